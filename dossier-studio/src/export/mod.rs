//! Downloadable artifacts: podcast WAV files and the PDF dossier.

pub mod filenames;
pub mod pdf;

use crate::Dossier;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use filenames::{pdf_filename, slugify, wav_filename};
pub use pdf::render_dossier_pdf;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
    #[error("Media {0} is no longer available")]
    MediaRevoked(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write both podcasts (and optionally the PDF) into `dir`, returning the
/// written paths.
pub async fn write_dossier(
    dossier: &Dossier,
    media: &crate::MediaStore,
    dir: &Path,
    include_pdf: bool,
) -> Result<Vec<PathBuf>, ExportError> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::with_capacity(dossier.media.len() + 1);
    for podcast in &dossier.media {
        let entry = media
            .get(&podcast.handle)
            .ok_or_else(|| ExportError::MediaRevoked(podcast.handle.to_string()))?;
        let path = dir.join(&podcast.filename);
        tokio::fs::write(&path, &entry.bytes).await?;
        tracing::info!(path = %path.display(), bytes = entry.bytes.len(), "podcast written");
        written.push(path);
    }

    if include_pdf {
        let bytes = render_dossier_pdf(dossier)?;
        let path = dir.join(pdf_filename(&dossier.subject));
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "dossier PDF written");
        written.push(path);
    }

    Ok(written)
}
