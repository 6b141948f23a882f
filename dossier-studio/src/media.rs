use axum::body::Bytes;
use serde::{Serialize, Serializer};
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

const ROUTE_PREFIX: &str = "/media/";

/// Revocable reference to a published blob, rendered as `/media/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaHandle(String);

impl MediaHandle {
    fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Parse either a bare id or a `/media/{id}` url.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let id = value.strip_prefix(ROUTE_PREFIX).unwrap_or(value);
        let valid = id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit());
        valid.then(|| Self(id.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("{ROUTE_PREFIX}{}", self.0)
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ROUTE_PREFIX}{}", self.0)
    }
}

impl Serialize for MediaHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub bytes: Bytes,
    pub content_type: String,
    pub filename: String,
}

/// In-memory blob store shared between the pipeline and the HTTP server.
/// Cloning yields another view of the same store.
#[derive(Debug, Clone, Default)]
pub struct MediaStore {
    entries: Arc<Mutex<HashMap<MediaHandle, MediaEntry>>>,
}

impl MediaStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<MediaHandle, MediaEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(
        &self,
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> MediaHandle {
        let handle = MediaHandle::generate();
        let entry = MediaEntry {
            bytes: bytes.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        };
        tracing::debug!(%handle, filename = %entry.filename, len = entry.bytes.len(), "media published");
        self.entries().insert(handle.clone(), entry);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: &MediaHandle) -> Option<MediaEntry> {
        self.entries().get(handle).cloned()
    }

    /// Returns whether the handle was live.
    pub fn revoke(&self, handle: &MediaHandle) -> bool {
        let removed = self.entries().remove(handle).is_some();
        if removed {
            tracing::debug!(%handle, "media revoked");
        }
        removed
    }

    pub fn revoke_all(&self) {
        self.entries().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
