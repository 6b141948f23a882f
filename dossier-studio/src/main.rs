use clap::{Parser, Subcommand};
use dossier_studio::{
    export::write_dossier,
    server::{self, AppState},
    Dossier, FailureNotice, MediaStore, Studio, StudioConfig, StudioError,
};
use std::{net::SocketAddr, path::PathBuf, process::ExitCode};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Research a subject with Gemini and turn it into a dossier and two
/// narrated podcasts.
#[derive(Parser, Debug)]
#[command(name = "dossier-studio")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the dossier and both podcasts for a subject
    Generate {
        /// The subject to research
        subject: String,

        /// Output directory (defaults to DOSSIER_OUTPUT_DIR or .)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also export the PDF dossier
        #[arg(long)]
        pdf: bool,
    },

    /// Serve the studio over HTTP
    Serve {
        /// Bind address (defaults to DOSSIER_BIND_ADDR or 127.0.0.1:3000)
        #[arg(short, long)]
        addr: Option<SocketAddr>,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn print_notice(notice: &FailureNotice) {
    eprintln!("{}\n{}", notice.title, notice.message);
}

fn print_summary(dossier: &Dossier) {
    println!("Dossiê: {}\n", dossier.subject);
    println!("{}\n", dossier.research.summary);
    for fact in &dossier.research.facts {
        println!("  - {fact}");
    }
    println!();
    for podcast in &dossier.media {
        println!(
            "{} ({:.1}s): {}",
            podcast.title, podcast.duration_secs, podcast.filename
        );
    }
}

async fn generate(
    config: StudioConfig,
    subject: &str,
    out: Option<PathBuf>,
    pdf: bool,
) -> Result<(), StudioError> {
    let media = MediaStore::new();
    let mut studio = Studio::from_config(&config, media.clone());
    let dossier = studio.generate(subject).await?;

    let dir = out.unwrap_or(config.output_dir);
    let written = write_dossier(dossier, &media, &dir, pdf).await?;

    print_summary(dossier);
    for path in written {
        println!("-> {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = match StudioConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            print_notice(&FailureNotice::from_error(&error.into()));
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Generate { subject, out, pdf } => {
            match generate(config, &subject, out, pdf).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    print_notice(&FailureNotice::from_error(&error));
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or(config.bind_addr);
            let studio = Studio::from_config(&config, MediaStore::new());
            match server::serve(AppState::new(studio), addr).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    tracing::error!(%error, "server failed");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
