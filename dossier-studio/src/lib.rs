pub mod config;
mod errors;
pub mod export;
pub mod media;
pub mod pipeline;
pub mod server;
pub mod state;

pub use config::{ConfigError, StudioConfig};
pub use errors::*;
pub use media::{MediaHandle, MediaStore};
pub use pipeline::Studio;
pub use state::{Dossier, GenerationStep, PodcastMedia, Scripts, StudioEvent, StudioState};
