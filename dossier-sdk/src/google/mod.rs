pub mod api;
mod prompts;
mod service;

pub use service::{
    GeminiService, GeminiServiceOptions, DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VOICE,
};
