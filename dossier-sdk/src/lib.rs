pub mod audio_utils;
mod client_utils;
pub mod dossier_sdk_test;
mod errors;
pub mod google;
pub mod opentelemetry;
pub mod retry;
mod service;
pub mod wav;

pub use audio_utils::{PcmDecoder, Waveform, SAMPLE_RATE};
pub use errors::*;
pub use retry::{retry, RetryPolicy, Retryable};
pub use service::*;
pub use wav::{encode_wav, WavBlob, WavHeader};
