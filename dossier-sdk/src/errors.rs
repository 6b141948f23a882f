use thiserror::Error;

/// Failures of the audio pipeline (base64 → PCM → waveform → WAV).
#[derive(Error, Debug)]
pub enum AudioError {
    /// The payload is not valid standard base64.
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),
    /// The PCM byte buffer cannot be split into 16-bit samples.
    #[error("Invalid PCM format: {0} bytes is not a whole number of 16-bit samples")]
    InvalidFormat(usize),
    /// The service reported a sample rate other than the fixed pipeline rate.
    #[error("Sample rate mismatch: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },
}

/// Coarse classification of a [`ServiceError`], assigned where the failure
/// happens rather than recovered from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transient,
    Blocked,
    Synthesis,
    Decode,
    InvalidFormat,
    Fatal,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    /// The API credential is missing, a placeholder, or rejected by the
    /// provider.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Server side fault or an interrupted network load. Safe to retry.
    #[error("Transient service error: {0}")]
    Transient(String),
    /// The request never reached the provider (refused connection, blocked
    /// by an ad blocker, proxy or restrictive network).
    #[error("Request blocked: {0}")]
    Blocked(#[source] reqwest::Error),
    /// The request returns a non-OK status code that is not retryable
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The speech service answered without an audio payload.
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),
    #[error(transparent)]
    Audio(#[from] AudioError),
    /// The response from the provider was unexpected. (e.g. no candidate or
    /// a research document that does not match the schema)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Transient(_) => ErrorKind::Transient,
            Self::Blocked(_) => ErrorKind::Blocked,
            Self::Synthesis(_) => ErrorKind::Synthesis,
            Self::Audio(AudioError::Decode(_)) => ErrorKind::Decode,
            Self::Audio(_) => ErrorKind::InvalidFormat,
            Self::StatusCode(..) | Self::Invariant(..) | Self::Transport(_) => ErrorKind::Fatal,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
