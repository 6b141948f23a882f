use crate::{AudioError, SpeechAudio};
use base64::Engine as _;

/// Sample rate of the PCM stream returned by the speech service.
pub const SAMPLE_RATE: u32 = 24_000;
pub const NUM_CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

/// A single channel of normalized samples in `[-1.0, 1.0]` at [`SAMPLE_RATE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
}

impl Waveform {
    #[must_use]
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(SAMPLE_RATE)
    }
}

impl From<Vec<f32>> for Waveform {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

pub fn decode_base64(b64: &str) -> Result<Vec<u8>, AudioError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(b64)?)
}

/// Interpret `bytes` as signed 16-bit little-endian samples and normalize
/// each one by 32768.
///
/// Odd-length buffers are rejected instead of dropping the trailing byte.
pub fn pcm16_to_waveform(bytes: &[u8]) -> Result<Waveform, AudioError> {
    if bytes.len() % 2 != 0 {
        return Err(AudioError::InvalidFormat(bytes.len()));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|chunk| f32::from(i16::from_le_bytes([chunk[0], chunk[1]])) / 32768.0)
        .collect();

    Ok(Waveform::new(samples))
}

/// Quantize a normalized sample. Negative values scale by 32768 and
/// non-negative values by 32767, truncating toward zero, so `-1.0` maps to
/// `i16::MIN` and `1.0` to `i16::MAX` without wrapping.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn sample_to_i16(sample: f32) -> i16 {
    let clamped = f64::from(sample.clamp(-1.0, 1.0));
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

#[must_use]
pub fn waveform_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut result_bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        result_bytes.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
    }
    result_bytes
}

/// Read the `rate=` parameter of a linear PCM mime type such as
/// `audio/L16;codec=pcm;rate=24000`.
#[must_use]
pub fn pcm_rate_from_mime_type(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("rate"))
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Decoding context shared by every speech payload of one generation run.
/// It is dropped at the end of the run.
#[derive(Debug)]
pub struct PcmDecoder {
    sample_rate: u32,
    decoded: usize,
}

impl Default for PcmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PcmDecoder {
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!(sample_rate = SAMPLE_RATE, "opened pcm decode context");
        Self {
            sample_rate: SAMPLE_RATE,
            decoded: 0,
        }
    }

    pub fn decode(&mut self, audio: &SpeechAudio) -> Result<Waveform, AudioError> {
        if let Some(actual) = audio.mime_type.as_deref().and_then(pcm_rate_from_mime_type) {
            if actual != self.sample_rate {
                return Err(AudioError::SampleRateMismatch {
                    expected: self.sample_rate,
                    actual,
                });
            }
        }

        let bytes = decode_base64(&audio.data)?;
        let waveform = pcm16_to_waveform(&bytes)?;
        self.decoded += 1;
        Ok(waveform)
    }

    #[must_use]
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl Drop for PcmDecoder {
    fn drop(&mut self) {
        tracing::debug!(decoded = self.decoded, "released pcm decode context");
    }
}
