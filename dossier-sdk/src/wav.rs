//! RIFF/WAVE container for the fixed mono 16-bit 24 kHz stream.

use crate::audio_utils::{
    waveform_to_pcm16, Waveform, BITS_PER_SAMPLE, NUM_CHANNELS, SAMPLE_RATE,
};

pub const HEADER_LEN: usize = 44;
pub const WAV_MIME_TYPE: &str = "audio/wav";

const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_SIZE: u32 = 16;

/// The fields of the canonical 44-byte PCM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub chunk_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Header for `data_size` bytes of mono 16-bit PCM at [`SAMPLE_RATE`].
    #[must_use]
    pub fn pcm16(data_size: u32) -> Self {
        let block_align = NUM_CHANNELS * BITS_PER_SAMPLE / 8;
        Self {
            chunk_size: 36 + data_size,
            audio_format: PCM_FORMAT,
            num_channels: NUM_CHANNELS,
            sample_rate: SAMPLE_RATE,
            byte_rate: SAMPLE_RATE * u32::from(block_align),
            block_align,
            bits_per_sample: BITS_PER_SAMPLE,
            data_size,
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        out[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        out[22..24].copy_from_slice(&self.num_channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_size.to_le_bytes());
        out
    }

    /// Read back a canonical header. Returns `None` when the chunk ids or
    /// the `fmt ` chunk size do not match the canonical layout.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let header = bytes.get(..HEADER_LEN)?;
        let u16_at = |at: usize| u16::from_le_bytes([header[at], header[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
        };

        if &header[0..4] != b"RIFF"
            || &header[8..12] != b"WAVE"
            || &header[12..16] != b"fmt "
            || u32_at(16) != FMT_CHUNK_SIZE
            || &header[36..40] != b"data"
        {
            return None;
        }

        Some(Self {
            chunk_size: u32_at(4),
            audio_format: u16_at(20),
            num_channels: u16_at(22),
            sample_rate: u32_at(24),
            byte_rate: u32_at(28),
            block_align: u16_at(32),
            bits_per_sample: u16_at(34),
            data_size: u32_at(40),
        })
    }

    #[must_use]
    pub fn sample_count(&self) -> u32 {
        self.data_size / u32::from(self.block_align.max(1))
    }
}

/// An encoded WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBlob(Vec<u8>);

impl WavBlob {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn header(&self) -> Option<WavHeader> {
        WavHeader::parse(&self.0)
    }
}

impl AsRef<[u8]> for WavBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Build the WAV container for `waveform`. Deterministic: the same samples
/// always produce the same bytes.
///
/// The size fields saturate for buffers beyond what RIFF can
/// describe.
#[must_use]
pub fn encode_wav(waveform: &Waveform) -> WavBlob {
    let data = waveform_to_pcm16(waveform.samples());
    let data_size = u32::try_from(data.len())
        .unwrap_or(u32::MAX)
        .min(u32::MAX - 36);
    let header = WavHeader::pcm16(data_size);

    let mut bytes = Vec::with_capacity(HEADER_LEN + data.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&data);
    WavBlob(bytes)
}
