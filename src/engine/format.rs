//! PCM format descriptor
//!
//! Mirrors the 16-byte body of a RIFF `fmt ` chunk and knows how to check
//! itself for internal consistency and for canonical form.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WavError};

// ============================================================================
// Constants
// ============================================================================

/// Format tag for uncompressed PCM
pub const PCM_FORMAT: u16 = 1;

/// Size of the `fmt ` chunk body this crate reads and writes
pub const FMT_CHUNK_SIZE: u32 = 16;

/// Canonical sample rate
pub const CANONICAL_SAMPLE_RATE: u32 = 44100;

/// Canonical channel count (stereo)
pub const CANONICAL_CHANNELS: u16 = 2;

/// Canonical sample width
pub const CANONICAL_BITS_PER_SAMPLE: u16 = 16;

/// Bytes per canonical frame (two 16-bit samples)
pub const BYTES_PER_FRAME: usize = 4;

/// Longest canonical buffer whose payload fits a 32-bit `data` chunk size
pub const MAX_FRAMES: usize = u32::MAX as usize / BYTES_PER_FRAME;

// ============================================================================
// Format Descriptor
// ============================================================================

/// Contents of a `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Format tag, 1 for PCM
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    /// Bytes per second
    pub byte_rate: u32,
    /// Bytes per frame
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl Default for FormatDescriptor {
    fn default() -> Self {
        Self::canonical()
    }
}

impl FormatDescriptor {
    /// Build a consistent PCM descriptor, deriving byte rate and block align
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let block_align = (u32::from(channels) * u32::from(bits_per_sample) / 8) as u16;
        Self {
            audio_format: PCM_FORMAT,
            channels,
            sample_rate,
            byte_rate: sample_rate * u32::from(block_align),
            block_align,
            bits_per_sample,
        }
    }

    /// 16-bit stereo at 44.1kHz
    pub fn canonical() -> Self {
        Self::pcm(
            CANONICAL_CHANNELS,
            CANONICAL_SAMPLE_RATE,
            CANONICAL_BITS_PER_SAMPLE,
        )
    }

    /// Byte rate implied by the other fields
    pub fn expected_byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * u64::from(self.channels) * u64::from(self.bits_per_sample)
            / 8
    }

    /// Block align implied by the other fields
    pub fn expected_block_align(&self) -> u32 {
        u32::from(self.channels) * u32::from(self.bits_per_sample) / 8
    }

    /// Check the descriptor is a PCM format this crate can normalize
    ///
    /// Bit depth is deliberately not checked here; the normalizer rejects
    /// unsupported widths itself.
    pub fn validate(&self) -> Result<()> {
        if self.audio_format != PCM_FORMAT {
            return Err(WavError::unsupported(format!(
                "audio format {} is not PCM",
                self.audio_format
            )));
        }

        if self.channels == 0 || self.channels > CANONICAL_CHANNELS {
            return Err(WavError::unsupported(format!(
                "{} channels (only mono and stereo are supported)",
                self.channels
            )));
        }

        if u64::from(self.byte_rate) != self.expected_byte_rate() {
            return Err(WavError::unsupported(format!(
                "byte rate {} does not match other fmt fields (expected {})",
                self.byte_rate,
                self.expected_byte_rate()
            )));
        }

        if u32::from(self.block_align) != self.expected_block_align() {
            return Err(WavError::unsupported(format!(
                "block align {} does not match other fmt fields (expected {})",
                self.block_align,
                self.expected_block_align()
            )));
        }

        Ok(())
    }

    /// Check the descriptor is consistent and canonical
    pub fn validate_canonical(&self) -> Result<()> {
        self.validate()?;

        if self.bits_per_sample != CANONICAL_BITS_PER_SAMPLE {
            return Err(WavError::unsupported(format!(
                "{} bits per sample (canonical is {})",
                self.bits_per_sample, CANONICAL_BITS_PER_SAMPLE
            )));
        }

        if self.channels != CANONICAL_CHANNELS {
            return Err(WavError::unsupported(format!(
                "{} channels (canonical is {})",
                self.channels, CANONICAL_CHANNELS
            )));
        }

        if self.sample_rate != CANONICAL_SAMPLE_RATE {
            return Err(WavError::unsupported(format!(
                "sample rate {} (canonical is {})",
                self.sample_rate, CANONICAL_SAMPLE_RATE
            )));
        }

        Ok(())
    }

    /// True if [`validate_canonical`](Self::validate_canonical) would succeed
    pub fn is_canonical(&self) -> bool {
        self.validate_canonical().is_ok()
    }
}
