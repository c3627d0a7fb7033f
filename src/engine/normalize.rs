//! Normalization to canonical form
//!
//! Freshly read buffers go through three independent passes, each applied
//! only when needed:
//!
//! 1. 8-bit unsigned → 16-bit signed
//! 2. mono → stereo
//! 3. any sample rate → 44.1kHz (linear interpolation, see
//!    [`WaveBuffer::stretched`])
//!
//! Every pass returns a new buffer; nothing is mutated through an alias.

use tracing::debug;

use crate::engine::buffer::WaveBuffer;
use crate::engine::format::{FormatDescriptor, CANONICAL_SAMPLE_RATE, MAX_FRAMES};
use crate::error::{Result, WavError};

/// Convert a raw buffer to canonical 16-bit stereo 44.1kHz
///
/// An already-canonical buffer comes back byte-for-byte unchanged.
///
/// # Errors
/// * `UnsupportedFormat` - not PCM, more than two channels, inconsistent
///   descriptor, a width other than 8 or 16 bits, a zero sample rate, or a
///   result that still fails canonical validation
pub fn normalize(buffer: WaveBuffer) -> Result<WaveBuffer> {
    buffer.validate()?;

    let buffer = widen_to_16_bit(buffer)?;
    let buffer = upmix_to_stereo(buffer)?;
    let buffer = resample_to_canonical_rate(buffer)?;

    buffer.validate_canonical().map_err(|e| {
        WavError::unsupported(format!("normalization left buffer non-canonical: {}", e))
    })?;

    Ok(buffer)
}

/// Map an unsigned 8-bit sample onto the signed 16-bit range
///
/// `(old - 128) * 256 + old`: 0 → -32768, 128 → 128, 255 → 32767.
#[inline]
pub fn widen_sample(old: u8) -> i16 {
    let old = i32::from(old);
    ((old - 128) * 256 + old) as i16
}

fn widen_to_16_bit(buffer: WaveBuffer) -> Result<WaveBuffer> {
    match buffer.format().bits_per_sample {
        16 => Ok(buffer),
        8 => {
            debug!("Converting 8-bit PCM to 16-bit");
            let (format, data) = buffer.into_parts();

            let payload: Vec<u8> = data
                .bytes()
                .iter()
                .flat_map(|&old| widen_sample(old).to_le_bytes())
                .collect();

            let mut format = doubled(format)?;
            format.bits_per_sample = 16;
            Ok(WaveBuffer::from_payload(format, payload))
        }
        bits => Err(WavError::unsupported(format!(
            "{} bits per sample (only 8 and 16 are supported)",
            bits
        ))),
    }
}

fn upmix_to_stereo(buffer: WaveBuffer) -> Result<WaveBuffer> {
    if buffer.format().channels != 1 {
        return Ok(buffer);
    }

    debug!("Converting mono to stereo");
    let (format, data) = buffer.into_parts();

    let mut payload = Vec::with_capacity(data.bytes().len() * 2);
    for sample in data.bytes().chunks_exact(2) {
        payload.extend_from_slice(sample);
        payload.extend_from_slice(sample);
    }

    let mut format = doubled(format)?;
    format.channels = 2;
    Ok(WaveBuffer::from_payload(format, payload))
}

fn resample_to_canonical_rate(buffer: WaveBuffer) -> Result<WaveBuffer> {
    let rate = buffer.format().sample_rate;
    if rate == CANONICAL_SAMPLE_RATE {
        return Ok(buffer);
    }
    if rate == 0 {
        return Err(WavError::unsupported("sample rate of 0 Hz"));
    }

    let old_frames = buffer.frame_count();
    let new_frames = old_frames as u64 * u64::from(CANONICAL_SAMPLE_RATE) / u64::from(rate);
    if new_frames > MAX_FRAMES as u64 {
        return Err(WavError::unsupported(format!(
            "resampling {} frames from {} Hz needs {} frames, more than a data chunk can hold",
            old_frames, rate, new_frames
        )));
    }
    let new_frames = new_frames as usize;

    debug!(
        from_rate = rate,
        to_rate = CANONICAL_SAMPLE_RATE,
        old_frames,
        new_frames,
        "Resampling"
    );

    let (_, data) = buffer.stretched(new_frames).into_parts();
    Ok(WaveBuffer::from_parts(FormatDescriptor::canonical(), data))
}

/// Double byte rate and block align, as each pass doubles the frame size
fn doubled(mut format: FormatDescriptor) -> Result<FormatDescriptor> {
    let overflow = || WavError::unsupported("byte rate overflows during conversion");
    format.byte_rate = format.byte_rate.checked_mul(2).ok_or_else(overflow)?;
    format.block_align = format.block_align.checked_mul(2).ok_or_else(overflow)?;
    Ok(format)
}

// ============================================================================
// Tests
// ============================================================================
