//! Wave Buffer Management
//!
//! Provides the core buffer type: a [`FormatDescriptor`] paired with a raw
//! little-endian PCM payload. Sample accessors assume canonical form
//! (16-bit signed stereo, interleaved, 4 bytes per frame).

use crate::engine::diagnostics::{DiagnosticKind, Diagnostics};
use crate::engine::format::{FormatDescriptor, BYTES_PER_FRAME};
use crate::error::{Result, WavError};

// ============================================================================
// Data Chunk
// ============================================================================

/// Declared size plus raw payload of a `data` chunk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataChunk {
    size: u32,
    bytes: Vec<u8>,
}

impl DataChunk {
    /// Wrap a payload, declaring its own length as the chunk size
    ///
    /// Payloads longer than `u32::MAX` saturate the declared size, which
    /// [`is_consistent`](Self::is_consistent) then reports.
    pub fn from_payload(bytes: Vec<u8>) -> Self {
        let size = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        Self { size, bytes }
    }

    /// Declared chunk size
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Raw payload
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared size matches the payload length
    pub fn is_consistent(&self) -> bool {
        self.size as usize == self.bytes.len()
    }
}

// ============================================================================
// Wave Buffer
// ============================================================================

/// A PCM descriptor and its payload, exclusively owned by one caller
///
/// Buffers are created either as silence (already canonical) or by loading
/// and normalizing external bytes. `Clone` produces an independent deep
/// copy.
///
/// # Example
/// ```
/// use wavmix::engine::WaveBuffer;
///
/// let mut buffer = WaveBuffer::silence(100);
/// buffer.set(10, 1000, -1000);
/// assert_eq!(buffer.get(10), (1000, -1000));
/// assert_eq!(buffer.frame_count(), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveBuffer {
    format: FormatDescriptor,
    data: DataChunk,
}

impl WaveBuffer {
    /// Create a canonical buffer of `frames` silent frames
    ///
    /// # Panics
    /// If `frames * BYTES_PER_FRAME` overflows `usize`. Buffers longer than
    /// [`MAX_FRAMES`](crate::engine::MAX_FRAMES) can be built but not saved
    /// in strict mode.
    pub fn silence(frames: usize) -> Self {
        Self {
            format: FormatDescriptor::canonical(),
            data: DataChunk::from_payload(vec![
                0;
                frames
                    .checked_mul(BYTES_PER_FRAME)
                    .unwrap_or_else(|| panic!("{} frames overflow the payload length", frames))
            ]),
        }
    }

    /// Assemble a buffer from parts without validating them
    ///
    /// Used by the container reader; the result may be in any format and is
    /// normally passed straight to the normalizer.
    pub fn from_parts(format: FormatDescriptor, data: DataChunk) -> Self {
        Self { format, data }
    }

    /// Assemble a buffer from a descriptor and payload bytes
    pub fn from_payload(format: FormatDescriptor, payload: Vec<u8>) -> Self {
        Self::from_parts(format, DataChunk::from_payload(payload))
    }

    /// Consume the buffer, returning its parts
    pub fn into_parts(self) -> (FormatDescriptor, DataChunk) {
        (self.format, self.data)
    }

    #[inline]
    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    #[inline]
    pub fn data(&self) -> &DataChunk {
        &self.data
    }

    /// Raw payload bytes
    #[inline]
    pub fn payload(&self) -> &[u8] {
        self.data.bytes()
    }

    /// Frames according to the descriptor: `data size / block align`
    pub fn frame_count(&self) -> usize {
        if self.format.block_align == 0 {
            return 0;
        }
        self.data.size() as usize / self.format.block_align as usize
    }

    /// Check if the buffer has no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.format.sample_rate as f64
    }

    /// Check descriptor consistency and `size == len(payload)`
    pub fn validate(&self) -> Result<()> {
        self.format.validate()?;
        self.check_data_size()
    }

    /// Check full canonical invariants
    pub fn validate_canonical(&self) -> Result<()> {
        self.format.validate_canonical()?;
        self.check_data_size()
    }

    fn check_data_size(&self) -> Result<()> {
        if !self.data.is_consistent() {
            return Err(WavError::unsupported(format!(
                "data chunk size {} does not match payload length {}",
                self.data.size(),
                self.data.bytes().len()
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Sample accessors (canonical layout)
    // ------------------------------------------------------------------------

    /// Number of complete 4-byte frames in the payload
    #[inline]
    fn canonical_frames(&self) -> usize {
        self.data.bytes.len() / BYTES_PER_FRAME
    }

    /// Read a frame, or `None` past the end
    #[inline]
    pub fn frame(&self, frame: usize) -> Option<(i16, i16)> {
        if frame >= self.canonical_frames() {
            return None;
        }
        let n = frame * BYTES_PER_FRAME;
        let b = &self.data.bytes[n..n + BYTES_PER_FRAME];
        Some((
            i16::from_le_bytes([b[0], b[1]]),
            i16::from_le_bytes([b[2], b[3]]),
        ))
    }

    /// Write a frame; returns false (and writes nothing) past the end
    #[inline]
    pub fn set_frame(&mut self, frame: usize, left: i16, right: i16) -> bool {
        if frame >= self.canonical_frames() {
            return false;
        }
        let n = frame * BYTES_PER_FRAME;
        let b = &mut self.data.bytes[n..n + BYTES_PER_FRAME];
        b[..2].copy_from_slice(&left.to_le_bytes());
        b[2..].copy_from_slice(&right.to_le_bytes());
        true
    }

    /// Read `(left, right)` at `frame`; `(0, 0)` past the end
    pub fn get(&self, frame: usize) -> (i16, i16) {
        self.get_with(frame, Diagnostics::global())
    }

    /// [`get`](Self::get) reporting out-of-range reads to `diagnostics`
    pub fn get_with(&self, frame: usize, diagnostics: &Diagnostics) -> (i16, i16) {
        match self.frame(frame) {
            Some(samples) => samples,
            None => {
                diagnostics.report(DiagnosticKind::OutOfRangeRead, || {
                    format!(
                        "read of frame {} past end of {}-frame buffer",
                        frame,
                        self.canonical_frames()
                    )
                });
                (0, 0)
            }
        }
    }

    /// Write `(left, right)` at `frame`; silently ignored past the end
    pub fn set(&mut self, frame: usize, left: i16, right: i16) {
        self.set_with(frame, left, right, Diagnostics::global())
    }

    /// [`set`](Self::set) reporting out-of-range writes to `diagnostics`
    pub fn set_with(&mut self, frame: usize, left: i16, right: i16, diagnostics: &Diagnostics) {
        if !self.set_frame(frame, left, right) {
            diagnostics.report(DiagnosticKind::OutOfRangeWrite, || {
                format!(
                    "write of frame {} past end of {}-frame buffer",
                    frame,
                    self.canonical_frames()
                )
            });
        }
    }
}

impl Default for WaveBuffer {
    fn default() -> Self {
        Self::silence(0)
    }
}

// ============================================================================
// Tests
// ============================================================================
