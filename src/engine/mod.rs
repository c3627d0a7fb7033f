//! Wave Engine Module
//!
//! Core buffer handling:
//! - Format descriptor and canonical-form validation
//! - Wave buffer with frame accessors
//! - RIFF/WAVE reading and writing
//! - Normalization to canonical form
//! - Rate-limited diagnostics

pub mod buffer;
pub mod diagnostics;
pub mod format;
pub mod io;
pub mod normalize;
pub mod riff;

pub use buffer::{DataChunk, WaveBuffer};
pub use diagnostics::{DiagnosticKind, DiagnosticPolicy, Diagnostics};
pub use format::{
    FormatDescriptor, BYTES_PER_FRAME, CANONICAL_BITS_PER_SAMPLE, CANONICAL_CHANNELS,
    CANONICAL_SAMPLE_RATE, MAX_FRAMES,
};
pub use io::{load, load_file, save, save_file};
pub use normalize::normalize;
pub use riff::{read_wave, write_wave};
