//! wavmix - In-Memory PCM WAV Buffers
//!
//! wavmix is the audio primitive layer for multi-track composition tools:
//! 1. Parse and write RIFF/WAVE containers
//! 2. Normalize 8/16-bit, mono/stereo, any-rate PCM to one canonical form
//! 3. Manipulate canonical buffers sample-accurately
//!
//! # Canonical form
//!
//! 16-bit signed little-endian PCM, stereo, 44.1kHz. One frame is four
//! bytes: left then right.
//!
//! # Example
//! ```
//! use wavmix::dsp::MixParams;
//! use wavmix::engine::WaveBuffer;
//!
//! let mut track = WaveBuffer::silence(44100);
//! let mut hit = WaveBuffer::silence(100);
//! for frame in 0..100 {
//!     hit.set(frame, 8000, 8000);
//! }
//!
//! track.add(&hit, &MixParams::new(100).target_at(22050).fadeout(20));
//! track.fade_fraction(0.1);
//! assert_eq!(track.get(22050), (8000, 8000));
//! ```

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;

pub use config::{Config, SaveMode};
pub use engine::{Diagnostics, FormatDescriptor, WaveBuffer};
pub use error::{Result, WavError};
