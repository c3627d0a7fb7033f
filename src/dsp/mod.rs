//! Sample-accurate operations on canonical buffers
//!
//! Each module adds methods to [`WaveBuffer`](crate::engine::WaveBuffer):
//! - `stretched` / `stretched_relative` (linear-interpolation resampling)
//! - `add` / `add_with` (additive mixing with fade-out and clipping)
//! - `fade_samples` / `fade_fraction` (tail fades)

mod fade;
mod mix;
mod resample;

pub use mix::{MixOutcome, MixParams};
