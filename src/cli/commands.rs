//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::Config;
use crate::dsp::MixParams;
use crate::engine::{
    load_file, save_file, Diagnostics, FormatDescriptor, WaveBuffer, MAX_FRAMES,
};
use crate::error::{Result, WavError};

/// Configuration and diagnostics shared by every command in one run
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub diagnostics: Diagnostics,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            diagnostics: config.diagnostics(),
            config,
        }
    }

    fn save(&self, buffer: &WaveBuffer, path: &Path) -> Result<()> {
        save_file(buffer, path, self.config.save_mode, &self.diagnostics)
    }
}

/// Report printed by `info`
#[derive(Debug, Serialize)]
pub struct WavInfo {
    pub format: FormatDescriptor,
    pub frames: usize,
    pub duration_secs: f64,
    pub payload_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<FrameSample>,
}

/// One frame's samples, as requested with `info --frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSample {
    pub frame: usize,
    pub left: i16,
    pub right: i16,
}

impl WavInfo {
    pub fn of(buffer: &WaveBuffer) -> Self {
        Self {
            format: *buffer.format(),
            frames: buffer.frame_count(),
            duration_secs: buffer.duration_secs(),
            payload_sha256: format!("{:x}", Sha256::digest(buffer.payload())),
            sample: None,
        }
    }

    /// Include frame `frame`; past the end reads as silence and is reported
    pub fn with_sample(
        mut self,
        buffer: &WaveBuffer,
        frame: usize,
        diagnostics: &Diagnostics,
    ) -> Self {
        let (left, right) = buffer.get_with(frame, diagnostics);
        self.sample = Some(FrameSample { frame, left, right });
        self
    }
}

/// Print the normalized format of a file.
pub fn info(session: &Session, input: &Path, frame: Option<usize>) -> Result<()> {
    let buffer = load_file(input)?;

    let mut report = WavInfo::of(&buffer);
    if let Some(frame) = frame {
        report = report.with_sample(&buffer, frame, &session.diagnostics);
    }

    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Reject lengths whose payload cannot be described by a `data` chunk
fn check_length(frames: usize) -> Result<usize> {
    if frames > MAX_FRAMES {
        return Err(WavError::unsupported(format!(
            "{} frames exceeds the limit of {} for a WAV data chunk",
            frames, MAX_FRAMES
        )));
    }
    Ok(frames)
}

/// Normalize a file to canonical form.
pub fn normalize(session: &Session, input: &Path, output: &Path) -> Result<()> {
    info!("Normalizing {} -> {}", input.display(), output.display());

    let buffer = load_file(input)?;
    session.save(&buffer, output)?;

    println!("Wrote {} frames to {}", buffer.frame_count(), output.display());
    Ok(())
}

/// Resample a file to an exact length or by a factor.
pub fn stretch(
    session: &Session,
    input: &Path,
    output: &Path,
    frames: Option<usize>,
    factor: Option<f64>,
) -> Result<()> {
    let buffer = load_file(input)?;
    let original_frames = buffer.frame_count();

    let stretched = match (frames, factor) {
        (Some(frames), _) => buffer.stretched(check_length(frames)?),
        (None, Some(factor)) => {
            // Same length `stretched_relative` would pick; NaN and negatives become 0
            check_length((original_frames as f64 * factor).floor() as usize)?;
            buffer.stretched_relative(factor)
        }
        (None, None) => buffer,
    };

    info!(
        "Stretched {} frames to {}",
        original_frames,
        stretched.frame_count()
    );
    session.save(&stretched, output)?;

    println!(
        "Wrote {} frames to {}",
        stretched.frame_count(),
        output.display()
    );
    Ok(())
}

/// Mix one file into another.
#[allow(clippy::too_many_arguments)]
pub fn mix(
    session: &Session,
    target: &Path,
    source: &Path,
    output: &Path,
    at: usize,
    from: usize,
    frames: Option<usize>,
    volume: f64,
    fadeout: usize,
) -> Result<()> {
    let mut mixed = load_file(target)?;
    let source_buffer = load_file(source)?;

    let params = MixParams {
        target_offset: at,
        source_offset: from,
        frames: frames.unwrap_or_else(|| source_buffer.frame_count()),
        volume,
        fadeout,
    };

    let outcome = mixed.add_with(&source_buffer, &params, &session.diagnostics);
    info!(
        frames_added = outcome.frames_added,
        clipped = outcome.clipped,
        "Mixed {} into {}",
        source.display(),
        target.display()
    );

    session.save(&mixed, output)?;

    println!(
        "Mixed {} frames{} into {}",
        outcome.frames_added,
        if outcome.clipped { " (clipped)" } else { "" },
        output.display()
    );
    Ok(())
}

/// Fade the tail of a file.
pub fn fade(
    session: &Session,
    input: &Path,
    output: &Path,
    frames: Option<usize>,
    fraction: Option<f64>,
) -> Result<()> {
    let mut buffer = load_file(input)?;

    match (frames, fraction) {
        (Some(frames), _) => buffer.fade_samples(frames),
        (None, Some(fraction)) => buffer.fade_fraction(fraction),
        (None, None) => {}
    }

    session.save(&buffer, output)?;
    println!("Faded {} -> {}", input.display(), output.display());
    Ok(())
}

/// Write a silent file.
pub fn silence(session: &Session, output: &Path, frames: usize) -> Result<()> {
    let frames = check_length(frames)?;
    session.save(&WaveBuffer::silence(frames), output)?;
    println!("Wrote {} silent frames to {}", frames, output.display());
    Ok(())
}
