//! Stream and file I/O for wavmix
//!
//! The core only needs a [`Read`] to load and a [`Write`] to save. The
//! `*_file` helpers open files with buffering and tag open/create failures
//! with the path.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::info;

use crate::config::SaveMode;
use crate::engine::buffer::WaveBuffer;
use crate::engine::diagnostics::Diagnostics;
use crate::engine::normalize::normalize;
use crate::engine::riff::{read_wave, write_wave};
use crate::error::{Result, WavError};

/// Read and normalize a RIFF/WAVE stream
pub fn load<R: Read>(reader: R) -> Result<WaveBuffer> {
    normalize(read_wave(reader)?)
}

/// Save a buffer to a stream
pub fn save<W: Write>(
    buffer: &WaveBuffer,
    writer: W,
    mode: SaveMode,
    diagnostics: &Diagnostics,
) -> Result<()> {
    write_wave(buffer, writer, mode, diagnostics)
}

/// Load and normalize a WAV file
///
/// # Errors
/// * `StreamIo` - the file cannot be opened or read
/// * `MalformedContainer` - the file is not a readable RIFF/WAVE container
/// * `UnsupportedFormat` - the audio cannot be normalized
pub fn load_file(path: &Path) -> Result<WaveBuffer> {
    let file = File::open(path)
        .map_err(|e| WavError::stream(format!("opening '{}'", path.display()), e))?;

    let raw = read_wave(BufReader::new(file))?;
    let fmt = *raw.format();
    info!(
        path = %path.display(),
        channels = fmt.channels,
        sample_rate = fmt.sample_rate,
        bits_per_sample = fmt.bits_per_sample,
        frames = raw.frame_count(),
        "Loaded WAV"
    );

    normalize(raw)
}

/// Save a buffer to a WAV file, creating or truncating it
pub fn save_file(
    buffer: &WaveBuffer,
    path: &Path,
    mode: SaveMode,
    diagnostics: &Diagnostics,
) -> Result<()> {
    // Strict mode must not leave an empty file behind
    if mode == SaveMode::Strict {
        buffer.validate_canonical()?;
    }

    let file = File::create(path)
        .map_err(|e| WavError::stream(format!("creating '{}'", path.display()), e))?;

    write_wave(buffer, BufWriter::new(file), mode, diagnostics)?;
    info!(path = %path.display(), frames = buffer.frame_count(), "Saved WAV");
    Ok(())
}
