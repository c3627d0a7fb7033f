//! CLI Module
//!
//! Command-line interface for wavmix.

pub mod commands;

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// wavmix - normalize, stretch, mix and fade PCM WAV files
#[derive(Parser, Debug)]
#[command(name = "wavmix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Refuse to save non-canonical buffers
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print format, length and payload checksum as JSON
    #[command(name = "info")]
    Info {
        /// Input WAV file
        input: PathBuf,
        /// Also print the samples of this frame
        #[arg(long)]
        frame: Option<usize>,
    },

    /// Convert to 16-bit stereo 44.1kHz
    #[command(name = "normalize")]
    Normalize {
        /// Input WAV file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
    },

    /// Resample to a new length
    #[command(name = "stretch")]
    #[command(group(ArgGroup::new("length").required(true).args(["frames", "factor"])))]
    Stretch {
        /// Input WAV file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Exact output length in frames
        #[arg(long)]
        frames: Option<usize>,
        /// Length multiplier
        #[arg(long)]
        factor: Option<f64>,
    },

    /// Mix a source file into a target file
    #[command(name = "mix")]
    Mix {
        /// Target WAV file (defines the output length)
        target: PathBuf,
        /// Source WAV file
        source: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// First target frame to mix into
        #[arg(long, default_value_t = 0)]
        at: usize,
        /// First source frame to mix from
        #[arg(long, default_value_t = 0)]
        from: usize,
        /// Maximum frames to mix (default: all of the source)
        #[arg(long)]
        frames: Option<usize>,
        /// Source volume
        #[arg(long, default_value_t = 1.0)]
        volume: f64,
        /// Fade-out length in frames at the end of the mixed window
        #[arg(long, default_value_t = 0)]
        fadeout: usize,
    },

    /// Fade the end of a file to silence
    #[command(name = "fade")]
    #[command(group(ArgGroup::new("length").required(true).args(["frames", "fraction"])))]
    Fade {
        /// Input WAV file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Number of frames to fade
        #[arg(long)]
        frames: Option<usize>,
        /// Fraction of the file to fade (0.0 - 1.0)
        #[arg(long)]
        fraction: Option<f64>,
    },

    /// Write a silent canonical file
    #[command(name = "silence")]
    Silence {
        /// Output WAV file
        output: PathBuf,
        /// Length in frames
        #[arg(long)]
        frames: usize,
    },
}
