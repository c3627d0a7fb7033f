//! wavmix CLI
//!
//! Command-line front end for the wavmix buffer library.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wavmix::cli::commands::{self, Session};
use wavmix::cli::{Cli, Commands};
use wavmix::config::{Config, SaveMode};
use wavmix::engine::Diagnostics;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("wavmix v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if cli.strict {
        config.save_mode = SaveMode::Strict;
    }

    // Library accessors that take no limiter follow the configured policies too
    Diagnostics::install_global(config.diagnostics());

    let session = Session::new(config);
    handle_command(&session, cli.command)
}

fn handle_command(session: &Session, cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Info { input, frame } => commands::info(session, &input, frame)
            .with_context(|| format!("reading {}", input.display())),
        Commands::Normalize { input, output } => commands::normalize(session, &input, &output)
            .with_context(|| format!("normalizing {}", input.display())),
        Commands::Stretch {
            input,
            output,
            frames,
            factor,
        } => commands::stretch(session, &input, &output, frames, factor)
            .with_context(|| format!("stretching {}", input.display())),
        Commands::Mix {
            target,
            source,
            output,
            at,
            from,
            frames,
            volume,
            fadeout,
        } => commands::mix(
            session, &target, &source, &output, at, from, frames, volume, fadeout,
        )
        .with_context(|| format!("mixing {} into {}", source.display(), target.display())),
        Commands::Fade {
            input,
            output,
            frames,
            fraction,
        } => commands::fade(session, &input, &output, frames, fraction)
            .with_context(|| format!("fading {}", input.display())),
        Commands::Silence { output, frames } => commands::silence(session, &output, frames)
            .with_context(|| format!("writing {}", output.display())),
    }
}
