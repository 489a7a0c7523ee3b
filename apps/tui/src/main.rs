//! ContentSynth TUI: interactive terminal interface for deconstructing
//! sources, curating an outline, and synthesizing articles.
//!
//! Built with `ratatui` + `crossterm`. Logs go to `~/.contentsynth/tui.log`
//! because the terminal is taken over by the interface.

mod app;
mod screens;
mod widgets;

use std::sync::Mutex;

use color_eyre::eyre::Result;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;
    app::run().await
}

fn init_tracing() -> Result<()> {
    let dir = contentsynth_shared::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::File::create(dir.join("tui.log"))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("contentsynth=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
