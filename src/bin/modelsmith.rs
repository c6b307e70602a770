//! Build, train, evaluate, and save a model from a YAML document.
use anyhow::{Context, Result};
use modelsmith::console::Console;
use modelsmith::logging;
use modelsmith::trainer;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(logging::env_filter())
        .init();

    let mut console = Console::stdio();
    trainer::run_session(&mut console)
        .context("model session failed")?;
    Ok(())
}
