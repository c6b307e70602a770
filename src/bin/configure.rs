//! Write a model configuration document interactively.
use anyhow::{Context, Result};
use modelsmith::console::Console;
use modelsmith::logging;
use modelsmith::editor::EditorSession;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(logging::env_filter())
        .init();

    let mut session = EditorSession::new(Console::stdio());
    session.run()
        .context("configuration editor failed")?;
    Ok(())
}
