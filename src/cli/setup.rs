use super::quotes::setup_instructions;
use crate::core::config::{ApiCredentials, AppConfig};
use anyhow::{Context, Result};
use std::path::Path;

// Shipped in the binary so `setup` works without the source tree.
const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the default location and prints what to do next.
pub fn setup(credentials: &ApiCredentials) -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(&path)?;
    println!("{}", next_steps(&path, credentials));
    Ok(())
}

/// Writes the example configuration to `path`. Refuses to overwrite an existing file.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!(path = %path.display(), "Created example configuration");
    Ok(())
}

/// Confirmation text; API keys live in the environment, so point at them when none is set.
pub fn next_steps(path: &Path, credentials: &ApiCredentials) -> String {
    let mut text = format!(
        "Created {}. Edit `symbols` there to choose what to track.",
        path.display()
    );
    if !credentials.has_any() {
        text.push_str("\n\n");
        text.push_str(&setup_instructions());
    }
    text
}
