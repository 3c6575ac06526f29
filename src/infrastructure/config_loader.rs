use crate::domain::tracer::TracerConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a `TracerConfig` from a TOML file. Missing keys keep their defaults.
///
/// ```toml
/// verbose = true
/// save = true
/// path = "out/fib.html"
/// display_args = [0]
/// ```
pub fn load_config(path: &Path) -> Result<TracerConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    tracing::debug!(target: "rectrace::config", path = %path.display(), ?config, "Loaded tracer config");
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<TracerConfig> {
    toml::from_str(content).context("Failed to parse TOML")
}
