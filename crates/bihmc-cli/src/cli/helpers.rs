use super::CliError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub(super) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let value = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    Ok(value)
}

pub(super) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create '{}'", parent.display()))?;
        }
    }
    let rendered = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize report for '{}'", path.display()))?;
    fs::write(path, rendered).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}
