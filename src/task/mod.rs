pub mod types;

use std::path::Path;

use crate::error::{AppError, Result};

pub use types::{ParseValueError, TaskDescriptor, TaskType};

/// Load a task descriptor from a JSON or TOML file, chosen by extension.
pub fn load_from_file(path: &Path) -> Result<TaskDescriptor> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::TaskFile(format!("Failed to read {}: {e}", path.display()))
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_str(&raw)?),
        Some("toml") => Ok(toml::from_str(&raw)?),
        other => Err(AppError::TaskFile(format!(
            "Unsupported task file extension {:?} for {}",
            other.unwrap_or(""),
            path.display()
        ))),
    }
}
