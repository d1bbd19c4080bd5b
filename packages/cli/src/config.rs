use anyhow::{Context, Result};
use std::path::Path;
use xdynamic_engine::ProjectionOptions;

pub const DEFAULT_CONFIG_NAME: &str = "xdynamic.config.json";

/// Load projection settings.
///
/// An explicit path must exist. Without one, `xdynamic.config.json` in `cwd` is used
/// when present, otherwise the defaults.
pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<ProjectionOptions> {
    let path = match explicit {
        Some(path) => cwd.join(path),
        None => {
            let path = cwd.join(DEFAULT_CONFIG_NAME);
            if !path.exists() {
                return Ok(ProjectionOptions::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    let options = ProjectionOptions::from_json(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded projection settings");
    Ok(options)
}
