use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::core::WorkbenchConfig;

pub const CONFIG_FILE_NAME: &str = ".sourcelab.toml";
pub const SERVER_ENV_VAR: &str = "SOURCELAB_SERVER";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to parse and validate config from TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<WorkbenchConfig, String> {
    let mut config = toml::from_str::<WorkbenchConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))?;

    if config.transport.timeout_secs == 0 {
        warn!("transport.timeout_secs must be positive. Using 1 second.");
        config.transport.timeout_secs = 1;
    }
    let trimmed = config.server.base_url.trim_end_matches('/').to_string();
    config.server.base_url = trimmed;

    Ok(config)
}

/// Pure function to try loading config from a specific path
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<WorkbenchConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            debug!(path = %config_path.display(), "Loaded config");
            Some(config)
        }
        Err(e) => {
            warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        warn!(path = %config_path.display(), %error, "Failed to read config file");
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn find_config(start: PathBuf) -> Option<WorkbenchConfig> {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
}

/// Per-user config file, e.g. `~/.config/sourcelab/config.toml` on Linux.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sourcelab").join("config.toml"))
}

/// Load configuration.
///
/// An explicit path wins; otherwise the current directory and its ancestors
/// are searched, then the per-user config file. Missing or broken files
/// fall back to defaults. The `SOURCELAB_SERVER` environment variable
/// overrides the server URL either way.
pub fn load_config(explicit: Option<&Path>) -> WorkbenchConfig {
    let config = match explicit {
        Some(path) => try_load_config_from_path(path).unwrap_or_else(|| {
            warn!(path = %path.display(), "Config file unusable. Using default config.");
            WorkbenchConfig::default()
        }),
        None => search_from_current_dir(),
    };
    apply_env_overrides(config, std::env::var(SERVER_ENV_VAR).ok())
}

fn search_from_current_dir() -> WorkbenchConfig {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Failed to get current directory: {}. Using default config.", e);
            return WorkbenchConfig::default();
        }
    };

    find_config(current)
        .or_else(|| user_config_path().and_then(|path| try_load_config_from_path(&path)))
        .unwrap_or_else(|| {
            debug!(
                depth = MAX_TRAVERSAL_DEPTH,
                "No config found. Using default config."
            );
            WorkbenchConfig::default()
        })
}

/// Pure function applying environment overrides.
pub fn apply_env_overrides(mut config: WorkbenchConfig, server: Option<String>) -> WorkbenchConfig {
    if let Some(url) = server.filter(|url| !url.trim().is_empty()) {
        debug!(%url, "Server URL overridden from environment");
        config.server.base_url = url.trim().trim_end_matches('/').to_string();
    }
    config
}
