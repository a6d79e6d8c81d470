//! Workbench configuration.
//!
//! Settings come from a `.sourcelab.toml` file found in the working
//! directory or one of its ancestors, falling back to the per-user
//! `sourcelab/config.toml`. Every field is defaulted so a partial (or absent)
//! file is fine.
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:5000"
//!
//! [transport]
//! timeout_secs = 30
//! ```

mod core;
mod loader;

pub use core::{
    ExportConfig, NotificationConfig, ServerConfig, TransportConfig, UploadConfig,
    WorkbenchConfig, DEFAULT_SERVER_URL,
};
pub use loader::{
    apply_env_overrides, directory_ancestors, find_config, load_config,
    parse_and_validate_config, user_config_path, CONFIG_FILE_NAME, SERVER_ENV_VAR,
};

/// Contents written by `sourcelab init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# sourcelab configuration

[server]
base_url = "http://localhost:5000"

[transport]
# Seconds before an analysis or upload request is abandoned
timeout_secs = 30

[upload]
max_size_bytes = 16777216

[export]
timestamp_format = "%d/%m/%Y %H:%M:%S"
output_dir = "."

[notifications]
toast_secs = 3
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_file_parses_to_defaults() {
        let parsed = parse_and_validate_config(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, WorkbenchConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let parsed = parse_and_validate_config("[transport]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(parsed.transport.timeout_secs, 5);
        assert_eq!(parsed.server.base_url, DEFAULT_SERVER_URL);
        assert_eq!(parsed.upload.max_size_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let parsed = parse_and_validate_config("[transport]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(parsed.transport.timeout_secs, 1);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = parse_and_validate_config("[server\nbase_url = 3").unwrap_err();
        assert!(err.contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn env_override_replaces_server() {
        let config = apply_env_overrides(
            WorkbenchConfig::default(),
            Some("http://analysis.local:8080/".into()),
        );
        assert_eq!(config.server.base_url, "http://analysis.local:8080");

        let untouched = apply_env_overrides(WorkbenchConfig::default(), Some("  ".into()));
        assert_eq!(untouched.server.base_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn ancestors_are_bounded() {
        let start = PathBuf::from("/a/b/c/d");
        let dirs: Vec<_> = directory_ancestors(start, 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }

    #[test]
    fn config_is_found_in_parent_directory() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[server]\nbase_url = \"http://parent:1\"\n",
        )
        .unwrap();
        let child = root.path().join("nested");
        std::fs::create_dir(&child).unwrap();

        let config = find_config(child).unwrap();
        assert_eq!(config.server.base_url, "http://parent:1");
    }

    #[test]
    fn user_config_lives_under_sourcelab_dir() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with("sourcelab/config.toml"));
        }
    }
}
