//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the project root, then applies
//! `US_VISA_LOG_DIR` and `US_VISA_LOG_LEVEL` env overrides. The file is
//! optional; without it the defaults below apply.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{error::AppError, logger};

/// Config file path, relative to the project root.
pub const CONFIG_PATH: &str = "config/default.toml";

/// Entries whose presence marks a directory as the project root.
const ROOT_MARKERS: &[&str] = &[".git", "Cargo.toml", ".project-root"];

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory log files are created in (already expanded and absolute
    /// when the config came from [`load_from`]).
    pub dir: PathBuf,
    /// Minimum severity: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
}

impl LogConfig {
    pub fn new(dir: impl Into<PathBuf>, level: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            level: level.into(),
        }
    }
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub logging: LogConfig,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Deserialize)]
struct RawLogging {
    #[serde(default = "default_log_dir")]
    dir: String,
    #[serde(default = "default_log_level")]
    level: String,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_level() -> String {
    "trace".to_string()
}

/// Load config for the project containing the working directory, then apply
/// env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let cwd = env::current_dir()?;
    let root = find_project_root(&cwd);
    let log_dir_override = env::var("US_VISA_LOG_DIR").ok();
    let log_level_override = env::var("US_VISA_LOG_LEVEL").ok();
    load_from(
        &root,
        log_dir_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit project root and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    project_root: &Path,
    log_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let path = project_root.join(CONFIG_PATH);
    let parsed = if path.exists() {
        let raw = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str::<RawConfig>(&raw)
            .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
    } else {
        RawConfig::default()
    };

    let l = parsed.logging;

    let dir_str = log_dir_override.unwrap_or(&l.dir);
    if dir_str.is_empty() {
        return Err(AppError::Config("log dir must not be empty".into()));
    }
    let dir = expand_home(dir_str);
    let dir = if dir.is_absolute() {
        dir
    } else {
        project_root.join(dir)
    };

    let level = log_level_override.unwrap_or(&l.level);
    logger::parse_level(level)
        .map_err(|e| AppError::Config(format!("invalid [logging].level: {e}")))?;

    Ok(Config {
        project_root: project_root.to_path_buf(),
        logging: LogConfig {
            dir,
            level: level.to_string(),
        },
    })
}

/// Nearest ancestor of `start` (inclusive) holding one of the root markers.
/// Falls back to `start` itself.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| ROOT_MARKERS.iter().any(|m| dir.join(m).exists()))
        .unwrap_or(start)
        .to_path_buf()
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(root: &Path, content: &str) {
        let path = root.join(CONFIG_PATH);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn defaults_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_from(tmp.path(), None, None).unwrap();
        assert_eq!(cfg.project_root, tmp.path());
        assert_eq!(cfg.logging.dir, tmp.path().join("logs"));
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn parse_logging_section() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
[logging]
dir = "var/log"
level = "info"
"#,
        );
        let cfg = load_from(tmp.path(), None, None).unwrap();
        assert_eq!(cfg.logging.dir, tmp.path().join("var/log"));
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[logging]\nlevel = \"warn\"\n");
        let cfg = load_from(tmp.path(), None, None).unwrap();
        assert_eq!(cfg.logging.dir, tmp.path().join("logs"));
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn malformed_file_errors() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[logging\n");
        let msg = load_from(tmp.path(), None, None).unwrap_err().to_string();
        assert!(msg.contains("config error"));
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn env_overrides_win() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[logging]\nlevel = \"info\"\n");
        let cfg = load_from(tmp.path(), Some("/tmp/us-visa-logs"), Some("debug")).unwrap();
        assert_eq!(cfg.logging.dir, PathBuf::from("/tmp/us-visa-logs"));
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn unknown_level_in_file_errors() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[logging]\nlevel = \"verbose\"\n");
        let msg = load_from(tmp.path(), None, None).unwrap_err().to_string();
        assert!(msg.contains("config error"));
        assert!(msg.contains("verbose"));
    }

    #[test]
    fn bad_level_override_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_from(tmp.path(), None, Some("loud")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(load_from(tmp.path(), None, Some("")).is_err());
    }

    #[test]
    fn empty_dir_override_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(load_from(tmp.path(), Some(""), None).is_err());
    }

    #[test]
    fn project_root_found_from_nested_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".project-root"), "").unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested), tmp.path());
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/logs");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("logs"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("relative/path"), PathBuf::from("relative/path"));
    }
}
