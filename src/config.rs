//! Application configuration.
//!
//! Loaded from `metrado.toml` in the platform config directory, or from an
//! explicit `--config` path. Missing file means defaults; a malformed file
//! is reported as a warning and falls back to defaults, never a crash.

use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decimal places for displayed quantities.
    pub decimales: usize,
    /// Drift beyond which the status bar suggests a sync. Reconciliation
    /// itself always flags at the core tolerance; this only gates the
    /// hint.
    pub tolerancia_sync: f64,
    /// Floors of the project, in display order. Floor ids may contain
    /// hyphens and double as the per-floor formula suffix.
    pub pisos: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decimales: 2,
            tolerancia_sync: metrado_core::DRIFT_TOLERANCE,
            pisos: vec![
                "1er-piso".to_string(),
                "2do-piso".to_string(),
                "azotea".to_string(),
            ],
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "metrado")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("metrado.toml");
    Some(path)
}

/// Load the configuration, collecting non-fatal warnings.
pub fn load(path: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();

    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return (Config::default(), warnings),
        },
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warnings.push(format!("cannot read {}: {}", path.display(), e));
            return (Config::default(), warnings);
        }
    };

    match toml::from_str::<Config>(&content) {
        Ok(config) => (config, warnings),
        Err(e) => {
            warnings.push(format!("invalid config {}: {}", path.display(), e));
            (Config::default(), warnings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.decimales, 2);
        assert_eq!(config.pisos.len(), 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("decimales = 3").unwrap();
        assert_eq!(config.decimales, 3);
        assert_eq!(config.pisos, Config::default().pisos);
    }

    #[test]
    fn test_full_file() {
        let config: Config = toml::from_str(
            r#"
            decimales = 1
            tolerancia_sync = 0.05
            pisos = ["sotano", "1er-piso"]
            "#,
        )
        .unwrap();
        assert_eq!(config.decimales, 1);
        assert_eq!(config.tolerancia_sync, 0.05);
        assert_eq!(config.pisos, vec!["sotano", "1er-piso"]);
    }

    #[test]
    fn test_missing_explicit_path_warns_and_defaults() {
        let (config, warnings) = load(Some(Path::new("/nonexistent/metrado.toml")));
        assert_eq!(config.decimales, Config::default().decimales);
        assert_eq!(warnings.len(), 1);
    }
}
