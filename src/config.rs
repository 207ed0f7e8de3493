//! Configuration loading for the shadowing player.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the UI can still launch.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_loop_tick_ms")]
    pub loop_tick_ms: u64,
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "default_active_highlight")]
    pub active_highlight: HighlightColor,
    #[serde(default = "default_selection_highlight")]
    pub selection_highlight: HighlightColor,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_url: default_server_url(),
            loop_tick_ms: default_loop_tick_ms(),
            theme: ThemeMode::Day,
            active_highlight: default_active_highlight(),
            selection_highlight: default_selection_highlight(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            log_level: default_log_level(),
        }
    }
}

/// Theme mode.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    Day,
    Night,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::Day
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeMode::Day => "Day",
            ThemeMode::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_loop_tick_ms() -> u64 {
    200
}

fn default_active_highlight() -> HighlightColor {
    HighlightColor {
        r: 0.2,
        g: 0.4,
        b: 0.7,
        a: 0.35,
    }
}

fn default_selection_highlight() -> HighlightColor {
    HighlightColor {
        r: 0.8,
        g: 0.7,
        b: 0.2,
        a: 0.25,
    }
}

fn default_window_width() -> f32 {
    900.0
}

fn default_window_height() -> f32 {
    700.0
}

fn default_log_level() -> LogLevel {
    LogLevel::Debug
}

#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_missing_fields_with_defaults() {
        let cfg: AppConfig = toml::from_str("server_url = \"http://box:5000\"").unwrap();
        assert_eq!(cfg.server_url, "http://box:5000");
        assert_eq!(cfg.loop_tick_ms, 200);
        assert_eq!(cfg.theme, ThemeMode::Day);
    }

    #[test]
    fn unknown_log_level_is_an_error_not_a_panic() {
        assert!(toml::from_str::<AppConfig>("log_level = \"chatty\"").is_err());
    }
}
