//! Configuration for the alumni client.

use std::time::Duration;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub splash: SplashConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Firebase project the client talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    /// Web API key of the project.
    pub api_key: String,
    pub project_id: String,
    /// Identity Toolkit base URL (overridable for emulators and tests).
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Firestore REST base URL.
    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,
    /// Secure Token API base URL, used to refresh ID tokens.
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplashConfig {
    #[serde(default = "default_splash_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,
}

impl SplashConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_splash_duration_ms(),
            fade_in_ms: default_fade_in_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_auth_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}
fn default_firestore_url() -> String {
    "https://firestore.googleapis.com".to_string()
}
fn default_token_url() -> String {
    "https://securetoken.googleapis.com".to_string()
}
fn default_splash_duration_ms() -> u64 {
    3000
}
fn default_fade_in_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `alumni.toml` and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (ALUMNI__SECTION__KEY format)
    /// 2. alumni.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("alumni")
    }

    /// Same as [`Config::load`] with an explicit file stem or path.
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("firebase.auth_url", default_auth_url())?
            .set_default("firebase.firestore_url", default_firestore_url())?
            .set_default("firebase.token_url", default_token_url())?
            .set_default("splash.duration_ms", default_splash_duration_ms() as i64)?
            .set_default("splash.fade_in_ms", default_fade_in_ms() as i64)?
            .set_default("logging.level", default_log_level())?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("ALUMNI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_splash_config() {
        let splash = SplashConfig::default();
        assert_eq!(splash.duration(), Duration::from_millis(3000));
        assert_eq!(splash.fade_in(), Duration::from_millis(1000));
    }

    #[test]
    fn test_default_logging_config() {
        assert_eq!(LoggingConfig::default().level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[firebase]
api_key = "test-key"
project_id = "alumni-test"

[splash]
duration_ms = 500
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.firebase.api_key, "test-key");
        assert_eq!(config.firebase.project_id, "alumni-test");
        assert_eq!(config.firebase.auth_url, "https://identitytoolkit.googleapis.com");
        assert_eq!(config.firebase.firestore_url, "https://firestore.googleapis.com");
        assert_eq!(config.firebase.token_url, "https://securetoken.googleapis.com");
        assert_eq!(config.splash.duration_ms, 500);
        assert_eq!(config.splash.fade_in_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_firebase_section_fails() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

        assert!(Config::load_from(file.path().to_str().unwrap()).is_err());
    }
}
