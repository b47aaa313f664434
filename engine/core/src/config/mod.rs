//! TOML Configuration File Support
//!
//! Headline configuration is loaded from `~/.config/typecycle/headline.toml`
//! (XDG config dir), then overridden by environment variables. Command-line
//! flags, when a binary has them, go on top.
//!
//! # Configuration Priority
//!
//! 1. CLI arguments (when applicable)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [engine]
//! roles = ["FULLSTACK DEVELOPER", "SOFTWARE ENGINEER", "MERN DEVELOPER"]
//! char_delay_ms = 100
//! pause_ms = 3000
//!
//! [headline]
//! retype_speed_ms = 150      # 0 shows the cycler text directly
//! greeting = "Hello, I'm"
//! greeting_speed_ms = 100
//! fallback_text = "DEVELOPER"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TYPECYCLE_ROLES` | `engine.roles` (comma separated) |
//! | `TYPECYCLE_CHAR_DELAY_MS` | `engine.char_delay_ms` |
//! | `TYPECYCLE_PAUSE_MS` | `engine.pause_ms` |
//! | `TYPECYCLE_RETYPE_SPEED_MS` | `headline.retype_speed_ms` |
//! | `TYPECYCLE_GREETING` | `headline.greeting` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::InvalidConfig;
use crate::headline::{HeadlineSettings, RevealMode, DEFAULT_FALLBACK_TEXT, DEFAULT_RETYPE_SPEED_MS};
use crate::roles::{EngineConfig, DEFAULT_CHAR_DELAY_MS, DEFAULT_PAUSE_MS, DEFAULT_ROLES};
use crate::typing::DEFAULT_TYPING_SPEED_MS;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Loaded values do not form a valid engine configuration
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] InvalidConfig),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the winning configuration values came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[engine]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Roles to cycle through
    pub roles: Option<Vec<String>>,

    /// Per-character typing delay in milliseconds
    pub char_delay_ms: Option<i64>,

    /// Pause after a completed role in milliseconds
    pub pause_ms: Option<i64>,
}

/// `[headline]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlineToml {
    /// Re-typing speed in milliseconds (0 = direct)
    pub retype_speed_ms: Option<u64>,

    /// One-shot greeting revealed above the headline
    pub greeting: Option<String>,

    /// Greeting reveal speed in milliseconds
    pub greeting_speed_ms: Option<u64>,

    /// Static text when no role can be shown
    pub fallback_text: Option<String>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypecycleToml {
    /// Engine settings
    pub engine: EngineToml,

    /// Headline settings
    pub headline: HeadlineToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Fully resolved configuration
///
/// Values are kept raw (signed milliseconds, unchecked roles) so they can be
/// layered; [`TypecycleConfig::validate`] and [`TypecycleConfig::engine_config`]
/// check them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypecycleConfig {
    /// Roles to cycle through
    pub roles: Vec<String>,

    /// Per-character typing delay in milliseconds
    pub char_delay_ms: i64,

    /// Pause after a completed role in milliseconds
    pub pause_ms: i64,

    /// Re-typing speed in milliseconds (0 = direct)
    pub retype_speed_ms: u64,

    /// One-shot greeting revealed above the headline
    pub greeting: Option<String>,

    /// Greeting reveal speed in milliseconds
    pub greeting_speed_ms: u64,

    /// Static text when no role can be shown
    pub fallback_text: String,

    /// Path to the loaded config file, if any
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for TypecycleConfig {
    fn default() -> Self {
        Self {
            roles: DEFAULT_ROLES.iter().map(|r| (*r).to_string()).collect(),
            char_delay_ms: DEFAULT_CHAR_DELAY_MS as i64,
            pause_ms: DEFAULT_PAUSE_MS as i64,
            retype_speed_ms: DEFAULT_RETYPE_SPEED_MS,
            greeting: Some("Hello, I'm".to_string()),
            greeting_speed_ms: DEFAULT_TYPING_SPEED_MS,
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl TypecycleConfig {
    /// Where the most recent override came from
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Record where the most recent override came from
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check that the engine part of the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine_config()?;
        if self.greeting.is_some() && self.greeting_speed_ms == 0 {
            return Err(InvalidConfig::NonPositiveSpeed.into());
        }
        Ok(())
    }

    /// Validated engine configuration
    pub fn engine_config(&self) -> Result<EngineConfig, InvalidConfig> {
        EngineConfig::from_millis(self.roles.iter().cloned(), self.char_delay_ms, self.pause_ms)
    }

    /// Settings for mounting a [`crate::HeroHeadline`]
    #[must_use]
    pub fn headline_settings(&self) -> HeadlineSettings {
        HeadlineSettings {
            roles: self.roles.clone(),
            char_delay_ms: self.char_delay_ms,
            pause_ms: self.pause_ms,
            reveal: RevealMode::from_speed_ms(self.retype_speed_ms),
            fallback_text: self.fallback_text.clone(),
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Default config file path (`$XDG_CONFIG_HOME/typecycle/headline.toml`)
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("typecycle").join("headline.toml"))
}

/// Load configuration from the default path plus environment
pub fn load_config() -> Result<TypecycleConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from `path` (if it exists) plus environment
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<TypecycleConfig, ConfigError> {
    let mut config = load_file_config(path.as_deref())?;
    apply_env_config(&mut config);
    Ok(config)
}

/// Load configuration from `path` only, without environment overrides
pub fn load_file_config(path: Option<&Path>) -> Result<TypecycleConfig, ConfigError> {
    let mut config = TypecycleConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: TypecycleToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    Ok(config)
}

fn apply_toml_config(config: &mut TypecycleConfig, toml: &TypecycleToml) {
    // Engine settings
    if let Some(roles) = &toml.engine.roles {
        config.roles.clone_from(roles);
    }
    if let Some(delay) = toml.engine.char_delay_ms {
        config.char_delay_ms = delay;
    }
    if let Some(pause) = toml.engine.pause_ms {
        config.pause_ms = pause;
    }

    // Headline settings
    if let Some(speed) = toml.headline.retype_speed_ms {
        config.retype_speed_ms = speed;
    }
    if toml.headline.greeting.is_some() {
        config.greeting.clone_from(&toml.headline.greeting);
    }
    if let Some(speed) = toml.headline.greeting_speed_ms {
        config.greeting_speed_ms = speed;
    }
    if let Some(text) = &toml.headline.fallback_text {
        config.fallback_text.clone_from(text);
    }
}

/// Apply overrides from the process environment
pub fn apply_env_config(config: &mut TypecycleConfig) {
    apply_env_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup
///
/// Values that fail to parse are ignored with a warning.
pub fn apply_env_from<F>(config: &mut TypecycleConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(roles) = lookup("TYPECYCLE_ROLES") {
        config.roles = roles.split(',').map(|s| s.trim().to_string()).collect();
        config.source = ConfigSource::Env;
    }
    if let Some(delay) = parse_env(&lookup, "TYPECYCLE_CHAR_DELAY_MS") {
        config.char_delay_ms = delay;
        config.source = ConfigSource::Env;
    }
    if let Some(pause) = parse_env(&lookup, "TYPECYCLE_PAUSE_MS") {
        config.pause_ms = pause;
        config.source = ConfigSource::Env;
    }
    if let Some(speed) = parse_env(&lookup, "TYPECYCLE_RETYPE_SPEED_MS") {
        config.retype_speed_ms = speed;
        config.source = ConfigSource::Env;
    }
    if let Some(greeting) = lookup("TYPECYCLE_GREETING") {
        config.greeting = (!greeting.is_empty()).then_some(greeting);
        config.source = ConfigSource::Env;
    }
}

fn parse_env<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TypecycleConfig::default();
        assert_eq!(config.roles.len(), 3);
        assert_eq!(config.char_delay_ms, 100);
        assert_eq!(config.pause_ms, 3000);
        assert_eq!(config.retype_speed_ms, 150);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_file_config(Some(Path::new("/nonexistent/typecycle/headline.toml"))).unwrap();
        assert_eq!(config, TypecycleConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[engine]
roles = ["RUSTACEAN", "SRE"]
char_delay_ms = 40

[headline]
retype_speed_ms = 0
greeting = "Hey"
"#
        )
        .unwrap();

        let config = load_file_config(Some(file.path())).unwrap();
        assert_eq!(config.roles, vec!["RUSTACEAN", "SRE"]);
        assert_eq!(config.char_delay_ms, 40);
        assert_eq!(config.pause_ms, 3000);
        assert_eq!(config.retype_speed_ms, 0);
        assert_eq!(config.greeting.as_deref(), Some("Hey"));
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
        assert_eq!(config.headline_settings().reveal, RevealMode::Direct);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine\nroles = 3").unwrap();

        let err = load_file_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TypecycleConfig::default();
        apply_env_from(
            &mut config,
            env(&[
                ("TYPECYCLE_ROLES", "A, B ,C"),
                ("TYPECYCLE_PAUSE_MS", "250"),
                ("TYPECYCLE_CHAR_DELAY_MS", "fast"),
                ("TYPECYCLE_GREETING", ""),
            ]),
        );

        assert_eq!(config.roles, vec!["A", "B", "C"]);
        assert_eq!(config.pause_ms, 250);
        assert_eq!(config.char_delay_ms, 100, "unparseable value ignored");
        assert_eq!(config.greeting, None);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_validate_rejects_bad_engine_values() {
        let mut config = TypecycleConfig::default();
        config.roles.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(InvalidConfig::EmptyRoleList))
        ));

        let mut config = TypecycleConfig::default();
        config.pause_ms = -1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(InvalidConfig::NegativePause { millis: -1 }))
        ));

        let mut config = TypecycleConfig::default();
        config.greeting_speed_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(InvalidConfig::NonPositiveSpeed))
        ));
    }
}
