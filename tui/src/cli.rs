//! Command-Line Arguments
//!
//! Flags are the highest-precedence configuration layer, applied on top of
//! the config file and `TYPECYCLE_*` environment overrides.

use std::path::PathBuf;

use clap::Parser;
use typecycle_core::config::{load_config, load_config_from_path};
use typecycle_core::{ConfigError, ConfigSource, TypecycleConfig};

/// Typecycle TUI - animated hero headline in the terminal
#[derive(Parser, Debug)]
#[command(name = "typecycle-tui")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "TYPECYCLE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Roles to cycle through (comma separated)
    #[arg(short = 'r', long, value_delimiter = ',', value_name = "ROLES")]
    pub roles: Option<Vec<String>>,

    /// Delay between typed characters
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub char_delay_ms: Option<i64>,

    /// Hold time on a completed role
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub pause_ms: Option<i64>,

    /// Re-typing speed for each update (0 shows cycler text directly)
    #[arg(long, value_name = "MS")]
    pub retype_speed_ms: Option<u64>,

    /// Greeting revealed once above the headline
    #[arg(short = 'g', long, value_name = "TEXT")]
    pub greeting: Option<String>,

    /// Show the engine phase and role index in a status line
    #[arg(long)]
    pub dev: bool,
}

impl Args {
    /// Resolve the full configuration: defaults, file, environment, flags
    pub fn load_config(&self) -> Result<TypecycleConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config_from_path(Some(path.clone()))?,
            None => load_config()?,
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Apply flag overrides to an already layered configuration
    pub fn apply(&self, config: &mut TypecycleConfig) {
        let mut overridden = false;

        if let Some(roles) = &self.roles {
            config.roles = roles.iter().map(|r| r.trim().to_string()).collect();
            overridden = true;
        }
        if let Some(delay) = self.char_delay_ms {
            config.char_delay_ms = delay;
            overridden = true;
        }
        if let Some(pause) = self.pause_ms {
            config.pause_ms = pause;
            overridden = true;
        }
        if let Some(speed) = self.retype_speed_ms {
            config.retype_speed_ms = speed;
            overridden = true;
        }
        if let Some(greeting) = &self.greeting {
            config.greeting = Some(greeting.clone());
            overridden = true;
        }

        if overridden {
            config.set_source(ConfigSource::Cli);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("typecycle-tui").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "--roles",
            "SRE, QA",
            "--char-delay-ms",
            "50",
            "--pause-ms",
            "0",
            "--retype-speed-ms",
            "0",
        ]);
        let mut config = TypecycleConfig::default();
        args.apply(&mut config);

        assert_eq!(config.roles, vec!["SRE".to_string(), "QA".to_string()]);
        assert_eq!(config.char_delay_ms, 50);
        assert_eq!(config.pause_ms, 0);
        assert_eq!(config.retype_speed_ms, 0);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_no_flags_keep_source() {
        let args = parse(&[]);
        let mut config = TypecycleConfig::default();
        args.apply(&mut config);
        assert_eq!(config, TypecycleConfig::default());
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(!args.dev);
    }

    #[test]
    fn test_negative_delay_parses_and_fails_validation() {
        let args = parse(&["--char-delay-ms", "-10"]);
        let mut config = TypecycleConfig::default();
        args.apply(&mut config);
        assert_eq!(config.char_delay_ms, -10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_greeting_and_dev_flags() {
        let args = parse(&["-g", "Hey", "--dev"]);
        let mut config = TypecycleConfig::default();
        args.apply(&mut config);
        assert_eq!(config.greeting.as_deref(), Some("Hey"));
        assert!(args.dev);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Args::try_parse_from(["typecycle-tui", "--speed", "3"]).is_err());
    }
}
