//! Roles and Engine Configuration
//!
//! A [`RoleList`] is the fixed, ordered, cyclic set of labels the headline
//! rotates through. [`EngineConfig`] bundles it with the two timing knobs.
//! Both are validated on construction and immutable afterwards, so an engine
//! never has to re-check them while ticking.
//!
//! Text is measured in Unicode scalar values: a prefix of `n` characters is
//! always cut on a `char` boundary.

use std::time::Duration;

use crate::error::InvalidConfig;

/// Roles shown by the portfolio hero banner
pub const DEFAULT_ROLES: &[&str] = &["FULLSTACK DEVELOPER", "SOFTWARE ENGINEER", "MERN DEVELOPER"];

/// Default delay between revealed characters
pub const DEFAULT_CHAR_DELAY_MS: u64 = 100;

/// Default hold time on a fully typed role
pub const DEFAULT_PAUSE_MS: u64 = 3000;

/// Return the first `count` characters of `text`.
///
/// Counts past the end yield the whole string.
pub(crate) fn char_prefix(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// A single non-empty role label
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    text: String,
    /// Length in characters, cached since every tick needs it
    len: usize,
}

impl Role {
    fn new(text: String) -> Option<Self> {
        let len = text.chars().count();
        (len > 0).then_some(Self { text, len })
    }

    /// Full text of the role
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; empty roles are rejected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// First `count` characters (clamped to the role length)
    #[must_use]
    pub fn prefix(&self, count: usize) -> &str {
        char_prefix(&self.text, count)
    }
}

/// Ordered, non-empty, cyclic list of roles
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleList {
    roles: Vec<Role>,
}

impl RoleList {
    /// Validate and build a role list
    ///
    /// Rejects an empty list and any empty entry.
    pub fn new<I, S>(roles: I) -> Result<Self, InvalidConfig>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = roles
            .into_iter()
            .enumerate()
            .map(|(index, text)| Role::new(text.into()).ok_or(InvalidConfig::EmptyRole { index }))
            .collect::<Result<Vec<_>, _>>()?;

        if roles.is_empty() {
            return Err(InvalidConfig::EmptyRoleList);
        }

        Ok(Self { roles })
    }

    /// Number of roles (always at least one)
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Always false; see [`RoleList::new`]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Role at `index`, wrapping around the end of the list
    #[must_use]
    pub fn get_wrapped(&self, index: usize) -> &Role {
        &self.roles[index % self.roles.len()]
    }

    /// First role in the list
    #[must_use]
    pub fn first(&self) -> &Role {
        &self.roles[0]
    }
}

impl Default for RoleList {
    fn default() -> Self {
        Self {
            roles: DEFAULT_ROLES
                .iter()
                .filter_map(|r| Role::new((*r).to_string()))
                .collect(),
        }
    }
}

/// Immutable configuration for one role cycler instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    roles: RoleList,
    char_delay: Duration,
    pause: Duration,
}

impl EngineConfig {
    /// Build a configuration from validated parts
    ///
    /// `char_delay` must be non-zero; a zero `pause` is allowed.
    pub fn new(roles: RoleList, char_delay: Duration, pause: Duration) -> Result<Self, InvalidConfig> {
        if char_delay.is_zero() {
            return Err(InvalidConfig::NonPositiveCharDelay { millis: 0 });
        }
        Ok(Self {
            roles,
            char_delay,
            pause,
        })
    }

    /// Build a configuration from raw values as they arrive from config
    /// files, environment variables, or the command line.
    pub fn from_millis<I, S>(roles: I, char_delay_ms: i64, pause_ms: i64) -> Result<Self, InvalidConfig>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = RoleList::new(roles)?;
        if char_delay_ms <= 0 {
            return Err(InvalidConfig::NonPositiveCharDelay {
                millis: char_delay_ms,
            });
        }
        if pause_ms < 0 {
            return Err(InvalidConfig::NegativePause { millis: pause_ms });
        }
        Self::new(
            roles,
            Duration::from_millis(char_delay_ms.unsigned_abs()),
            Duration::from_millis(pause_ms.unsigned_abs()),
        )
    }

    /// The role list
    #[must_use]
    pub fn roles(&self) -> &RoleList {
        &self.roles
    }

    /// Delay between revealed characters
    #[must_use]
    pub fn char_delay(&self) -> Duration {
        self.char_delay
    }

    /// Hold time on a completed role
    #[must_use]
    pub fn pause(&self) -> Duration {
        self.pause
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            roles: RoleList::default(),
            char_delay: Duration::from_millis(DEFAULT_CHAR_DELAY_MS),
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
        }
    }
}
