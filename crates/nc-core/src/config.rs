//! Configuration model
//!
//! The persisted configuration is owned by an external store (extension
//! sync storage). This module parses it leniently, applies field deltas and
//! reports which fields changed.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;

use crate::gate::DomainLists;
use crate::host::normalize_host;
use crate::types::Mode;

/// Error type for configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown configuration field: {0}")]
    UnknownField(String),
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Built-in keyword list, Latin, Russian and Ukrainian spellings.
#[rustfmt::skip]
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "trump", "donald trump", "дональд трамп", "трамп",
    "putin", "vladimir putin", "владимир путин", "путин", "путін", "володимир путін",
    "zelensky", "zelenskiy", "zelenskyy", "volodymyr zelensky",
    "владимир зеленский", "володимир зеленський", "зеленский", "зеленський",
    "Украина", "Украины", "Україна", "ukraine", "ukrainian",
];

// =============================================================================
// Config
// =============================================================================

/// Full user configuration as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub enabled: bool,
    pub mode: Mode,
    pub aggressive: bool,
    pub keywords: Vec<String>,
    pub allowlist: Vec<String>,
    pub blocklist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: Mode::Hide,
            aggressive: true,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            allowlist: Vec::new(),
            blocklist: Vec::new(),
        }
    }
}

impl Config {
    /// Strict parse; fails on malformed JSON or mistyped fields.
    pub fn try_from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        let mut config = Self::default();
        if let Value::Object(map) = &value {
            for (key, field_value) in map {
                let field = ConfigField::from_key(key)?;
                config.set_field(field, field_value)?;
            }
            Ok(config)
        } else {
            Err(ConfigError::InvalidValue {
                field: "config",
                reason: "expected an object".to_string(),
            })
        }
    }

    /// Lenient parse: anything missing or invalid falls back to its default.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                log::warn!("configuration is not valid JSON, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Lenient parse of an already decoded value.
    pub fn from_value(value: &Value) -> Self {
        let mut config = Self::default();
        let Value::Object(map) = value else {
            log::warn!("configuration is not an object, using defaults");
            return config;
        };

        for (key, field_value) in map {
            match ConfigField::from_key(key) {
                Ok(field) => config.apply_or_default(field, field_value),
                Err(e) => log::debug!("ignoring configuration entry: {}", e),
            }
        }
        config
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn domain_lists(&self) -> DomainLists {
        DomainLists::new(&self.allowlist, &self.blocklist)
    }

    /// Apply one delta. An invalid value resets the field to its default.
    pub fn apply(&mut self, change: &ConfigChange) -> ChangeSet {
        self.apply_or_default(change.field, &change.new_value);
        change.field.change_flag()
    }

    /// Flip global enablement, returning the delta to persist.
    pub fn toggle_enabled(&mut self) -> ConfigChange {
        self.enabled = !self.enabled;
        ConfigChange::new(ConfigField::Enabled, Value::Bool(self.enabled))
    }

    fn apply_or_default(&mut self, field: ConfigField, value: &Value) {
        if let Err(e) = self.set_field(field, value) {
            log::warn!("{}; falling back to default", e);
            self.reset_field(field);
        }
    }

    fn reset_field(&mut self, field: ConfigField) {
        let defaults = Self::default();
        match field {
            ConfigField::Enabled => self.enabled = defaults.enabled,
            ConfigField::Mode => self.mode = defaults.mode,
            ConfigField::Aggressive => self.aggressive = defaults.aggressive,
            ConfigField::Keywords => self.keywords = defaults.keywords,
            ConfigField::Allowlist => self.allowlist = defaults.allowlist,
            ConfigField::Blocklist => self.blocklist = defaults.blocklist,
        }
    }

    fn set_field(&mut self, field: ConfigField, value: &Value) -> Result<(), ConfigError> {
        let key = field.key();
        match field {
            ConfigField::Enabled => self.enabled = expect_bool(key, value)?,
            ConfigField::Aggressive => self.aggressive = expect_bool(key, value)?,
            ConfigField::Mode => {
                let raw = value.as_str().ok_or_else(|| invalid(key, "expected a string"))?;
                self.mode = Mode::parse(raw)
                    .ok_or_else(|| invalid(key, &format!("unknown mode '{}'", raw)))?;
            }
            ConfigField::Keywords => self.keywords = expect_strings(key, value)?,
            ConfigField::Allowlist => self.allowlist = normalize_hosts(expect_strings(key, value)?),
            ConfigField::Blocklist => self.blocklist = normalize_hosts(expect_strings(key, value)?),
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn expect_bool(field: &'static str, value: &Value) -> Result<bool, ConfigError> {
    value.as_bool().ok_or_else(|| invalid(field, "expected a boolean"))
}

fn expect_strings(field: &'static str, value: &Value) -> Result<Vec<String>, ConfigError> {
    let items = value.as_array().ok_or_else(|| invalid(field, "expected an array"))?;
    // Non-string entries are stringified, the way the settings page coerces them.
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect())
}

fn normalize_hosts(hosts: Vec<String>) -> Vec<String> {
    hosts
        .iter()
        .map(|h| normalize_host(h))
        .filter(|h| !h.is_empty())
        .collect()
}

/// Split a settings textarea into trimmed, non-empty lines.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`parse_lines`], but each line is normalized to a bare hostname.
pub fn parse_host_lines(text: &str) -> Vec<String> {
    normalize_hosts(parse_lines(text))
}

// =============================================================================
// Field Deltas
// =============================================================================

/// Configuration fields the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Enabled,
    Mode,
    Aggressive,
    Keywords,
    Allowlist,
    Blocklist,
}

impl ConfigField {
    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        match key {
            "enabled" => Ok(Self::Enabled),
            "mode" => Ok(Self::Mode),
            "aggressive" => Ok(Self::Aggressive),
            "keywords" => Ok(Self::Keywords),
            "allowlist" => Ok(Self::Allowlist),
            "blocklist" => Ok(Self::Blocklist),
            other => Err(ConfigError::UnknownField(other.to_string())),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Mode => "mode",
            Self::Aggressive => "aggressive",
            Self::Keywords => "keywords",
            Self::Allowlist => "allowlist",
            Self::Blocklist => "blocklist",
        }
    }

    pub fn change_flag(&self) -> ChangeSet {
        match self {
            Self::Enabled => ChangeSet::ENABLED,
            Self::Mode => ChangeSet::MODE,
            Self::Aggressive => ChangeSet::AGGRESSIVE,
            Self::Keywords => ChangeSet::KEYWORDS,
            Self::Allowlist => ChangeSet::ALLOWLIST,
            Self::Blocklist => ChangeSet::BLOCKLIST,
        }
    }
}

/// One `{field, newValue}` delta delivered by the configuration store.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    pub field: ConfigField,
    pub new_value: Value,
}

impl ConfigChange {
    pub fn new(field: ConfigField, new_value: Value) -> Self {
        Self { field, new_value }
    }

    /// Build from a raw storage key.
    pub fn from_key(key: &str, new_value: Value) -> Result<Self, ConfigError> {
        Ok(Self::new(ConfigField::from_key(key)?, new_value))
    }
}

bitflags::bitflags! {
    /// Set of fields touched by a batch of deltas.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeSet: u8 {
        const ENABLED = 1 << 0;
        const MODE = 1 << 1;
        const AGGRESSIVE = 1 << 2;
        const KEYWORDS = 1 << 3;
        const ALLOWLIST = 1 << 4;
        const BLOCKLIST = 1 << 5;

        /// Fields whose change invalidates earlier scan results
        const MATCHING = Self::MODE.bits()
            | Self::AGGRESSIVE.bits()
            | Self::KEYWORDS.bits()
            | Self::ALLOWLIST.bits()
            | Self::BLOCKLIST.bits();
    }
}

impl ChangeSet {
    pub fn affects_matching(&self) -> bool {
        self.intersects(Self::MATCHING)
    }
}

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Read-only access to the persisted configuration.
pub trait ConfigSource {
    fn load(&self) -> Result<Config, ConfigError>;

    /// Load, falling back to defaults when the store is unreadable.
    fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("failed to load configuration, using defaults: {}", e);
                Config::default()
            }
        }
    }
}

/// Deltas pushed by the store since the last drain.
pub trait ConfigSubscription {
    fn drain(&mut self) -> Vec<ConfigChange>;
}

/// In-memory store used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryConfigSource {
    config: Config,
    pending: VecDeque<ConfigChange>,
}

impl MemoryConfigSource {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
        }
    }

    /// Write a field the way a settings page would, queueing a delta.
    pub fn set(&mut self, change: ConfigChange) {
        self.config.apply(&change);
        self.pending.push_back(change);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl ConfigSource for MemoryConfigSource {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.config.clone())
    }
}

impl ConfigSubscription for MemoryConfigSource {
    fn drain(&mut self) -> Vec<ConfigChange> {
        self.pending.drain(..).collect()
    }
}
