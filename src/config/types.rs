//! Core configuration types and loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{default_plugins, default_port};

/// Idle timeout applied when only `keepalive` is set.
const KEEPALIVE_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config key: {0:?}")]
    InvalidKey(String),
}

/// Bot configuration.
///
/// Required keys default to empty so that validation can report every
/// missing one at once instead of failing on the first.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// IRC server hostname.
    #[serde(default)]
    pub server: String,
    /// IRC server port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Server password sent with PASS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub realname: String,
    #[serde(default)]
    pub nick: String,
    /// Idle timeout in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Reconnect after a lost connection instead of exiting.
    #[serde(default)]
    pub keepalive: bool,
    /// Set user mode +i after registering.
    #[serde(default)]
    pub invisible: bool,
    /// Hostmask patterns whose messages skip type handlers.
    #[serde(default)]
    pub ignore: String,
    /// Log every wire line.
    #[serde(default)]
    pub debug: bool,
    /// Append log output to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<PathBuf>,
    /// Prefix required in front of plugin commands (e.g. "!").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_prefix: Option<String>,
    /// Plugin selection expression: `all`/`none` with an optional `except` list.
    #[serde(default = "default_plugins")]
    pub plugins: String,
    /// Bot administration.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Per-plugin settings, keyed by lowercase plugin name.
    #[serde(default)]
    pub plugin: BTreeMap<String, toml::Table>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: default_port(),
            password: None,
            username: String::new(),
            realname: String::new(),
            nick: String::new(),
            timeout: None,
            keepalive: false,
            invisible: false,
            ignore: String::new(),
            debug: false,
            log: None,
            command_prefix: None,
            plugins: default_plugins(),
            admin: AdminConfig::default(),
            plugin: BTreeMap::new(),
        }
    }
}

/// Who may run admin-only commands.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Hostmask patterns of administrators.
    #[serde(default)]
    pub admins: String,
    /// Treat channel operators as administrators.
    #[serde(default)]
    pub ops: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// How long the connection may stay silent before it is considered dead.
    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.timeout {
            Some(minutes) if minutes > 0 => {
                Some(Duration::from_secs(minutes.saturating_mul(60)))
            }
            _ if self.keepalive => Some(KEEPALIVE_IDLE_TIMEOUT),
            _ => None,
        }
    }

    /// Raw value of a `[plugin.<name>]` setting.
    pub fn plugin_setting(&self, plugin: &str, key: &str) -> Option<&toml::Value> {
        self.plugin.get(&plugin.to_ascii_lowercase())?.get(key)
    }

    /// String setting; non-string scalars are rendered as text.
    pub fn plugin_str(&self, plugin: &str, key: &str) -> Option<String> {
        match self.plugin_setting(plugin, key)? {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn plugin_bool(&self, plugin: &str, key: &str, default: bool) -> bool {
        match self.plugin_setting(plugin, key) {
            Some(toml::Value::Boolean(b)) => *b,
            Some(toml::Value::Integer(i)) => *i != 0,
            Some(toml::Value::String(s)) => !matches!(s.trim(), "" | "0" | "false" | "off" | "no"),
            _ => default,
        }
    }

    pub fn plugin_int(&self, plugin: &str, key: &str) -> Option<i64> {
        match self.plugin_setting(plugin, key)? {
            toml::Value::Integer(i) => Some(*i),
            toml::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Parsed plugin selection expression.
    pub fn plugin_selection(&self) -> PluginSelection {
        PluginSelection::parse(&self.plugins)
    }
}

/// Which built-in plugins to load.
///
/// `all` loads everything except the listed names, `none` loads only the
/// listed names. Anything unparseable falls back to `all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSelection {
    /// Base mode: true for `all`, false for `none`.
    pub all: bool,
    /// Lowercased names listed after `except`.
    pub except: Vec<String>,
}

impl Default for PluginSelection {
    fn default() -> Self {
        Self {
            all: true,
            except: Vec::new(),
        }
    }
}

impl PluginSelection {
    pub fn parse(expr: &str) -> Self {
        let expr = expr.trim();
        let lower = expr.to_ascii_lowercase();

        let (all, tail) = if let Some(tail) = lower.strip_prefix("all") {
            (true, tail)
        } else if let Some(tail) = lower.strip_prefix("none") {
            (false, tail)
        } else {
            return Self::default();
        };

        let tail = tail.trim_start();
        let except = match tail.strip_prefix("except") {
            Some(list) => list
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
            None if tail.is_empty() => Vec::new(),
            None => return Self::default(),
        };

        Self { all, except }
    }

    /// Whether the named plugin should be loaded.
    pub fn includes(&self, name: &str) -> bool {
        let listed = self.except.iter().any(|n| n.eq_ignore_ascii_case(name));
        self.all != listed
    }
}
