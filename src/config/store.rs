//! Shared configuration with write-back.
//!
//! Plugins read the live configuration through a [`ConfigStore`] and may
//! change it at runtime (the alternate-nick plugin rewrites `nick`, for
//! instance). Updates are validated by re-deserializing the whole document
//! and take effect in memory immediately. [`ConfigStore::update`] also
//! writes them back to the file the store was loaded from.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::types::{Config, ConfigError};

struct Snapshot {
    /// Document as loaded, including keys the typed view ignores.
    table: toml::Table,
    config: Arc<Config>,
}

/// Live configuration shared by the connection and every plugin.
pub struct ConfigStore {
    path: Option<PathBuf>,
    inner: RwLock<Snapshot>,
}

impl ConfigStore {
    /// Load a store backed by a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut store = Self::from_toml(&content)?;
        store.path = Some(path.as_ref().to_path_buf());
        Ok(store)
    }

    /// Build an in-memory store; updates are never persisted.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse()?;
        let config = Self::typed(&table)?;
        Ok(Self {
            path: None,
            inner: RwLock::new(Snapshot {
                table,
                config: Arc::new(config),
            }),
        })
    }

    /// Wrap an existing configuration; updates are never persisted.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let table = toml::Table::try_from(&config)?;
        Ok(Self {
            path: None,
            inner: RwLock::new(Snapshot {
                table,
                config: Arc::new(config),
            }),
        })
    }

    fn typed(table: &toml::Table) -> Result<Config, ConfigError> {
        Ok(toml::Value::Table(table.clone()).try_into()?)
    }

    /// Current configuration snapshot.
    pub fn get(&self) -> Arc<Config> {
        Arc::clone(&self.inner.read().config)
    }

    /// File backing this store, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw value of a `[plugin.<name>]` setting.
    pub fn plugin_setting(&self, plugin: &str, key: &str) -> Option<toml::Value> {
        self.get().plugin_setting(plugin, key).cloned()
    }

    /// Change one setting.
    ///
    /// `key` is either a top-level key (`nick`), `admin.<key>`, or
    /// `<plugin>.<key>` for a per-plugin setting. Nothing changes when the
    /// resulting document no longer deserializes.
    pub fn update(&self, key: &str, value: impl Into<toml::Value>) -> Result<(), ConfigError> {
        self.apply(key, value.into(), true)
    }

    /// Change one setting in memory only; the file is left alone and the
    /// change is lost when the configuration is reloaded.
    pub fn set(&self, key: &str, value: impl Into<toml::Value>) -> Result<(), ConfigError> {
        self.apply(key, value.into(), false)
    }

    fn apply(&self, key: &str, value: toml::Value, persist: bool) -> Result<(), ConfigError> {
        let mut inner = self.inner.write();

        let mut table = inner.table.clone();
        Self::set_key(&mut table, key, value)?;
        let config = Self::typed(&table)?;

        if let (true, Some(path)) = (persist, &self.path) {
            std::fs::write(path, toml::to_string_pretty(&table)?)?;
        }

        inner.table = table;
        inner.config = Arc::new(config);
        debug!(key = %key, persist, "config updated");
        Ok(())
    }

    fn set_key(table: &mut toml::Table, key: &str, value: toml::Value) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidKey(key.to_owned());

        let Some((section, name)) = key.split_once('.') else {
            if key.is_empty() {
                return Err(invalid());
            }
            table.insert(key.to_owned(), value);
            return Ok(());
        };
        if section.is_empty() || name.is_empty() || name.contains('.') {
            return Err(invalid());
        }

        let target = if section.eq_ignore_ascii_case("admin") {
            Self::subtable(table, "admin").ok_or_else(invalid)?
        } else {
            let plugins = Self::subtable(table, "plugin").ok_or_else(invalid)?;
            Self::subtable(plugins, &section.to_ascii_lowercase()).ok_or_else(invalid)?
        };
        target.insert(name.to_owned(), value);
        Ok(())
    }

    fn subtable<'a>(table: &'a mut toml::Table, name: &str) -> Option<&'a mut toml::Table> {
        table
            .entry(name)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
server = "irc.example.net"
username = "bot"
realname = "Bot"
nick = "bot"
"#;

    #[test]
    fn test_get_reflects_document() {
        let store = ConfigStore::from_toml(BASE).unwrap();
        assert_eq!(store.get().nick, "bot");
        assert!(store.path().is_none());
    }

    #[test]
    fn test_update_top_level() {
        let store = ConfigStore::from_toml(BASE).unwrap();
        let before = store.get();

        store.update("nick", "bot_").unwrap();
        assert_eq!(store.get().nick, "bot_");
        // Old snapshots stay valid
        assert_eq!(before.nick, "bot");
    }

    #[test]
    fn test_update_plugin_setting() {
        let store = ConfigStore::from_toml(BASE).unwrap();
        store.update("AutoJoin.channels", "#rust").unwrap();
        assert_eq!(
            store.plugin_setting("autojoin", "channels"),
            Some(toml::Value::String("#rust".into()))
        );
    }

    #[test]
    fn test_update_admin_setting() {
        let store = ConfigStore::from_toml(BASE).unwrap();
        store.update("admin.ops", true).unwrap();
        assert!(store.get().admin.ops);
    }

    #[test]
    fn test_rejected_update_leaves_state() {
        let store = ConfigStore::from_toml(BASE).unwrap();
        let err = store.update("port", "not a number").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert_eq!(store.get().port, 6667);

        assert!(matches!(store.update("", 1), Err(ConfigError::InvalidKey(_))));
        assert!(matches!(store.update("a.b.c", 1), Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_update_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slircbot.toml");
        std::fs::write(&path, BASE).unwrap();

        let store = ConfigStore::load(&path).unwrap();
        store.update("nick", "renamed").unwrap();
        store.update("altnick.altnick0", "renamed_").unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.nick, "renamed");
        assert_eq!(reloaded.plugin_str("altnick", "altnick0").as_deref(), Some("renamed_"));
        assert_eq!(reloaded.server, "irc.example.net");
    }

    #[test]
    fn test_set_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slircbot.toml");
        std::fs::write(&path, BASE).unwrap();

        let store = ConfigStore::load(&path).unwrap();
        store.set("nick", "bot_").unwrap();
        assert_eq!(store.get().nick, "bot_");
        assert_eq!(Config::load(&path).unwrap().nick, "bot");
    }

    #[test]
    fn test_from_config_roundtrip() {
        let config = Config {
            nick: "x".into(),
            ..Config::default()
        };
        let store = ConfigStore::from_config(config).unwrap();
        store.update("nick", "y").unwrap();
        assert_eq!(store.get().nick, "y");
    }
}
