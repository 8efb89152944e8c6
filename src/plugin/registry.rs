//! Plugin registry.
//!
//! Every loaded plugin gets a [`PluginHandle`] carrying its runtime flags:
//! whether it is enabled and where it is muted. Plugins look each other up
//! by name through the [`PluginRegistry`] instead of reaching into a global
//! table.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mute key that silences a plugin everywhere.
pub const GLOBAL: &str = "global";

#[derive(Debug)]
struct PluginState {
    name: String,
    enabled: AtomicBool,
    /// Lowercased target -> muted.
    muted: RwLock<HashMap<String, bool>>,
}

/// Shared runtime flags of one plugin.
#[derive(Clone, Debug)]
pub struct PluginHandle(Arc<PluginState>);

impl PluginHandle {
    fn new(name: &str) -> Self {
        Self(Arc::new(PluginState {
            name: name.to_owned(),
            enabled: AtomicBool::new(true),
            muted: RwLock::new(HashMap::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Disabled plugins are skipped by dispatch but still see ticks.
    pub fn is_enabled(&self) -> bool {
        self.0.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.0.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Mute or unmute output towards `target` (a channel, a nick, or
    /// [`GLOBAL`]).
    pub fn set_muted(&self, target: &str, muted: bool) {
        self.0
            .muted
            .write()
            .insert(target.trim().to_ascii_lowercase(), muted);
    }

    /// Whether output whose first argument is `target` is suppressed.
    pub fn is_muted(&self, target: Option<&str>) -> bool {
        let muted = self.0.muted.read();
        let flagged = |key: &str| muted.get(key).copied().unwrap_or(false);

        if flagged(GLOBAL) {
            return true;
        }
        match target.map(|t| t.trim().to_ascii_lowercase()) {
            Some(target) if !target.is_empty() => flagged(&target),
            _ => false,
        }
    }
}

/// Names and flags of every loaded plugin, in load order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: RwLock<Vec<PluginHandle>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin name, returning the existing handle when the name
    /// is already known. Names compare case-insensitively.
    pub fn register(&self, name: &str) -> PluginHandle {
        if let Some(handle) = self.lookup(name) {
            return handle;
        }
        let handle = PluginHandle::new(name);
        self.plugins.write().push(handle.clone());
        handle
    }

    pub fn lookup(&self, name: &str) -> Option<PluginHandle> {
        self.plugins
            .read()
            .iter()
            .find(|handle| handle.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins
            .read()
            .iter()
            .map(|handle| handle.name().to_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}
