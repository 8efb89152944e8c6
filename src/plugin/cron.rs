//! Periodic work gate.

use std::time::{Duration, Instant};

use super::Context;

/// Delay used when the plugin has no `delay` setting.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(60);

/// Runs a plugin's periodic job at most once per delay.
///
/// The gate is polled from a hook that fires often (usually
/// [`Plugin::on_raw`](super::Plugin::on_raw)); it opens on the first poll
/// and then again whenever the delay has elapsed since it last opened.
#[derive(Debug, Clone)]
pub struct CronGate {
    delay: Option<Duration>,
    default_delay: Duration,
    next_call: Option<Instant>,
}

impl Default for CronGate {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl CronGate {
    /// Gate whose delay comes from the plugin's `delay` setting (seconds),
    /// falling back to `default_delay`.
    pub fn new(default_delay: Duration) -> Self {
        Self {
            delay: None,
            default_delay,
            next_call: None,
        }
    }

    /// Gate with a fixed delay that ignores settings.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            default_delay: delay,
            next_call: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay.unwrap_or(self.default_delay)
    }

    /// Resolve the delay from the plugin settings on first use, then poll.
    pub fn check(&mut self, ctx: &Context<'_>) -> bool {
        if self.delay.is_none() {
            let configured = ctx
                .setting_int("delay")
                .and_then(|secs| u64::try_from(secs).ok())
                .map(Duration::from_secs);
            self.delay = Some(configured.unwrap_or(self.default_delay));
        }
        self.ready(Instant::now())
    }

    /// Whether the job should run at `now`. Opening re-arms the gate.
    pub fn ready(&mut self, now: Instant) -> bool {
        if self.next_call.is_some_and(|next| now < next) {
            return false;
        }
        self.next_call = Some(now + self.delay());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::plugin::Services;
    use crate::sender::Sender;
    use std::sync::Arc;

    #[test]
    fn test_ready_rearms() {
        let mut gate = CronGate::fixed(Duration::from_secs(30));
        let start = Instant::now();

        assert!(gate.ready(start));
        assert!(!gate.ready(start + Duration::from_secs(10)));
        assert!(!gate.ready(start + Duration::from_secs(29)));
        assert!(gate.ready(start + Duration::from_secs(30)));
        assert!(!gate.ready(start + Duration::from_secs(31)));
    }

    #[test]
    fn test_delay_from_settings() {
        let store = ConfigStore::from_toml("[plugin.feed]\ndelay = 5\n").unwrap();
        let services = Services::new(Arc::new(store));
        let handle = services.registry.register("feed");
        let mut sender = Sender::new();
        let ctx = Context::new(&handle, None, &mut sender, &services);

        let mut gate = CronGate::default();
        assert_eq!(gate.delay(), DEFAULT_DELAY);
        assert!(gate.check(&ctx));
        assert_eq!(gate.delay(), Duration::from_secs(5));
        assert!(!gate.check(&ctx));
    }

    #[test]
    fn test_default_delay_without_setting() {
        let services = Services::new(Arc::new(ConfigStore::from_toml("").unwrap()));
        let handle = services.registry.register("feed");
        let mut sender = Sender::new();
        let ctx = Context::new(&handle, None, &mut sender, &services);

        let mut gate = CronGate::new(Duration::from_secs(90));
        gate.check(&ctx);
        assert_eq!(gate.delay(), Duration::from_secs(90));
    }
}
