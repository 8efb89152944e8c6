//! A scriptable plugin that records which hooks ran.

use parking_lot::Mutex;
use std::sync::Arc;

use slircbot::plugin::{Context, Plugin};

/// Hook log shared by every probe of a test, in call order.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, plugin: &str, hook: &str) {
        self.0.lock().push(format!("{plugin}:{hook}"));
    }

    /// Snapshot of the log.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// How often `entry` was recorded.
    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == entry).count()
    }
}

type Script = Box<dyn FnMut(&mut Context<'_>) + Send>;

/// Records its hooks and optionally acts on private messages and shutdown.
pub struct Probe {
    name: String,
    journal: Journal,
    on_privmsg: Option<Script>,
    on_shutdown: Option<Script>,
    ticks: Arc<Mutex<usize>>,
}

impl Probe {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_owned(),
            journal: journal.clone(),
            on_privmsg: None,
            on_shutdown: None,
            ticks: Arc::default(),
        }
    }

    /// Run `script` whenever a PRIVMSG arrives.
    pub fn on_message<F>(mut self, script: F) -> Self
    where
        F: FnMut(&mut Context<'_>) + Send + 'static,
    {
        self.on_privmsg = Some(Box::new(script));
        self
    }

    /// Run `script` in the shutdown hook.
    pub fn at_shutdown<F>(mut self, script: F) -> Self
    where
        F: FnMut(&mut Context<'_>) + Send + 'static,
    {
        self.on_shutdown = Some(Box::new(script));
        self
    }

    /// Counter of tick hooks, readable after the probe is boxed.
    pub fn ticks(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.ticks)
    }

    pub fn boxed(self) -> Box<dyn Plugin> {
        Box::new(self)
    }
}

impl Plugin for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_connect(&mut self, _ctx: &mut Context<'_>) {
        self.journal.record(&self.name, "connect");
    }

    fn on_shutdown(&mut self, ctx: &mut Context<'_>) {
        self.journal.record(&self.name, "shutdown");
        if let Some(script) = self.on_shutdown.as_mut() {
            script(ctx);
        }
    }

    fn on_tick(&mut self, _ctx: &mut Context<'_>) {
        *self.ticks.lock() += 1;
    }

    fn on_raw(&mut self, _ctx: &mut Context<'_>) {
        self.journal.record(&self.name, "raw");
    }

    fn on_response(&mut self, _ctx: &mut Context<'_>) {
        self.journal.record(&self.name, "response");
    }

    fn on_join(&mut self, _ctx: &mut Context<'_>) {
        self.journal.record(&self.name, "join");
    }

    fn on_privmsg(&mut self, ctx: &mut Context<'_>) {
        self.journal.record(&self.name, "privmsg");
        if let Some(script) = self.on_privmsg.as_mut() {
            script(ctx);
        }
    }
}
