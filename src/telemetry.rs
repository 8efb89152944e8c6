//! Logging setup and span constructors.
//!
//! The subscriber is installed once per process. Its filter sits behind a
//! reload layer and the log file behind a shared slot, so a re-read config
//! can change both through [`Telemetry::apply`].

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::config::Config;

/// Filter used when `RUST_LOG` is unset.
fn default_filter(config: &Config) -> EnvFilter {
    EnvFilter::new(if config.debug { "debug" } else { "warn" })
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Swappable log file target. Writes are dropped while no file is set.
#[derive(Clone, Default)]
struct LogFile(Arc<Mutex<Option<File>>>);

impl LogFile {
    fn replace(&self, file: Option<File>) {
        *self.0.lock() = file;
    }

    fn is_open(&self) -> bool {
        self.0.lock().is_some()
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock().as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Handle to the installed subscriber.
pub struct Telemetry {
    filter: reload::Handle<EnvFilter, Registry>,
    file: LogFile,
    log: Option<PathBuf>,
    /// `RUST_LOG` was set at startup and wins over the config.
    env_override: bool,
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the config's `debug` flag. When `log` is set, every
/// record is also appended to that file. If another subscriber is already
/// installed it stays in place and the returned handle has no effect on
/// filtering.
pub fn init(config: &Config) -> io::Result<Telemetry> {
    let file = LogFile::default();
    if let Some(path) = &config.log {
        file.replace(Some(open_log(path)?));
    }

    let env = EnvFilter::try_from_default_env().ok();
    let env_override = env.is_some();
    let (filter, handle) = reload::Layer::new(env.unwrap_or_else(|| default_filter(config)));

    let writer = file.clone();
    let layer = fmt::layer()
        .with_target(true)
        .with_ansi(config.log.is_none())
        .with_writer(io::stderr.and(move || writer.clone()));

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        debug!("tracing subscriber already installed");
    }

    Ok(Telemetry {
        filter: handle,
        file,
        log: config.log.clone(),
        env_override,
    })
}

impl Telemetry {
    /// Bring the filter and log file in line with a re-read config.
    pub fn apply(&mut self, config: &Config) -> io::Result<()> {
        if !self.env_override {
            if let Err(e) = self.filter.reload(default_filter(config)) {
                debug!(error = %e, "log filter not reloaded");
            }
        }
        if config.log != self.log {
            let file = config.log.as_deref().map(open_log).transpose()?;
            self.file.replace(file);
            self.log = config.log.clone();
            debug!(log = ?self.log, "log file switched");
        }
        Ok(())
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span covering one connection to a server.
    pub fn session(server: &str, port: u16) -> Span {
        info_span!("session", server = %server, port = port)
    }

    /// Span covering one dispatch cycle.
    pub fn dispatch(kind: &str) -> Span {
        debug_span!("dispatch", kind = %kind)
    }

    /// Span covering one plugin hook invocation.
    pub fn plugin(name: &str) -> Span {
        debug_span!("plugin", plugin = %name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_log_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            log: Some(dir.path().join("bot.log")),
            ..Config::default()
        };

        init(&config).unwrap();
        init(&config).unwrap();
        assert!(dir.path().join("bot.log").exists());
    }

    #[test]
    fn test_init_unwritable_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            log: Some(dir.path().join("missing").join("bot.log")),
            ..Config::default()
        };
        assert!(init(&config).is_err());
    }

    #[test]
    fn test_apply_switches_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut telemetry = init(&Config::default()).unwrap();
        assert!(!telemetry.file.is_open());

        let config = Config {
            log: Some(dir.path().join("later.log")),
            debug: true,
            ..Config::default()
        };
        telemetry.apply(&config).unwrap();
        assert!(telemetry.file.is_open());
        assert!(dir.path().join("later.log").exists());

        let mut writer = telemetry.file.clone();
        writer.write_all(b"line\n").unwrap();
        writer.flush().unwrap();
        let written = std::fs::read_to_string(dir.path().join("later.log")).unwrap();
        assert_eq!(written, "line\n");

        telemetry.apply(&Config::default()).unwrap();
        assert!(!telemetry.file.is_open());
    }
}
