use std::{
    io,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{config::APP_NAME, error::Result};

/// Rotated log files kept on disk.
pub const MAX_LOG_FILES: usize = 3;

static LOG_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();

/// `<cache_dir>/docktop`, falling back to the temp dir.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Installs the global subscriber writing to a daily rolling file in `dir`.
///
/// `RUST_LOG` wins over `level`. Calling this twice keeps the first setup.
pub fn setup_logger(dir: &Path, level: &str) -> Result<()> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(APP_NAME)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .map_err(io::Error::other)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let file_layer = fmt::layer()
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(non_blocking_writer)
        .with_filter(filter);

    if LOG_GUARD.set(Mutex::new(Some(guard))).is_err() {
        return Ok(());
    }
    tracing_subscriber::registry().with(file_layer).try_init().ok();

    Ok(())
}

/// Flushes buffered log lines; later events are dropped.
pub fn flush_logger() {
    if let Some(slot) = LOG_GUARD.get() {
        let guard = match slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(guard);
    }
}

/// Runs `f` with a thread-local subscriber and returns what it logged at
/// warn level or above.
#[cfg(test)]
pub(crate) fn capture_warnings<F, R>(f: F) -> (R, String)
where
    F: FnOnce() -> R,
{
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&capture.0.lock().unwrap()).into_owned();
    (out, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_ends_with_app_name() {
        assert!(log_dir().ends_with(APP_NAME));
    }

    #[test]
    fn test_setup_creates_dir_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("nested");
        setup_logger(&log_path, "debug").unwrap();
        tracing::info!("hello from test");
        flush_logger();

        assert!(log_path.is_dir());
        let files: Vec<_> = std::fs::read_dir(&log_path).unwrap().collect();
        assert!(!files.is_empty());
    }

    #[test]
    fn test_capture_warnings_filters_by_level() {
        let ((), logs) = capture_warnings(|| {
            tracing::info!("quiet");
            tracing::warn!(widget = "x", "loud");
        });
        assert!(logs.contains("loud"), "{logs}");
        assert!(logs.contains("widget=\"x\""), "{logs}");
        assert!(!logs.contains("quiet"), "{logs}");
    }
}
