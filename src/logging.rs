//! File logging. The terminal belongs to the TUI, so log output goes to
//! `shadowbox.log` in the local data directory. `SHADOWBOX_LOG` takes an
//! `EnvFilter` directive and defaults to `info`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "SHADOWBOX_LOG";
pub const LOG_FILE: &str = "shadowbox.log";

pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shadowbox").map(|pd| pd.data_local_dir().to_path_buf())
}

/// Install the global subscriber. The returned guard flushes buffered lines
/// when dropped and must live as long as the app. None if the log directory
/// can't be created, in which case logging is simply off.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    init_in(&dir)
}

pub fn init_in(dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("failed to create log directory {}: {e}", dir.display());
        return None;
    }

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, LOG_FILE,
    ));

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .try_init()
        .is_err()
    {
        return None;
    }

    tracing::info!(log_dir = %dir.display(), "logging initialized");
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test in the crate that installs the global subscriber
    #[test]
    fn init_in_writes_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs");

        let guard = init_in(&nested);
        assert!(guard.is_some());
        tracing::info!("hello from test");
        drop(guard);

        let text = std::fs::read_to_string(nested.join(LOG_FILE)).unwrap();
        assert!(text.contains("logging initialized"));
        assert!(text.contains("hello from test"));
    }
}
