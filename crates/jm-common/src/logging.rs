use std::panic;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::store::{Collection, StoreConfig};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where service logs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    DailyFile { dir: PathBuf, file_prefix: String },
}

impl LogTarget {
    /// A daily file under `log_dir` when that directory can be created,
    /// stdout otherwise.
    pub fn resolve(log_dir: Option<&Path>, app_name: &str) -> Self {
        let Some(dir) = log_dir else {
            return LogTarget::Stdout;
        };

        match std::fs::create_dir_all(dir) {
            Ok(()) => LogTarget::DailyFile {
                dir: dir.to_path_buf(),
                file_prefix: format!("{app_name}.log"),
            },
            Err(err) => {
                eprintln!("cannot use JM_LOG_DIR {}: {err}; logging to stdout", dir.display());
                LogTarget::Stdout
            }
        }
    }
}

/// Install the global subscriber. Filtering follows `RUST_LOG` (default
/// `info`); `JM_LOG_DIR` moves output into a daily-rotated file.
pub fn init_tracing_subscriber(app_name: &'static str) -> LogTarget {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let log_dir = std::env::var_os("JM_LOG_DIR").map(PathBuf::from);
    let target = LogTarget::resolve(log_dir.as_deref(), app_name);

    match &target {
        LogTarget::DailyFile { dir, file_prefix } => {
            let appender = tracing_appender::rolling::daily(dir, file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
        }
        LogTarget::Stdout => {
            let _ = builder.try_init();
        }
    }

    target
}

/// Log panics through `tracing`. When logs go to a file the default hook
/// still runs, so the panic also reaches stderr.
pub fn install_tracing_panic_hook(app_name: &'static str, target: &LogTarget) {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    let echo_to_stderr = matches!(target, LogTarget::DailyFile { .. });

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();

        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".into());

            tracing::error!(
                application = app_name,
                thread = thread.name().unwrap_or("unnamed"),
                location = %info.location().map_or_else(|| "unknown".into(), |l| l.to_string()),
                panic_message = %message,
                "panic"
            );

            if echo_to_stderr {
                default_hook(info);
            }
        }));
    });
}

/// Record which files back each collection.
pub fn log_store_layout(config: &StoreConfig) {
    for collection in [
        Collection::Workers,
        Collection::Contractors,
        Collection::Availability,
    ] {
        info!(
            collection = collection.as_str(),
            path = %config.path(collection).display(),
            "collection_file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_log_dir_means_stdout() {
        assert_eq!(LogTarget::resolve(None, "jm-api"), LogTarget::Stdout);
    }

    #[test]
    fn log_dir_is_created_for_daily_files() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");

        let target = LogTarget::resolve(Some(&logs), "jm-api");

        assert_eq!(
            target,
            LogTarget::DailyFile {
                dir: logs.clone(),
                file_prefix: "jm-api.log".into(),
            }
        );
        assert!(logs.is_dir());
    }

    #[test]
    fn unusable_log_dir_falls_back_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let target = LogTarget::resolve(Some(&blocker.join("logs")), "jm-api");
        assert_eq!(target, LogTarget::Stdout);
    }
}
