use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Env var naming a log file; overrides `LoggingConfig::file`.
pub const LOG_FILE_ENV: &str = "SLICESTORE_LOG";

/// Initialize tracing for the host application.
///
/// `RUST_LOG` takes precedence over `config.filter`. Output goes to stderr
/// unless a log file is configured through `SLICESTORE_LOG` or
/// `config.file`. Log files get a unique suffix so that several processes
/// can share one path: `{path}.{timestamp}.{pid}`
///
/// Returns false if a global subscriber was already installed or the log
/// file could not be created.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_path = std::env::var(LOG_FILE_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(|| config.file.clone());

    let writer = match file_path {
        Some(path) => {
            let unique_path = unique_log_path(&path);
            let Ok(file) = std::fs::File::create(&unique_path) else {
                eprintln!("Warning: Failed to create log file: {}", unique_path);
                return false;
            };
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_ok()
}

fn unique_log_path(path: &Path) -> String {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}.{}.{}", path.display(), timestamp, pid)
}
