//! Log setup for the `fcp` binary.
//!
//! Verbosity is an explicit [`LogConfig`] value built from the command line;
//! the library only emits `tracing` events and never reads it.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Maximum level unless `RUST_LOG` says otherwise
    pub level: Level,
    /// Append to this file instead of writing to stderr
    pub file: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(debug: bool, file: Option<PathBuf>) -> Self {
        Self {
            level: if debug { Level::DEBUG } else { Level::INFO },
            file,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string().to_lowercase()))
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr so that stdout stays reserved for results.
pub fn init(config: &LogConfig) -> io::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(false);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };

    // A subscriber may already be installed (e.g. by an embedding process)
    if let Err(e) = installed {
        eprintln!("warning: logging not initialized: {e}");
    }
    Ok(())
}
