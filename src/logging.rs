//! Logging prelude and log sink setup.
//!
//! Call sites use the re-exported tracing macros:
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("a.txt is created");
//! error!("a.txt could not be updated: permission denied");
//! ```
//!
//! The sink itself is owned by a [`LogHandle`] that `main` builds once and
//! keeps alive for the life of the process. Every record goes to stdout and,
//! when a log file is configured, to that file as well.

pub use tracing::{debug, error, info, warn};

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::error::SyncError;

/// What the log sink needs to know
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
	/// Default level when RUST_LOG is not set
	pub level: String,

	/// Append records to this file in addition to the console
	pub file: Option<PathBuf>,

	/// Colorize console output (only when stdout is a terminal by default)
	pub ansi: bool,
}

impl LogSettings {
	pub fn from_config(config: &Config) -> Self {
		LogSettings {
			level: config.log_level.clone(),
			file: config.log_file.clone(),
			ansi: std::io::stdout().is_terminal(),
		}
	}
}

impl Default for LogSettings {
	fn default() -> Self {
		LogSettings {
			level: "info".to_string(),
			file: None,
			ansi: std::io::stdout().is_terminal(),
		}
	}
}

/// Owner of the installed log sink.
///
/// Dropping the handle flushes the file writer, so it must outlive every
/// record that should reach the file.
pub struct LogHandle {
	file: Option<PathBuf>,
	_guard: Option<WorkerGuard>,
}

impl LogHandle {
	/// Install the console + file sink.
	///
	/// By default, records at the configured level and above are emitted.
	/// RUST_LOG takes precedence:
	///
	/// ```bash
	/// RUST_LOG=debug replisync -s in -r out
	/// RUST_LOG=replisync::reconcile=trace replisync -s in -r out
	/// ```
	pub fn init(settings: &LogSettings) -> Result<LogHandle, SyncError> {
		let filter = build_filter(&settings.level)?;

		let (file_layer, guard) = match &settings.file {
			Some(path) => {
				let file = open_log_file(path)?;
				let (writer, guard) = tracing_appender::non_blocking(file);
				let layer = fmt::layer().with_ansi(false).with_writer(writer);
				(Some(layer), Some(guard))
			}
			None => (None, None),
		};

		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_ansi(settings.ansi).with_writer(std::io::stdout))
			.with(file_layer)
			.try_init()
			.map_err(|e| SyncError::Logging { message: e.to_string() })?;

		Ok(LogHandle { file: settings.file.clone(), _guard: guard })
	}

	/// File the records are appended to, if any
	pub fn log_file(&self) -> Option<&Path> {
		self.file.as_deref()
	}
}

fn build_filter(level: &str) -> Result<EnvFilter, SyncError> {
	match EnvFilter::try_from_default_env() {
		Ok(filter) => Ok(filter),
		Err(_) => EnvFilter::try_new(level.to_lowercase()).map_err(|e| SyncError::Logging {
			message: format!("invalid log level {:?}: {}", level, e),
		}),
	}
}

/// Open `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> Result<fs::File, SyncError> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
		}
	}
	fs::OpenOptions::new().create(true).append(true).open(path).map_err(|e| SyncError::io(path, e))
}


// vim: ts=4
