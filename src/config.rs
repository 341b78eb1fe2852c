//! Unified configuration for replisync
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (`--config`, TOML or JSON)
//! 3. Environment variables (REPLISYNC_* prefix)
//! 4. CLI flags (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::{env, fs};

use crate::error::SyncError;

/// Prefix of every environment variable read by [`Config::apply_env`]
pub const ENV_PREFIX: &str = "REPLISYNC_";

/// Longest accepted tick interval (one day)
pub const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Log levels accepted by `--log-level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// Configuration of one mirroring process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	// ========================================================================
	// DIRECTORIES
	// ========================================================================
	/// Authoritative directory
	pub source: PathBuf,

	/// Directory kept identical to the source; created if missing
	pub replica: PathBuf,

	// ========================================================================
	// SCHEDULING
	// ========================================================================
	/// Sleep between ticks, in seconds
	pub interval_secs: u64,

	/// Stop after this many ticks (None = run until terminated)
	pub max_ticks: Option<u64>,

	/// What to do when the source directory is unusable
	pub source_error_policy: SourceErrorPolicy,

	/// Upper bound of the retry backoff, in seconds
	pub max_backoff_secs: u64,

	// ========================================================================
	// SYNC BEHAVIOR
	// ========================================================================
	/// Dry run mode - report operations without applying them
	pub dry_run: bool,

	// ========================================================================
	// OUTPUT & LOGGING
	// ========================================================================
	/// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
	pub log_level: String,

	/// Path to log file (None = console only)
	pub log_file: Option<PathBuf>,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			source: PathBuf::from("source_dir"),
			replica: PathBuf::from("replica_dir"),

			interval_secs: 2,
			max_ticks: None,
			source_error_policy: SourceErrorPolicy::Exit,
			max_backoff_secs: 60,

			dry_run: false,

			log_level: "info".to_string(),
			log_file: Some(PathBuf::from("logfile.txt")),
		}
	}
}

impl Config {
	/// Load a config file on top of the defaults. `.toml` files are parsed as
	/// TOML, anything else as JSON5 (which accepts plain JSON).
	pub fn from_file(path: &Path) -> Result<Config, SyncError> {
		let contents = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
		let is_toml = path.extension().map(|ext| ext == "toml").unwrap_or(false);

		let parsed: Result<Config, String> = if is_toml {
			toml::from_str(&contents).map_err(|e| e.to_string())
		} else {
			json5::from_str(&contents).map_err(|e| e.to_string())
		};
		parsed.map_err(|message| SyncError::InvalidConfig {
			message: format!("{}: {}", path.display(), message),
		})
	}

	/// Apply REPLISYNC_* variables from the process environment
	pub fn apply_env(&mut self) -> Result<(), SyncError> {
		self.apply_env_vars(env::vars())
	}

	/// Apply REPLISYNC_* variables from an explicit list of pairs
	pub fn apply_env_vars<I>(&mut self, vars: I) -> Result<(), SyncError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			let Some(name) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};
			match name {
				"SOURCE" => self.source = PathBuf::from(value),
				"REPLICA" => self.replica = PathBuf::from(value),
				"LOG_FILE" => {
					self.log_file = if value.is_empty() { None } else { Some(PathBuf::from(value)) }
				}
				"LOG_LEVEL" => self.log_level = value,
				"INTERVAL" => self.interval_secs = parse_env(&key, &value)?,
				"DRY_RUN" => self.dry_run = parse_bool(&key, &value)?,
				"SOURCE_ERROR_POLICY" => {
					self.source_error_policy = value
						.parse()
						.map_err(|message| SyncError::InvalidConfig { message })?
				}
				_ => {}
			}
		}
		Ok(())
	}

	/// Sleep between ticks
	pub fn interval(&self) -> Duration {
		Duration::from_secs(self.interval_secs)
	}

	/// Upper bound of the retry backoff, never shorter than the interval
	pub fn max_backoff(&self) -> Duration {
		Duration::from_secs(self.max_backoff_secs.max(self.interval_secs))
	}

	/// Effective configuration as pretty JSON
	pub fn to_json(&self) -> Result<String, SyncError> {
		serde_json::to_string_pretty(self)
			.map_err(|e| SyncError::InvalidConfig { message: e.to_string() })
	}
}

// ============================================================================
// VALIDATION
// ============================================================================

impl Config {
	/// Reject settings the scheduler cannot run with. Relative directories
	/// are resolved against the working directory.
	pub fn validate(&self) -> Result<(), SyncError> {
		if self.source.as_os_str().is_empty() {
			return Err(invalid("source path must not be empty".to_string()));
		}
		if self.replica.as_os_str().is_empty() {
			return Err(invalid("replica path must not be empty".to_string()));
		}
		let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
		check_disjoint(&self.source, &self.replica, &base)?;

		if self.interval_secs == 0 {
			return Err(invalid("Interval must be at least 1 second".to_string()));
		}
		if self.interval_secs > MAX_INTERVAL_SECS {
			return Err(invalid(format!(
				"Interval too large: {} seconds (max {})",
				self.interval_secs, MAX_INTERVAL_SECS
			)));
		}
		if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
			return Err(invalid(format!(
				"Unknown log level: {}. Valid options: {}",
				self.log_level,
				LOG_LEVELS.join(", ")
			)));
		}
		if self.max_ticks == Some(0) {
			return Err(invalid("Tick count must be at least 1".to_string()));
		}
		Ok(())
	}
}

fn invalid(message: String) -> SyncError {
	SyncError::InvalidConfig { message }
}

/// Make `path` absolute against `base`, drop `.` and fold `..` into its
/// parent. The filesystem is not consulted, so a replica that does not exist
/// yet is handled too. Symlinks are not resolved.
fn normalize_lexically(path: &Path, base: &Path) -> PathBuf {
	let joined = if path.is_absolute() { path.to_path_buf() } else { base.join(path) };
	let mut out = PathBuf::new();
	for component in joined.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				out.pop();
			}
			other => out.push(other.as_os_str()),
		}
	}
	out
}

/// Source and replica must differ and neither may contain the other; a
/// replica inside the source would be mirrored into itself.
fn check_disjoint(source: &Path, replica: &Path, base: &Path) -> Result<(), SyncError> {
	let src = normalize_lexically(source, base);
	let dst = normalize_lexically(replica, base);

	if src == dst {
		return Err(invalid(format!("Source and replica are the same directory: {:?}", src)));
	}
	if dst.starts_with(&src) {
		return Err(invalid(format!("Replica {:?} is inside source directory {:?}", dst, src)));
	}
	if src.starts_with(&dst) {
		return Err(invalid(format!("Source {:?} is inside replica directory {:?}", src, dst)));
	}
	Ok(())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, SyncError> {
	value.trim().parse().map_err(|_| SyncError::InvalidConfig {
		message: format!("{}: cannot parse {:?}", key, value),
	})
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SyncError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" | "" => Ok(false),
		_ => Err(SyncError::InvalidConfig {
			message: format!("{}: expected a boolean, got {:?}", key, value),
		}),
	}
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

/// Scheduler reaction to a missing or unreadable source directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceErrorPolicy {
	/// Report once and stop
	#[default]
	Exit,

	/// Keep polling with exponential backoff until the source is back
	Retry,
}

impl FromStr for SourceErrorPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"exit" | "stop" => Ok(Self::Exit),
			"retry" | "wait" => Ok(Self::Retry),
			_ => Err(format!("Unknown source error policy: {}. Valid options: exit, retry", s)),
		}
	}
}

impl std::fmt::Display for SourceErrorPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Exit => write!(f, "exit"),
			Self::Retry => write!(f, "retry"),
		}
	}
}


// vim: ts=4
