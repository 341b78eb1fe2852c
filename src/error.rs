//! Error types for replisync operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::EntryKind;

/// Main error type for mirroring operations
#[derive(Debug)]
pub enum SyncError {
	/// I/O error on a specific path
	Io { path: PathBuf, source: io::Error },

	/// Source directory is missing, unreadable or not a directory
	SourceUnavailable { path: PathBuf, reason: String },

	/// Replica directory could not be created or listed
	ReplicaUnavailable { path: PathBuf, reason: String },

	/// Entry kind that cannot be mirrored (fifo, socket, device)
	Unsupported { path: PathBuf, kind: EntryKind },

	/// Invalid configuration
	InvalidConfig { message: String },

	/// Log sink could not be set up
	Logging { message: String },

	/// Operation aborted by a termination request
	Aborted,
}

impl SyncError {
	/// Wrap an I/O error together with the path it happened on
	pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
		SyncError::Io { path: path.as_ref().to_path_buf(), source }
	}

	/// True for errors that stop the scheduler rather than a single entry
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			SyncError::SourceUnavailable { .. }
				| SyncError::InvalidConfig { .. }
				| SyncError::Logging { .. }
				| SyncError::Aborted
		)
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::Io { path, source } => {
				write!(f, "I/O error on {}: {}", path.display(), source)
			}
			SyncError::SourceUnavailable { path, reason } => {
				write!(f, "Source dir {} is unusable: {}", path.display(), reason)
			}
			SyncError::ReplicaUnavailable { path, reason } => {
				write!(f, "Replica dir {} is unusable: {}", path.display(), reason)
			}
			SyncError::Unsupported { path, kind } => {
				write!(f, "Cannot mirror {} ({})", path.display(), kind)
			}
			SyncError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			SyncError::Logging { message } => write!(f, "Logging setup failed: {}", message),
			SyncError::Aborted => write!(f, "Operation aborted"),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::Io { source, .. } => Some(source),
			_ => None,
		}
	}
}


// vim: ts=4
