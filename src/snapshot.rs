//! Top-level directory listing

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::SyncError;
use crate::logging::*;
use crate::types::{DirectorySnapshot, EntryKind};

impl DirectorySnapshot {
	/// List the entries directly under `dir`.
	///
	/// Failing to open the directory is an error. An entry whose type cannot
	/// be probed is kept as `EntryKind::Other` so that its name still counts.
	pub fn read(dir: &Path) -> Result<DirectorySnapshot, SyncError> {
		let mut entries = BTreeMap::new();

		for entry in fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))? {
			let entry = entry.map_err(|e| SyncError::io(dir, e))?;
			let kind = match entry.file_type() {
				Ok(ft) => EntryKind::from_file_type(ft),
				Err(e) => {
					debug!("Cannot probe type of {}: {}", entry.path().display(), e);
					EntryKind::Other
				}
			};
			entries.insert(entry.file_name(), kind);
		}

		Ok(DirectorySnapshot { root: dir.to_path_buf(), entries })
	}
}


// vim: ts=4
