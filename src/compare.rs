//! Cheap top-level equality check run once per tick
//!
//! Only names present in the source are walked; an extra replica entry is
//! caught by the entry count alone. The reconciler stays the backstop and
//! runs on every reported mismatch.

use std::path::Path;

use crate::error::SyncError;
use crate::types::DirectorySnapshot;
use crate::util::files_equal;

/// True if `source` and `replica` hold the same top-level names and every
/// name that is a plain file on both sides has identical content.
///
/// A name that is a directory, symlink or special file on either side
/// matches as soon as it exists on both sides; its content is not looked at.
pub fn directories_equal(source: &Path, replica: &Path) -> Result<bool, SyncError> {
	let src = DirectorySnapshot::read(source)?;
	let dst = DirectorySnapshot::read(replica)?;
	snapshots_equal(&src, &dst)
}

/// Same as [`directories_equal`] on snapshots already taken
pub fn snapshots_equal(src: &DirectorySnapshot, dst: &DirectorySnapshot) -> Result<bool, SyncError> {
	if src.len() != dst.len() {
		return Ok(false);
	}

	for (name, src_kind) in &src.entries {
		let dst_kind = match dst.kind_of(name) {
			Some(kind) => kind,
			None => return Ok(false),
		};
		if src_kind.is_file()
			&& dst_kind.is_file()
			&& !files_equal(&src.path_of(name), &dst.path_of(name))?
		{
			return Ok(false);
		}
	}

	Ok(true)
}


// vim: ts=4
