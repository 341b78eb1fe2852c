//! Filesystem primitives used by the reconciler
//!
//! Only these operations ever write to the replica: copying one entry,
//! removing one entry and creating a directory.

use std::fs;
use std::path::Path;

use crate::error::SyncError;
use crate::logging::*;
use crate::types::EntryKind;

/// Copy a source entry to `dst`.
///
/// Files are copied with `fs::copy`, directories as a whole tree, symlinks
/// are recreated with the same target. Special files are refused.
///
/// A directory copy that fails partway is removed again, so the name stays
/// missing from the replica and the next pass retries it.
pub fn copy_entry(src: &Path, dst: &Path, kind: EntryKind) -> Result<(), SyncError> {
	match kind {
		EntryKind::Dir => copy_dir_all(src, dst).map_err(|e| {
			discard_partial_dir(dst);
			e
		}),
		_ => copy_one(src, dst, kind),
	}
}

fn copy_one(src: &Path, dst: &Path, kind: EntryKind) -> Result<(), SyncError> {
	match kind {
		EntryKind::File => {
			fs::copy(src, dst).map_err(|e| SyncError::io(src, e))?;
			Ok(())
		}
		EntryKind::Dir => copy_dir_all(src, dst),
		EntryKind::SymLink => copy_symlink(src, dst),
		EntryKind::Other => Err(SyncError::Unsupported { path: src.to_path_buf(), kind }),
	}
}

/// Remove a replica entry. Directories go recursively, a symlink is removed
/// without touching its target.
pub fn remove_entry(path: &Path, kind: EntryKind) -> Result<(), SyncError> {
	let result = match kind {
		EntryKind::Dir => fs::remove_dir_all(path),
		_ => fs::remove_file(path),
	};
	result.map_err(|e| SyncError::io(path, e))
}

/// Create `dir` (and parents) if missing. Returns true if it had to be created.
pub fn ensure_dir(dir: &Path) -> Result<bool, SyncError> {
	match fs::metadata(dir) {
		Ok(meta) if meta.is_dir() => Ok(false),
		Ok(_) => Err(SyncError::ReplicaUnavailable {
			path: dir.to_path_buf(),
			reason: "exists, but it is not a directory".to_string(),
		}),
		Err(_) => {
			fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;
			Ok(true)
		}
	}
}

fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), SyncError> {
	fs::create_dir_all(dst).map_err(|e| SyncError::io(dst, e))?;
	for entry in fs::read_dir(src).map_err(|e| SyncError::io(src, e))? {
		let entry = entry.map_err(|e| SyncError::io(src, e))?;
		let src_path = entry.path();
		let dst_path = dst.join(entry.file_name());
		let kind = EntryKind::from_file_type(
			entry.file_type().map_err(|e| SyncError::io(&src_path, e))?,
		);
		copy_one(&src_path, &dst_path, kind)?;
	}
	Ok(())
}

fn discard_partial_dir(dst: &Path) {
	match fs::remove_dir_all(dst) {
		Ok(()) => debug!("Removed incomplete copy {}", dst.display()),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => warn!("Incomplete copy {} could not be removed: {}", dst.display(), e),
	}
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), SyncError> {
	let target = fs::read_link(src).map_err(|e| SyncError::io(src, e))?;
	std::os::unix::fs::symlink(&target, dst).map_err(|e| SyncError::io(dst, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), SyncError> {
	// No portable way to recreate the link; copy what it points to
	let meta = fs::metadata(src).map_err(|e| SyncError::io(src, e))?;
	if meta.is_dir() {
		copy_dir_all(src, dst)
	} else {
		fs::copy(src, dst).map_err(|e| SyncError::io(src, e))?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_copy_file() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("a"), b"content").unwrap();
		copy_entry(&dir.path().join("a"), &dir.path().join("b"), EntryKind::File).unwrap();
		assert_eq!(fs::read(dir.path().join("b")).unwrap(), b"content");
	}

	#[test]
	fn test_copy_dir_recursively() {
		let src = TempDir::new().unwrap();
		let dst = TempDir::new().unwrap();
		fs::create_dir_all(src.path().join("sub/inner")).unwrap();
		fs::write(src.path().join("sub/one.txt"), b"1").unwrap();
		fs::write(src.path().join("sub/inner/two.txt"), b"2").unwrap();

		copy_entry(&src.path().join("sub"), &dst.path().join("sub"), EntryKind::Dir).unwrap();

		assert_eq!(fs::read(dst.path().join("sub/one.txt")).unwrap(), b"1");
		assert_eq!(fs::read(dst.path().join("sub/inner/two.txt")).unwrap(), b"2");
	}

	#[cfg(unix)]
	#[test]
	fn test_failed_dir_copy_leaves_nothing_behind() {
		let src = TempDir::new().unwrap();
		let dst = TempDir::new().unwrap();
		fs::create_dir_all(src.path().join("sub/inner")).unwrap();
		fs::write(src.path().join("sub/a.txt"), b"a").unwrap();
		fs::write(src.path().join("sub/inner/b.txt"), b"b").unwrap();
		let _listener =
			std::os::unix::net::UnixListener::bind(src.path().join("sub/inner/m.sock")).unwrap();

		let err = copy_entry(&src.path().join("sub"), &dst.path().join("sub"), EntryKind::Dir)
			.unwrap_err();

		assert!(matches!(err, SyncError::Unsupported { .. }));
		assert!(!dst.path().join("sub").exists());
	}

	#[test]
	fn test_copy_other_is_unsupported() {
		let dir = TempDir::new().unwrap();
		let err = copy_entry(&dir.path().join("fifo"), &dir.path().join("x"), EntryKind::Other)
			.unwrap_err();
		assert!(matches!(err, SyncError::Unsupported { kind: EntryKind::Other, .. }));
	}

	#[test]
	fn test_copy_missing_source_is_error() {
		let dir = TempDir::new().unwrap();
		let err = copy_entry(&dir.path().join("gone"), &dir.path().join("x"), EntryKind::File)
			.unwrap_err();
		assert!(matches!(&err, SyncError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound));
	}

	#[cfg(unix)]
	#[test]
	fn test_copy_symlink_keeps_target() {
		let dir = TempDir::new().unwrap();
		std::os::unix::fs::symlink("elsewhere.txt", dir.path().join("link")).unwrap();
		copy_entry(&dir.path().join("link"), &dir.path().join("copy"), EntryKind::SymLink).unwrap();
		assert_eq!(
			fs::read_link(dir.path().join("copy")).unwrap(),
			Path::new("elsewhere.txt")
		);
	}

	#[test]
	fn test_remove_file_and_dir() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("f"), b"x").unwrap();
		fs::create_dir_all(dir.path().join("d/e")).unwrap();
		fs::write(dir.path().join("d/e/g"), b"y").unwrap();

		remove_entry(&dir.path().join("f"), EntryKind::File).unwrap();
		remove_entry(&dir.path().join("d"), EntryKind::Dir).unwrap();

		assert!(!dir.path().join("f").exists());
		assert!(!dir.path().join("d").exists());
	}

	#[test]
	fn test_ensure_dir_creates_once() {
		let dir = TempDir::new().unwrap();
		let replica = dir.path().join("nested/replica");
		assert!(ensure_dir(&replica).unwrap());
		assert!(!ensure_dir(&replica).unwrap());
		assert!(replica.is_dir());
	}

	#[test]
	fn test_ensure_dir_rejects_file() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("file"), b"x").unwrap();
		let err = ensure_dir(&dir.path().join("file")).unwrap_err();
		assert!(matches!(err, SyncError::ReplicaUnavailable { .. }));
	}
}

// vim: ts=4
