use std::fs;
use std::io;
use std::path::Path;

use crate::error::SyncError;

/// BLAKE3 digest of a file's content, streamed through the hasher
pub fn hash_file(path: &Path) -> Result<String, SyncError> {
	let mut file = fs::File::open(path).map_err(|e| SyncError::io(path, e))?;
	let mut hasher = blake3::Hasher::new();
	io::copy(&mut file, &mut hasher).map_err(|e| SyncError::io(path, e))?;
	Ok(hex::encode(hasher.finalize().as_bytes()))
}

/// Content equality of two files. Read failures on either side are returned,
/// never folded into "equal" or "different".
pub fn files_equal(a: &Path, b: &Path) -> Result<bool, SyncError> {
	let left = hash_file(a)?;
	let right = hash_file(b)?;
	Ok(left == right)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_hash_file_matches_buffer_hash() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("a.txt");
		fs::write(&path, b"hello").unwrap();
		assert_eq!(hash_file(&path).unwrap(), blake3::hash(b"hello").to_hex().as_str());
	}

	#[test]
	fn test_files_equal_same_content() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("a"), b"same bytes").unwrap();
		fs::write(dir.path().join("b"), b"same bytes").unwrap();
		assert!(files_equal(&dir.path().join("a"), &dir.path().join("b")).unwrap());
	}

	#[test]
	fn test_files_equal_different_content() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("a"), b"hello").unwrap();
		fs::write(dir.path().join("b"), b"world").unwrap();
		assert!(!files_equal(&dir.path().join("a"), &dir.path().join("b")).unwrap());
	}

	#[test]
	fn test_files_equal_empty_files() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("a"), b"").unwrap();
		fs::write(dir.path().join("b"), b"").unwrap();
		assert!(files_equal(&dir.path().join("a"), &dir.path().join("b")).unwrap());
	}

	#[test]
	fn test_files_equal_missing_side_is_error() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("a"), b"hello").unwrap();
		let err = files_equal(&dir.path().join("a"), &dir.path().join("missing")).unwrap_err();
		assert!(matches!(&err, SyncError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound));
		assert!(err.to_string().contains("missing"));
	}
}
