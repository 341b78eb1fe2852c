use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path;

/// Kind of a top-level entry, probed without following symlinks
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
	File,
	Dir,
	SymLink,
	Other,
}

impl EntryKind {
	pub fn from_file_type(ft: fs::FileType) -> Self {
		if ft.is_symlink() {
			EntryKind::SymLink
		} else if ft.is_file() {
			EntryKind::File
		} else if ft.is_dir() {
			EntryKind::Dir
		} else {
			EntryKind::Other
		}
	}

	/// Only plain files take part in content comparison
	pub fn is_file(self) -> bool {
		self == EntryKind::File
	}
}

impl fmt::Display for EntryKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntryKind::File => write!(f, "file"),
			EntryKind::Dir => write!(f, "directory"),
			EntryKind::SymLink => write!(f, "symlink"),
			EntryKind::Other => write!(f, "special file"),
		}
	}
}

/// Names directly under one directory at the moment it was listed
#[derive(Clone, PartialEq, Debug)]
pub struct DirectorySnapshot {
	pub root: path::PathBuf,
	pub entries: BTreeMap<OsString, EntryKind>,
}

impl DirectorySnapshot {
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, name: &OsStr) -> bool {
		self.entries.contains_key(name)
	}

	pub fn kind_of(&self, name: &OsStr) -> Option<EntryKind> {
		self.entries.get(name).copied()
	}

	pub fn path_of(&self, name: &OsStr) -> path::PathBuf {
		self.root.join(name)
	}
}

/// What the reconciler did (or would do) with one entry
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryAction {
	Synchronized,
	Created,
	Updated,
	Deleted,
}

impl fmt::Display for EntryAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntryAction::Synchronized => write!(f, "synchronized"),
			EntryAction::Created => write!(f, "created"),
			EntryAction::Updated => write!(f, "updated"),
			EntryAction::Deleted => write!(f, "deleted"),
		}
	}
}

/// Per-pass counters. Diagnostic only, never carried across ticks.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ReconciliationOutcome {
	pub synchronized: usize,
	pub created: usize,
	pub updated: usize,
	pub deleted: usize,
	/// Entries whose comparison, delete or copy failed this pass
	pub failed: usize,
}

impl ReconciliationOutcome {
	pub fn record(&mut self, action: EntryAction) {
		match action {
			EntryAction::Synchronized => self.synchronized += 1,
			EntryAction::Created => self.created += 1,
			EntryAction::Updated => self.updated += 1,
			EntryAction::Deleted => self.deleted += 1,
		}
	}

	/// Number of entries analysed, failures included
	pub fn total(&self) -> usize {
		self.synchronized + self.created + self.updated + self.deleted + self.failed
	}

	pub fn merge(&mut self, other: &ReconciliationOutcome) {
		self.synchronized += other.synchronized;
		self.created += other.created;
		self.updated += other.updated;
		self.deleted += other.deleted;
		self.failed += other.failed;
	}
}

impl fmt::Display for ReconciliationOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"(total entries analysed: {}) synced: {}; created: {}; updated: {}; deleted: {}; failed: {}",
			self.total(),
			self.synchronized,
			self.created,
			self.updated,
			self.deleted,
			self.failed
		)
	}
}
