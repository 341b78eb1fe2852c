//! Two-pass reconciliation of a replica against its source
//!
//! Pass 1 walks the replica: names gone from the source are deleted, plain
//! files present on both sides are compared and overwritten when stale.
//! Pass 2 walks the source and copies every name the replica lacked.
//!
//! Names that are a directory, symlink or special file on either side are
//! reported as synchronized without being inspected, the same shallow rule
//! the comparator applies. Only the top level is ever reconciled.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use crate::callbacks::{EntryEvent, EntryFailure, NoCallbacks, SyncCallbacks};
use crate::error::SyncError;
use crate::fsops::{copy_entry, remove_entry};
use crate::logging::*;
use crate::types::{DirectorySnapshot, EntryAction, EntryKind, ReconciliationOutcome};
use crate::util::files_equal;

/// Applies create/update/delete operations to make a replica match its source
#[derive(Clone)]
pub struct Reconciler {
	callbacks: Arc<dyn SyncCallbacks>,
	dry_run: bool,
}

impl Reconciler {
	pub fn new() -> Self {
		Reconciler { callbacks: Arc::new(NoCallbacks), dry_run: false }
	}

	/// Observe every entry event of every pass
	pub fn with_callbacks(mut self, callbacks: Arc<dyn SyncCallbacks>) -> Self {
		self.callbacks = callbacks;
		self
	}

	/// Plan and report without writing to the replica
	pub fn dry_run(mut self, dry_run: bool) -> Self {
		self.dry_run = dry_run;
		self
	}

	/// Run one pass. Only a failure to list either root aborts it; every
	/// per-entry failure is logged and counted while the pass continues.
	pub fn reconcile(
		&self,
		source: &Path,
		replica: &Path,
	) -> Result<ReconciliationOutcome, SyncError> {
		let src = DirectorySnapshot::read(source)?;
		let dst = DirectorySnapshot::read(replica)?;
		Ok(self.reconcile_snapshots(&src, &dst))
	}

	/// Run one pass against snapshots taken by the caller
	pub fn reconcile_snapshots(
		&self,
		src: &DirectorySnapshot,
		dst: &DirectorySnapshot,
	) -> ReconciliationOutcome {
		let mut outcome = ReconciliationOutcome::default();

		// Pass 1: shrink/update the replica
		for (name, &dst_kind) in &dst.entries {
			let dst_path = dst.path_of(name);
			let src_kind = match src.kind_of(name) {
				Some(kind) => kind,
				None => {
					self.apply(&mut outcome, name, dst_kind, EntryAction::Deleted, || {
						remove_entry(&dst_path, dst_kind)
					});
					continue;
				}
			};

			if !(src_kind.is_file() && dst_kind.is_file()) {
				self.report(&mut outcome, name, src_kind, EntryAction::Synchronized);
				continue;
			}

			let src_path = src.path_of(name);
			match files_equal(&src_path, &dst_path) {
				Ok(true) => self.report(&mut outcome, name, src_kind, EntryAction::Synchronized),
				Ok(false) => {
					self.apply(&mut outcome, name, src_kind, EntryAction::Updated, || {
						remove_entry(&dst_path, EntryKind::File)?;
						copy_entry(&src_path, &dst_path, EntryKind::File)
					});
				}
				Err(e) => self.fail(&mut outcome, name, EntryAction::Updated, e),
			}
		}

		// Pass 2: grow the replica
		for (name, &src_kind) in &src.entries {
			if dst.contains(name) {
				continue;
			}
			let src_path = src.path_of(name);
			let dst_path = dst.path_of(name);
			self.apply(&mut outcome, name, src_kind, EntryAction::Created, || {
				copy_entry(&src_path, &dst_path, src_kind)
			});
		}

		if self.dry_run {
			info!("(dry run) {}", outcome);
		} else {
			info!("{}", outcome);
		}
		self.callbacks.on_pass_complete(&outcome);
		outcome
	}

	fn apply<F>(
		&self,
		outcome: &mut ReconciliationOutcome,
		name: &OsStr,
		kind: EntryKind,
		action: EntryAction,
		op: F,
	) where
		F: FnOnce() -> Result<(), SyncError>,
	{
		if self.dry_run {
			self.report(outcome, name, kind, action);
			return;
		}
		match op() {
			Ok(()) => self.report(outcome, name, kind, action),
			Err(e) => self.fail(outcome, name, action, e),
		}
	}

	// Single place where a successful entry event is counted, logged and
	// handed to the callbacks.
	fn report(
		&self,
		outcome: &mut ReconciliationOutcome,
		name: &OsStr,
		kind: EntryKind,
		action: EntryAction,
	) {
		outcome.record(action);
		let entry_name = name.to_string_lossy();
		let prefix = if self.dry_run { "(dry run) " } else { "" };
		match action {
			EntryAction::Synchronized => {
				info!(entry = %entry_name, action = %action, "{}{} is already up to date", prefix, entry_name)
			}
			_ => info!(entry = %entry_name, action = %action, "{}{} is {}", prefix, entry_name, action),
		}
		self.callbacks.on_entry(&EntryEvent {
			name: name.to_os_string(),
			kind,
			action,
			dry_run: self.dry_run,
		});
	}

	fn fail(
		&self,
		outcome: &mut ReconciliationOutcome,
		name: &OsStr,
		action: EntryAction,
		error: SyncError,
	) {
		outcome.failed += 1;
		let entry_name = name.to_string_lossy();
		error!(entry = %entry_name, action = %action, "{} could not be {}: {}", entry_name, action, error);
		self.callbacks.on_failure(&EntryFailure { name: name.to_os_string(), action, error });
	}
}

impl Default for Reconciler {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	fn dirs() -> (TempDir, TempDir) {
		(TempDir::new().unwrap(), TempDir::new().unwrap())
	}

	#[test]
	fn test_creates_missing_file() {
		let (src, dst) = dirs();
		fs::write(src.path().join("a.txt"), "hello").unwrap();

		let outcome = Reconciler::new().reconcile(src.path(), dst.path()).unwrap();

		assert_eq!(outcome.created, 1);
		assert_eq!(outcome.total(), 1);
		assert_eq!(fs::read_to_string(dst.path().join("a.txt")).unwrap(), "hello");
	}

	#[test]
	fn test_updates_stale_file() {
		let (src, dst) = dirs();
		fs::write(src.path().join("a.txt"), "hello").unwrap();
		fs::write(dst.path().join("a.txt"), "world, and longer").unwrap();

		let outcome = Reconciler::new().reconcile(src.path(), dst.path()).unwrap();

		assert_eq!(outcome.updated, 1);
		assert_eq!(fs::read_to_string(dst.path().join("a.txt")).unwrap(), "hello");
	}

	#[test]
	fn test_deletes_extra_dir_recursively() {
		let (src, dst) = dirs();
		fs::create_dir_all(dst.path().join("old/nested")).unwrap();
		fs::write(dst.path().join("old/nested/f"), "x").unwrap();

		let outcome = Reconciler::new().reconcile(src.path(), dst.path()).unwrap();

		assert_eq!(outcome.deleted, 1);
		assert!(!dst.path().join("old").exists());
	}

	#[test]
	fn test_creates_missing_dir_as_whole_tree() {
		let (src, dst) = dirs();
		fs::create_dir_all(src.path().join("sub/inner")).unwrap();
		fs::write(src.path().join("sub/inner/f.txt"), "deep").unwrap();

		let outcome = Reconciler::new().reconcile(src.path(), dst.path()).unwrap();

		assert_eq!(outcome.created, 1);
		assert_eq!(fs::read_to_string(dst.path().join("sub/inner/f.txt")).unwrap(), "deep");
	}

	#[test]
	fn test_dry_run_writes_nothing() {
		let (src, dst) = dirs();
		fs::write(src.path().join("new.txt"), "n").unwrap();
		fs::write(dst.path().join("old.txt"), "o").unwrap();

		let outcome = Reconciler::new().dry_run(true).reconcile(src.path(), dst.path()).unwrap();

		assert_eq!(outcome.created, 1);
		assert_eq!(outcome.deleted, 1);
		assert!(!dst.path().join("new.txt").exists());
		assert!(dst.path().join("old.txt").exists());
	}

	#[test]
	fn test_missing_replica_aborts_pass() {
		let (src, dst) = dirs();
		let result = Reconciler::new().reconcile(src.path(), &dst.path().join("nope"));
		assert!(result.is_err());
	}
}

// vim: ts=4
