//! Callback traits for observing reconciliation events

use std::ffi::OsString;
use std::sync::Arc;

use crate::error::SyncError;
use crate::types::{EntryAction, EntryKind, ReconciliationOutcome};

// Type aliases to reduce complexity
type EntryFn = dyn Fn(&EntryEvent) + Send + Sync;
type FailureFn = dyn Fn(&EntryFailure) + Send + Sync;
type PassFn = dyn Fn(&ReconciliationOutcome) + Send + Sync;

/// One completed (or, in dry-run mode, planned) entry operation
#[derive(Debug, Clone, PartialEq)]
pub struct EntryEvent {
	/// Entry name relative to source/replica root
	pub name: OsString,

	/// Kind the entry had in the snapshot that drove the decision
	pub kind: EntryKind,

	/// What was done
	pub action: EntryAction,

	/// True if nothing was written
	pub dry_run: bool,
}

/// An entry operation that was abandoned for this tick
#[derive(Debug)]
pub struct EntryFailure {
	/// Entry name relative to source/replica root
	pub name: OsString,

	/// The operation that was attempted
	pub action: EntryAction,

	/// Why it failed
	pub error: SyncError,
}

/// Combined callback handler for all reconciliation events
pub trait SyncCallbacks: Send + Sync {
	/// Called exactly once per entry that was handled successfully
	fn on_entry(&self, _event: &EntryEvent) {}

	/// Called exactly once per entry whose operation failed
	fn on_failure(&self, _failure: &EntryFailure) {}

	/// Called after the summary line of a pass
	fn on_pass_complete(&self, _outcome: &ReconciliationOutcome) {}
}

/// Default callback implementation that does nothing
pub struct NoCallbacks;

impl SyncCallbacks for NoCallbacks {}

/// Builder for callbacks using function closures
pub struct CallbackBuilder {
	entry: Option<Box<EntryFn>>,
	failure: Option<Box<FailureFn>>,
	pass: Option<Box<PassFn>>,
}

impl CallbackBuilder {
	/// Create a new callback builder
	pub fn new() -> Self {
		CallbackBuilder { entry: None, failure: None, pass: None }
	}

	/// Set entry callback
	pub fn on_entry<F>(mut self, callback: F) -> Self
	where
		F: Fn(&EntryEvent) + Send + Sync + 'static,
	{
		self.entry = Some(Box::new(callback));
		self
	}

	/// Set failure callback
	pub fn on_failure<F>(mut self, callback: F) -> Self
	where
		F: Fn(&EntryFailure) + Send + Sync + 'static,
	{
		self.failure = Some(Box::new(callback));
		self
	}

	/// Set pass-complete callback
	pub fn on_pass_complete<F>(mut self, callback: F) -> Self
	where
		F: Fn(&ReconciliationOutcome) + Send + Sync + 'static,
	{
		self.pass = Some(Box::new(callback));
		self
	}

	/// Build the callbacks handler
	pub fn build(self) -> Arc<dyn SyncCallbacks> {
		Arc::new(CompositeCallbacks { entry: self.entry, failure: self.failure, pass: self.pass })
	}
}

impl Default for CallbackBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal composite callbacks implementation
struct CompositeCallbacks {
	entry: Option<Box<EntryFn>>,
	failure: Option<Box<FailureFn>>,
	pass: Option<Box<PassFn>>,
}

impl SyncCallbacks for CompositeCallbacks {
	fn on_entry(&self, event: &EntryEvent) {
		if let Some(ref callback) = self.entry {
			callback(event);
		}
	}

	fn on_failure(&self, failure: &EntryFailure) {
		if let Some(ref callback) = self.failure {
			callback(failure);
		}
	}

	fn on_pass_complete(&self, outcome: &ReconciliationOutcome) {
		if let Some(ref callback) = self.pass {
			callback(outcome);
		}
	}
}


// vim: ts=4
