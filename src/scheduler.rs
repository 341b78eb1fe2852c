//! Polling loop: compare, reconcile on mismatch, sleep, repeat
//!
//! Ticks never overlap. Each tick re-lists both directories from scratch;
//! nothing is cached between ticks.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::callbacks::SyncCallbacks;
use crate::compare::directories_equal;
use crate::config::{Config, SourceErrorPolicy};
use crate::error::SyncError;
use crate::fsops::ensure_dir;
use crate::logging::*;
use crate::reconcile::Reconciler;
use crate::types::ReconciliationOutcome;
use crate::utils::Shutdown;

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
	/// Comparator found nothing to do
	pub in_sync: bool,

	/// Replica directory was missing and had to be created
	pub replica_created: bool,

	/// Reconciler outcome, if it ran
	pub outcome: Option<ReconciliationOutcome>,
}

/// Totals over a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
	pub ticks: u64,
	pub reconciliations: u64,
	pub totals: ReconciliationOutcome,

	/// Set if the run ended because of a termination request
	pub shutdown: Option<Shutdown>,
}

/// Next delay of the source-error backoff
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
	current.saturating_mul(2).min(max)
}

#[derive(Clone)]
pub struct Scheduler {
	config: Arc<Config>,
	reconciler: Reconciler,
}

impl Scheduler {
	pub fn new(config: Config) -> Self {
		let reconciler = Reconciler::new().dry_run(config.dry_run);
		Scheduler { config: Arc::new(config), reconciler }
	}

	/// Observe every entry event of every pass
	pub fn with_callbacks(mut self, callbacks: Arc<dyn SyncCallbacks>) -> Self {
		self.reconciler = self.reconciler.with_callbacks(callbacks);
		self
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Fail with `SourceUnavailable` unless the source is an existing directory
	pub fn check_source(&self) -> Result<(), SyncError> {
		let source = &self.config.source;
		match fs::metadata(source) {
			Ok(meta) if meta.is_dir() => Ok(()),
			Ok(_) => Err(SyncError::SourceUnavailable {
				path: source.clone(),
				reason: "not a directory".to_string(),
			}),
			Err(e) => Err(SyncError::SourceUnavailable { path: source.clone(), reason: e.to_string() }),
		}
	}

	/// Validate the configuration, check the source (unless the retry policy
	/// is in effect) and create the replica if it does not exist yet.
	pub fn prepare(&self) -> Result<(), SyncError> {
		self.config.validate()?;

		if self.config.source_error_policy == SourceErrorPolicy::Exit {
			self.check_source()?;
		}

		if ensure_dir(&self.config.replica)? {
			info!("Replica dir {} has been created", self.config.replica.display());
		}
		Ok(())
	}

	/// One compare-then-reconcile-if-needed pass
	pub fn tick(&self) -> Result<TickReport, SyncError> {
		let source: &Path = &self.config.source;
		let replica: &Path = &self.config.replica;

		self.check_source()?;

		let replica_created = ensure_dir(replica)?;
		if replica_created {
			warn!("Replica dir {} was missing and has been recreated", replica.display());
		}

		match directories_equal(source, replica) {
			Ok(true) => {
				info!("Source dir and replica dir are matching / up to date");
				return Ok(TickReport { in_sync: true, replica_created, outcome: None });
			}
			Ok(false) => info!("Source dir and replica dir are not matching, reconciling"),
			Err(e) => error!("Comparison failed ({}), reconciling anyway", e),
		}

		let outcome = self.reconciler.reconcile(source, replica)?;
		Ok(TickReport { in_sync: false, replica_created, outcome: Some(outcome) })
	}

	/// Tick until `max_ticks` is reached, a fatal error occurs or `shutdown`
	/// resolves. An in-flight pass is not waited for or rolled back when the
	/// shutdown request arrives.
	pub async fn run<F>(&self, shutdown: F) -> Result<RunSummary, SyncError>
	where
		F: Future<Output = Shutdown>,
	{
		tokio::pin!(shutdown);

		if let Err(e) = self.prepare() {
			error!("{}", e);
			return Err(e);
		}

		let interval = self.config.interval();
		let mut delay = interval;
		let mut source_down = false;
		let mut summary = RunSummary::default();

		info!(
			"Mirroring {} into {} every {}s{}",
			self.config.source.display(),
			self.config.replica.display(),
			interval.as_secs(),
			if self.config.dry_run { " (dry run)" } else { "" }
		);

		loop {
			let scheduler = self.clone();
			let tick = tokio::task::spawn_blocking(move || scheduler.tick());

			let result = tokio::select! {
				joined = tick => joined.unwrap_or_else(|e| {
					error!("Tick task failed: {}", e);
					Err(SyncError::Aborted)
				}),
				kind = &mut shutdown => {
					warn!("Shutdown requested during a pass; operations already applied are kept");
					summary.shutdown = Some(kind);
					return Ok(summary);
				}
			};
			summary.ticks += 1;

			match result {
				Ok(report) => {
					if source_down {
						info!("Source dir {} is available again", self.config.source.display());
						source_down = false;
					}
					delay = interval;
					if let Some(outcome) = report.outcome {
						summary.reconciliations += 1;
						summary.totals.merge(&outcome);
					}
				}
				Err(e @ SyncError::SourceUnavailable { .. }) => {
					if self.config.source_error_policy == SourceErrorPolicy::Exit {
						error!("{}", e);
						return Err(e);
					}
					if source_down {
						delay = next_backoff(delay, self.config.max_backoff());
						debug!("{}", e);
					} else {
						error!("{}", e);
						source_down = true;
						delay = interval;
					}
					warn!("Retrying in {}s", delay.as_secs());
				}
				Err(e) if e.is_fatal() => {
					error!("{}", e);
					return Err(e);
				}
				Err(e) => error!("Tick failed, retrying next tick: {}", e),
			}

			if let Some(max) = self.config.max_ticks {
				if summary.ticks >= max {
					info!("Completed {} tick(s), stopping", summary.ticks);
					return Ok(summary);
				}
			}

			tokio::select! {
				_ = tokio::time::sleep(delay) => {}
				kind = &mut shutdown => {
					info!("Shutdown requested, stopping");
					summary.shutdown = Some(kind);
					return Ok(summary);
				}
			}
			info!("Slept for {} seconds. Checking directories now..", delay.as_secs());
		}
	}
}


// vim: ts=4
