//! Integration tests for the polling loop
//!
//! Tests ensure that the scheduler creates a missing replica, converges in
//! one tick, stops on a bounded tick count or a shutdown request, and honours
//! the source error policy.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

use replisync::utils::Shutdown;
use replisync::{Config, Scheduler, SourceErrorPolicy, SyncError};

fn config_for(root: &Path) -> Config {
	Config {
		source: root.join("source"),
		replica: root.join("replica"),
		log_file: None,
		interval_secs: 1,
		max_backoff_secs: 2,
		..Default::default()
	}
}

async fn never() -> Shutdown {
	std::future::pending().await
}

#[tokio::test]
async fn test_single_tick_creates_replica_and_converges() {
	let root = TempDir::new().unwrap();
	fs::create_dir(root.path().join("source")).unwrap();
	fs::write(root.path().join("source/a.txt"), "hello").unwrap();

	let config = Config { max_ticks: Some(1), ..config_for(root.path()) };
	let summary = Scheduler::new(config).run(never()).await.unwrap();

	assert_eq!(summary.ticks, 1);
	assert_eq!(summary.reconciliations, 1);
	assert_eq!(summary.totals.created, 1);
	assert_eq!(summary.shutdown, None);
	assert_eq!(fs::read_to_string(root.path().join("replica/a.txt")).unwrap(), "hello");
}

#[tokio::test]
async fn test_second_tick_skips_reconciliation() {
	let root = TempDir::new().unwrap();
	fs::create_dir(root.path().join("source")).unwrap();
	fs::write(root.path().join("source/a.txt"), "hello").unwrap();

	let config = Config { max_ticks: Some(2), ..config_for(root.path()) };
	let summary = Scheduler::new(config).run(never()).await.unwrap();

	assert_eq!(summary.ticks, 2);
	assert_eq!(summary.reconciliations, 1);
}

#[tokio::test]
async fn test_missing_source_exits_by_default() {
	let root = TempDir::new().unwrap();

	let result = Scheduler::new(config_for(root.path())).run(never()).await;

	assert!(matches!(result, Err(SyncError::SourceUnavailable { .. })));
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_first_tick() {
	let root = TempDir::new().unwrap();
	fs::create_dir(root.path().join("source")).unwrap();
	let config = Config { interval_secs: 0, ..config_for(root.path()) };

	let result = Scheduler::new(config).run(never()).await;

	assert!(matches!(result, Err(SyncError::InvalidConfig { .. })));
	assert!(!root.path().join("replica").exists());
}

#[tokio::test]
async fn test_retry_policy_waits_for_source() {
	let root = TempDir::new().unwrap();
	let config = Config {
		source_error_policy: SourceErrorPolicy::Retry,
		max_ticks: Some(2),
		..config_for(root.path())
	};

	let summary = Scheduler::new(config).run(never()).await.unwrap();

	assert_eq!(summary.ticks, 2);
	assert_eq!(summary.reconciliations, 0);
	// The replica is still bootstrapped while the source is missing
	assert!(root.path().join("replica").is_dir());
}

#[tokio::test]
async fn test_shutdown_stops_the_loop() {
	let root = TempDir::new().unwrap();
	fs::create_dir(root.path().join("source")).unwrap();
	let config = Config { interval_secs: 30, max_backoff_secs: 30, ..config_for(root.path()) };

	let shutdown = async {
		tokio::time::sleep(Duration::from_millis(200)).await;
		Shutdown::Terminate
	};
	let summary = tokio::time::timeout(
		Duration::from_secs(10),
		Scheduler::new(config).run(shutdown),
	)
	.await
	.expect("Shutdown should end the loop promptly")
	.unwrap();

	assert!(summary.ticks <= 1);
	assert_eq!(summary.shutdown, Some(Shutdown::Terminate));
}

#[tokio::test]
async fn test_dry_run_leaves_replica_untouched() {
	let root = TempDir::new().unwrap();
	fs::create_dir(root.path().join("source")).unwrap();
	fs::create_dir(root.path().join("replica")).unwrap();
	fs::write(root.path().join("source/a.txt"), "hello").unwrap();
	fs::write(root.path().join("replica/old.txt"), "old").unwrap();

	let config = Config { dry_run: true, max_ticks: Some(1), ..config_for(root.path()) };
	let summary = Scheduler::new(config).run(never()).await.unwrap();

	assert_eq!(summary.totals.created, 1);
	assert_eq!(summary.totals.deleted, 1);
	assert!(!root.path().join("replica/a.txt").exists());
	assert!(root.path().join("replica/old.txt").exists());
}
