//! # replisync - One-Way Periodic Directory Mirroring
//!
//! replisync keeps a replica directory identical to a source directory by
//! polling: every tick both top-level listings are compared, and only on a
//! mismatch are the missing, stale and extra entries of the replica fixed.
//! Subdirectory contents are never descended into.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use replisync::compare::directories_equal;
//! use replisync::reconcile::Reconciler;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     if !directories_equal("./source".as_ref(), "./replica".as_ref())? {
//!         let outcome = Reconciler::new().reconcile("./source".as_ref(), "./replica".as_ref())?;
//!         println!("{}", outcome);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Running the Polling Loop
//!
//! ```rust,ignore
//! use replisync::{Config, Scheduler};
//! use replisync::utils::shutdown_signal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config { interval_secs: 5, ..Default::default() };
//!     let summary = Scheduler::new(config).run(shutdown_signal()).await?;
//!     println!("{} ticks", summary.ticks);
//!     Ok(())
//! }
//! ```

pub mod callbacks;
pub mod compare;
pub mod config;
pub mod error;
pub mod fsops;
pub mod logging;
pub mod reconcile;
pub mod scheduler;
pub mod snapshot;
pub mod types;
pub mod util;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Config, SourceErrorPolicy};
pub use error::SyncError;
pub use reconcile::Reconciler;
pub use scheduler::{RunSummary, Scheduler, TickReport};
pub use types::{DirectorySnapshot, EntryAction, EntryKind, ReconciliationOutcome};

// vim: ts=4
