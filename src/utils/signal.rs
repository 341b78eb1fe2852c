//! Termination signals

use crate::logging::*;

/// Which request ended the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
	Interrupt,
	Terminate,
}

impl Shutdown {
	/// Conventional exit code: 128 + signal number
	pub fn exit_code(self) -> i32 {
		match self {
			Shutdown::Interrupt => 130, // 128 + SIGINT(2)
			Shutdown::Terminate => 143, // 128 + SIGTERM(15)
		}
	}
}

/// Resolve on the first SIGINT or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is simply not awaited; the default disposition still kills the process.
#[cfg(unix)]
pub async fn shutdown_signal() -> Shutdown {
	use tokio::signal::unix::{signal, SignalKind};

	let mut sigterm = match signal(SignalKind::terminate()) {
		Ok(stream) => Some(stream),
		Err(e) => {
			warn!("Failed to setup SIGTERM handler: {}. Process will not handle SIGTERM gracefully.", e);
			None
		}
	};

	let mut sigint = match signal(SignalKind::interrupt()) {
		Ok(stream) => Some(stream),
		Err(e) => {
			warn!("Failed to setup SIGINT handler: {}. Process will not handle SIGINT gracefully.", e);
			None
		}
	};

	tokio::select! {
		Some(_) = recv_or_pending(&mut sigterm) => {
			debug!("Received SIGTERM, shutting down...");
			Shutdown::Terminate
		}
		Some(_) = recv_or_pending(&mut sigint) => {
			debug!("Received SIGINT, shutting down...");
			Shutdown::Interrupt
		}
		else => Shutdown::Terminate,
	}
}

#[cfg(unix)]
async fn recv_or_pending(stream: &mut Option<tokio::signal::unix::Signal>) -> Option<()> {
	match stream {
		Some(s) => s.recv().await,
		None => std::future::pending().await,
	}
}

#[cfg(not(unix))]
pub async fn shutdown_signal() -> Shutdown {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for Ctrl-C: {}", e);
		std::future::pending::<()>().await;
	}
	debug!("Received Ctrl-C, shutting down...");
	Shutdown::Interrupt
}


// vim: ts=4
