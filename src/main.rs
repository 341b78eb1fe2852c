// vim: ts=4
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

use replisync::config::Config;
use replisync::logging::{error, info, LogHandle, LogSettings};
use replisync::utils::shutdown_signal;
use replisync::{Scheduler, SourceErrorPolicy, SyncError};

fn cli() -> Command {
	Command::new("replisync")
		.version(env!("CARGO_PKG_VERSION"))
		.author("Szilard Hajba <szilu@symbion.hu>")
		.about("One-way periodic mirroring of a source directory into a replica")
		.arg(
			Arg::new("source")
				.short('s')
				.long("source")
				.value_name("DIR")
				.value_parser(value_parser!(PathBuf))
				.help("Path to the source directory [default: ./source_dir]"),
		)
		.arg(
			Arg::new("replica")
				.short('r')
				.long("replica")
				.value_name("DIR")
				.value_parser(value_parser!(PathBuf))
				.help("Path to the replica directory, created if missing [default: ./replica_dir]"),
		)
		.arg(
			Arg::new("logfile")
				.short('l')
				.long("logfile")
				.value_name("FILE")
				.value_parser(value_parser!(PathBuf))
				.help("Path to the log file [default: ./logfile.txt]"),
		)
		.arg(
			Arg::new("no-logfile")
				.long("no-logfile")
				.action(ArgAction::SetTrue)
				.conflicts_with("logfile")
				.help("Log to the console only"),
		)
		.arg(
			Arg::new("interval")
				.short('t')
				.long("interval")
				.visible_alias("timesleep")
				.value_name("SECONDS")
				.value_parser(value_parser!(u64))
				.help("Sleep between ticks in seconds [default: 2]"),
		)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.value_parser(value_parser!(PathBuf))
				.help("Config file (TOML or JSON)"),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.value_name("LEVEL")
				.help("trace, debug, info, warn or error [default: info]"),
		)
		.arg(
			Arg::new("dry-run")
				.short('n')
				.long("dry-run")
				.action(ArgAction::SetTrue)
				.help("Report operations without touching the replica"),
		)
		.arg(
			Arg::new("retry")
				.long("retry-on-source-error")
				.action(ArgAction::SetTrue)
				.help("Keep polling with backoff while the source is unusable instead of exiting"),
		)
		.arg(
			Arg::new("ticks")
				.long("ticks")
				.value_name("N")
				.value_parser(value_parser!(u64))
				.help("Stop after N ticks"),
		)
		.arg(
			Arg::new("once")
				.long("once")
				.action(ArgAction::SetTrue)
				.conflicts_with("ticks")
				.help("Run a single tick and exit"),
		)
		.arg(
			Arg::new("print-config")
				.long("print-config")
				.action(ArgAction::SetTrue)
				.help("Print the effective configuration as JSON and exit"),
		)
}

/// Defaults, then config file, then REPLISYNC_* environment, then flags
fn build_config(matches: &ArgMatches) -> Result<Config, SyncError> {
	let mut config = match matches.get_one::<PathBuf>("config") {
		Some(path) => Config::from_file(path)?,
		None => Config::default(),
	};
	config.apply_env()?;

	if let Some(source) = matches.get_one::<PathBuf>("source") {
		config.source = source.clone();
	}
	if let Some(replica) = matches.get_one::<PathBuf>("replica") {
		config.replica = replica.clone();
	}
	if let Some(logfile) = matches.get_one::<PathBuf>("logfile") {
		config.log_file = Some(logfile.clone());
	}
	if matches.get_flag("no-logfile") {
		config.log_file = None;
	}
	if let Some(interval) = matches.get_one::<u64>("interval") {
		config.interval_secs = *interval;
	}
	if let Some(level) = matches.get_one::<String>("log-level") {
		config.log_level = level.clone();
	}
	if matches.get_flag("dry-run") {
		config.dry_run = true;
	}
	if matches.get_flag("retry") {
		config.source_error_policy = SourceErrorPolicy::Retry;
	}
	if let Some(ticks) = matches.get_one::<u64>("ticks") {
		config.max_ticks = Some(*ticks);
	}
	if matches.get_flag("once") {
		config.max_ticks = Some(1);
	}

	Ok(config)
}

async fn run() -> Result<i32, Box<dyn Error>> {
	let matches = cli().get_matches();
	let config = match build_config(&matches) {
		Ok(config) => config,
		Err(e) => {
			// No log file is known yet; report through a console-only sink
			let _log = LogHandle::init(&LogSettings::default())?;
			error!("{}", e);
			return Ok(1);
		}
	};

	if matches.get_flag("print-config") {
		println!("{}", config.to_json()?);
		return Ok(0);
	}

	let log = LogHandle::init(&LogSettings::from_config(&config))?;
	info!("Starting replisync {}", env!("CARGO_PKG_VERSION"));
	if let Some(path) = log.log_file() {
		info!("Logging to {}", path.display());
	}

	// Errors are logged by the scheduler before they are returned
	let code = match Scheduler::new(config).run(shutdown_signal()).await {
		Ok(summary) => {
			info!(
				"Stopped after {} tick(s) and {} reconciliation(s): {}",
				summary.ticks, summary.reconciliations, summary.totals
			);
			summary.shutdown.map(|s| s.exit_code()).unwrap_or(0)
		}
		Err(_) => 1,
	};

	drop(log);
	Ok(code)
}

#[tokio::main]
async fn main() {
	let code = match run().await {
		Ok(code) => code,
		Err(e) => {
			eprintln!("replisync: {}", e);
			1
		}
	};
	std::process::exit(code);
}
