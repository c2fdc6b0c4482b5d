//! netdev-inventory command line tool.
//!
//! Polls every device of a device list and prints the normalized records
//! as JSON on stdout. Logs go to stderr.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use netdev_inventory::{
    select_capabilities, with_session, AppConfig, DeviceList, DevicePoller, DeviceRecord,
    DeviceSpec, InventoryError, InventoryResult, NeighborRecord, SnapshotDevice, SystemResolver,
};

/// Network device inventory poller
#[derive(Parser, Debug)]
#[command(name = "netdev-inventory")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print device records
    Poll(CommonArgs),
    /// Print neighbor lists
    Neighbors(CommonArgs),
    /// Print device records and neighbor lists
    Inventory(CommonArgs),
}

#[derive(ClapArgs, Debug)]
struct CommonArgs {
    /// Device list file
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Devices polled in parallel (overrides the config file)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Application config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'v', long = "verbose", value_name = "LEVEL")]
    verbose: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Poll,
    Neighbors,
    Inventory,
}

impl Action {
    fn wants_record(self) -> bool {
        matches!(self, Action::Poll | Action::Inventory)
    }

    fn wants_neighbors(self) -> bool {
        matches!(self, Action::Neighbors | Action::Inventory)
    }
}

/// What gets printed for one device.
#[derive(Debug, Default, Serialize)]
struct DeviceOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<DeviceRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    neighbors: Option<Vec<NeighborRecord>>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let (action, common) = match args.command {
        Command::Poll(common) => (Action::Poll, common),
        Command::Neighbors(common) => (Action::Neighbors, common),
        Command::Inventory(common) => (Action::Inventory, common),
    };

    match run(action, common) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!(failed, "some devices could not be polled");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("netdev-inventory: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr subscriber. `-v` wins over `RUST_LOG`, which wins
/// over the config file.
fn init_logging(verbose: Option<&str>, config_level: &str) -> Result<()> {
    let filter = match verbose {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level {:?}", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set logger: {}", e))
}

/// Polls every device and prints the results. Returns the number of
/// devices that failed.
fn run(action: Action, args: CommonArgs) -> Result<usize> {
    let config = AppConfig::locate(args.config.as_deref()).context("loading config")?;
    init_logging(args.verbose.as_deref(), &config.loglevel)?;

    let devices = DeviceList::load(&args.file)
        .with_context(|| format!("loading device list {}", args.file.display()))?;
    let specs = devices.specs(&config);

    let threads = args.threads.unwrap_or(config.threads).max(1);
    info!(devices = specs.len(), threads, "polling devices");

    let (outputs, failed) = poll_all(&specs, action, threads);

    let json = serde_json::to_string_pretty(&outputs).context("encoding output")?;
    println!("{}", json);

    Ok(failed)
}

/// Runs `action` on every device over a bounded pool of scoped threads.
fn poll_all(
    specs: &[DeviceSpec],
    action: Action,
    threads: usize,
) -> (BTreeMap<String, DeviceOutput>, usize) {
    let next = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let outputs = Mutex::new(BTreeMap::new());

    thread::scope(|scope| {
        for _ in 0..threads.min(specs.len()) {
            scope.spawn(|| {
                while let Some(spec) = specs.get(next.fetch_add(1, Ordering::Relaxed)) {
                    match poll_device(spec, action) {
                        Ok(output) => store_output(&outputs, &spec.name, output),
                        Err(e) => {
                            error!(host = %spec.name, error = %e, "device poll failed");
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            });
        }
    });

    let outputs = outputs.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    (outputs, failed.into_inner())
}

/// Records one device's output. A worker that panicked while holding the
/// lock does not cost the other devices their results.
fn store_output(outputs: &Mutex<BTreeMap<String, DeviceOutput>>, name: &str, output: DeviceOutput) {
    outputs
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(name.to_string(), output);
}

/// Opens a session on one device and runs `action` inside it.
fn poll_device(spec: &DeviceSpec, action: Action) -> InventoryResult<DeviceOutput> {
    let Some(dir) = spec.snapshot.as_ref() else {
        return Err(InventoryError::session(
            &spec.name,
            "no snapshot configured, live sessions need an external driver",
        ));
    };

    debug!(host = %spec.name, snapshot = %dir.display(), "polling device");
    let mut device = SnapshotDevice::new(&spec.name, dir, &spec.vendor);

    with_session(&mut device, |device| {
        let caps = select_capabilities(&spec.vendor, &spec.name, device);
        let poller = DevicePoller::new(device, caps, &SystemResolver, &spec.settings);

        let mut output = DeviceOutput::default();
        if action.wants_record() {
            output.record = Some(poller.poll()?);
        }
        if action.wants_neighbors() {
            output.neighbors = Some(poller.neighbors().collect::<InventoryResult<Vec<_>>>()?);
        }
        Ok(output)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_store_output_after_poison() {
        let outputs = Arc::new(Mutex::new(BTreeMap::new()));

        let poisoner = Arc::clone(&outputs);
        let result = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("worker panicked while holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(outputs.is_poisoned());

        store_output(&outputs, "sw1", DeviceOutput::default());
        let outputs = outputs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        assert!(outputs.contains_key("sw1"));
    }

    #[test]
    fn test_action_selection() {
        assert!(Action::Poll.wants_record());
        assert!(!Action::Poll.wants_neighbors());
        assert!(Action::Neighbors.wants_neighbors());
        assert!(Action::Inventory.wants_record() && Action::Inventory.wants_neighbors());
    }

    #[test]
    fn test_device_without_snapshot_fails() {
        let config = AppConfig::default();
        let devices = DeviceList::from_yaml("leaf9:\n  driver: eos\n", ".").unwrap();
        let spec = &devices.specs(&config)[0];

        assert!(matches!(
            poll_device(spec, Action::Poll),
            Err(InventoryError::Session { .. })
        ));
    }
}
