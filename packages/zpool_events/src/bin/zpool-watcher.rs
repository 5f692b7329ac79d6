use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use zpool_events::{PoolEvent, PoolWatcher, WatcherConfig, ZpoolCommand, logging_handler};

#[derive(Parser)]
#[command(name = "zpool-watcher")]
#[command(about = "Monitor ZFS events by watching pool history")]
#[command(long_about = "A utility that monitors ZFS events by watching the zpool history command.\n\
This tool will detect volume creation, snapshot creation, volume deletion,\n\
snapshot deletion, and volume resize events.")]
struct Args {
    /// ZFS pools to monitor (comma-separated)
    #[arg(short, long, value_delimiter = ',', default_value = "pool1")]
    pools: Vec<String>,

    /// Check interval in seconds
    #[arg(short, long, default_value = "5")]
    interval: u64,

    /// Append events to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log events to stdout (pass `--stdout false` to disable)
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    stdout: bool,

    /// Emit events as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Path to the zpool binary (default: resolve via PATH)
    #[arg(long)]
    zpool_cmd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        "zpool_events=debug"
    } else {
        "zpool_events=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = WatcherConfig {
        pools: args.pools.clone(),
        interval: Duration::from_secs(args.interval),
        zpool_cmd: args
            .zpool_cmd
            .map(ZpoolCommand::from)
            .unwrap_or_default(),
        ..Default::default()
    };

    let mut watcher = PoolWatcher::new(config);

    if args.stdout {
        if args.json {
            watcher.add_handler(|event| {
                if let Ok(line) = serde_json::to_string(event) {
                    println!("{line}");
                }
            });
        } else {
            watcher.add_handler(logging_handler());
        }
    }

    if let Some(path) = args.output {
        let json = args.json;
        watcher.add_handler(move |event| file_append(&path, event, json));
    }

    let handle = watcher.stop_handle();
    let task = tokio::spawn(watcher.run());

    info!("ZFS watcher started. Monitoring pools: {}", args.pools.join(", "));
    info!("Press Ctrl+C to exit.");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    handle.stop();
    task.await?;

    Ok(())
}

/// Appends one event to the output file. Handler contract: failures are
/// swallowed here, never surfaced to the watcher.
fn file_append(path: &PathBuf, event: &PoolEvent, json: bool) {
    let line = if json {
        match serde_json::to_string(event) {
            Ok(line) => line,
            Err(_) => return,
        }
    } else {
        event.describe()
    };

    let Ok(mut file) = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
    else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
