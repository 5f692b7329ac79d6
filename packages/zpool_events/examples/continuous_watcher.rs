//! Continuous watcher with a persistent cutoff.
//!
//! Keeps a single Unix timestamp in a state file. At startup it seeds the
//! watcher's `since_time`, so events already handled before the last
//! shutdown are not replayed; after every delivered event (and again on
//! shutdown) the file is rewritten with the newest event time. The file
//! format belongs to this example, not to the library.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use zpool_events::{PoolWatcher, WatcherConfig, logging_handler};

const STATE_FILE: &str = "/var/lib/zpool-watcher/last_event_time";

fn load_cutoff(path: &Path) -> Option<NaiveDateTime> {
    let text = std::fs::read_to_string(path).ok()?;
    let unix: i64 = text.trim().parse().ok()?;
    Local
        .timestamp_opt(unix, 0)
        .single()
        .map(|dt| dt.naive_local())
}

fn store_cutoff(path: &Path, timestamp: NaiveDateTime) -> Result<()> {
    let unix = Local
        .from_local_datetime(&timestamp)
        .single()
        .map(|dt| dt.timestamp())
        .context("timestamp not representable in local time")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{unix}\n"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("zpool_events=info")
        .init();

    let state_file = PathBuf::from(
        std::env::var("ZPOOL_WATCHER_STATE").unwrap_or_else(|_| STATE_FILE.to_string()),
    );

    let since_time = load_cutoff(&state_file);
    match since_time {
        Some(t) => println!("Resuming after {}", t.format("%Y-%m-%d %H:%M:%S")),
        None => println!("No saved state, reporting all new events"),
    }

    let mut watcher = PoolWatcher::new(WatcherConfig {
        pools: vec!["pool1".to_string()],
        interval: Duration::from_secs(5),
        since_time,
        ..Default::default()
    });

    watcher.add_handler(logging_handler());

    // Track the newest delivered timestamp and persist it as we go.
    let latest = Arc::new(Mutex::new(since_time));
    {
        let latest = latest.clone();
        let state_file = state_file.clone();
        watcher.add_handler(move |event| {
            let mut latest = latest.lock().unwrap();
            if latest.map(|t| event.timestamp > t).unwrap_or(true) {
                *latest = Some(event.timestamp);
                if let Err(e) = store_cutoff(&state_file, event.timestamp) {
                    eprintln!("Warning: failed to persist state: {e}");
                }
            }
        });
    }

    let handle = watcher.stop_handle();
    let task = tokio::spawn(watcher.run());

    println!("Watching pool1. Press Ctrl+C to exit.");
    tokio::signal::ctrl_c().await?;

    handle.stop();
    task.await?;

    if let Some(timestamp) = *latest.lock().unwrap() {
        store_cutoff(&state_file, timestamp)?;
        println!("Saved state at {}", timestamp.format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}
