use std::time::Duration;

use anyhow::Result;
use zpool_events::{EventKind, PoolWatcher, WatcherConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("zpool_events=info")
        .init();

    let mut watcher = PoolWatcher::new(WatcherConfig {
        pools: vec!["pool1".to_string()],
        interval: Duration::from_secs(5),
        ..Default::default()
    });

    println!("=== Events from the last 24 hours ===");
    match watcher.recent_events(Duration::from_secs(24 * 3600)).await {
        Ok(events) => {
            for event in &events {
                println!("  {}", event.describe());
            }
            let snapshots = events
                .iter()
                .filter(|e| e.kind == EventKind::SnapshotCreated)
                .count();
            println!("  {} events, {} snapshots created", events.len(), snapshots);
        }
        Err(e) => println!("  query failed: {e}"),
    }
    println!();

    println!("=== Events since a marker command ===");
    match watcher
        .events_since_marker("zpool create pool1")
        .await
    {
        Ok(events) => {
            for event in &events {
                println!("  {}", event.describe());
            }
        }
        Err(e) => println!("  query failed: {e}"),
    }
    println!();

    // Live watching: handlers must be registered before run() starts.
    watcher.add_handler(|event| {
        println!("live: {}", event.describe());
    });

    let handle = watcher.stop_handle();
    let task = tokio::spawn(watcher.run());

    println!("Watching pool1 for 30 seconds...");
    tokio::time::sleep(Duration::from_secs(30)).await;

    handle.stop();
    task.await?;
    Ok(())
}
