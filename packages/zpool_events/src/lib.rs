//! # zpool_events
//!
//! A Rust library for watching ZFS pool command history and emitting typed
//! volume/snapshot lifecycle events.
//!
//! ## Overview
//!
//! ZFS records every administrative command in a per-pool history, readable
//! with `zpool history <pool>`. This library provides:
//! - A classifier that turns raw history lines into typed events
//!   (volume create/delete/resize, snapshot create/delete)
//! - A polling watcher that re-scans each pool's full history on a fixed
//!   interval and delivers each new event exactly once to registered
//!   handlers
//! - Stateless historical queries (since a time, since a marker command,
//!   or within a recent window)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use zpool_events::{PoolWatcher, WatcherConfig};
//!
//! # async fn demo() {
//! let mut watcher = PoolWatcher::new(WatcherConfig {
//!     pools: vec!["pool1".to_string()],
//!     interval: Duration::from_secs(5),
//!     ..Default::default()
//! });
//!
//! watcher.add_handler(|event| {
//!     println!("{}", event.describe());
//! });
//!
//! let handle = watcher.stop_handle();
//! tokio::spawn(watcher.run());
//! // ... later:
//! handle.stop();
//! # }
//! ```
//!
//! ## Historical queries
//!
//! Queries scan the full history once and return matching events without
//! touching the watcher's live dedup state, so they can run concurrently
//! with steady-state polling:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use zpool_events::{PoolWatcher, WatcherConfig};
//!
//! # async fn demo() -> zpool_events::Result<()> {
//! let watcher = PoolWatcher::new(WatcherConfig {
//!     pools: vec!["pool1".to_string()],
//!     ..Default::default()
//! });
//!
//! // Everything from the last hour.
//! let recent = watcher.recent_events(Duration::from_secs(3600)).await?;
//!
//! // Everything after a known resume point.
//! let resumed = watcher
//!     .events_since_marker("zfs snapshot pool1/volume-aaaa-bbbb_0@snapshot-cccc")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Delivery semantics
//!
//! The watcher runs one silent initialization pass that records existing
//! history without reporting it, then polls. Dedup keys on the raw command
//! text: because the source is re-read in full every tick, the same line
//! reappears each time and is delivered only on its first genuinely new
//! appearance. Handlers run synchronously in registration order and must
//! not block.

pub mod classify;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod paths;
pub mod query;
pub mod tracker;
pub mod types;
pub mod watcher;

pub use classify::LineClassifier;
pub use dispatch::{Dispatcher, EventHandler, logging_handler};
pub use error::{Result, WatchError};
pub use history::HistorySource;
pub use paths::ZpoolCommand;
pub use tracker::DedupTracker;
pub use types::{EventKind, HISTORY_TIME_FORMAT, PoolEvent};
pub use watcher::{PoolWatcher, WatcherConfig, WatcherHandle};
