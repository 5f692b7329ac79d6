use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format used by `zpool history` output.
pub const HISTORY_TIME_FORMAT: &str = "%Y-%m-%d.%H:%M:%S";

/// The kind of lifecycle event extracted from a history line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    VolumeCreated,
    VolumeDeleted,
    SnapshotCreated,
    SnapshotDeleted,
    VolumeResized,
}

impl EventKind {
    /// Short human-readable label used by the logging handler and CLI.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::VolumeCreated => "Volume created",
            EventKind::VolumeDeleted => "Volume deleted",
            EventKind::SnapshotCreated => "Snapshot created",
            EventKind::SnapshotDeleted => "Snapshot deleted",
            EventKind::VolumeResized => "Volume resized",
        }
    }
}

/// A classified event from a pool's command history.
///
/// Built by the classifier and never mutated afterwards. `command` is the
/// raw command text exactly as it appeared after the timestamp; the tracker
/// uses it verbatim as the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEvent {
    /// When the command ran, parsed from the history line (local time,
    /// `zpool history` prints no zone).
    pub timestamp: NaiveDateTime,

    /// Raw command text after the timestamp.
    pub command: String,

    /// Name of the pool the line came from.
    pub pool: String,

    pub kind: EventKind,

    /// Volume identifier, without any snapshot suffix.
    pub volume_id: String,

    /// Set only for snapshot create/delete events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,

    /// Display identifier: `volume_id` alone, or `volume_id@snapshot_id`.
    pub target: String,

    /// Size in KB as text, for create-with-size and resize events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl PoolEvent {
    /// One-line human-readable description, matching the CLI output format.
    pub fn describe(&self) -> String {
        let time = self.timestamp.format("%Y-%m-%d %H:%M:%S");
        match self.kind {
            EventKind::VolumeResized => format!(
                "[{}] {}: {} to {}KB on pool {}",
                time,
                self.kind.label(),
                self.target,
                self.size.as_deref().unwrap_or("?"),
                self.pool
            ),
            _ => format!(
                "[{}] {}: {} on pool {}",
                time,
                self.kind.label(),
                self.target,
                self.pool
            ),
        }
    }
}
