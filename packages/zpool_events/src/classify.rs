use chrono::NaiveDateTime;
use regex::Regex;

use crate::types::{EventKind, HISTORY_TIME_FORMAT, PoolEvent};

/// Classifies raw `zpool history` lines into typed events.
///
/// Pure: no state beyond the compiled patterns. A line that is malformed
/// (no timestamp/command split, unparseable timestamp) or that matches no
/// pattern yields `None`; callers skip it without reporting. The bulk of
/// history output is informational and expected to classify as `None`.
pub struct LineClassifier {
    volume_create: Regex,
    volume_destroy: Regex,
    snapshot_create: Regex,
    volume_resize: Regex,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier {
    pub fn new() -> Self {
        // Identifier shapes: pools are `pool<digits>`, volumes are
        // `volume-<hex-with-dashes>_<digits>`, snapshots `snapshot-<hex-with-dashes>`.
        Self {
            volume_create: Regex::new(
                r"zfs create\s+.*?(-s -V\s+(\d+)KB.*?)?pool\d+/(volume-[a-f0-9\-]+_\d+)",
            )
            .expect("volume create pattern"),
            volume_destroy: Regex::new(
                r"zfs destroy\s+pool\d+/(volume-[a-f0-9\-]+_\d+)(?:@(snapshot-[a-f0-9\-]+))?",
            )
            .expect("volume destroy pattern"),
            snapshot_create: Regex::new(
                r"zfs snapshot\s+pool\d+/(volume-[a-f0-9\-]+_\d+)@(snapshot-[a-f0-9\-]+)",
            )
            .expect("snapshot create pattern"),
            volume_resize: Regex::new(r"zfs set volsize=(\d+)KB\s+pool\d+/(volume-[a-f0-9\-]+_\d+)")
                .expect("volume resize pattern"),
        }
    }

    /// Splits a history line into timestamp and command, then applies the
    /// patterns in priority order: create, resize, snapshot, destroy.
    /// First match wins.
    pub fn classify(&self, line: &str, pool: &str) -> Option<PoolEvent> {
        // The first whitespace run separates timestamp from command text.
        let (timestamp, command) = line.split_once(char::is_whitespace)?;
        let command = command.trim_start();
        let timestamp = NaiveDateTime::parse_from_str(timestamp, HISTORY_TIME_FORMAT).ok()?;

        if let Some(m) = self.volume_create.captures(command) {
            let volume_id = m[3].to_string();
            return Some(PoolEvent {
                timestamp,
                command: command.to_string(),
                pool: pool.to_string(),
                kind: EventKind::VolumeCreated,
                target: volume_id.clone(),
                volume_id,
                snapshot_id: None,
                size: m.get(2).map(|s| s.as_str().to_string()),
            });
        }

        if let Some(m) = self.volume_resize.captures(command) {
            let volume_id = m[2].to_string();
            return Some(PoolEvent {
                timestamp,
                command: command.to_string(),
                pool: pool.to_string(),
                kind: EventKind::VolumeResized,
                target: volume_id.clone(),
                volume_id,
                snapshot_id: None,
                size: Some(m[1].to_string()),
            });
        }

        if let Some(m) = self.snapshot_create.captures(command) {
            let volume_id = m[1].to_string();
            let snapshot_id = m[2].to_string();
            return Some(PoolEvent {
                timestamp,
                command: command.to_string(),
                pool: pool.to_string(),
                kind: EventKind::SnapshotCreated,
                target: format!("{}@{}", volume_id, snapshot_id),
                volume_id,
                snapshot_id: Some(snapshot_id),
                size: None,
            });
        }

        if let Some(m) = self.volume_destroy.captures(command) {
            let volume_id = m[1].to_string();
            return Some(match m.get(2) {
                Some(snap) => {
                    let snapshot_id = snap.as_str().to_string();
                    PoolEvent {
                        timestamp,
                        command: command.to_string(),
                        pool: pool.to_string(),
                        kind: EventKind::SnapshotDeleted,
                        target: format!("{}@{}", volume_id, snapshot_id),
                        volume_id,
                        snapshot_id: Some(snapshot_id),
                        size: None,
                    }
                }
                None => PoolEvent {
                    timestamp,
                    command: command.to_string(),
                    pool: pool.to_string(),
                    kind: EventKind::VolumeDeleted,
                    target: volume_id.clone(),
                    volume_id,
                    snapshot_id: None,
                    size: None,
                },
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<PoolEvent> {
        LineClassifier::new().classify(line, "pool1")
    }

    #[test]
    fn test_volume_create_with_size() {
        let event =
            classify("2024-01-01.10:00:00 zfs create -s -V 1024KB pool1/volume-aaaa-bbbb_0")
                .unwrap();

        assert_eq!(event.kind, EventKind::VolumeCreated);
        assert_eq!(event.volume_id, "volume-aaaa-bbbb_0");
        assert_eq!(event.target, "volume-aaaa-bbbb_0");
        assert_eq!(event.size.as_deref(), Some("1024"));
        assert_eq!(event.snapshot_id, None);
        assert_eq!(
            event.command,
            "zfs create -s -V 1024KB pool1/volume-aaaa-bbbb_0"
        );
    }

    #[test]
    fn test_volume_create_without_size() {
        let event = classify("2024-01-01.10:00:00 zfs create pool1/volume-aaaa-bbbb_0").unwrap();

        assert_eq!(event.kind, EventKind::VolumeCreated);
        assert_eq!(event.size, None);
    }

    #[test]
    fn test_volume_resize() {
        let event =
            classify("2024-02-03.08:15:00 zfs set volsize=4096KB pool7/volume-0123-cafe_3")
                .unwrap();

        assert_eq!(event.kind, EventKind::VolumeResized);
        assert_eq!(event.volume_id, "volume-0123-cafe_3");
        assert_eq!(event.size.as_deref(), Some("4096"));
    }

    #[test]
    fn test_snapshot_create() {
        let event = classify(
            "2024-01-01.11:00:00 zfs snapshot pool1/volume-aaaa-bbbb_0@snapshot-dead-beef",
        )
        .unwrap();

        assert_eq!(event.kind, EventKind::SnapshotCreated);
        assert_eq!(event.volume_id, "volume-aaaa-bbbb_0");
        assert_eq!(event.snapshot_id.as_deref(), Some("snapshot-dead-beef"));
        assert_eq!(event.target, "volume-aaaa-bbbb_0@snapshot-dead-beef");
    }

    #[test]
    fn test_destroy_with_snapshot_suffix() {
        let event = classify(
            "2024-01-01.12:00:00 zfs destroy pool1/volume-aaaa-bbbb_0@snapshot-dead-beef",
        )
        .unwrap();

        assert_eq!(event.kind, EventKind::SnapshotDeleted);
        assert_eq!(event.target, "volume-aaaa-bbbb_0@snapshot-dead-beef");
        assert_eq!(event.snapshot_id.as_deref(), Some("snapshot-dead-beef"));
    }

    #[test]
    fn test_destroy_without_suffix() {
        let event = classify("2024-01-01.12:00:00 zfs destroy pool1/volume-aaaa-bbbb_0").unwrap();

        assert_eq!(event.kind, EventKind::VolumeDeleted);
        assert_eq!(event.target, "volume-aaaa-bbbb_0");
        assert_eq!(event.snapshot_id, None);
    }

    #[test]
    fn test_timestamp_parsed() {
        let event = classify("2024-06-30.23:59:59 zfs destroy pool1/volume-aaaa-bbbb_0").unwrap();
        assert_eq!(
            event.timestamp.format("%Y-%m-%d.%H:%M:%S").to_string(),
            "2024-06-30.23:59:59"
        );
    }

    #[test]
    fn test_malformed_timestamp_is_skipped() {
        assert!(classify("not-a-timestamp zfs destroy pool1/volume-aaaa-bbbb_0").is_none());
    }

    #[test]
    fn test_line_without_split_is_skipped() {
        assert!(classify("2024-01-01.10:00:00").is_none());
    }

    #[test]
    fn test_informational_line_is_not_an_event() {
        assert!(classify("2024-01-01.10:00:00 zpool scrub pool1").is_none());
        assert!(classify("2024-01-01.10:00:00 zfs set compression=on pool1/data").is_none());
    }

    #[test]
    fn test_numbered_pool_names_match() {
        let event = classify("2024-01-01.10:00:00 zfs destroy pool42/volume-00ff-aa_7").unwrap();
        assert_eq!(event.volume_id, "volume-00ff-aa_7");
    }
}
