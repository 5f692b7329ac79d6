use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::types::PoolEvent;

/// Decides which classified events are new for the current tick.
///
/// The history source is re-read in full on every tick, so every line
/// reappears every time; `last_seen` maps raw command text to the most
/// recent timestamp at which that exact text was accepted, and anything at
/// or before that timestamp is rejected as already delivered.
///
/// Owned by exactly one watcher and mutated only from its sequential
/// scheduler context; multiple watcher instances each carry their own
/// tracker.
#[derive(Debug)]
pub struct DedupTracker {
    last_seen: HashMap<String, NaiveDateTime>,
    marker: Option<String>,
    marker_seen: bool,
    cutoff: Option<NaiveDateTime>,
}

impl DedupTracker {
    pub fn new(marker: Option<String>, cutoff: Option<NaiveDateTime>) -> Self {
        Self {
            last_seen: HashMap::new(),
            // With no marker configured there is nothing to wait for.
            marker_seen: marker.is_none(),
            marker,
            cutoff,
        }
    }

    /// Marker gate, applied to the raw line before classification so that a
    /// marker command which is not itself a classifiable event still trips
    /// the flag.
    ///
    /// Returns `true` when the line may proceed to classification. The
    /// marker line itself is consumed here and never delivered.
    pub fn marker_gate(&mut self, line: &str) -> bool {
        if self.marker_seen {
            return true;
        }
        if let Some(marker) = &self.marker {
            if line.contains(marker.as_str()) {
                self.marker_seen = true;
            }
        }
        false
    }

    /// Remaining gates for a classified event: dedup, cutoff time, and the
    /// initialization pass. Returns `true` when the event is new and must
    /// be dispatched.
    ///
    /// The dedup update is committed as soon as that gate passes, even when
    /// the cutoff or initialization gate then rejects: a line is never
    /// re-evaluated as new after its first genuine appearance.
    pub fn admit(&mut self, event: &PoolEvent, initializing: bool) -> bool {
        if let Some(last) = self.last_seen.get(&event.command) {
            if event.timestamp <= *last {
                return false;
            }
        }
        self.last_seen.insert(event.command.clone(), event.timestamp);

        if let Some(cutoff) = self.cutoff {
            if event.timestamp <= cutoff {
                return false;
            }
        }

        !initializing
    }

    pub fn marker_seen(&self) -> bool {
        self.marker_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::LineClassifier;
    use crate::types::HISTORY_TIME_FORMAT;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, HISTORY_TIME_FORMAT).unwrap()
    }

    fn event(line: &str) -> PoolEvent {
        LineClassifier::new().classify(line, "pool1").unwrap()
    }

    const CREATE: &str = "2024-01-01.10:00:00 zfs create -s -V 1024KB pool1/volume-aaaa-bbbb_0";
    const DESTROY: &str = "2024-01-01.10:05:00 zfs destroy pool1/volume-aaaa-bbbb_0";

    #[test]
    fn test_rescan_is_idempotent() {
        let mut tracker = DedupTracker::new(None, None);

        assert!(tracker.admit(&event(CREATE), false));
        // Second tick re-reads the full history; the same line must not be
        // delivered again.
        assert!(!tracker.admit(&event(CREATE), false));
    }

    #[test]
    fn test_second_tick_delivers_only_the_new_line() {
        let mut tracker = DedupTracker::new(None, None);

        assert!(tracker.admit(&event(CREATE), false));

        // Next tick: history now holds both lines.
        assert!(!tracker.admit(&event(CREATE), false));
        assert!(tracker.admit(&event(DESTROY), false));
    }

    #[test]
    fn test_initialization_pass_populates_without_delivering() {
        let mut tracker = DedupTracker::new(None, None);

        assert!(!tracker.admit(&event(CREATE), true));
        // State was populated, so steady state does not redeliver.
        assert!(!tracker.admit(&event(CREATE), false));
    }

    #[test]
    fn test_cutoff_is_strictly_after() {
        let mut tracker = DedupTracker::new(None, Some(at("2024-01-01.10:00:00")));

        // timestamp == cutoff: rejected.
        assert!(!tracker.admit(&event(CREATE), false));
        // timestamp == cutoff + 1s: accepted.
        let later = event("2024-01-01.10:00:01 zfs destroy pool1/volume-aaaa-bbbb_0");
        assert!(tracker.admit(&later, false));
    }

    #[test]
    fn test_dedup_update_commits_even_when_cutoff_rejects() {
        let mut tracker = DedupTracker::new(None, Some(at("2024-12-31.00:00:00")));

        // Rejected by the cutoff, but last_seen is updated anyway.
        assert!(!tracker.admit(&event(CREATE), false));

        // Remove the cutoff; the same line is still not "new".
        tracker.cutoff = None;
        assert!(!tracker.admit(&event(CREATE), false));
    }

    #[test]
    fn test_identical_command_with_newer_timestamp_is_new() {
        let mut tracker = DedupTracker::new(None, None);

        assert!(tracker.admit(&event(DESTROY), false));
        let rerun = event("2024-01-01.10:06:00 zfs destroy pool1/volume-aaaa-bbbb_0");
        assert!(tracker.admit(&rerun, false));
    }

    #[test]
    fn test_marker_suppresses_until_seen() {
        let mut tracker = DedupTracker::new(Some("zfs snapshot".to_string()), None);

        // Lines before the marker are rejected.
        assert!(!tracker.marker_gate(CREATE));
        assert!(!tracker.marker_seen());

        // The marker line trips the flag but is itself rejected.
        assert!(!tracker.marker_gate(
            "2024-01-01.10:02:00 zfs snapshot pool1/volume-aaaa-bbbb_0@snapshot-cccc"
        ));
        assert!(tracker.marker_seen());

        // The first subsequent line passes the gate.
        assert!(tracker.marker_gate(DESTROY));
        assert!(tracker.admit(&event(DESTROY), false));
    }

    #[test]
    fn test_no_marker_configured_passes_everything() {
        let mut tracker = DedupTracker::new(None, None);
        assert!(tracker.marker_gate(CREATE));
    }

    #[test]
    fn test_unclassifiable_marker_line_still_trips_flag() {
        let mut tracker = DedupTracker::new(Some("zpool scrub".to_string()), None);

        assert!(!tracker.marker_gate("2024-01-01.09:00:00 zpool scrub pool1"));
        assert!(tracker.marker_seen());
        assert!(tracker.marker_gate(DESTROY));
    }
}
