//! Pure scan helpers behind the historical query entry points. These never
//! touch the live tracker: a query is not a stream, so "already delivered"
//! has no meaning here and no dedup is applied.

use chrono::NaiveDateTime;

use crate::classify::LineClassifier;
use crate::history::history_lines;
use crate::types::PoolEvent;

/// Collects every classified event strictly after `since`.
pub fn scan_since(
    classifier: &LineClassifier,
    pool: &str,
    output: &str,
    since: NaiveDateTime,
) -> Vec<PoolEvent> {
    history_lines(output)
        .filter_map(|line| classifier.classify(line, pool))
        .filter(|event| event.timestamp > since)
        .collect()
}

/// Scans for the first line containing `marker`, skips it, and collects
/// every classified line after it unconditionally.
///
/// `already_found` carries the marker state across pools: once the marker
/// was found in an earlier pool's history, every line of later pools is
/// collected. Returns the events plus whether the marker has been found so
/// far.
pub fn scan_after_marker(
    classifier: &LineClassifier,
    pool: &str,
    output: &str,
    marker: &str,
    already_found: bool,
) -> (Vec<PoolEvent>, bool) {
    let mut found = already_found;
    let mut events = Vec::new();

    for line in history_lines(output) {
        if !found {
            if line.contains(marker) {
                found = true;
            }
            continue;
        }
        if let Some(event) = classifier.classify(line, pool) {
            events.push(event);
        }
    }

    (events, found)
}
