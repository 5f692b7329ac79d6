use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, WatchError};
use crate::paths::ZpoolCommand;

/// Header line emitted at the top of `zpool history` output.
const HISTORY_HEADER: &str = "History for";

/// Fetches the full command history for a pool by invoking the external
/// `zpool` binary.
///
/// There is no incremental read: every fetch returns the complete ordered
/// history, and the tracker is responsible for deciding what is new. There
/// is also no timeout on the invocation; a hung command stalls the current
/// tick (the watcher's stop token can still cancel it).
#[derive(Debug, Clone)]
pub struct HistorySource {
    command: ZpoolCommand,
}

impl HistorySource {
    pub fn new(command: ZpoolCommand) -> Self {
        Self { command }
    }

    /// Runs `<zpool> history <pool>` and returns its stdout.
    pub async fn fetch(&self, pool: &str) -> Result<String> {
        debug!("fetching history for pool {}", pool);

        let output = Command::new(self.command.as_os_str())
            .arg("history")
            .arg(pool)
            .output()
            .await?;

        if !output.status.success() {
            return Err(WatchError::CommandFailed {
                pool: pool.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Iterates the data lines of a history dump, skipping the header and
/// blank lines.
pub fn history_lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .filter(|line| !line.is_empty() && !line.contains(HISTORY_HEADER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_lines_skip_header_and_blanks() {
        let output = "History for 'pool1':\n\
                      2024-01-01.10:00:00 zpool create pool1 sda\n\
                      \n\
                      2024-01-01.10:05:00 zfs destroy pool1/volume-aaaa-bbbb_0\n";

        let lines: Vec<&str> = history_lines(output).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2024-01-01.10:00:00"));
        assert!(lines[1].ends_with("volume-aaaa-bbbb_0"));
    }

    #[tokio::test]
    async fn test_fetch_missing_binary_is_io_error() {
        let source = HistorySource::new(ZpoolCommand::Custom("/nonexistent/zpool".into()));
        let err = source.fetch("pool1").await.unwrap_err();
        assert!(matches!(err, WatchError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_nonzero_exit_is_command_failed() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("zpool");
        let mut f = std::fs::File::create(&script).unwrap();
        writeln!(f, "#!/bin/sh\necho 'cannot open pool' >&2\nexit 1").unwrap();
        drop(f);
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let source = HistorySource::new(ZpoolCommand::Custom(script));
        let err = source.fetch("pool1").await.unwrap_err();
        match err {
            WatchError::CommandFailed { pool, detail } => {
                assert_eq!(pool, "pool1");
                assert!(detail.contains("cannot open pool"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
