use std::ffi::OsStr;
use std::path::PathBuf;

/// Location of the `zpool` binary used to read pool history.
///
/// The well-known variants cover where distributions usually install it;
/// `Default` leaves resolution to the caller's PATH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZpoolCommand {
    /// Bare `zpool`, resolved via PATH.
    Default,
    /// `/usr/sbin/zpool`, common on many Linux/Unix systems.
    UsrSbin,
    /// `/sbin/zpool`, alternative location on some systems.
    Sbin,
    /// `/usr/local/sbin/zpool`, common on FreeBSD or custom installs.
    UsrLocalSbin,
    /// An arbitrary path supplied by the caller.
    Custom(PathBuf),
}

impl Default for ZpoolCommand {
    fn default() -> Self {
        ZpoolCommand::Default
    }
}

impl ZpoolCommand {
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            ZpoolCommand::Default => OsStr::new("zpool"),
            ZpoolCommand::UsrSbin => OsStr::new("/usr/sbin/zpool"),
            ZpoolCommand::Sbin => OsStr::new("/sbin/zpool"),
            ZpoolCommand::UsrLocalSbin => OsStr::new("/usr/local/sbin/zpool"),
            ZpoolCommand::Custom(path) => path.as_os_str(),
        }
    }
}

impl From<PathBuf> for ZpoolCommand {
    fn from(path: PathBuf) -> Self {
        ZpoolCommand::Custom(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolves_via_path() {
        assert_eq!(ZpoolCommand::default().as_os_str(), "zpool");
    }

    #[test]
    fn test_custom_path_passes_through() {
        let cmd = ZpoolCommand::from(PathBuf::from("/opt/zfs/bin/zpool"));
        assert_eq!(cmd.as_os_str(), "/opt/zfs/bin/zpool");
    }
}
