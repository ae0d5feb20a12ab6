//! Permission check for secure lookups.
//!
//! In secure mode a config file is only accepted when nobody but its owner
//! can read or write it (mode `0600` or stricter).

use std::io;
use std::path::Path;

/// Group/other read and write bits.
#[cfg(unix)]
const FOREIGN_ACCESS_MASK: u32 = 0o066;

/// Whether `path` is only accessible by its owner.
///
/// Permission bits are not available on non-Unix platforms, where every file
/// is accepted.
pub fn is_secure(path: &Path) -> io::Result<bool> {
    let metadata = std::fs::metadata(path)?;
    Ok(mode_is_secure(&metadata))
}

#[cfg(unix)]
fn mode_is_secure(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & FOREIGN_ACCESS_MASK == 0
}

#[cfg(not(unix))]
fn mode_is_secure(_metadata: &std::fs::Metadata) -> bool {
    true
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn file_with_mode(temp: &TempDir, name: &str, mode: u32) -> std::path::PathBuf {
        let path = temp.path().join(name);
        std::fs::write(&path, "[section]\nkey = value\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_owner_only_is_secure() {
        let temp = TempDir::new().unwrap();
        assert!(is_secure(&file_with_mode(&temp, "a.ini", 0o600)).unwrap());
        assert!(is_secure(&file_with_mode(&temp, "b.ini", 0o400)).unwrap());
        assert!(is_secure(&file_with_mode(&temp, "c.ini", 0o700)).unwrap());
    }

    #[test]
    fn test_group_or_world_access_is_insecure() {
        let temp = TempDir::new().unwrap();
        assert!(!is_secure(&file_with_mode(&temp, "a.ini", 0o644)).unwrap());
        assert!(!is_secure(&file_with_mode(&temp, "b.ini", 0o640)).unwrap());
        assert!(!is_secure(&file_with_mode(&temp, "c.ini", 0o602)).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(is_secure(&temp.path().join("missing.ini")).is_err());
    }
}
