use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("settings"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` next to `path` and rename it into place, creating parent
/// directories as needed. Readers never observe a half-written file.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    fs::write(&temp, content)?;
    fs::rename(&temp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");

        atomic_write(&path, "leverage: 1.0\n").unwrap();
        atomic_write(&path, "leverage: 0.5\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "leverage: 0.5\n");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.yaml");

        atomic_write(&path, "x: 1\n").unwrap();
        assert!(path.exists());
    }
}
