use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{FileError, FileResult};

/// Write `data` to a sibling temp file, sync it, then rename over `path`.
///
/// Readers see either the previous content or the complete new content.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> FileResult<()> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let written = write_synced(&tmp_path, data).and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(err) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    if let Some(parent) = parent {
        sync_dir(parent)?;
    }
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> FileResult<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| FileError::InvalidPath(path.display().to_string()))?;
    let tmp_name = format!(".{}.{}.tmp", file_name.to_string_lossy(), Uuid::new_v4());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datamold-atomic-{}", Uuid::new_v4()));
        create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn replaces_existing_file_and_leaves_no_temp_files() {
        let dir = scratch_dir();
        let target = dir.join("records.json");
        write_bytes_atomic(&target, b"[1]").expect("first write");
        write_bytes_atomic(&target, b"[1,2]").expect("second write");

        assert_eq!(std::fs::read(&target).expect("read back"), b"[1,2]");
        let entries = std::fs::read_dir(&dir).expect("list dir").count();
        assert_eq!(entries, 1);
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = scratch_dir();
        let target = dir.join("nested/out/record.json");
        write_bytes_atomic(&target, b"{}").expect("write");
        assert!(target.exists());
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn rejects_paths_without_a_file_name() {
        let result = write_bytes_atomic(Path::new("/"), b"{}");
        assert!(matches!(result, Err(FileError::InvalidPath(_))));
    }
}
