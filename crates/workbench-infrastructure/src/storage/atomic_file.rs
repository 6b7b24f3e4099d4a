//! Atomic file writes.
//!
//! Contents are written to a hidden temporary file next to the target,
//! synced, and renamed over the target, so readers never observe a
//! half-written file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use workbench_core::error::{Result, WorkbenchError};

/// Writes `contents` to `path` atomically, creating parent directories.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !fs::try_exists(parent).await? {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut tmp_file = fs::File::create(&tmp_path).await?;
    tmp_file.write_all(contents).await?;

    // Ensure data is written to disk
    tmp_file.sync_all().await?;
    drop(tmp_file);

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// Gets a temporary file path for atomic writes.
fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| WorkbenchError::io(format!("Path has no file name: {}", path.display())))?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("lab.py");

        write_atomic(&path, b"x = 1\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = 1\n");
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lab.scm");

        write_atomic(&path, b"(define x 1)").await.unwrap();
        write_atomic(&path, b"(define x 2)").await.unwrap();

        assert!(!temp_dir.path().join(".lab.scm.tmp").exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "(define x 2)");
    }

    #[test]
    fn test_temp_path_rejects_bare_root() {
        assert!(temp_path(Path::new("/")).is_err());
    }
}
