//! Atomic File Writes - tmp then rename
//!
//! Reports are written to `<name>.tmp` first and renamed over the
//! final path, so a reader sees either the old file or the complete
//! new one, never a partial write.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument};

use crate::ports::repository::{SaveOutcome, StoreError};

/// Write `contents` to `path` atomically.
///
/// Refuses to replace an existing file unless `overwrite` is set.
#[instrument(skip(path, contents), fields(path = %path.display(), bytes = contents.len()))]
pub async fn write_atomic(
    path: &Path,
    contents: &str,
    overwrite: bool,
) -> Result<SaveOutcome, StoreError> {
    let existed = fs::try_exists(path).await?;
    if existed && !overwrite {
        return Err(StoreError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, contents).await?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }

    debug!(overwritten = existed, "Report written");
    let path = path.to_path_buf();
    Ok(if existed {
        SaveOutcome::Overwritten(path)
    } else {
        SaveOutcome::Created(path)
    })
}

/// `trend_2026-03-02.csv` becomes `trend_2026-03-02.csv.tmp`.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Check if `dir` exists and accepts writes.
pub async fn is_writable(dir: &Path) -> bool {
    let marker = dir.join(".health_check");
    let result = fs::write(&marker, b"ok").await;
    let _ = fs::remove_file(&marker).await;
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ntt-atomic-{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_refuses_overwrite_by_default() {
        let dir = scratch_dir("refuse");
        let path = dir.join("report.csv");

        let first = write_atomic(&path, "a\n", false).await.unwrap();
        assert_eq!(first, SaveOutcome::Created(path.clone()));

        let err = write_atomic(&path, "b\n", false).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(p) if p == path));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n");

        let second = write_atomic(&path, "b\n", true).await.unwrap();
        assert_eq!(second, SaveOutcome::Overwritten(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b\n");
        assert!(!tmp_path_for(&path).exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_creates_missing_parent() {
        let dir = scratch_dir("parent");
        let path = dir.join("nested").join("r.html");
        write_atomic(&path, "<p/>", false).await.unwrap();
        assert!(path.exists());
        assert!(is_writable(&dir).await);
        std::fs::remove_dir_all(dir).unwrap();
    }
}
