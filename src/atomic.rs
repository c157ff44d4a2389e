//! Crash-safe persistence: backup, temp write, rename.
//!
//! Readers of the primary path see either the complete old content or the
//! complete new content. On failure the backup and temp siblings stay on disk
//! for the reader's recovery path; rollback is never automatic.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::ConfigError;

pub const BACKUP_SUFFIX: &str = ".bak";
pub const TEMP_SUFFIX: &str = ".tmp";

/// The primary file and its deterministic sibling artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub primary: PathBuf,
    pub backup: PathBuf,
    pub temp: PathBuf,
}

impl ArtifactPaths {
    pub fn for_path(path: &Path) -> Self {
        Self {
            primary: path.to_path_buf(),
            backup: with_suffix(path, BACKUP_SUFFIX),
            temp: with_suffix(path, TEMP_SUFFIX),
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// True for backup and temp siblings, which are never real documents.
pub fn is_artifact(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(BACKUP_SUFFIX) || n.ends_with(TEMP_SUFFIX))
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Writes `content` to `path` through a backup and a temp sibling.
pub async fn atomic_write(path: &Path, content: &str) -> Result<(), ConfigError> {
    let artifacts = ArtifactPaths::for_path(path);
    let failed = |source| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(failed)?;
    }

    let existed = exists(path).await;
    if existed {
        fs::copy(path, &artifacts.backup).await.map_err(failed)?;
        debug!(backup = %artifacts.backup.display(), "backed up existing config");
    }

    if let Err(e) = write_synced(&artifacts.temp, content).await {
        warn!(path = %path.display(), error = %e, "temp write failed, original left untouched");
        return Err(failed(e));
    }

    if let Err(e) = fs::rename(&artifacts.temp, path).await {
        warn!(path = %path.display(), error = %e, "rename failed, original left untouched");
        return Err(failed(e));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = sync_dir(parent).await {
            warn!(dir = %parent.display(), error = %e, "failed to fsync config directory");
        }
    }

    if existed {
        if let Err(e) = fs::remove_file(&artifacts.backup).await {
            debug!(backup = %artifacts.backup.display(), error = %e, "could not remove backup");
        }
    }

    info!(path = %path.display(), bytes = content.len(), "wrote config");
    Ok(())
}

async fn write_synced(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.sync_all().await
}

async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

/// Reads the backup sibling of `path`, if one was left behind.
pub async fn read_backup(path: &Path) -> Option<String> {
    let backup = ArtifactPaths::for_path(path).backup;
    fs::read_to_string(&backup).await.ok()
}

/// Moves the backup sibling over `path`, making it the active file again.
pub async fn restore_backup(path: &Path) -> Result<(), ConfigError> {
    let backup = ArtifactPaths::for_path(path).backup;
    fs::rename(&backup, path)
        .await
        .map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), "restored config from backup");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_names_are_siblings() {
        let artifacts = ArtifactPaths::for_path(Path::new("/p/.config/rse.jsonc"));
        assert_eq!(artifacts.backup, PathBuf::from("/p/.config/rse.jsonc.bak"));
        assert_eq!(artifacts.temp, PathBuf::from("/p/.config/rse.jsonc.tmp"));
        assert!(is_artifact(&artifacts.backup));
        assert!(is_artifact(&artifacts.temp));
        assert!(!is_artifact(&artifacts.primary));
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_leaves_no_artifacts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".config/rse.jsonc");

        atomic_write(&path, "{}\n").await.unwrap();
        atomic_write(&path, "{\"a\": 1}\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\": 1}\n");
        let artifacts = ArtifactPaths::for_path(&path);
        assert!(!artifacts.backup.exists());
        assert!(!artifacts.temp.exists());
    }

    #[tokio::test]
    async fn test_failed_temp_write_keeps_original_and_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.jsonc");
        std::fs::write(&path, "original").unwrap();
        // a directory where the temp file should go makes the write fail
        std::fs::create_dir(ArtifactPaths::for_path(&path).temp).unwrap();

        let err = atomic_write(&path, "replacement").await.unwrap_err();
        assert!(matches!(err, ConfigError::WriteFailed { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(read_backup(&path).await.as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn test_restore_moves_backup_into_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.jsonc");
        std::fs::write(&path, "broken").unwrap();
        std::fs::write(ArtifactPaths::for_path(&path).backup, "good").unwrap();

        restore_backup(&path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "good");
        assert!(read_backup(&path).await.is_none());
    }
}
