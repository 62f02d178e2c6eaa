//! Atomic file writes shared by the artifact, key file and config savers

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Who may read the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    /// Default process umask
    Shared,
    /// Owner read/write only (0600 on unix)
    OwnerOnly,
}

/// Sibling temp path unique to the target file name (`a.creds` -> `a.creds.tmp`)
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("unnamed"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` via a temp file and rename, creating parent dirs
pub(crate) async fn write_atomic(
    path: &Path,
    contents: &[u8],
    visibility: Visibility,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = temp_path_for(path);

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        if visibility == Visibility::OwnerOnly {
            options.mode(0o600);
        }
    }

    let mut file = options.open(&temp_path).await?;

    // mode() only applies on create; a leftover temp file keeps its old bits
    #[cfg(unix)]
    {
        if visibility == Visibility::OwnerOnly {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
        }
    }
    #[cfg(not(unix))]
    let _ = visibility;

    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}
