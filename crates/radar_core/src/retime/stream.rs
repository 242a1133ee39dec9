//! The working copy of an audio track under correction.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::models::BitrateId;

use super::errors::{RetimeError, RetimeResult};
use super::splicer::Splicer;
use super::timecode::CutPlan;

/// Owned handle to the temporary file holding the stream being retimed.
///
/// Each correction consumes the stream and yields its replacement, so a
/// failed splice leaves no half-updated handle behind.
#[derive(Debug)]
pub struct WorkingStream {
    path: PathBuf,
}

impl WorkingStream {
    /// Copy `source` into `work_dir` and take ownership of the copy.
    pub fn copy_from(source: &Path, work_dir: &Path) -> RetimeResult<Self> {
        let file_name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "audio.ac3".into());
        let path = work_dir.join(file_name);

        fs::copy(source, &path).map_err(|e| {
            RetimeError::filesystem(format!("copy {} to work dir", source.display()), e)
        })?;
        tracing::debug!("Working copy: {}", path.display());

        Ok(Self { path })
    }

    /// Adopt an existing file as the working stream.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the stream in bytes.
    pub fn len(&self) -> RetimeResult<u64> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|e| RetimeError::filesystem(format!("stat {}", self.path.display()), e))
    }

    pub fn is_empty(&self) -> RetimeResult<bool> {
        self.len().map(|len| len == 0)
    }

    /// Apply one scene correction, producing the corrected stream.
    pub fn apply(
        self,
        plan: &CutPlan,
        splicer: &Splicer<'_>,
        bitrate: &BitrateId,
    ) -> RetimeResult<Self> {
        splicer.splice(self, plan, bitrate)
    }

    /// Replace the stream's contents with `new_file` by renaming it over the
    /// working path.
    pub(crate) fn replace_with(self, new_file: &Path) -> RetimeResult<Self> {
        fs::rename(new_file, &self.path).map_err(|e| {
            RetimeError::filesystem(format!("replace {}", self.path.display()), e)
        })?;
        Ok(self)
    }

    /// Move the finished stream to `dest`, replacing any existing file.
    ///
    /// Falls back to copying through a temporary sibling of `dest` when a
    /// plain rename is not possible (e.g. across filesystems).
    pub fn commit(self, dest: &Path) -> RetimeResult<PathBuf> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                RetimeError::filesystem(format!("create {}", parent.display()), e)
            })?;
        }

        match fs::rename(&self.path, dest) {
            Ok(()) => {}
            Err(rename_err) => {
                tracing::debug!(
                    "Rename to {} failed ({}), copying instead",
                    dest.display(),
                    rename_err
                );
                copy_replace(&self.path, dest).map_err(|e| {
                    RetimeError::filesystem(format!("move result to {}", dest.display()), e)
                })?;
                let _ = fs::remove_file(&self.path);
            }
        }

        Ok(dest.to_path_buf())
    }
}

/// Copy `src` to a temp file next to `dest`, then atomically persist it.
fn copy_replace(src: &Path, dest: &Path) -> io::Result<()> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    io::copy(&mut fs::File::open(src)?, tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
