use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::ExtractPatchError;

pub const HASH_HEX_LEN: usize = 16;

pub fn content_hash(bytes: &[u8]) -> String {
    let full_hex = blake3::hash(bytes).to_hex();
    full_hex.as_str()[..HASH_HEX_LEN].to_string()
}

/// How the target is opened. Dry runs never ask for write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// A target file opened under an exclusive advisory lock. The lock is
/// released when this value is dropped.
#[derive(Debug)]
pub struct LockedTarget {
    path: PathBuf,
    file: File,
    access: Access,
    source_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WritePhase {
    TempWritten,
    TempSynced,
    Persisted,
}

impl LockedTarget {
    /// Lock `path` and read it as UTF-8. Fails before anything is created
    /// when the path does not exist.
    pub fn open(path: &Path, access: Access) -> Result<(Self, String), ExtractPatchError> {
        let metadata =
            fs::symlink_metadata(path).map_err(|error| ExtractPatchError::io(path, error))?;
        if metadata.file_type().is_symlink() {
            return Err(ExtractPatchError::InvalidRequest {
                message: format!(
                    "Refusing to rewrite through symbolic link '{}'",
                    path.display()
                ),
            });
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(access == Access::ReadWrite)
            .open(path)
            .map_err(|error| ExtractPatchError::io(path, error))?;

        file.try_lock_exclusive().map_err(|error| {
            if error.kind() == std::io::ErrorKind::WouldBlock {
                ExtractPatchError::ResourceBusy {
                    path: path.display().to_string(),
                }
            } else {
                ExtractPatchError::io(path, error)
            }
        })?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|error| ExtractPatchError::io(path, error))?;
        let source_hash = content_hash(&bytes);
        let text = String::from_utf8(bytes).map_err(|error| {
            ExtractPatchError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, error),
            )
        })?;

        tracing::debug!(path = %path.display(), hash = %source_hash, ?access, "target read");
        Ok((
            Self {
                path: path.to_path_buf(),
                file,
                access,
                source_hash,
            },
            text,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    /// Replace the file contents, provided it still hashes to what was read.
    pub fn write(&self, contents: &str) -> Result<(), ExtractPatchError> {
        self.write_with_hook(contents, |_| Ok(()))
    }

    // The temp file lives next to the target so the final rename stays on
    // one filesystem. Dropping it on any early return removes it.
    pub(crate) fn write_with_hook<F>(
        &self,
        contents: &str,
        mut phase_hook: F,
    ) -> Result<(), ExtractPatchError>
    where
        F: FnMut(WritePhase) -> std::io::Result<()>,
    {
        if self.access != Access::ReadWrite {
            return Err(ExtractPatchError::InvalidRequest {
                message: format!("'{}' was opened read-only", self.path.display()),
            });
        }

        let io_error = |error| ExtractPatchError::io(&self.path, error);
        let directory = self.directory();
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.extractpatch-", self.file_name()))
            .tempfile_in(&directory)
            .map_err(|error| ExtractPatchError::io(&directory, error))?;

        temp.write_all(contents.as_bytes()).map_err(io_error)?;
        phase_hook(WritePhase::TempWritten).map_err(io_error)?;

        temp.as_file().sync_all().map_err(io_error)?;
        phase_hook(WritePhase::TempSynced).map_err(io_error)?;

        self.verify_unchanged()?;
        let permissions = self.file.metadata().map_err(io_error)?.permissions();
        temp.as_file().set_permissions(permissions).map_err(io_error)?;

        self.persist(temp)?;
        phase_hook(WritePhase::Persisted).map_err(io_error)?;

        tracing::debug!(path = %self.path.display(), bytes = contents.len(), "target written");
        Ok(())
    }

    fn persist(&self, temp: NamedTempFile) -> Result<(), ExtractPatchError> {
        temp.persist(&self.path)
            .map_err(|error| ExtractPatchError::io(&self.path, error.error))?;

        #[cfg(unix)]
        {
            let directory = self.directory();
            File::open(&directory)
                .and_then(|handle| handle.sync_all())
                .map_err(|error| ExtractPatchError::io(&directory, error))?;
        }
        Ok(())
    }

    fn verify_unchanged(&self) -> Result<(), ExtractPatchError> {
        let current =
            fs::read(&self.path).map_err(|error| ExtractPatchError::io(&self.path, error))?;
        let actual_hash = content_hash(&current);
        if actual_hash != self.source_hash {
            return Err(ExtractPatchError::PreconditionFailed {
                expected_hash: self.source_hash.clone(),
                actual_hash,
            });
        }
        Ok(())
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "target".to_string())
    }
}
