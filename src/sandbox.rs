// ABOUTME: Capability-based filesystem sandbox backing the file built-ins

use crate::config::FsConfig;
use cap_std::fs::{Dir, OpenOptions};
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Access denied: {0} is not inside a sandbox root")]
    PathNotAllowed(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// File access restricted to a set of root directories, each opened as a
/// capability `Dir`. Reads try every root; writes and appends go to the
/// first.
pub struct Sandbox {
    roots: Vec<Dir>,
    max_file_size: usize,
}

impl Sandbox {
    pub fn new(config: &FsConfig) -> Result<Self, SandboxError> {
        let mut roots = Vec::with_capacity(config.allowed_paths.len());
        for path in &config.allowed_paths {
            std::fs::create_dir_all(path)
                .map_err(|e| SandboxError::Io(format!("Cannot create {}: {e}", path.display())))?;
            let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority())
                .map_err(|e| SandboxError::Io(format!("Cannot open {}: {e}", path.display())))?;
            roots.push(dir);
        }
        Ok(Self {
            roots,
            max_file_size: config.max_file_size,
        })
    }

    pub fn read(&self, path: &str) -> Result<String, SandboxError> {
        self.check_path(path)?;
        let root = self.read_root(path)?;
        root.read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::FileNotFound(path.to_string())
            } else {
                SandboxError::Io(format!("Cannot read {path}: {e}"))
            }
        })
    }

    pub fn write(&self, path: &str, contents: &str) -> Result<(), SandboxError> {
        self.check_path(path)?;
        self.check_size(path, contents.len())?;
        let root = self.write_root(path)?;
        root.write(path, contents)
            .map_err(|e| SandboxError::Io(format!("Cannot write {path}: {e}")))
    }

    pub fn append(&self, path: &str, contents: &str) -> Result<(), SandboxError> {
        self.check_path(path)?;
        let root = self.write_root(path)?;
        let existing = root.metadata(path).map(|m| m.len() as usize).unwrap_or(0);
        self.check_size(path, existing + contents.len())?;
        let mut file = root
            .open_with(path, OpenOptions::new().create(true).append(true))
            .map_err(|e| SandboxError::Io(format!("Cannot open {path}: {e}")))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| SandboxError::Io(format!("Cannot write {path}: {e}")))
    }

    // Dir refuses escapes at the syscall level too; this covers the
    // obvious forms with a uniform error.
    fn check_path(&self, path: &str) -> Result<(), SandboxError> {
        if path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
            return Err(SandboxError::PathNotAllowed(path.to_string()));
        }
        Ok(())
    }

    fn check_size(&self, path: &str, total: usize) -> Result<(), SandboxError> {
        if total > self.max_file_size {
            return Err(SandboxError::FileTooLarge(format!(
                "{path} would be {total} bytes, limit is {} bytes",
                self.max_file_size
            )));
        }
        Ok(())
    }

    fn read_root(&self, path: &str) -> Result<&Dir, SandboxError> {
        for root in &self.roots {
            if root.metadata(path).is_ok() {
                return Ok(root);
            }
        }
        self.roots
            .first()
            .ok_or_else(|| SandboxError::PathNotAllowed(path.to_string()))
    }

    fn write_root(&self, path: &str) -> Result<&Dir, SandboxError> {
        self.roots
            .first()
            .ok_or_else(|| SandboxError::PathNotAllowed(path.to_string()))
    }
}
