//! Request-scoped staging for encoded artifacts.
//!
//! A [`Workspace`] holds files between encoding and upload. It is removed when
//! [`Workspace::release`] is called or, on early-exit paths, when it is dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;

use crate::foundation::error::{AvatarError, AvatarResult};

/// Staging area owned by one request.
pub trait Workspace: Send {
    /// Store `bytes` as `file_name`, replacing any previous content.
    fn write(&mut self, file_name: &str, bytes: &[u8]) -> AvatarResult<()>;

    /// Read back a staged file.
    fn read(&self, file_name: &str) -> AvatarResult<Vec<u8>>;

    /// Remove everything staged, reporting failures.
    fn release(self: Box<Self>) -> AvatarResult<()>;
}

/// Hands out workspaces keyed by a per-request value.
pub trait WorkspaceProvider: Send + Sync {
    /// Acquire a fresh workspace for `key`.
    fn acquire(&self, key: &str) -> AvatarResult<Box<dyn Workspace>>;
}

fn check_file_name(file_name: &str) -> AvatarResult<()> {
    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\'])
    {
        return Err(AvatarError::resource(format!(
            "invalid staged file name '{file_name}'"
        )));
    }
    Ok(())
}

/// Filesystem workspaces created as unique directories under `root`.
#[derive(Clone, Debug)]
pub struct DirWorkspaces {
    root: PathBuf,
}

impl DirWorkspaces {
    /// Stage under `root`, creating it on first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Stage under the system temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("layerpin"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl WorkspaceProvider for DirWorkspaces {
    fn acquire(&self, key: &str) -> AvatarResult<Box<dyn Workspace>> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create staging root '{}'", self.root.display()))
            .map_err(|e| AvatarError::resource(format!("{e:#}")))?;

        // Suffix keeps concurrent requests for the same identity apart.
        let dir = tempfile::Builder::new()
            .prefix(&format!("{key}-"))
            .tempdir_in(&self.root)
            .map_err(|e| AvatarError::resource(format!("create workspace for '{key}': {e}")))?;
        tracing::debug!(path = %dir.path().display(), "acquired workspace");
        Ok(Box::new(DirWorkspace { dir }))
    }
}

/// One staging directory. Dropping it removes the directory.
#[derive(Debug)]
pub struct DirWorkspace {
    dir: tempfile::TempDir,
}

impl DirWorkspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Workspace for DirWorkspace {
    fn write(&mut self, file_name: &str, bytes: &[u8]) -> AvatarResult<()> {
        check_file_name(file_name)?;
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, bytes)
            .map_err(|e| AvatarError::resource(format!("write '{}': {e}", path.display())))
    }

    fn read(&self, file_name: &str) -> AvatarResult<Vec<u8>> {
        check_file_name(file_name)?;
        let path = self.dir.path().join(file_name);
        std::fs::read(&path)
            .map_err(|e| AvatarError::resource(format!("read '{}': {e}", path.display())))
    }

    fn release(self: Box<Self>) -> AvatarResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| AvatarError::resource(format!("remove '{}': {e}", path.display())))
    }
}

/// In-memory workspaces. Nothing touches the filesystem.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkspaces {
    live: Arc<AtomicUsize>,
}

impl MemoryWorkspaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workspaces acquired and not yet released or dropped.
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl WorkspaceProvider for MemoryWorkspaces {
    fn acquire(&self, _key: &str) -> AvatarResult<Box<dyn Workspace>> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryWorkspace {
            files: BTreeMap::new(),
            live: Arc::clone(&self.live),
        }))
    }
}

#[derive(Debug)]
struct MemoryWorkspace {
    files: BTreeMap<String, Vec<u8>>,
    live: Arc<AtomicUsize>,
}

impl Workspace for MemoryWorkspace {
    fn write(&mut self, file_name: &str, bytes: &[u8]) -> AvatarResult<()> {
        check_file_name(file_name)?;
        self.files.insert(file_name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, file_name: &str) -> AvatarResult<Vec<u8>> {
        self.files
            .get(file_name)
            .cloned()
            .ok_or_else(|| AvatarError::resource(format!("'{file_name}' is not staged")))
    }

    fn release(self: Box<Self>) -> AvatarResult<()> {
        Ok(())
    }
}

impl Drop for MemoryWorkspace {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/workspace.rs"]
mod tests;
