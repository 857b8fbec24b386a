//! Document output.
//!
//! The generator hands the finished document to an [`OutputWriter`] exactly
//! once per successful generation. [`FsWriter`] writes beneath an output
//! directory with the following guarantees:
//!
//! - **Path validation**: the target is cleaned and must stay inside the
//!   output directory; `..` escapes and null bytes are rejected.
//! - **Atomic replace**: content goes to a uniquely named sibling temporary
//!   file which is then renamed over the target, so readers see either the
//!   old or the new document and overlapping writes never share a temporary.
//! - **Directory creation**: missing parent directories are created.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use path_clean::PathClean;
use tracing::debug;

use crate::error::{Result, WebIndexError};

/// Destination for generated documents
#[async_trait]
pub trait OutputWriter: Send + Sync {
    /// Create or replace the file at `path` with `content`
    async fn write(&self, path: &Path, content: &str) -> Result<()>;
}

#[async_trait]
impl<T: OutputWriter + ?Sized> OutputWriter for Arc<T> {
    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        (**self).write(path, content).await
    }
}

/// Writes documents beneath an output directory
#[derive(Debug, Clone)]
pub struct FsWriter {
    out_dir: PathBuf,
}

impl FsWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into().clean(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Resolve `path` inside the output directory
    pub fn target(&self, path: &Path) -> Result<PathBuf> {
        let dir = normalize_dir(&self.out_dir)?;
        validate_output_path(&dir, path)
    }
}

#[async_trait]
impl OutputWriter for FsWriter {
    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        let target = self.target(path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WebIndexError::write(parent, e))?;
        }

        let dest = target.clone();
        let content_owned = content.to_owned();
        tokio::task::spawn_blocking(move || replace_file(&dest, &content_owned))
            .await
            .map_err(|e| WebIndexError::write(&target, std::io::Error::other(e)))??;

        debug!(path = %target.display(), bytes = content.len(), "wrote document");
        Ok(())
    }
}

fn normalize_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.clean());
    }
    let cwd = std::env::current_dir().map_err(|e| {
        WebIndexError::InvalidOutputPath(format!("failed to get current directory: {}", e))
    })?;
    Ok(cwd.join(dir).clean())
}

fn validate_output_path(base_dir: &Path, path: &Path) -> Result<PathBuf> {
    let display = path.to_string_lossy();
    if display.contains('\0') {
        return Err(WebIndexError::InvalidOutputPath(
            "path contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(path.clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(WebIndexError::InvalidOutputPath(format!(
            "'{}' escapes output directory '{}' (resolved to '{}')",
            display,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

/// Write `content` to a fresh temporary file next to `target` and rename it
/// into place. The temporary file is removed if any step fails.
fn replace_file(target: &Path, content: &str) -> Result<()> {
    let dir = target.parent().unwrap_or(Path::new("."));
    let prefix = format!(
        ".{}.",
        target.file_name().unwrap_or_default().to_string_lossy()
    );

    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| WebIndexError::write(dir, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| WebIndexError::write(temp.path(), e))?;
    temp.persist(target)
        .map_err(|e| WebIndexError::write(target, e.error))?;
    Ok(())
}

/// Keeps written documents in memory
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: Mutex<IndexMap<PathBuf, String>>,
    writes: Mutex<usize>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content at `path`
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// Total number of successful writes
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl OutputWriter for MemoryWriter {
    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.files
            .lock()
            .insert(path.to_path_buf(), content.to_string());
        *self.writes.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_path_normal() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, Path::new("index.html")).unwrap();
        assert_eq!(result, Path::new("/tmp/output/index.html"));
    }

    #[test]
    fn test_validate_output_path_nested() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, Path::new("app/./index.html")).unwrap();
        assert_eq!(result, Path::new("/tmp/output/app/index.html"));
    }

    #[test]
    fn test_validate_output_path_traversal() {
        let base = Path::new("/tmp/output");
        assert!(validate_output_path(base, Path::new("../index.html")).is_err());
        assert!(validate_output_path(base, Path::new("a/../../index.html")).is_err());
        assert!(validate_output_path(base, Path::new("/etc/index.html")).is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_directory_itself() {
        let base = Path::new("/tmp/output");
        assert!(validate_output_path(base, Path::new(".")).is_err());
    }

    #[test]
    fn test_relative_out_dir_is_anchored() {
        let writer = FsWriter::new(".");
        let target = writer.target(Path::new("index.html")).unwrap();
        assert!(target.is_absolute());
        assert!(target.ends_with("index.html"));
    }

    #[tokio::test]
    async fn test_fs_writer_creates_and_replaces() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = FsWriter::new(dir.path());

        writer
            .write(Path::new("nested/index.html"), "one")
            .await
            .unwrap();
        writer
            .write(Path::new("nested/index.html"), "two")
            .await
            .unwrap();

        let target = dir.path().join("nested/index.html");
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "two");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("index.html")]);
    }

    #[tokio::test]
    async fn test_fs_writer_overlapping_writes() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = Arc::new(FsWriter::new(dir.path()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let writer = writer.clone();
                tokio::spawn(async move {
                    writer
                        .write(Path::new("index.html"), &format!("doc {i}"))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(html.starts_with("doc "));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_memory_writer_records_writes() {
        let writer = MemoryWriter::new();
        writer.write(Path::new("index.html"), "a").await.unwrap();
        writer.write(Path::new("index.html"), "b").await.unwrap();
        assert_eq!(writer.get("index.html").as_deref(), Some("b"));
        assert_eq!(writer.write_count(), 2);
        assert_eq!(writer.paths(), vec![PathBuf::from("index.html")]);
    }
}
