//! File content acquisition and the async batch entry point.

use super::project::extract_from_contents;
use super::types::{FileContent, PackageFile};
use crate::config::ExtractConfig;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use tracing::trace;

/// Source of build file contents.
///
/// `None` means the file could not be read; the file is skipped.
pub trait FileReader: Sync {
    /// Read `package_file`, a `/`-separated path relative to the project root.
    fn read(&self, package_file: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Reads files below a project root on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileReader {
    root: PathBuf,
}

impl LocalFileReader {
    /// Reader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }
}

impl FileReader for LocalFileReader {
    fn read(&self, package_file: &str) -> impl Future<Output = Option<String>> + Send {
        let path = self.root.join(package_file);
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => Some(content),
                Err(e) => {
                    trace!("Failed to read {}: {}", path.display(), e);
                    None
                }
            }
        }
    }
}

/// In-memory contents keyed by relative path.
impl FileReader for HashMap<String, String> {
    fn read(&self, package_file: &str) -> impl Future<Output = Option<String>> + Send {
        let content = self.get(package_file).cloned();
        async move { content }
    }
}

/// Read and extract every file of a project.
///
/// Reads run concurrently up to `max_concurrent_reads` but results keep the
/// order of `package_files`. Missing and empty files are skipped. Returns
/// `None` when nothing was found.
pub async fn extract_all_package_files<R: FileReader>(
    config: &ExtractConfig,
    package_files: &[String],
    reader: &R,
) -> Option<Vec<PackageFile>> {
    let contents: Vec<Option<String>> = stream::iter(package_files)
        .map(|package_file| reader.read(package_file))
        .buffered(config.max_concurrent_reads.max(1))
        .collect()
        .await;

    let mut files = Vec::with_capacity(package_files.len());
    for (package_file, content) in package_files.iter().zip(contents) {
        match content {
            Some(content) if !content.is_empty() => files.push(FileContent::new(package_file.clone(), content)),
            _ => trace!(package_file = %package_file, "packageFile has no content"),
        }
    }

    extract_from_contents(&config.registry_urls, files)
}
