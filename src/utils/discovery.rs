//! Discovery of sbt build files below a project root.
//!
//! Paths are matched relative to the root with `/` separators, so the same
//! patterns work on every platform. Symlinks are not followed.

use crate::config::DiscoveryConfig;
use crate::core::ExtractError;
use anyhow::Result;
use glob::{MatchOptions, Pattern};
use std::path::Path;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled include patterns and excluded directory names.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: Vec<Pattern>,
    exclude_dirs: Vec<String>,
}

impl FileMatcher {
    /// Compile the patterns of a discovery configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidPattern`] for a pattern that does not
    /// compile.
    pub fn new(config: &DiscoveryConfig) -> Result<Self, ExtractError> {
        let include = config
            .include
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ExtractError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            include,
            exclude_dirs: config.exclude_dirs.clone(),
        })
    }

    /// Whether a `/`-separated relative path is a build file.
    #[must_use]
    pub fn matches(&self, relative: &str) -> bool {
        self.include.iter().any(|pattern| pattern.matches_with(relative, MATCH_OPTIONS))
    }

    fn skips_dir(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || self.exclude_dirs.iter().any(|excluded| *excluded == name)
    }
}

/// List the build files below `root`, sorted, as `/`-separated relative paths.
///
/// Hidden directories and the configured excluded directories are skipped.
///
/// # Errors
///
/// Returns an error if `root` is not a directory or a pattern is invalid.
pub fn discover_package_files(root: &Path, config: &DiscoveryConfig) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(ExtractError::DirectoryNotFound {
            path: root.display().to_string(),
        }
        .into());
    }

    let matcher = FileMatcher::new(config)?;
    debug!("Discovering build files in {}", root.display());

    let mut files = Vec::new();
    let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| !matcher.skips_dir(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                trace!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");

        trace!("Checking path: {}", relative);
        if matcher.matches(&relative) {
            files.push(relative);
        }
    }

    files.sort();
    debug!("Found {} build files", files.len());
    Ok(files)
}
