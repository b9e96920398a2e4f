//! Two-phase project driver.
//!
//! Phase 1 reads the `project/` directory and the root directory to collect
//! project-wide variables, resolver URLs and the Scala version. Phase 2 then
//! extracts every directory group on its own, with the phase-1 variables as a
//! read-only fallback. Results are grouped by the file a rewrite would edit.

use super::context::FileExtraction;
use super::file::{ParseOptions, extract_file};
use super::types::{FileContent, PackageDependency, PackageFile, VariableTable};
use crate::config::RegistryUrls;
use crate::constants::{PROJECT_CONFIG_DIR, ROOT_GROUP};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// What phase 1 learned about the project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectState {
    /// Variables visible to every group
    pub global_vars: VariableTable,
    /// Registry URLs in discovery order, duplicates included
    pub registry_urls: Vec<String>,
    /// Scala binary version; the root directory wins over `project/`
    pub scala_version: Option<String>,
}

/// Files sharing one directory, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    /// Directory relative to the project root, `.` for the root itself
    pub directory: String,
    /// Member files
    pub files: Vec<FileContent>,
}

/// Directory of a `/`-separated relative path, `.` for top-level files.
#[must_use]
pub fn group_name(package_file: &str) -> &str {
    match package_file.rsplit_once('/') {
        Some(("", _)) | None => ROOT_GROUP,
        Some((directory, _)) => directory,
    }
}

/// Partition files by directory, groups in order of first appearance.
#[must_use]
pub fn group_files(files: Vec<FileContent>) -> Vec<FileGroup> {
    let mut groups: Vec<FileGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for file in files {
        let directory = group_name(&file.package_file).to_string();
        match index.get(&directory) {
            Some(&i) => groups[i].files.push(file),
            None => {
                index.insert(directory.clone(), groups.len());
                groups.push(FileGroup {
                    directory,
                    files: vec![file],
                });
            }
        }
    }
    groups
}

/// Phase 1: collect globals from the `project/` group, then the root group.
///
/// Each file is extracted with the running global table as its local table,
/// so later files overwrite earlier same-named entries.
#[must_use]
pub fn prepare_project_state(groups: &[FileGroup], registries: &RegistryUrls) -> ProjectState {
    let mut state = ProjectState {
        registry_urls: vec![registries.maven_central.clone()],
        ..ProjectState::default()
    };

    let phase_one = [PROJECT_CONFIG_DIR, ROOT_GROUP]
        .into_iter()
        .filter_map(|directory| groups.iter().find(|group| group.directory == directory))
        .flat_map(|group| &group.files);

    for file in phase_one {
        let options = ParseOptions {
            package_file: &file.package_file,
            registries,
            registry_urls: &[],
            local_vars: Arc::new(state.global_vars.clone()),
            global_vars: Arc::default(),
            scala_version: None,
        };
        let Some(result) = extract_file(&file.content, options) else {
            continue;
        };
        state.global_vars.extend(result.local_vars);
        state.registry_urls.extend(result.registry_urls);
        if result.scala_version.is_some() {
            state.scala_version = result.scala_version;
        }
    }

    state
}

/// Phase 2 for one group: thread one local table through the group's files.
fn extract_group(
    group: &FileGroup,
    state: &ProjectState,
    global_vars: &Arc<VariableTable>,
    registries: &RegistryUrls,
) -> Vec<FileExtraction> {
    let mut local_vars: Arc<VariableTable> = Arc::default();
    let mut results = Vec::with_capacity(group.files.len());
    for file in &group.files {
        let options = ParseOptions {
            package_file: &file.package_file,
            registries,
            registry_urls: &state.registry_urls,
            local_vars: Arc::clone(&local_vars),
            global_vars: Arc::clone(global_vars),
            scala_version: state.scala_version.clone(),
        };
        if let Some(mut result) = extract_file(&file.content, options) {
            local_vars = Arc::new(std::mem::take(&mut result.local_vars));
            results.push(result);
        }
    }
    results
}

/// Extract every file of a project whose contents are already in memory.
///
/// Files are grouped by directory in first-appearance order. The result maps
/// each edit-target file to its dependencies, de-duplicated by package name
/// and version. Returns `None` when no file yields a dependency.
#[must_use]
pub fn extract_from_contents(registries: &RegistryUrls, files: Vec<FileContent>) -> Option<Vec<PackageFile>> {
    let groups = group_files(files);
    let state = prepare_project_state(&groups, registries);
    debug!(
        globals = %serde_json::to_string(&state.global_vars).unwrap_or_default(),
        registries = state.registry_urls.len(),
        scala_version = ?state.scala_version,
        "Prepared project state"
    );

    let global_vars = Arc::new(state.global_vars.clone());
    let mut package_files = PackageFileMap::default();
    for group in &groups {
        for result in extract_group(group, &state, &global_vars, registries) {
            for dep in result.deps {
                package_files.insert(&result.package_file, dep);
            }
        }
    }

    let package_files = package_files.finish();
    debug!(files = package_files.len(), "Extracted package files");
    (!package_files.is_empty()).then_some(package_files)
}

/// Dependencies grouped by edit target in first-appearance order.
#[derive(Default)]
struct PackageFileMap {
    files: Vec<PackageFile>,
    index: HashMap<String, usize>,
}

impl PackageFileMap {
    fn insert(&mut self, declaring_file: &str, mut dep: PackageDependency) {
        let edit_file = dep.edit_file.get_or_insert_with(|| declaring_file.to_string()).clone();
        dedup_in_order(&mut dep.registry_urls);

        let slot = match self.index.get(&edit_file) {
            Some(&i) => i,
            None => {
                self.index.insert(edit_file.clone(), self.files.len());
                self.files.push(PackageFile {
                    package_file: edit_file,
                    deps: Vec::new(),
                });
                self.files.len() - 1
            }
        };
        self.files[slot].deps.push(dep);
    }

    fn finish(mut self) -> Vec<PackageFile> {
        for file in &mut self.files {
            let mut seen = HashSet::new();
            file.deps.retain(|dep| seen.insert((dep.package_name.clone(), dep.current_value.clone())));
        }
        self.files
    }
}

fn dedup_in_order(urls: &mut Vec<String>) {
    let mut seen = HashSet::new();
    urls.retain(|url| seen.insert(url.clone()));
}
