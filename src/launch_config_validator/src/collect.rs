//! Candidate file enumeration

use crate::error::Result;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Directory names (substring match) whose YAML files are candidates
const CANDIDATE_SEGMENTS: &[&str] = &["launch", "config", "configs", "test"];

/// Expand `paths` into candidate YAML files, sorted and deduplicated.
///
/// Directories are searched recursively for `*.yaml` / `*.yml`. Both
/// searched and explicitly named files are kept only if some directory
/// above them names a launch, config or test directory.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                let candidate = entry.path();
                if entry.file_type().is_file()
                    && has_yaml_extension(candidate)
                    && in_candidate_dir(candidate)
                {
                    files.push(candidate.to_path_buf());
                }
            }
        } else if path.is_file() {
            if in_candidate_dir(path) {
                files.push(path.clone());
            } else {
                log::debug!("Skipping {} (not under a launch/config/test directory)", path.display());
            }
        } else {
            log::warn!("No such file or directory: {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    log::debug!("Collected {} candidate files", files.len());
    Ok(files)
}

fn has_yaml_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Some parent directory name contains a candidate segment
pub fn in_candidate_dir(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    parent.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| CANDIDATE_SEGMENTS.iter().any(|seg| name.contains(seg))),
        _ => false,
    })
}
