//! Closest-match hints for missing referenced files

use std::path::{Path, PathBuf};

/// Find the sibling of `missing` whose file name is closest to its name.
///
/// Returns `None` if the parent directory does not exist or nothing is
/// within `max(2, len / 3)` edits.
pub fn closest_match(missing: &Path) -> Option<PathBuf> {
    let parent = missing.parent()?;
    let target = missing.file_name()?.to_str()?;
    let threshold = (target.chars().count() / 3).max(2);

    let mut candidates: Vec<(usize, PathBuf)> = std::fs::read_dir(parent)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            let distance = levenshtein(target, &name);
            (distance <= threshold).then(|| (distance, entry.path()))
        })
        .collect();

    // read_dir order is unspecified
    candidates.sort();
    candidates.into_iter().next().map(|(_, path)| path)
}

/// Message suffix for a missing file, empty if there is no close sibling
pub fn suggestion_suffix(missing: &Path) -> String {
    closest_match(missing)
        .map(|path| format!(" (closest match: {})", path.display()))
        .unwrap_or_default()
}

/// Edit distance between two strings (insert, delete, substitute)
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            current[j + 1] = (previous[j] + cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("params.yaml", "param.yaml"), 1);
    }

    #[test]
    fn test_closest_match() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("robot_params.yaml"), "a: 1").unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), "").unwrap();

        let missing = dir.path().join("robot_param.yaml");
        assert_eq!(
            closest_match(&missing),
            Some(dir.path().join("robot_params.yaml"))
        );
        assert!(suggestion_suffix(&missing).starts_with(" (closest match: "));

        assert!(closest_match(&dir.path().join("zzzzzzzzzzzz.yaml")).is_none());
        assert_eq!(suggestion_suffix(&dir.path().join("nope/x.yaml")), "");
    }
}
