// jgrep - core/discovery.rs
//
// Directory discovery (C9, ambient): recursive file enumeration honoring
// include/exclude globs, grounded on the same `walkdir` + `filter_entry`
// short-circuit pattern used elsewhere in this codebase for traversal that
// must never descend into an excluded subtree.

use crate::util::constants::{ABSOLUTE_MAX_FILES, DEFAULT_MAX_DEPTH, DEFAULT_SEARCH_TARGET};
use crate::util::error::DiscoveryError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Mirrors the core's `ScanConfig` as a plain, `Default`-able struct (§3.1).
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub search_target: String,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub recurse: bool,
    pub max_depth: usize,
    pub max_files: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_target: DEFAULT_SEARCH_TARGET.to_string(),
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            recurse: true,
            max_depth: DEFAULT_MAX_DEPTH,
            max_files: ABSOLUTE_MAX_FILES,
        }
    }
}

/// Parse a semicolon-separated glob list (§4.8). An empty string (after
/// trimming) yields no patterns, meaning "no exclusions".
pub fn parse_glob_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn matches_any(patterns: &[String], candidate: &str) -> bool {
    patterns.iter().any(|p| {
        Pattern::new(p)
            .map(|compiled| compiled.matches(candidate))
            .unwrap_or(false)
    })
}

fn dir_excluded(exclude_dirs: &[String], path: &Path) -> bool {
    if exclude_dirs.is_empty() {
        return false;
    }
    path.components().any(|c| {
        let segment = c.as_os_str().to_string_lossy();
        matches_any(exclude_dirs, &segment)
    })
}

fn file_excluded(exclude_files: &[String], file_name: &str) -> bool {
    !exclude_files.is_empty() && matches_any(exclude_files, file_name)
}

/// `discover_files(roots, config) → (Vec<PathBuf>, Vec<String>)` (§4.8).
///
/// The returned `Vec<PathBuf>` preserves `walkdir`'s traversal order. Only a
/// missing or non-directory root, or exceeding `max_files`, is fatal;
/// per-entry I/O errors (permission denied, broken symlink) are collected as
/// warnings.
pub fn discover_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let target = if config.search_target.is_empty() {
        DEFAULT_SEARCH_TARGET.to_string()
    } else {
        config.search_target.clone()
    };
    let target_pattern = Pattern::new(&target).ok();

    let max_depth = if config.recurse { config.max_depth } else { 1 };

    let mut files = Vec::new();
    let mut warnings = Vec::new();

    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && entry.path() != root {
                !dir_excluded(&config.exclude_dirs, entry.path())
            } else {
                true
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warnings.push(format!("{e}"));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if file_excluded(&config.exclude_files, &file_name) {
            continue;
        }
        if let Some(pat) = &target_pattern {
            if !pat.matches(&file_name) {
                continue;
            }
        }

        if files.len() >= config.max_files {
            return Err(DiscoveryError::MaxFilesExceeded {
                max: config.max_files,
            });
        }
        files.push(entry.into_path());
    }

    Ok((files, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_files(&missing, &DiscoveryConfig::default()).unwrap_err();
        matches!(err, DiscoveryError::RootNotFound { .. });
    }

    #[test]
    fn recursive_discovery_finds_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"b").unwrap();

        let (files, warnings) = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn excluded_directory_is_never_descended() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/x.txt"), b"x").unwrap();
        fs::write(dir.path().join("keep.txt"), b"k").unwrap();

        let config = DiscoveryConfig {
            exclude_dirs: vec!["node_modules".to_string()],
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.txt"));
    }

    #[test]
    fn search_target_glob_filters_by_filename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.log"), b"a").unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();

        let config = DiscoveryConfig {
            search_target: "*.log".to_string(),
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.log"));
    }

    #[test]
    fn max_files_exceeded_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("{i}.txt")), b"x").unwrap();
        }
        let config = DiscoveryConfig {
            max_files: 2,
            ..Default::default()
        };
        let err = discover_files(dir.path(), &config).unwrap_err();
        matches!(err, DiscoveryError::MaxFilesExceeded { .. });
    }

    #[test]
    fn parse_glob_list_trims_and_drops_empty() {
        assert_eq!(
            parse_glob_list(" *.tmp ; node_modules ;; "),
            vec!["*.tmp".to_string(), "node_modules".to_string()]
        );
        assert!(parse_glob_list("  ").is_empty());
    }
}
