//! Filesystem helpers: year-pattern enumeration, tolerant removal, atomic writes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use nbdeploy_shared::{NbDeployError, Result};

/// List the non-directory entries directly inside `dir` whose names match
/// `file_pattern`, sorted by path.
///
/// `dir` is taken literally; only `file_pattern` is interpreted as a glob.
/// Wildcards never match a leading `.`, so hidden entries are skipped.
/// Symlinks are kept even when dangling; only directories are dropped.
/// A missing directory yields an empty list.
pub fn matching_files(dir: &Path, file_pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = PathBuf::from(Pattern::escape(&dir.to_string_lossy())).join(file_pattern);
    let pattern = pattern.to_string_lossy();

    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob::glob_with(&pattern, options)
        .map_err(|e| NbDeployError::pattern(pattern.to_string(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            NbDeployError::io(path, e.into_error())
        })?;
        match std::fs::symlink_metadata(&path) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => files.push(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(NbDeployError::io(&path, e)),
        }
    }
    files.sort();

    debug!(%pattern, count = files.len(), "enumerated files");
    Ok(files)
}

/// Remove each file, tolerating files that vanished since enumeration.
///
/// Returns the paths actually removed. Any other failure aborts.
pub fn remove_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::with_capacity(paths.len());

    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed");
                removed.push(path.clone());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "already gone");
            }
            Err(e) => return Err(NbDeployError::io(path, e)),
        }
    }

    Ok(removed)
}

/// Write `content` to `path` via a sibling temp file and a rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| NbDeployError::io(&parent, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| NbDeployError::config(format!("not a file path: {}", path.display())))?;
    let temp = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&temp, content).map_err(|e| NbDeployError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| NbDeployError::io(path, e))?;

    debug!(path = %path.display(), size = content.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nbd-files-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn matches_only_the_year_prefix() {
        let dir = temp_dir();
        touch(&dir.join("2022-talk.html"));
        touch(&dir.join("2022-intro.html"));
        touch(&dir.join("2021-talk.html"));
        touch(&dir.join("2022-talk.ipynb"));
        touch(&dir.join("x2022-talk.html"));

        let found = matching_files(&dir, "2022-*.html").unwrap();
        assert_eq!(
            found,
            vec![dir.join("2022-intro.html"), dir.join("2022-talk.html")]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn skips_directories() {
        let dir = temp_dir();
        std::fs::create_dir_all(dir.join("2022-assets.html")).unwrap();
        touch(&dir.join("2022-post.html"));

        let found = matching_files(&dir, "2022-*.html").unwrap();
        assert_eq!(found, vec![dir.join("2022-post.html")]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn skips_hidden_entries() {
        let dir = temp_dir();
        touch(&dir.join("2022-post.html"));
        std::fs::create_dir_all(dir.join(".cache")).unwrap();
        touch(&dir.join(".cache/2022-x.html"));
        std::fs::create_dir_all(dir.join("2022")).unwrap();
        touch(&dir.join("2022/.draft.html"));
        touch(&dir.join("2022/2022-a.html"));

        let found = matching_files(&dir, "*/*.html").unwrap();
        assert_eq!(found, vec![dir.join("2022/2022-a.html")]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_are_matched_and_removed() {
        let dir = temp_dir();
        let link = dir.join("2022-old.html");
        std::os::unix::fs::symlink(dir.join("gone"), &link).unwrap();

        let found = matching_files(&dir, "2022-*.html").unwrap();
        assert_eq!(found, vec![link.clone()]);

        let removed = remove_files(&found).unwrap();
        assert_eq!(removed, vec![link.clone()]);
        assert!(std::fs::symlink_metadata(&link).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_directory_matches_nothing() {
        let dir = temp_dir().join("does-not-exist");
        assert!(matching_files(&dir, "2022-*.html").unwrap().is_empty());
    }

    #[test]
    fn directory_with_glob_characters_is_literal() {
        let root = temp_dir();
        let dir = root.join("posts[draft]");
        std::fs::create_dir_all(&dir).unwrap();
        touch(&dir.join("2022-a.html"));

        let found = matching_files(&dir, "2022-*.html").unwrap();
        assert_eq!(found, vec![dir.join("2022-a.html")]);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn remove_tolerates_missing_files() {
        let dir = temp_dir();
        let present = dir.join("2022-a.html");
        touch(&present);
        let missing = dir.join("2022-b.html");

        let removed = remove_files(&[present.clone(), missing]).unwrap();
        assert_eq!(removed, vec![present.clone()]);
        assert!(!present.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn write_atomic_overwrites_and_leaves_no_temp() {
        let dir = temp_dir();
        let target = dir.join("toc.html");
        write_atomic(&target, "first").unwrap();
        write_atomic(&target, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
        assert!(!dir.join(".toc.html.tmp").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
