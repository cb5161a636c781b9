//! File system walking

use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Options controlling a directory walk
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Directory names pruned wherever they appear below the root
    pub ignore_dirs: HashSet<String>,
    /// Honour .gitignore, .ignore and global git excludes
    pub respect_gitignore: bool,
}

/// Walk `root` and return every regular file below it.
///
/// Ignored directories are pruned before descent. Entries the walker cannot
/// read (permission errors, broken links) are logged and skipped.
pub fn walk_files(root: &Path, options: &WalkOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let ignore_dirs = options.ignore_dirs.clone();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .ignore(options.respect_gitignore)
        .parents(options.respect_gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ignore_dirs.contains(name)))
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            trace!(path = %entry.path().display(), "Discovered file");
            files.push(entry.into_path());
        }
    }

    files
}

/// Whether any directory component of `path` below `root` is in `ignore_dirs`
pub fn has_ignored_segment(root: &Path, path: &Path, ignore_dirs: &HashSet<String>) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut components: Vec<_> = relative.components().collect();
    // The last component is the file itself
    components.pop();
    components.iter().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| ignore_dirs.contains(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn options(dirs: &[&str]) -> WalkOptions {
        WalkOptions {
            ignore_dirs: dirs.iter().map(|d| d.to_string()).collect(),
            respect_gitignore: false,
        }
    }

    #[test]
    fn test_walk_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("test.py"), "x = 1").unwrap();
        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/nested.js"), "let a;").unwrap();

        let files = walk_files(root, &options(&[]));

        assert!(files.contains(&root.join("test.py")));
        assert!(files.contains(&root.join("subdir/nested.js")));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_walk_prunes_ignored_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::create_dir_all(root.join("src/build")).unwrap();
        fs::write(root.join("src/build/out.js"), "x").unwrap();
        fs::write(root.join("src/app.js"), "x").unwrap();

        let files = walk_files(root, &options(&["node_modules", "build"]));

        assert_eq!(files, vec![root.join("src/app.js")]);
    }

    #[test]
    fn test_walk_ignores_gitignore_by_default() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join(".gitignore"), "skipped.py\n").unwrap();
        fs::write(root.join("skipped.py"), "x = 1").unwrap();

        let files = walk_files(root, &options(&[]));
        assert!(files.contains(&root.join("skipped.py")));

        let files = walk_files(
            root,
            &WalkOptions {
                respect_gitignore: true,
                ..options(&[])
            },
        );
        assert!(!files.contains(&root.join("skipped.py")));
    }

    #[test]
    fn test_has_ignored_segment() {
        let ignore: HashSet<String> = ["venv".to_string()].into_iter().collect();
        let root = Path::new("/project");

        assert!(has_ignored_segment(
            root,
            Path::new("/project/venv/lib/site.py"),
            &ignore
        ));
        assert!(!has_ignored_segment(
            root,
            Path::new("/project/src/venv.py"),
            &ignore
        ));
        // Segments above the root do not count
        assert!(!has_ignored_segment(
            Path::new("/venv/project"),
            Path::new("/venv/project/a.py"),
            &ignore
        ));
    }
}
