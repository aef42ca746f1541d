//! Content-root discovery for stagehand workspaces.
//!
//! Walks a workspace directory tree depth-first looking for directories
//! whose immediate listing contains the marker file (by default
//! `_deconst.json`). Hidden directories and reserved build-output
//! directories are pruned *before* descent, so excluded subtrees are never
//! visited. A directory read error drops that directory and continues with
//! its siblings; it never aborts the walk.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use stagehand_shared::{ContentRoot, Result, StagehandError};

/// Options controlling a discovery walk.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// File name that designates a directory as a content root.
    pub marker_file: String,
    /// Directory names excluded from traversal before descent.
    pub reserved_dirs: Vec<String>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            marker_file: "_deconst.json".into(),
            reserved_dirs: vec![
                "_build".into(),
                "_site".into(),
                "_deconst".into(),
                "node_modules".into(),
            ],
        }
    }
}

impl DiscoverOptions {
    /// Whether a directory with this name may be descended into.
    fn is_traversable(&self, name: &str) -> bool {
        !name.starts_with('.') && !self.reserved_dirs.iter().any(|r| r == name)
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Pull-based depth-first walker over a workspace tree.
///
/// The caller drives the walk by iterating; each item is the next
/// [`ContentRoot`] in deterministic visitation order (directory entries are
/// visited in name order). Symbolic links are never followed. Nested roots
/// are legal: descent continues through a discovered root, with the same
/// pruning rules applied inside it.
pub struct Walker {
    workspace: PathBuf,
    options: DiscoverOptions,
    /// Workspace-relative directories still to examine, front = next.
    pending: VecDeque<PathBuf>,
}

impl Walker {
    /// Start a walk rooted at `workspace`.
    pub fn new(workspace: impl Into<PathBuf>, options: DiscoverOptions) -> Self {
        let mut pending = VecDeque::new();
        pending.push_front(PathBuf::new());
        Self {
            workspace: workspace.into(),
            options,
            pending,
        }
    }

    /// Examine one directory: detect the marker, queue traversable
    /// subdirectories in front (depth-first), and report whether this
    /// directory is a content root.
    fn visit(&mut self, relative: &Path) -> Result<bool> {
        let absolute = self.workspace.join(relative);

        let entries = std::fs::read_dir(&absolute).map_err(|e| StagehandError::Traversal {
            path: absolute.clone(),
            source: e,
        })?;

        let mut is_root = false;
        let mut subdirs: Vec<PathBuf> = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StagehandError::Traversal {
                path: absolute.clone(),
                source: e,
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy().into_owned();

            // file_type() does not follow symlinks, so a symlinked
            // directory is neither descended into nor treated as a root.
            let file_type = entry.file_type().map_err(|e| StagehandError::Traversal {
                path: entry.path(),
                source: e,
            })?;

            if file_type.is_file() && name_str == self.options.marker_file {
                is_root = true;
            } else if file_type.is_dir() && self.options.is_traversable(&name_str) {
                subdirs.push(relative.join(&name));
            }
        }

        // Sorted, pushed in reverse so the front of the deque pops the
        // lexicographically first child: deterministic depth-first order.
        subdirs.sort();
        for dir in subdirs.into_iter().rev() {
            self.pending.push_front(dir);
        }

        Ok(is_root)
    }
}

impl Iterator for Walker {
    type Item = ContentRoot;

    fn next(&mut self) -> Option<ContentRoot> {
        while let Some(relative) = self.pending.pop_front() {
            match self.visit(&relative) {
                Ok(true) => {
                    debug!(root = %relative.display(), "content root discovered");
                    return Some(ContentRoot::new(relative));
                }
                Ok(false) => {}
                Err(e) => {
                    // Continue with siblings; a bad directory never aborts
                    // the remainder of the walk.
                    warn!(error = %e, "skipping unreadable directory");
                }
            }
        }
        None
    }
}

/// Drive a full walk and collect every content root in visitation order.
///
/// Zero roots is a legitimate outcome ("nothing discovered"), reported to
/// the caller as an empty vector, never as an error.
pub fn discover(workspace: &Path, options: &DiscoverOptions) -> Vec<ContentRoot> {
    let roots: Vec<ContentRoot> = Walker::new(workspace, options.clone()).collect();
    if roots.is_empty() {
        debug!(workspace = %workspace.display(), "no content roots discovered");
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"{}").unwrap();
    }

    fn keys(roots: &[ContentRoot]) -> Vec<String> {
        roots.iter().map(|r| r.as_key()).collect()
    }

    #[test]
    fn finds_marked_directories() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("docs/_deconst.json"));
        touch(&tmp.path().join("api/_deconst.json"));
        touch(&tmp.path().join("src/main.c"));

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert_eq!(keys(&roots), vec!["api", "docs"]);
    }

    #[test]
    fn workspace_root_itself_can_be_a_content_root() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("_deconst.json"));

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert_eq!(keys(&roots), vec!["."]);
    }

    #[test]
    fn hidden_and_reserved_directories_are_never_visited() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join(".git/_deconst.json"));
        touch(&tmp.path().join(".hidden/_deconst.json"));
        touch(&tmp.path().join("_build/_deconst.json"));
        touch(&tmp.path().join("_site/_deconst.json"));
        touch(&tmp.path().join("docs/_deconst.json"));

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert_eq!(keys(&roots), vec!["docs"]);
    }

    #[test]
    fn pruning_applies_before_descent_not_after() {
        let tmp = tempfile::tempdir().unwrap();
        // A marked directory nested under a reserved one must stay invisible.
        touch(&tmp.path().join("_build/deep/nested/_deconst.json"));

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert!(roots.is_empty());
    }

    #[test]
    fn nested_roots_are_discovered() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("docs/_deconst.json"));
        touch(&tmp.path().join("docs/reference/_deconst.json"));

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert_eq!(keys(&roots), vec!["docs", "docs/reference"]);
    }

    #[test]
    fn marker_must_be_a_file_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("docs/_deconst.json")).unwrap();

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert!(roots.is_empty());
    }

    #[test]
    fn empty_workspace_discovers_nothing_without_error() {
        let tmp = tempfile::tempdir().unwrap();
        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert!(roots.is_empty());
    }

    #[test]
    fn order_is_deterministic_depth_first() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("zeta/_deconst.json"));
        touch(&tmp.path().join("alpha/_deconst.json"));
        touch(&tmp.path().join("alpha/inner/_deconst.json"));
        touch(&tmp.path().join("mid/_deconst.json"));

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert_eq!(
            keys(&roots),
            vec!["alpha", "alpha/inner", "mid", "zeta"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_does_not_abort_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("docs/_deconst.json"));
        let locked = tmp.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let roots = discover(tmp.path(), &DiscoverOptions::default());

        // Restore so the tempdir can be cleaned up.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(keys(&roots), vec!["docs"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("real/_deconst.json"));
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("linked")).unwrap();

        let roots = discover(tmp.path(), &DiscoverOptions::default());
        assert_eq!(keys(&roots), vec!["real"]);
    }
}
