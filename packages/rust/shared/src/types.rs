//! Core domain types for stagehand builds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// ContentRoot
// ---------------------------------------------------------------------------

/// A workspace-relative directory identified as containing publishable
/// content (its listing includes the marker file).
///
/// Identity is the normalized relative path; created during traversal,
/// immutable, discarded once prepared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentRoot {
    relative: PathBuf,
}

impl ContentRoot {
    /// Build a content root from its workspace-relative path.
    pub fn new(relative: impl Into<PathBuf>) -> Self {
        Self {
            relative: relative.into(),
        }
    }

    /// The workspace-relative path of this root.
    pub fn relative_path(&self) -> &Path {
        &self.relative
    }

    /// The root's identity as a display string (forward slashes).
    pub fn as_key(&self) -> String {
        let s = self.relative.to_string_lossy().replace('\\', "/");
        if s.is_empty() { ".".to_string() } else { s }
    }

    /// Absolute location of this root under the given workspace.
    pub fn absolute_under(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.relative)
    }
}

impl std::fmt::Display for ContentRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

// ---------------------------------------------------------------------------
// PrepareOutcome
// ---------------------------------------------------------------------------

/// Result of preparing one content root, produced once by the preparer and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareOutcome {
    /// Whether preparation completed without error.
    pub success: bool,
    /// Whether anything was actually submitted to the content service.
    pub did_something: bool,
    /// The content ID base assigned to the submitted content, if any.
    pub content_id_base: Option<String>,
}

// ---------------------------------------------------------------------------
// AggregateResult
// ---------------------------------------------------------------------------

/// The folded outcome of preparing every discovered content root.
///
/// Invariant: `content_id_map` has an entry for a root iff that root's
/// [`PrepareOutcome`] had `did_something = true`. `all_successful` is the
/// AND of every outcome's success; aggregation is fail-soft, so a failure
/// never stops the remaining roots from being attempted.
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    /// Whether any root was discovered and attempted.
    pub did_something: bool,
    /// Whether at least one root submitted content.
    pub submitted_something: bool,
    /// Content ID base per root key, for roots that submitted.
    pub content_id_map: BTreeMap<String, String>,
    /// AND of every per-root success seen so far.
    pub all_successful: bool,
    /// Per-root failures, in discovery order: (root key, message).
    pub errors: Vec<(String, String)>,
}

impl AggregateResult {
    /// An aggregate for a build that has not yet seen any root.
    pub fn empty() -> Self {
        Self {
            all_successful: true,
            ..Self::default()
        }
    }

    /// The first recorded failure, surfaced only after every root ran.
    pub fn first_error(&self) -> Option<&(String, String)> {
        self.errors.first()
    }
}

// ---------------------------------------------------------------------------
// RevisionId
// ---------------------------------------------------------------------------

/// A build-scoped identifier of the form `build-<short-sha>`, used to
/// namespace staged content and the transient credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    /// Derive a revision ID from a short commit hash (or mock value).
    pub fn from_sha(sha: &str) -> Self {
        Self(format!("build-{}", sha.trim()))
    }

    /// The full `build-<sha>` identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TransientApiKey
// ---------------------------------------------------------------------------

/// A short-lived content-service credential scoped to one revision.
///
/// Issued before preparation, passed to each preparer invocation as an
/// opaque token, and revoked exactly once afterwards. The Debug impl
/// redacts the key material so it never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TransientApiKey(String);

impl TransientApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the Authorization header and preparer env only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for TransientApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransientApiKey(****)")
    }
}

// ---------------------------------------------------------------------------
// PresentedUrlMap
// ---------------------------------------------------------------------------

/// Public preview URLs per root key. A root may map to zero, one, or many
/// URLs. The map is only produced when a presenter is configured and
/// something was submitted; otherwise the pipeline carries `None`, a
/// distinct "unavailable" state rather than an empty map.
pub type PresentedUrlMap = BTreeMap<String, Vec<Url>>;

// ---------------------------------------------------------------------------
// PullRequestOutcome
// ---------------------------------------------------------------------------

/// Externally visible result of the whole preview pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestOutcome {
    /// Whether any content root was discovered and prepared.
    pub did_something: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_root_key_uses_forward_slashes() {
        let root = ContentRoot::new(PathBuf::from("docs").join("guides"));
        assert_eq!(root.as_key(), "docs/guides");
    }

    #[test]
    fn content_root_at_workspace_top_is_dot() {
        let root = ContentRoot::new("");
        assert_eq!(root.as_key(), ".");
    }

    #[test]
    fn revision_id_format() {
        let rev = RevisionId::from_sha("abc123\n");
        assert_eq!(rev.as_str(), "build-abc123");
        assert_eq!(rev.to_string(), "build-abc123");
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = TransientApiKey::new("s3cret");
        assert_eq!(format!("{key:?}"), "TransientApiKey(****)");
        assert_eq!(key.expose(), "s3cret");
    }

    #[test]
    fn empty_aggregate_is_successful_and_did_nothing() {
        let agg = AggregateResult::empty();
        assert!(agg.all_successful);
        assert!(!agg.did_something);
        assert!(!agg.submitted_something);
        assert!(agg.first_error().is_none());
    }
}
