//! Error types for stagehand.
//!
//! Library crates use [`StagehandError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all stagehand operations.
#[derive(Debug, thiserror::Error)]
pub enum StagehandError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A single directory could not be read during discovery.
    /// Non-fatal: logged per directory, traversal continues with siblings.
    #[error("traversal error at {path:?}: {source}")]
    Traversal {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A content root failed to prepare. Recorded per root; the remaining
    /// roots still run and the error surfaces only after all were attempted.
    #[error("preparation failed for {root}: {message}")]
    Preparation { root: String, message: String },

    /// The build revision could not be resolved from source control.
    /// Fatal: no credential may be issued without a revision ID.
    #[error("revision resolution failed: {message}")]
    RevisionResolution { message: String },

    /// The content service refused to issue a transient API key.
    /// Fatal, and there is nothing to revoke.
    #[error("credential issuance failed: {0}")]
    CredentialIssuance(String),

    /// An issued key could not be revoked. Fatal and overrides any prior
    /// success: an un-revoked credential fails the build.
    #[error("credential revocation failed: {0}")]
    CredentialRevocation(String),

    /// The staging presenter could not map a content ID to its paths.
    #[error("preview resolution failed: {0}")]
    PreviewResolution(String),

    /// The pull-request URL did not match `.../<owner>/<repo>/pull/<n>`.
    /// Non-fatal: notification is skipped, the pipeline still succeeds.
    #[error("pull request URL not recognized: {url}")]
    PullRequestUrlFormat { url: String },

    /// Posting the preview comment to GitHub failed.
    #[error("comment post failed: {0}")]
    CommentPost(String),

    /// Network/HTTP error talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StagehandError>;

impl StagehandError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a preparation error for a specific content root.
    pub fn preparation(root: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Preparation {
            root: root.into(),
            message: msg.into(),
        }
    }

    /// Create a revision-resolution error from any displayable message.
    pub fn revision(msg: impl Into<String>) -> Self {
        Self::RevisionResolution {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = StagehandError::config("missing admin API key");
        assert_eq!(err.to_string(), "config error: missing admin API key");

        let err = StagehandError::preparation("docs", "preparer exited with status 2");
        assert!(err.to_string().contains("docs"));
        assert!(err.to_string().contains("status 2"));
    }

    #[test]
    fn revocation_error_mentions_revocation() {
        let err = StagehandError::CredentialRevocation("HTTP 500".into());
        assert!(err.to_string().contains("revocation"));
    }
}
