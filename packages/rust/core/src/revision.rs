//! Build revision resolution.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument};

use stagehand_shared::{Result, RevisionId, StagehandError};

/// Resolve the build's revision identifier.
///
/// With a `mock` value the identifier is derived synchronously and no
/// subprocess runs, keeping tests and offline builds deterministic.
/// Otherwise the workspace's current short commit hash is obtained from
/// git. Failure here is fatal to the preview pipeline: the transient
/// credential is namespaced by the revision, so no credential can be
/// issued without one.
#[instrument(skip_all, fields(workspace = %workspace.display()))]
pub async fn resolve_revision(workspace: &Path, mock: Option<&str>) -> Result<RevisionId> {
    if let Some(value) = mock {
        let rev = RevisionId::from_sha(value);
        debug!(revision = %rev, "using mocked revision");
        return Ok(rev);
    }

    let output = Command::new("git")
        .arg("rev-parse")
        .arg("--short")
        .arg("HEAD")
        .current_dir(workspace)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| StagehandError::revision(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StagehandError::revision(format!(
            "git rev-parse exited with {}\nstdout: {}\nstderr: {}",
            output.status,
            stdout.trim(),
            stderr.trim()
        )));
    }

    let sha = String::from_utf8_lossy(&output.stdout);
    let rev = RevisionId::from_sha(&sha);
    debug!(revision = %rev, "revision resolved from git");
    Ok(rev)
}
