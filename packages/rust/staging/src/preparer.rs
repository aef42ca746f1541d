//! Per-root content preparation.
//!
//! The orchestration core does not decide *how* a root is prepared, only
//! that every discovered root is prepared exactly once. [`Preparer`] is the
//! seam; [`CommandPreparer`] is the bundled implementation that delegates
//! to an external preparer command run inside the content root.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument};

use stagehand_shared::{
    ContentRoot, PrepareOutcome, Result, RevisionId, StagehandError, TransientApiKey,
};

/// Stdout line prefix a preparer command uses to report the content ID it
/// submitted under. Exit 0 without this line means the root was prepared
/// but nothing needed submitting.
const CONTENT_ID_LINE: &str = "content-id-base:";

/// Everything a preparer invocation needs beyond the root itself.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    /// Build-scoped revision identifier.
    pub revision_id: RevisionId,
    /// Content service the prepared content is submitted to.
    pub content_service_url: String,
    /// Transient credential for this build, passed through as an opaque token.
    pub content_service_api_key: TransientApiKey,
    /// Workspace the content roots are relative to.
    pub workspace: PathBuf,
}

/// Prepares a single content root and submits its content.
pub trait Preparer {
    /// Prepare `root`, returning what happened. An `Err` means the root
    /// failed; the aggregator records it and continues with other roots.
    fn prepare(
        &self,
        root: &ContentRoot,
        opts: &PrepareOptions,
    ) -> impl Future<Output = Result<PrepareOutcome>> + Send;
}

// ---------------------------------------------------------------------------
// CommandPreparer
// ---------------------------------------------------------------------------

/// Runs a configured preparer command with the content root as its working
/// directory. The revision, service URL, and credential are passed through
/// the environment; the command reports the submitted content ID on stdout.
#[derive(Debug, Clone)]
pub struct CommandPreparer {
    command: String,
}

impl CommandPreparer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Preparer for CommandPreparer {
    #[instrument(skip(self, opts), fields(root = %root))]
    async fn prepare(&self, root: &ContentRoot, opts: &PrepareOptions) -> Result<PrepareOutcome> {
        let cwd = root.absolute_under(&opts.workspace);

        debug!(command = %self.command, cwd = %cwd.display(), "spawning preparer");

        let output = Command::new(&self.command)
            .current_dir(&cwd)
            .env("CONTENT_SERVICE_URL", &opts.content_service_url)
            .env("CONTENT_SERVICE_APIKEY", opts.content_service_api_key.expose())
            .env("REVISION_ID", opts.revision_id.as_str())
            .env("CONTENT_ROOT", root.as_key())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                StagehandError::preparation(root.as_key(), format!("failed to spawn preparer: {e}"))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(StagehandError::preparation(
                root.as_key(),
                format!(
                    "preparer exited with {}\nstdout: {}\nstderr: {}",
                    output.status,
                    stdout.trim(),
                    stderr.trim()
                ),
            ));
        }

        // The last content-id-base line wins if the command prints several.
        let content_id_base = stdout
            .lines()
            .filter_map(|line| line.strip_prefix(CONTENT_ID_LINE))
            .map(|id| id.trim().to_string())
            .next_back();

        let did_something = content_id_base.is_some();
        debug!(did_something, ?content_id_base, "preparer finished");

        Ok(PrepareOutcome {
            success: true,
            did_something,
            content_id_base,
        })
    }
}
