//! End-to-end build pipelines: workspace preparation and pull-request preview.

use std::path::PathBuf;

use tracing::{info, instrument};

use stagehand_discovery::{DiscoverOptions, discover};
use stagehand_shared::{
    AggregateResult, PullRequestOutcome, Result, StagehandError, TransientApiKey,
};
use stagehand_staging::{ContentServiceClient, GitHubClient, PrepareOptions, Preparer, PresenterClient};

use crate::aggregate::prepare_all;
use crate::credentials;
use crate::notify::notify;
use crate::preview::resolve_previews;
use crate::revision::resolve_revision;

/// Configuration for the `prepare` and `preview` pipelines.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source workspace to discover content roots in.
    pub workspace: PathBuf,
    /// Content service base URL.
    pub content_service_url: String,
    /// Admin API key used to mint and revoke transient credentials
    /// (and used directly by plain `prepare` builds).
    pub admin_api_key: String,
    /// Staging presenter API URL, if a presenter is configured.
    pub presenter_api_url: Option<String>,
    /// Public base URL presented paths are joined against.
    pub presenter_public_url: Option<String>,
    /// GitHub token, if a GitHub integration is configured.
    pub github_token: Option<String>,
    /// GitHub API base URL.
    pub github_api_url: String,
    /// URL of the originating pull request (preview builds only).
    pub pull_request_url: Option<String>,
    /// Mocked revision value; when set, source control is never invoked.
    pub mock_revision: Option<String>,
    /// Discovery options (marker file, reserved directories).
    pub discover: DiscoverOptions,
}

impl BuildConfig {
    fn presenter(&self) -> Result<Option<PresenterClient>> {
        match (&self.presenter_api_url, &self.presenter_public_url) {
            (Some(api), Some(public)) => Ok(Some(PresenterClient::new(api, public)?)),
            (None, None) => Ok(None),
            _ => Err(StagehandError::config(
                "presenter requires both api_url and public_url",
            )),
        }
    }

    fn github(&self) -> Result<Option<GitHubClient>> {
        match &self.github_token {
            Some(token) => Ok(Some(GitHubClient::new(&self.github_api_url, token)?)),
            None => Ok(None),
        }
    }
}

/// Discover every content root in the workspace and prepare each one.
///
/// Stage one of the engine: traversal feeds the aggregator, which runs the
/// preparer per root and folds the outcomes. A per-root failure never
/// stops the siblings; if any root failed, the first recorded error is
/// surfaced here, after all of them ran.
#[instrument(skip_all, fields(workspace = %config.workspace.display()))]
pub async fn run_prepare<P: Preparer>(
    config: &BuildConfig,
    preparer: &P,
) -> Result<AggregateResult> {
    let revision =
        resolve_revision(&config.workspace, config.mock_revision.as_deref()).await?;

    let opts = PrepareOptions {
        revision_id: revision,
        content_service_url: config.content_service_url.clone(),
        content_service_api_key: TransientApiKey::new(config.admin_api_key.clone()),
        workspace: config.workspace.clone(),
    };

    let roots = discover(&config.workspace, &config.discover);
    if roots.is_empty() {
        info!("no content roots discovered in this workspace");
    }

    let aggregate = prepare_all(roots, preparer, &opts).await;

    if let Some((root, message)) = aggregate.first_error() {
        return Err(StagehandError::preparation(root, message));
    }
    Ok(aggregate)
}

/// Run the full pull-request preview pipeline.
///
/// Six stages, strictly in sequence: revision resolution, credential
/// issuance, discovery + aggregation, credential revocation, preview
/// resolution, and notification. Revision and issuance failures are fatal
/// up front. Preparation failures are recorded, not thrown, so that the
/// revoke stage always runs for an issued key; a revocation failure is
/// fatal and overrides a successful preparation. Only then does the
/// recorded preparation error surface. Missing optional collaborators
/// (presenter, GitHub) degrade the later stages instead of failing them.
#[instrument(skip_all, fields(workspace = %config.workspace.display()))]
pub async fn run_preview_build<P: Preparer>(
    config: &BuildConfig,
    preparer: &P,
) -> Result<PullRequestOutcome> {
    let revision =
        resolve_revision(&config.workspace, config.mock_revision.as_deref()).await?;
    info!(%revision, "starting preview build");

    let content_service =
        ContentServiceClient::new(&config.content_service_url, config.admin_api_key.clone())?;

    let key = credentials::issue_key(&content_service, &revision).await?;

    let opts = PrepareOptions {
        revision_id: revision,
        content_service_url: config.content_service_url.clone(),
        content_service_api_key: key.clone(),
        workspace: config.workspace.clone(),
    };

    let roots = discover(&config.workspace, &config.discover);
    let aggregate = prepare_all(roots, preparer, &opts).await;

    // Revoke before anything else can fail: exactly once per issued key,
    // whatever preparation did.
    credentials::revoke_key(&content_service, &key).await?;

    if let Some((root, message)) = aggregate.first_error() {
        return Err(StagehandError::preparation(root, message));
    }

    if !aggregate.did_something {
        info!("no content roots discovered; nothing to preview");
        return Ok(PullRequestOutcome {
            did_something: false,
        });
    }

    let presenter = config.presenter()?;
    let urls = resolve_previews(&aggregate, presenter.as_ref()).await?;

    let pull_request_url = config.pull_request_url.as_deref().ok_or_else(|| {
        StagehandError::config("preview builds require a pull request URL")
    })?;
    let github = config.github()?;
    notify(urls.as_ref(), pull_request_url, github.as_ref()).await?;

    info!(
        roots = aggregate.content_id_map.len(),
        submitted = aggregate.submitted_something,
        "preview build complete"
    );

    Ok(PullRequestOutcome { did_something: true })
}
