//! Preview URL resolution via the optional staging presenter.

use tracing::{debug, info, instrument};

use stagehand_shared::{AggregateResult, PresentedUrlMap, Result, StagehandError};
use stagehand_staging::PresenterClient;

/// Resolve the preview URLs for everything this build submitted.
///
/// Returns `None` — a distinct "unavailable" state, not an empty map —
/// when no presenter is configured or nothing was submitted; the presenter
/// is not called in either case. Otherwise every `(root, content ID)` pair
/// is resolved; any single entry failing fails the whole step.
#[instrument(skip_all)]
pub async fn resolve_previews(
    aggregate: &AggregateResult,
    presenter: Option<&PresenterClient>,
) -> Result<Option<PresentedUrlMap>> {
    let Some(presenter) = presenter else {
        info!("no staging presenter configured; preview links are unavailable");
        return Ok(None);
    };

    if !aggregate.submitted_something {
        debug!("nothing was submitted; skipping preview resolution");
        return Ok(None);
    }

    let mut urls: PresentedUrlMap = PresentedUrlMap::new();

    for (root, content_id) in &aggregate.content_id_map {
        let paths = presenter.whereis(content_id).await.map_err(|e| {
            StagehandError::PreviewResolution(format!("{root} ({content_id}): {e}"))
        })?;

        let mut root_urls = Vec::with_capacity(paths.len());
        for path in &paths {
            root_urls.push(presenter.url_for(path)?);
        }

        debug!(root = %root, urls = root_urls.len(), "preview URLs resolved");
        urls.insert(root.clone(), root_urls);
    }

    Ok(Some(urls))
}
