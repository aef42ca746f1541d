//! Pull-request preview notification.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument, warn};

use stagehand_shared::{PresentedUrlMap, Result, StagehandError};
use stagehand_staging::{GitHubClient, comment};

/// Strict trailing-segment pattern for pull-request URLs:
/// `.../<owner>/<repo>/pull/<number>`, anchored at the end.
static PULL_REQUEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+)/([^/]+)/pull/(\d+)/?$").unwrap());

/// A parsed pull-request reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// `owner/name`.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
}

/// Parse the trailing `<owner>/<repo>/pull/<number>` out of a PR URL.
pub fn parse_pull_request_url(url: &str) -> Result<PullRequestRef> {
    let captures = PULL_REQUEST_RE
        .captures(url)
        .ok_or_else(|| StagehandError::PullRequestUrlFormat { url: url.into() })?;

    let number: u64 = captures[3]
        .parse()
        .map_err(|_| StagehandError::PullRequestUrlFormat { url: url.into() })?;

    Ok(PullRequestRef {
        repo: format!("{}/{}", &captures[1], &captures[2]),
        number,
    })
}

/// Notify the originating pull request that its preview is ready.
///
/// - Absent or empty URL map: nothing to say, succeed silently.
/// - No GitHub integration: render the links as a local informational
///   message and succeed without any network I/O.
/// - Malformed pull-request URL: logged and skipped; the pipeline still
///   reports overall success.
/// - A posting failure is fatal.
#[instrument(skip(urls, github))]
pub async fn notify(
    urls: Option<&PresentedUrlMap>,
    pull_request_url: &str,
    github: Option<&GitHubClient>,
) -> Result<()> {
    let Some(urls) = urls else {
        return Ok(());
    };
    if urls.is_empty() {
        return Ok(());
    }

    let Some(github) = github else {
        log_preview_locally(urls);
        return Ok(());
    };

    let pr = match parse_pull_request_url(pull_request_url) {
        Ok(pr) => pr,
        Err(e) => {
            // Misconfigured PR URL degrades to a warning, not a failure.
            warn!(error = %e, "skipping pull request notification");
            return Ok(());
        }
    };

    let body = comment::for_successful_build(urls);
    github.post_comment(&pr.repo, pr.number, &body).await?;

    info!(repo = %pr.repo, number = pr.number, "preview comment posted");
    Ok(())
}

/// Render the preview links as log output when no GitHub account exists.
fn log_preview_locally(urls: &PresentedUrlMap) {
    let all: Vec<&url::Url> = urls.values().flatten().collect();
    match all.as_slice() {
        [] => info!("content staged, but no preview URL is mounted yet"),
        [only] => info!(url = %only, "your preview is ready"),
        many => {
            info!(count = many.len(), "your previews are ready");
            for (root, root_urls) in urls {
                for url in root_urls {
                    info!(root = %root, url = %url, "preview");
                }
            }
        }
    }
}
