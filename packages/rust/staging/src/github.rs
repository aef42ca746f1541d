//! Minimal GitHub API client: posting issue comments on pull requests.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use stagehand_shared::{Result, StagehandError};

/// User-Agent string (GitHub rejects requests without one).
const USER_AGENT: &str = concat!("stagehand/", env!("CARGO_PKG_VERSION"));

/// Default timeout in seconds for GitHub requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Request payload for the create-comment endpoint.
#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

/// Client for posting comments to GitHub pull requests.
pub struct GitHubClient {
    api_base: Url,
    token: String,
    client: Client,
}

impl GitHubClient {
    /// Create a client against `api_url` (`https://api.github.com` for
    /// github.com; overridable for GitHub Enterprise and tests).
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self> {
        let api_base = Url::parse(api_url)
            .map_err(|e| StagehandError::config(format!("invalid GitHub API URL: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StagehandError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base,
            token: token.into(),
            client,
        })
    }

    /// Post a comment on a pull request. `repo` is `owner/name`.
    ///
    /// Pull-request comments go through the issues endpoint; GitHub treats
    /// every PR as an issue with the same number.
    #[instrument(skip(self, body))]
    pub async fn post_comment(&self, repo: &str, number: u64, body: &str) -> Result<()> {
        let url = self
            .api_base
            .join(&format!("repos/{repo}/issues/{number}/comments"))
            .map_err(|e| StagehandError::CommentPost(format!("comment URL: {e}")))?;

        let response = self
            .client
            .post(url.clone())
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .json(&NewComment { body })
            .send()
            .await
            .map_err(|e| StagehandError::CommentPost(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let resp_body = response.text().await.unwrap_or_default();
            return Err(StagehandError::CommentPost(format!(
                "{url}: HTTP {status}: {resp_body}"
            )));
        }

        debug!(repo, number, "preview comment posted");
        Ok(())
    }
}
