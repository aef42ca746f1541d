//! Staging presenter client.
//!
//! The presenter knows where each content ID is currently mounted. Given a
//! content ID base, `whereis` returns the set of site paths that render it;
//! joining those against the presenter's public base URL yields the preview
//! URLs shown to reviewers.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use stagehand_shared::{Result, StagehandError};

/// User-Agent string for presenter requests.
const USER_AGENT: &str = concat!("stagehand/", env!("CARGO_PKG_VERSION"));

/// Default timeout in seconds for presenter requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One mapping entry returned by `whereis`.
#[derive(Debug, Deserialize)]
struct Mapping {
    path: String,
}

/// Response payload of `GET /_api/whereis/<id>`.
#[derive(Debug, Deserialize)]
struct WhereisResponse {
    mappings: Vec<Mapping>,
}

/// Client for the staging presenter's mapping API.
pub struct PresenterClient {
    api_base: Url,
    public_base: Url,
    client: Client,
}

impl PresenterClient {
    /// Create a presenter client. `api_url` hosts the `whereis` endpoint;
    /// `public_url` is the externally reachable base that mapped paths are
    /// joined against.
    pub fn new(api_url: &str, public_url: &str) -> Result<Self> {
        let api_base = Url::parse(api_url)
            .map_err(|e| StagehandError::config(format!("invalid presenter API URL: {e}")))?;
        let public_base = Url::parse(public_url)
            .map_err(|e| StagehandError::config(format!("invalid presenter public URL: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StagehandError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base,
            public_base,
            client,
        })
    }

    /// Query the site paths currently mapped to `content_id`.
    /// Zero paths is a legitimate answer (content staged but not mounted).
    #[instrument(skip(self))]
    pub async fn whereis(&self, content_id: &str) -> Result<Vec<String>> {
        let encoded: String = url::form_urlencoded::byte_serialize(content_id.as_bytes()).collect();
        let url = self
            .api_base
            .join(&format!("_api/whereis/{encoded}"))
            .map_err(|e| StagehandError::Network(format!("whereis URL: {e}")))?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StagehandError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StagehandError::Network(format!(
                "{url}: HTTP {status}: {body}"
            )));
        }

        let parsed: WhereisResponse = response
            .json()
            .await
            .map_err(|e| StagehandError::Network(format!("{url}: malformed response: {e}")))?;

        debug!(content_id, mappings = parsed.mappings.len(), "whereis resolved");
        Ok(parsed.mappings.into_iter().map(|m| m.path).collect())
    }

    /// Join a mapped site path against the public base URL.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.public_base
            .join(path)
            .map_err(|e| StagehandError::PreviewResolution(format!("bad mapped path {path:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn whereis_returns_mapped_paths() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/_api/whereis/id-docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mappings": [ { "path": "/docs/" }, { "path": "/latest/docs/" } ]
            })))
            .mount(&server)
            .await;

        let presenter =
            PresenterClient::new(&server.uri(), "https://docs.example.com").unwrap();
        let paths = presenter.whereis("id-docs").await.unwrap();
        assert_eq!(paths, vec!["/docs/", "/latest/docs/"]);
    }

    #[tokio::test]
    async fn whereis_percent_encodes_content_ids() {
        let server = MockServer::start().await;

        // Content IDs are often URL-shaped themselves.
        Mock::given(method("GET"))
            .and(path("/_api/whereis/https%3A%2F%2Fgithub.com%2Forg%2Frepo%2F"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mappings": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let presenter =
            PresenterClient::new(&server.uri(), "https://docs.example.com").unwrap();
        let paths = presenter.whereis("https://github.com/org/repo/").await.unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn whereis_maps_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let presenter =
            PresenterClient::new(&server.uri(), "https://docs.example.com").unwrap();
        let err = presenter.whereis("id").await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn url_for_joins_against_public_base() {
        let presenter =
            PresenterClient::new("http://presenter.internal", "https://docs.example.com").unwrap();
        let url = presenter.url_for("/docs/").unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/docs/");
    }
}
