//! Content-service API client: transient API key issuance and revocation.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use stagehand_shared::{Result, StagehandError, TransientApiKey};

/// User-Agent string for content-service requests.
const USER_AGENT: &str = concat!("stagehand/", env!("CARGO_PKG_VERSION"));

/// Default timeout in seconds for content-service requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Response payload of `POST /keys`.
#[derive(Debug, Deserialize)]
struct IssuedKey {
    apikey: String,
}

/// Client for the staging content service's key-management endpoints.
pub struct ContentServiceClient {
    base: Url,
    admin_key: String,
    client: Client,
}

impl ContentServiceClient {
    /// Create a client for the content service at `base_url`, authenticating
    /// with the given admin API key.
    pub fn new(base_url: &str, admin_key: impl Into<String>) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| StagehandError::config(format!("invalid content service URL: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StagehandError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base,
            admin_key: admin_key.into(),
            client,
        })
    }

    fn auth_header(&self) -> String {
        format!("deconst apikey=\"{}\"", self.admin_key)
    }

    /// Issue a named API key. The name records what the key was minted for
    /// (e.g. `temporary-build-abc123`) so stray keys can be traced.
    #[instrument(skip(self))]
    pub async fn issue_api_key(&self, name: &str) -> Result<TransientApiKey> {
        let mut url = self
            .base
            .join("keys")
            .map_err(|e| StagehandError::Network(format!("keys URL: {e}")))?;
        url.query_pairs_mut().append_pair("named", name);

        let response = self
            .client
            .post(url.clone())
            .header("Authorization", self.auth_header())
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

        let issued: IssuedKey = response
            .json()
            .await
            .map_err(|e| StagehandError::Network(format!("{url}: malformed response: {e}")))?;

        debug!(name, "API key issued");
        Ok(TransientApiKey::new(issued.apikey))
    }

    /// Revoke a previously issued API key.
    #[instrument(skip_all)]
    pub async fn revoke_api_key(&self, key: &TransientApiKey) -> Result<()> {
        let url = self
            .base
            .join(&format!("keys/{}", key.expose()))
            .map_err(|e| StagehandError::Network(format!("keys URL: {e}")))?;

        let response = self
            .client
            .delete(url.clone())
            .header("Authorization", self.auth_header())
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

        debug!("API key revoked");
        Ok(())
    }

    /// Base URL this client talks to (for preparer env wiring).
    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn issue_api_key_posts_named_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keys"))
            .and(query_param("named", "temporary-build-abc123"))
            .and(header("Authorization", "deconst apikey=\"admin-key\""))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "apikey": "issued-key-value"
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ContentServiceClient::new(&server.uri(), "admin-key").unwrap();
        let key = client.issue_api_key("temporary-build-abc123").await.unwrap();
        assert_eq!(key.expose(), "issued-key-value");
    }

    #[tokio::test]
    async fn issue_api_key_maps_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keys"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad admin key"))
            .mount(&server)
            .await;

        let client = ContentServiceClient::new(&server.uri(), "wrong").unwrap();
        let err = client.issue_api_key("temporary-x").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("bad admin key"));
    }

    #[tokio::test]
    async fn revoke_api_key_deletes_by_key() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/keys/issued-key-value"))
            .and(header("Authorization", "deconst apikey=\"admin-key\""))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ContentServiceClient::new(&server.uri(), "admin-key").unwrap();
        let key = TransientApiKey::new("issued-key-value");
        client.revoke_api_key(&key).await.unwrap();
    }

    #[tokio::test]
    async fn revoke_api_key_maps_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ContentServiceClient::new(&server.uri(), "admin-key").unwrap();
        let key = TransientApiKey::new("k");
        let err = client.revoke_api_key(&key).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
