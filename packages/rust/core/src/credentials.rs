//! Transient credential lifecycle.
//!
//! A revision-scoped API key is issued before preparation and revoked
//! exactly once afterwards, success or failure. The pipeline guarantees
//! the ordering; this module maps the client calls onto the issuance and
//! revocation error variants so fatality is decided in one place.

use tracing::{info, instrument};

use stagehand_shared::{Result, RevisionId, StagehandError, TransientApiKey};
use stagehand_staging::ContentServiceClient;

/// Issue the transient API key for this build.
///
/// Failure is fatal and leaves nothing to revoke.
#[instrument(skip(content_service))]
pub async fn issue_key(
    content_service: &ContentServiceClient,
    revision: &RevisionId,
) -> Result<TransientApiKey> {
    let name = format!("temporary-{revision}");
    let key = content_service
        .issue_api_key(&name)
        .await
        .map_err(|e| StagehandError::CredentialIssuance(e.to_string()))?;

    info!(%revision, "transient API key issued");
    Ok(key)
}

/// Revoke the build's transient API key.
///
/// Runs regardless of how preparation went; a failure here overrides a
/// successful preparation outcome, because leaving the credential alive is
/// worth failing the build over.
#[instrument(skip_all)]
pub async fn revoke_key(
    content_service: &ContentServiceClient,
    key: &TransientApiKey,
) -> Result<()> {
    content_service
        .revoke_api_key(key)
        .await
        .map_err(|e| StagehandError::CredentialRevocation(e.to_string()))?;

    info!("transient API key revoked");
    Ok(())
}
