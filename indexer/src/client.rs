//! HTTP client for the indexer service.

use async_trait::async_trait;
use daovote_types::{Byte32, ContextId, Entitlement, Identity, SubmissionRecord};
use reqwest::{Response, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::error::IndexerError;
use crate::types::{ContextDetail, SubmissionStatus};
use crate::wire::{
    DetailResponse, IdentityBody, PrepareRequest, PrepareResponse, StatusResponse, SubmissionBody,
};
use crate::IndexerApi;

/// Default timeout for indexer requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the indexer's `/v1` API.
pub struct HttpIndexer {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIndexer {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map a non-success status. 5xx is transient; 4xx is final.
async fn check(response: Response) -> Result<Response, IndexerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        Err(IndexerError::Transient(format!("HTTP {status}: {detail}")))
    } else {
        Err(IndexerError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait(?Send)]
impl IndexerApi for HttpIndexer {
    async fn prepare_entitlement(
        &self,
        subject: &Identity,
        context_id: &ContextId,
    ) -> Result<Entitlement, IndexerError> {
        let response = self
            .http
            .post(self.url("/v1/entitlements/prepare"))
            .json(&PrepareRequest {
                subject,
                context_id,
            })
            .send()
            .await
            .map_err(IndexerError::from_reqwest)?;

        let response = check(response).await.map_err(|e| match e {
            // Any client error here means no standing or wrong context state.
            IndexerError::Rejected { status, detail } => {
                IndexerError::EntitlementUnavailable(format!("HTTP {status}: {detail}"))
            }
            other => other,
        })?;

        let body: PrepareResponse = response
            .json()
            .await
            .map_err(|e| IndexerError::InvalidResponse(format!("entitlement: {e}")))?;
        debug!(subject = %subject, context = %context_id, proof_len = body.proof.len(), "entitlement prepared");
        Ok(Entitlement {
            subject: subject.clone(),
            context_id: context_id.clone(),
            proof: body.proof,
            commitment_address: body.commitment_address,
            context: body.context.into(),
        })
    }

    async fn record_submission(
        &self,
        record: &SubmissionRecord,
        attestation: &[u8],
    ) -> Result<(), IndexerError> {
        let response = self
            .http
            .post(self.url("/v1/submissions"))
            .json(&SubmissionBody::new(record, attestation))
            .send()
            .await
            .map_err(IndexerError::from_reqwest)?;
        check(response).await?;
        Ok(())
    }

    async fn submission_status(
        &self,
        subject: &Identity,
        context_id: &ContextId,
    ) -> Result<SubmissionStatus, IndexerError> {
        let response = self
            .http
            .get(self.url("/v1/submissions/status"))
            .query(&[("subject", subject.as_str()), ("contextId", context_id.as_str())])
            .send()
            .await
            .map_err(IndexerError::from_reqwest)?;
        // Nothing recorded yet.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(SubmissionStatus::default());
        }
        let body: StatusResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexerError::InvalidResponse(format!("status: {e}")))?;
        Ok(body.into())
    }

    async fn context_detail(&self, context_id: &ContextId) -> Result<ContextDetail, IndexerError> {
        let response = self
            .http
            .get(self.url(&format!("/v1/contexts/{context_id}")))
            .send()
            .await
            .map_err(IndexerError::from_reqwest)?;
        let body: DetailResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| IndexerError::InvalidResponse(format!("context detail: {e}")))?;
        Ok(body.into())
    }

    async fn create_identity(
        &self,
        subject: &Identity,
        commitment: &Byte32,
    ) -> Result<(), IndexerError> {
        let response = self
            .http
            .post(self.url("/v1/identities"))
            .json(&IdentityBody {
                subject,
                commitment,
            })
            .send()
            .await
            .map_err(IndexerError::from_reqwest)?;
        check(response).await?;
        Ok(())
    }

    async fn delete_identity(&self, subject: &Identity) -> Result<(), IndexerError> {
        let response = self
            .http
            .delete(self.url(&format!("/v1/identities/{subject}")))
            .send()
            .await
            .map_err(IndexerError::from_reqwest)?;
        // Already gone counts as rolled back.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let client = HttpIndexer::new("http://localhost:8080/");
        assert_eq!(
            client.url("/v1/contexts/abc"),
            "http://localhost:8080/v1/contexts/abc"
        );
    }
}
