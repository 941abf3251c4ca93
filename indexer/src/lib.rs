//! Client side of the off-chain indexer.
//!
//! The indexer issues entitlement proofs, records submissions, reports
//! per-subject submission status and aggregate tallies, and holds the
//! provisional identity registry. [`IndexerApi`] is the seam; [`HttpIndexer`]
//! speaks its JSON API and [`EntitlementClient`] adds retry with backoff.

pub mod client;
pub mod entitlement;
pub mod error;
pub mod types;
pub mod wire;

pub use client::HttpIndexer;
pub use entitlement::{EntitlementClient, RetryPolicy};
pub use error::IndexerError;
pub use types::{CandidateTally, ContextDetail, SubmissionStatus};

use async_trait::async_trait;
use daovote_types::{Byte32, ContextId, Entitlement, Identity, SubmissionRecord};

#[async_trait(?Send)]
pub trait IndexerApi {
    /// `POST /v1/entitlements/prepare`
    async fn prepare_entitlement(
        &self,
        subject: &Identity,
        context_id: &ContextId,
    ) -> Result<Entitlement, IndexerError>;

    /// `POST /v1/submissions`
    async fn record_submission(
        &self,
        record: &SubmissionRecord,
        attestation: &[u8],
    ) -> Result<(), IndexerError>;

    /// `GET /v1/submissions/status`
    async fn submission_status(
        &self,
        subject: &Identity,
        context_id: &ContextId,
    ) -> Result<SubmissionStatus, IndexerError>;

    /// `GET /v1/contexts/{id}`
    async fn context_detail(&self, context_id: &ContextId) -> Result<ContextDetail, IndexerError>;

    /// `POST /v1/identities`, provisional until the registration commits.
    async fn create_identity(&self, subject: &Identity, commitment: &Byte32)
        -> Result<(), IndexerError>;

    /// `DELETE /v1/identities/{subject}`
    async fn delete_identity(&self, subject: &Identity) -> Result<(), IndexerError>;
}
