//! Nullable indexer: scripted responses, recorded calls.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use daovote_indexer::{ContextDetail, IndexerApi, IndexerError, SubmissionStatus};
use daovote_types::{Byte32, ContextId, Entitlement, Identity, SubmissionRecord};
use tokio::time::sleep;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexerCall {
    Prepare(ContextId),
    Record(Byte32),
    Status(ContextId),
    Detail(ContextId),
    CreateIdentity(Identity),
    DeleteIdentity(Identity),
}

type Scripted<T> = RefCell<VecDeque<(Duration, Result<T, IndexerError>)>>;

#[derive(Default)]
pub struct NullIndexer {
    entitlements: Scripted<Entitlement>,
    default_entitlement: RefCell<Option<Entitlement>>,
    statuses: Scripted<SubmissionStatus>,
    details: Scripted<ContextDetail>,
    identities: RefCell<HashMap<Identity, Byte32>>,
    recorded: RefCell<Vec<(SubmissionRecord, Vec<u8>)>>,
    calls: RefCell<Vec<IndexerCall>>,
    fail_records: Cell<bool>,
    fail_deletes: Cell<bool>,
}

impl NullIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every prepare call with `entitlement`, rewritten for the
    /// requesting subject.
    pub fn with_entitlement(entitlement: Entitlement) -> Self {
        let indexer = Self::new();
        indexer.default_entitlement.replace(Some(entitlement));
        indexer
    }

    /// Queue one prepare response, used before the default.
    pub fn push_entitlement(&self, response: Result<Entitlement, IndexerError>) {
        self.entitlements
            .borrow_mut()
            .push_back((Duration::ZERO, response));
    }

    pub fn push_status(&self, status: SubmissionStatus) {
        self.push_delayed_status(Duration::ZERO, Ok(status));
    }

    pub fn push_delayed_status(
        &self,
        delay: Duration,
        response: Result<SubmissionStatus, IndexerError>,
    ) {
        self.statuses.borrow_mut().push_back((delay, response));
    }

    pub fn push_detail(&self, delay: Duration, detail: ContextDetail) {
        self.details.borrow_mut().push_back((delay, Ok(detail)));
    }

    pub fn fail_records(&self, fail: bool) {
        self.fail_records.set(fail);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.set(fail);
    }

    pub fn calls(&self) -> Vec<IndexerCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, matches: impl Fn(&IndexerCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| matches(c)).count()
    }

    pub fn recorded(&self) -> Vec<(SubmissionRecord, Vec<u8>)> {
        self.recorded.borrow().clone()
    }

    pub fn identity(&self, subject: &Identity) -> Option<Byte32> {
        self.identities.borrow().get(subject).copied()
    }

    fn log(&self, call: IndexerCall) {
        self.calls.borrow_mut().push(call);
    }
}

async fn answer<T>(next: Option<(Duration, Result<T, IndexerError>)>) -> Option<Result<T, IndexerError>> {
    let (delay, response) = next?;
    if !delay.is_zero() {
        sleep(delay).await;
    }
    Some(response)
}

#[async_trait(?Send)]
impl IndexerApi for NullIndexer {
    async fn prepare_entitlement(
        &self,
        subject: &Identity,
        context_id: &ContextId,
    ) -> Result<Entitlement, IndexerError> {
        self.log(IndexerCall::Prepare(context_id.clone()));
        let next = self.entitlements.borrow_mut().pop_front();
        if let Some(response) = answer(next).await {
            return response;
        }
        let default = self.default_entitlement.borrow().clone();
        match default {
            Some(mut entitlement) => {
                entitlement.subject = subject.clone();
                Ok(entitlement)
            }
            None => Err(IndexerError::EntitlementUnavailable(format!(
                "{subject} has no standing in {context_id}"
            ))),
        }
    }

    async fn record_submission(
        &self,
        record: &SubmissionRecord,
        attestation: &[u8],
    ) -> Result<(), IndexerError> {
        self.log(IndexerCall::Record(record.tx_id));
        if self.fail_records.get() {
            return Err(IndexerError::Transient("record endpoint down".into()));
        }
        self.recorded
            .borrow_mut()
            .push((record.clone(), attestation.to_vec()));
        Ok(())
    }

    async fn submission_status(
        &self,
        _subject: &Identity,
        context_id: &ContextId,
    ) -> Result<SubmissionStatus, IndexerError> {
        self.log(IndexerCall::Status(context_id.clone()));
        let next = self.statuses.borrow_mut().pop_front();
        answer(next)
            .await
            .unwrap_or_else(|| Ok(SubmissionStatus::default()))
    }

    async fn context_detail(&self, context_id: &ContextId) -> Result<ContextDetail, IndexerError> {
        self.log(IndexerCall::Detail(context_id.clone()));
        let next = self.details.borrow_mut().pop_front();
        answer(next)
            .await
            .unwrap_or_else(|| Ok(ContextDetail::default()))
    }

    async fn create_identity(
        &self,
        subject: &Identity,
        commitment: &Byte32,
    ) -> Result<(), IndexerError> {
        self.log(IndexerCall::CreateIdentity(subject.clone()));
        let mut identities = self.identities.borrow_mut();
        if identities.contains_key(subject) {
            return Err(IndexerError::Rejected {
                status: 409,
                detail: format!("{subject} already registered"),
            });
        }
        identities.insert(subject.clone(), *commitment);
        Ok(())
    }

    async fn delete_identity(&self, subject: &Identity) -> Result<(), IndexerError> {
        self.log(IndexerCall::DeleteIdentity(subject.clone()));
        if self.fail_deletes.get() {
            return Err(IndexerError::Transient("delete endpoint down".into()));
        }
        self.identities.borrow_mut().remove(subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_identities() {
        let indexer = NullIndexer::new();
        let alice = Identity::new("alice");
        indexer
            .create_identity(&alice, &Byte32::new([1; 32]))
            .await
            .unwrap();
        assert!(indexer.create_identity(&alice, &Byte32::new([2; 32])).await.is_err());
        assert_eq!(indexer.identity(&alice), Some(Byte32::new([1; 32])));

        indexer.delete_identity(&alice).await.unwrap();
        assert_eq!(indexer.identity(&alice), None);
        assert_eq!(
            indexer.count(|c| matches!(c, IndexerCall::CreateIdentity(_))),
            2
        );
    }

    #[tokio::test]
    async fn no_entitlement_without_script() {
        let indexer = NullIndexer::new();
        let err = indexer
            .prepare_entitlement(&Identity::new("bob"), &ContextId::new("c"))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexerError::EntitlementUnavailable(_)));
    }
}
