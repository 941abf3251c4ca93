//! Voting/registration contexts, entitlements and submission records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell::OutPoint;
use crate::error::TypesError;
use crate::hash::Byte32;
use crate::identity::Identity;
use crate::state::ContextState;
use crate::time::Timestamp;

/// Identifier of a context, assigned by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A vote (or registration) meta: what can be chosen, when, and where it is
/// anchored on chain.
///
/// Never deleted; the state only moves through [`Context::anchor`] and
/// [`Context::close`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextId,
    pub candidates: Vec<String>,
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    /// The meta cell. `None` until the context is anchored.
    pub anchor: Option<OutPoint>,
    state: ContextState,
    pub creator: Identity,
}

impl Context {
    /// A freshly proposed context, not yet on chain.
    pub fn opened(
        id: ContextId,
        candidates: Vec<String>,
        window_start: Timestamp,
        window_end: Timestamp,
        creator: Identity,
    ) -> Self {
        Self {
            id,
            candidates,
            window_start,
            window_end,
            anchor: None,
            state: ContextState::Opened,
            creator,
        }
    }

    /// Rebuild a context in an arbitrary state, as reported by the indexer.
    pub fn restore(
        id: ContextId,
        candidates: Vec<String>,
        window: (Timestamp, Timestamp),
        anchor: Option<OutPoint>,
        state: ContextState,
        creator: Identity,
    ) -> Self {
        Self {
            id,
            candidates,
            window_start: window.0,
            window_end: window.1,
            anchor,
            state,
            creator,
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Record the committed meta cell. `Opened -> Anchored`.
    pub fn anchor(&mut self, out_point: OutPoint) -> Result<(), TypesError> {
        self.transition(ContextState::Anchored)?;
        self.anchor = Some(out_point);
        Ok(())
    }

    /// `Anchored -> Closed`.
    pub fn close(&mut self) -> Result<(), TypesError> {
        self.transition(ContextState::Closed)
    }

    fn transition(&mut self, next: ContextState) -> Result<(), TypesError> {
        if !self.state.can_advance_to(next) {
            return Err(TypesError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

/// Proof that a subject may cast weight in a context, issued by the indexer.
///
/// Produced once per submission attempt; stale once the context's window
/// closes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entitlement {
    pub subject: Identity,
    pub context_id: ContextId,
    /// Serialized sparse Merkle tree proof.
    pub proof: Vec<u8>,
    /// Address whose lock the vote cell will carry.
    pub commitment_address: String,
    pub context: Context,
}

impl Entitlement {
    /// Whether the entitlement can still be used at `now`.
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        now < self.context.window_end
    }
}

/// What the indexer is told after a successful broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub context_id: ContextId,
    pub tx_id: Byte32,
    pub chosen_index: u32,
    pub signer: Identity,
    pub submitted_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context::opened(
            ContextId::new("ctx-1"),
            vec!["yes".into(), "no".into()],
            Timestamp::new(100),
            Timestamp::new(200),
            Identity::new("proposer"),
        )
    }

    #[test]
    fn lifecycle_moves_forward() {
        let mut ctx = context();
        assert_eq!(ctx.state(), ContextState::Opened);
        ctx.anchor(OutPoint::new(Byte32::new([1; 32]), 0)).unwrap();
        assert_eq!(ctx.state(), ContextState::Anchored);
        assert!(ctx.anchor.is_some());
        ctx.close().unwrap();
        assert_eq!(ctx.state(), ContextState::Closed);
    }

    #[test]
    fn cannot_close_unanchored_context() {
        let mut ctx = context();
        let err = ctx.close().unwrap_err();
        assert_eq!(
            err,
            TypesError::InvalidTransition {
                from: "opened".into(),
                to: "closed".into()
            }
        );
    }

    #[test]
    fn cannot_anchor_twice() {
        let mut ctx = context();
        ctx.anchor(OutPoint::new(Byte32::ZERO, 0)).unwrap();
        assert!(ctx.anchor(OutPoint::new(Byte32::ZERO, 1)).is_err());
        assert_eq!(ctx.anchor.unwrap().index, 0);
    }

    #[test]
    fn entitlement_goes_stale_at_window_end() {
        let ent = Entitlement {
            subject: Identity::new("alice"),
            context_id: ContextId::new("ctx-1"),
            proof: vec![1, 2, 3],
            commitment_address: "ckt1q".into(),
            context: context(),
        };
        assert!(ent.is_fresh(Timestamp::new(199)));
        assert!(!ent.is_fresh(Timestamp::new(200)));
    }
}
