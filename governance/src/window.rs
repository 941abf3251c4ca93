//! Voting window and lifecycle checks.
//!
//! A context accepts votes only while it is anchored and `now` lies in
//! `[window_start, window_end)`.

use daovote_types::{Context, OutPoint, Timestamp};
use tracing::debug;

use crate::error::ContextError;

/// Where `now` falls relative to a context's voting window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowStatus {
    Upcoming,
    Open,
    Closed,
}

pub fn window_status(context: &Context, now: Timestamp) -> WindowStatus {
    if now < context.window_start {
        WindowStatus::Upcoming
    } else if now < context.window_end {
        WindowStatus::Open
    } else {
        WindowStatus::Closed
    }
}

/// Check that a vote may be cast in `context` at `now`, returning the anchor
/// the vote's type script is bound to.
pub fn ensure_votable(context: &Context, now: Timestamp) -> Result<OutPoint, ContextError> {
    if !context.state().accepts_submissions() {
        return Err(ContextError::NotAnchored(context.state()));
    }
    let anchor = context.anchor.ok_or(ContextError::MissingAnchor)?;
    let status = window_status(context, now);
    if status != WindowStatus::Open {
        debug!(context = %context.id, ?status, %now, "context outside its voting window");
    }
    match status {
        WindowStatus::Upcoming => Err(ContextError::NotYetOpen {
            starts_at: context.window_start,
            now,
        }),
        WindowStatus::Closed => Err(ContextError::WindowClosed {
            ended_at: context.window_end,
            now,
        }),
        WindowStatus::Open => Ok(anchor),
    }
}

/// Check `index` names one of the context's candidates.
pub fn ensure_candidate(context: &Context, index: u32) -> Result<(), ContextError> {
    if (index as usize) < context.candidate_count() {
        Ok(())
    } else {
        Err(ContextError::CandidateOutOfRange {
            index,
            count: context.candidate_count(),
        })
    }
}

/// Validate a proposed window before a meta cell is built for it.
pub fn ensure_window(start: Timestamp, end: Timestamp) -> Result<(), ContextError> {
    if start < end {
        Ok(())
    } else {
        Err(ContextError::InvalidWindow { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daovote_types::{Byte32, ContextId, ContextState, Identity};

    fn anchored() -> Context {
        let mut ctx = Context::opened(
            ContextId::new("c"),
            vec!["a".into(), "b".into(), "c".into()],
            Timestamp::new(100),
            Timestamp::new(200),
            Identity::new("p"),
        );
        ctx.anchor(OutPoint::new(Byte32::new([9; 32]), 0)).unwrap();
        ctx
    }

    #[test]
    fn votable_inside_window() {
        let ctx = anchored();
        assert_eq!(
            ensure_votable(&ctx, Timestamp::new(100)).unwrap(),
            OutPoint::new(Byte32::new([9; 32]), 0)
        );
        assert!(ensure_votable(&ctx, Timestamp::new(199)).is_ok());
    }

    #[test]
    fn window_end_is_exclusive() {
        let ctx = anchored();
        assert_eq!(
            ensure_votable(&ctx, Timestamp::new(200)),
            Err(ContextError::WindowClosed {
                ended_at: Timestamp::new(200),
                now: Timestamp::new(200)
            })
        );
        assert!(matches!(
            ensure_votable(&ctx, Timestamp::new(99)),
            Err(ContextError::NotYetOpen { .. })
        ));
    }

    #[test]
    fn opened_context_is_not_votable() {
        let ctx = Context::opened(
            ContextId::new("c"),
            vec![],
            Timestamp::new(0),
            Timestamp::new(10),
            Identity::new("p"),
        );
        assert_eq!(
            ensure_votable(&ctx, Timestamp::new(5)),
            Err(ContextError::NotAnchored(ContextState::Opened))
        );
    }

    #[test]
    fn candidate_bounds() {
        let ctx = anchored();
        assert!(ensure_candidate(&ctx, 2).is_ok());
        assert_eq!(
            ensure_candidate(&ctx, 3),
            Err(ContextError::CandidateOutOfRange { index: 3, count: 3 })
        );
    }

    #[test]
    fn window_must_be_nonempty() {
        assert!(ensure_window(Timestamp::new(1), Timestamp::new(2)).is_ok());
        assert!(ensure_window(Timestamp::new(2), Timestamp::new(2)).is_err());
    }
}
