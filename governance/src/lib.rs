//! Voting contexts: lifecycle, window checks and tallies.
//!
//! A context moves `Opened -> Anchored -> Closed`. It is anchored once its
//! meta cell is committed on chain; votes are accepted only while anchored
//! and inside `[window_start, window_end)`. Results are weighted: each
//! candidate carries a vote count and the weight behind it.

pub mod error;
pub mod tally;
pub mod window;

pub use error::ContextError;
pub use tally::{CandidateResult, Tally, BPS_SCALE};
pub use window::{ensure_candidate, ensure_votable, ensure_window, window_status, WindowStatus};
