//! Client-side vote casting and identity registration.
//!
//! - [`KeyHolder`]: the seam to whatever holds the user's key, with
//!   [`LocalKeyHolder`] backed by an encrypted [`KeyFile`]
//! - [`SigningBroadcaster`]: shape check, sign, broadcast
//! - [`VoteSession`]: prepare/cancel/submit votes, create vote metas,
//!   register identities
//! - [`ClientConfig`]: TOML configuration

pub mod balance;
pub mod broadcaster;
pub mod config;
pub mod error;
pub mod keyfile;
pub mod session;
pub mod signer;

pub use balance::{check_balance, check_lock_balance, vote_cell_requirement};
pub use broadcaster::SigningBroadcaster;
pub use daovote_types::{Clock, SystemClock};
pub use config::{ClientConfig, ConfigError, Deployments, SessionSettings};
pub use error::{BroadcastError, KeyFileError, SignerError, SubmitError};
pub use keyfile::{KdfParams, KeyFile};
pub use session::{
    attestation_message, ContextOverview, MetaReceipt, PreparedVote, RegistrationReceipt,
    VoteReceipt, VoteSession,
};
pub use signer::{local_lock_script, KeyHolder, LocalKeyHolder, LOCAL_LOCK_WITNESS_LEN};
