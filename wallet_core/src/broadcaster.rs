//! Signing and broadcast through a [`KeyHolder`].

use daovote_crypto::tx_hash;
use daovote_types::{Byte32, UnsignedTransaction};
use tracing::{info, warn};

use crate::error::BroadcastError;
use crate::signer::KeyHolder;

pub struct SigningBroadcaster<'a> {
    holder: &'a dyn KeyHolder,
}

impl<'a> SigningBroadcaster<'a> {
    pub fn new(holder: &'a dyn KeyHolder) -> Self {
        Self { holder }
    }

    /// Sign `tx` and submit it, returning the transaction id.
    ///
    /// Shape is checked before the signer sees the transaction. A node
    /// rejection is returned verbatim in [`BroadcastError::BroadcastRejected`].
    pub async fn sign_and_send(&self, tx: &UnsignedTransaction) -> Result<Byte32, BroadcastError> {
        tx.check_shape()?;
        let expected = tx_hash(tx);
        info!(tx = %expected, signer = %self.holder.identity(), "requesting signature");

        let signed = self.holder.sign(tx).await.map_err(|e| {
            warn!(tx = %expected, error = %e, "signing failed");
            BroadcastError::from(e)
        })?;
        signed.transaction.check_shape()?;

        let tx_id = self.holder.broadcast(&signed).await.map_err(|e| {
            warn!(tx = %expected, error = %e, "broadcast rejected");
            BroadcastError::BroadcastRejected(e)
        })?;
        if tx_id != expected {
            warn!(expected = %expected, reported = %tx_id, "node reported a different tx hash");
        }
        info!(tx = %tx_id, "transaction broadcast");
        Ok(tx_id)
    }
}
