//! The key holder seam and the local Ed25519 key holder.

use async_trait::async_trait;
use daovote_codec::{witness, WitnessArgs};
use daovote_crypto::{blake2b_256, encode_address, sign_message, signing_message};
use daovote_rpc::{LedgerRpc, RpcError};
use daovote_transactions::LockDeployment;
use daovote_types::{
    Byte32, Identity, KeyPair, NetworkId, Script, SignedTransaction, UnsignedTransaction,
};
use tracing::debug;

use crate::error::SignerError;

/// Lock witness written by [`LocalKeyHolder`]: `pubkey(32) || signature(64)`.
pub const LOCAL_LOCK_WITNESS_LEN: usize = 96;
/// Lock args of a local key: the first 20 bytes of the key's blake2b hash.
pub const LOCAL_LOCK_ARGS_LEN: usize = 20;

/// Whatever holds the user's key: a local key file, a browser wallet, a
/// hardware device. Signing may take human time.
#[async_trait(?Send)]
pub trait KeyHolder {
    /// The subject identity the indexer knows this key by.
    fn identity(&self) -> Identity;

    /// Lock script guarding the holder's cells.
    fn lock_script(&self) -> Script;

    /// Size of the lock witness the signature will occupy, so fees can be
    /// estimated before signing.
    fn lock_witness_len(&self) -> usize;

    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SignerError>;

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<Byte32, RpcError>;

    /// Sign an arbitrary message (submission attestations).
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// Lock script for a local key under `lock`'s code.
pub fn local_lock_script(keypair: &KeyPair, lock: &LockDeployment) -> Script {
    let digest = blake2b_256(&keypair.public.0);
    Script::new(
        lock.code_hash,
        lock.hash_type,
        digest[..LOCAL_LOCK_ARGS_LEN].to_vec(),
    )
}

/// Signs with a key held in memory and broadcasts through the ledger RPC.
pub struct LocalKeyHolder<'a> {
    keypair: KeyPair,
    lock: Script,
    network: NetworkId,
    ledger: &'a dyn LedgerRpc,
}

impl<'a> LocalKeyHolder<'a> {
    pub fn new(
        keypair: KeyPair,
        lock: &LockDeployment,
        network: NetworkId,
        ledger: &'a dyn LedgerRpc,
    ) -> Self {
        let lock = local_lock_script(&keypair, lock);
        Self {
            keypair,
            lock,
            network,
            ledger,
        }
    }

    pub fn address(&self) -> String {
        encode_address(&self.lock, self.network)
    }
}

#[async_trait(?Send)]
impl KeyHolder for LocalKeyHolder<'_> {
    fn identity(&self) -> Identity {
        Identity::new(self.address())
    }

    fn lock_script(&self) -> Script {
        self.lock.clone()
    }

    fn lock_witness_len(&self) -> usize {
        LOCAL_LOCK_WITNESS_LEN
    }

    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SignerError> {
        let first = tx
            .witnesses
            .first()
            .ok_or_else(|| SignerError::Unavailable("transaction has no witness to sign".into()))?;
        let placeholder = WitnessArgs::from_witness(first)
            .map_err(|e| SignerError::Unavailable(format!("unreadable witness: {e}")))?
            .lock
            .map(|l| l.len())
            .unwrap_or(0);
        if placeholder != LOCAL_LOCK_WITNESS_LEN {
            return Err(SignerError::Unavailable(format!(
                "lock placeholder is {placeholder} bytes, expected {LOCAL_LOCK_WITNESS_LEN}"
            )));
        }

        let message = signing_message(tx)
            .map_err(|e| SignerError::Unavailable(format!("signing message: {e}")))?;
        let signature = sign_message(&message, &self.keypair.private);
        let mut lock = Vec::with_capacity(LOCAL_LOCK_WITNESS_LEN);
        lock.extend_from_slice(&self.keypair.public.0);
        lock.extend_from_slice(&signature.0);

        let mut signed = tx.clone();
        signed.witnesses[0] = witness::patch_lock(first, lock)
            .map_err(|e| SignerError::Unavailable(format!("witness patch: {e}")))?;
        debug!(identity = %self.identity(), "transaction signed locally");
        Ok(SignedTransaction::new(signed))
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<Byte32, RpcError> {
        self.ledger.send_transaction(tx).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(sign_message(message, &self.keypair.private).0.to_vec())
    }
}
