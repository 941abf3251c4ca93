//! Nullable key holder: a real Ed25519 signer that can be told to refuse.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use daovote_crypto::keypair_from_seed;
use daovote_rpc::{LedgerRpc, RpcError};
use daovote_transactions::LockDeployment;
use daovote_types::{Byte32, Identity, NetworkId, Script, SignedTransaction, UnsignedTransaction};
use daovote_wallet_core::{KeyHolder, LocalKeyHolder, SignerError};

pub struct NullKeyHolder<'a> {
    inner: LocalKeyHolder<'a>,
    refusal: RefCell<Option<SignerError>>,
    sign_calls: Cell<u32>,
}

impl<'a> NullKeyHolder<'a> {
    /// Key derived from `seed`; broadcasts go to `ledger`.
    pub fn new(seed: u8, lock: &LockDeployment, ledger: &'a dyn LedgerRpc) -> Self {
        Self {
            inner: LocalKeyHolder::new(
                keypair_from_seed(&[seed; 32]),
                lock,
                NetworkId::Testnet,
                ledger,
            ),
            refusal: RefCell::new(None),
            sign_calls: Cell::new(0),
        }
    }

    /// Make every signing request fail with `error`.
    pub fn refuse(&self, error: SignerError) {
        self.refusal.replace(Some(error));
    }

    pub fn sign_calls(&self) -> u32 {
        self.sign_calls.get()
    }

    pub fn address(&self) -> String {
        self.inner.address()
    }
}

#[async_trait(?Send)]
impl KeyHolder for NullKeyHolder<'_> {
    fn identity(&self) -> Identity {
        self.inner.identity()
    }

    fn lock_script(&self) -> Script {
        self.inner.lock_script()
    }

    fn lock_witness_len(&self) -> usize {
        self.inner.lock_witness_len()
    }

    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SignerError> {
        self.sign_calls.set(self.sign_calls.get() + 1);
        let refusal = self.refusal.borrow().clone();
        match refusal {
            Some(error) => Err(error),
            None => self.inner.sign(tx).await,
        }
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<Byte32, RpcError> {
        self.inner.broadcast(tx).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let refusal = self.refusal.borrow().clone();
        match refusal {
            Some(error) => Err(error),
            None => self.inner.sign_message(message).await,
        }
    }
}
