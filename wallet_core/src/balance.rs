//! Up-front balance check, before any indexer round-trip.

use daovote_crypto::decode_address;
use daovote_rpc::LedgerRpc;
use daovote_transactions::CapacityShortfall;
use daovote_types::{Capacity, NetworkId, Script};
use tracing::debug;

use crate::error::SubmitError;

/// Occupied capacity of a vote cell whose lock and type args are
/// `lock_args_len` and 20 bytes: capacity field, two scripts, 4-byte bitmask.
pub fn vote_cell_requirement(lock_args_len: usize) -> Capacity {
    Capacity::bytes(8 + (33 + lock_args_len) + (33 + 20) + 4)
}

/// Check that `lock` holds at least `required`. Returns the balance.
pub async fn check_lock_balance(
    ledger: &dyn LedgerRpc,
    lock: &Script,
    required: Capacity,
) -> Result<Capacity, SubmitError> {
    let available = ledger.get_balance(lock).await?;
    debug!(%available, %required, "balance checked");
    if available < required {
        return Err(SubmitError::InsufficientCapacity(CapacityShortfall::new(
            required, available,
        )));
    }
    Ok(available)
}

/// [`check_lock_balance`] for an address, which must be on `network`.
pub async fn check_balance(
    ledger: &dyn LedgerRpc,
    address: &str,
    network: NetworkId,
    required: Capacity,
) -> Result<Capacity, SubmitError> {
    let (found, lock) = decode_address(address)?;
    if found != network {
        return Err(SubmitError::Assemble(
            daovote_transactions::AssembleError::NetworkMismatch {
                expected: network,
                found,
            },
        ));
    }
    check_lock_balance(ledger, &lock, required).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_cell_needs_118_ckb_for_20_byte_args() {
        assert_eq!(vote_cell_requirement(20), Capacity::ckb(118));
    }
}
