//! Serialization of scripts, cells and transactions.
//!
//! ```text
//! struct OutPoint   { tx_hash: Byte32, index: Uint32 }                  // 36 bytes
//! struct CellInput  { since: Uint64, previous_output: OutPoint }        // 44 bytes
//! struct CellDep    { out_point: OutPoint, dep_type: byte }             // 37 bytes
//! table  Script     { code_hash: Byte32, hash_type: byte, args: Bytes }
//! table  CellOutput { capacity: Uint64, lock: Script, type_: ScriptOpt }
//! table  RawTransaction {
//!     version: Uint32, cell_deps: CellDepVec, header_deps: Byte32Vec,
//!     inputs: CellInputVec, outputs: CellOutputVec, outputs_data: BytesVec,
//! }
//! table  Transaction { raw: RawTransaction, witnesses: BytesVec }
//! ```

use daovote_types::{CellDep, CellInput, CellOutput, OutPoint, Script, UnsignedTransaction};

use crate::molecule::{pack_bytes, pack_dynvec, pack_fixvec, pack_table, pack_u32, pack_u64};

pub const OUT_POINT_SIZE: usize = 36;

/// Extra bytes a transaction costs inside a block (its offset entry).
const BLOCK_TX_OFFSET_SIZE: usize = 4;

pub fn serialize_out_point(out_point: &OutPoint) -> Vec<u8> {
    let mut out = Vec::with_capacity(OUT_POINT_SIZE);
    out.extend_from_slice(out_point.tx_hash.as_bytes());
    out.extend_from_slice(&pack_u32(out_point.index));
    out
}

pub fn serialize_script(script: &Script) -> Vec<u8> {
    pack_table(&[
        script.code_hash.as_bytes().to_vec(),
        vec![script.hash_type.as_byte()],
        pack_bytes(&script.args),
    ])
}

fn serialize_cell_input(input: &CellInput) -> Vec<u8> {
    let mut out = Vec::with_capacity(44);
    out.extend_from_slice(&pack_u64(input.since));
    out.extend_from_slice(&serialize_out_point(&input.previous_output));
    out
}

fn serialize_cell_dep(dep: &CellDep) -> Vec<u8> {
    let mut out = serialize_out_point(&dep.out_point);
    out.push(dep.dep_type.as_byte());
    out
}

fn serialize_cell_output(output: &CellOutput) -> Vec<u8> {
    pack_table(&[
        pack_u64(output.capacity.as_u64()).to_vec(),
        serialize_script(&output.lock),
        output.type_.as_ref().map(serialize_script).unwrap_or_default(),
    ])
}

/// The part of a transaction covered by its hash (everything but witnesses).
pub fn serialize_raw_transaction(tx: &UnsignedTransaction) -> Vec<u8> {
    let cell_deps: Vec<Vec<u8>> = tx.cell_deps.iter().map(serialize_cell_dep).collect();
    let header_deps: Vec<&[u8]> = tx.header_deps.iter().map(|h| &h.as_bytes()[..]).collect();
    let inputs: Vec<Vec<u8>> = tx.inputs.iter().map(serialize_cell_input).collect();
    let outputs: Vec<Vec<u8>> = tx.outputs.iter().map(serialize_cell_output).collect();
    let outputs_data: Vec<Vec<u8>> = tx.outputs_data.iter().map(|d| pack_bytes(d)).collect();

    pack_table(&[
        pack_u32(tx.version).to_vec(),
        pack_fixvec(&cell_deps),
        pack_fixvec(&header_deps),
        pack_fixvec(&inputs),
        pack_dynvec(&outputs),
        pack_dynvec(&outputs_data),
    ])
}

pub fn serialize_transaction(tx: &UnsignedTransaction) -> Vec<u8> {
    let witnesses: Vec<Vec<u8>> = tx.witnesses.iter().map(|w| pack_bytes(w)).collect();
    pack_table(&[serialize_raw_transaction(tx), pack_dynvec(&witnesses)])
}

/// Size the fee is charged on.
pub fn serialized_size_in_block(tx: &UnsignedTransaction) -> usize {
    serialize_transaction(tx).len() + BLOCK_TX_OFFSET_SIZE
}
