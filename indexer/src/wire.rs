//! JSON bodies of the indexer's HTTP API. Field names are camelCase and
//! binary fields are `0x`-prefixed hex.

use daovote_types::{
    hex_serde, Byte32, Context, ContextId, ContextState, Identity, OutPoint, SubmissionRecord,
    Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::types::{CandidateTally, ContextDetail, SubmissionStatus};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareRequest<'a> {
    pub subject: &'a Identity,
    pub context_id: &'a ContextId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareResponse {
    #[serde(with = "hex_serde", default)]
    pub proof: Vec<u8>,
    pub commitment_address: String,
    pub context: ContextWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorWire {
    pub tx_hash: Byte32,
    /// Meta cells are created at output 0.
    #[serde(default)]
    pub index: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextWire {
    pub id: ContextId,
    pub candidates: Vec<String>,
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    #[serde(default)]
    pub anchor: Option<AnchorWire>,
    /// Older indexers report only the anchoring transaction.
    #[serde(default)]
    pub anchor_tx_id: Option<Byte32>,
    pub state: ContextState,
    pub creator: Identity,
}

impl From<ContextWire> for Context {
    fn from(w: ContextWire) -> Self {
        let anchor = w
            .anchor
            .map(|a| OutPoint::new(a.tx_hash, a.index))
            .or_else(|| w.anchor_tx_id.map(|tx| OutPoint::new(tx, 0)));
        Context::restore(
            w.id,
            w.candidates,
            (w.window_start, w.window_end),
            anchor,
            w.state,
            w.creator,
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBody<'a> {
    pub context_id: &'a ContextId,
    pub tx_id: &'a Byte32,
    pub chosen_index: u32,
    pub signer: &'a Identity,
    pub submitted_at: Timestamp,
    #[serde(with = "hex_serde")]
    pub attestation: &'a [u8],
}

impl<'a> SubmissionBody<'a> {
    pub fn new(record: &'a SubmissionRecord, attestation: &'a [u8]) -> Self {
        Self {
            context_id: &record.context_id,
            tx_id: &record.tx_id,
            chosen_index: record.chosen_index,
            signer: &record.signer,
            submitted_at: record.submitted_at,
            attestation,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default)]
    pub chosen_index: Option<u32>,
    #[serde(default)]
    pub confirmed_tx_id: Option<Byte32>,
}

impl From<StatusResponse> for SubmissionStatus {
    fn from(r: StatusResponse) -> Self {
        SubmissionStatus {
            chosen_index: r.chosen_index,
            confirmed_tx_id: r.confirmed_tx_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailResponse {
    pub tally_per_candidate: Vec<(u64, u64)>,
    pub total_weight: u64,
}

impl From<DetailResponse> for ContextDetail {
    fn from(r: DetailResponse) -> Self {
        ContextDetail {
            tally_per_candidate: r
                .tally_per_candidate
                .into_iter()
                .map(|(count, weight)| CandidateTally { count, weight })
                .collect(),
            total_weight: r.total_weight,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityBody<'a> {
    pub subject: &'a Identity,
    pub commitment: &'a Byte32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_hex(b: &str) -> String {
        format!("0x{}", b.repeat(32))
    }

    #[test]
    fn context_anchor_index_defaults_to_zero() {
        let raw = serde_json::json!({
            "id": "ctx-7",
            "candidates": ["a", "b", "c"],
            "windowStart": 100,
            "windowEnd": 200,
            "anchor": { "txHash": hash_hex("aa") },
            "state": "anchored",
            "creator": "did:example:alice"
        });
        let ctx: Context = serde_json::from_value::<ContextWire>(raw).unwrap().into();
        assert_eq!(ctx.anchor.unwrap().index, 0);
        assert_eq!(ctx.state(), ContextState::Anchored);
        assert_eq!(ctx.candidate_count(), 3);
    }

    #[test]
    fn legacy_anchor_tx_id_is_output_zero() {
        let raw = serde_json::json!({
            "id": "ctx-7",
            "candidates": [],
            "windowStart": 0,
            "windowEnd": 1,
            "anchorTxId": hash_hex("bb"),
            "state": "anchored",
            "creator": "p"
        });
        let ctx: Context = serde_json::from_value::<ContextWire>(raw).unwrap().into();
        let anchor = ctx.anchor.unwrap();
        assert_eq!(anchor.index, 0);
        assert_eq!(anchor.tx_hash.as_bytes(), &[0xbb; 32]);
    }

    #[test]
    fn prepare_response_decodes_hex_proof() {
        let raw = serde_json::json!({
            "proof": "0xdeadbeef",
            "commitmentAddress": "ckt1qq",
            "context": {
                "id": "c",
                "candidates": ["x"],
                "windowStart": 0,
                "windowEnd": 10,
                "anchor": { "txHash": hash_hex("01"), "index": 1 },
                "state": "anchored",
                "creator": "p"
            }
        });
        let resp: PrepareResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.proof, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(resp.context.anchor.unwrap().index, 1);
    }

    #[test]
    fn submission_body_is_camel_case() {
        let record = SubmissionRecord {
            context_id: ContextId::new("c"),
            tx_id: Byte32::new([3; 32]),
            chosen_index: 2,
            signer: Identity::new("s"),
            submitted_at: Timestamp::new(5),
        };
        let json = serde_json::to_value(SubmissionBody::new(&record, &[0xab])).unwrap();
        assert_eq!(json["chosenIndex"], 2);
        assert_eq!(json["contextId"], "c");
        assert_eq!(json["attestation"], "0xab");
        assert_eq!(json["submittedAt"], 5);
    }

    #[test]
    fn status_and_detail() {
        let s: StatusResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(SubmissionStatus::from(s), SubmissionStatus::default());

        let d: DetailResponse = serde_json::from_value(serde_json::json!({
            "tallyPerCandidate": [[3, 30], [1, 70]],
            "totalWeight": 100
        }))
        .unwrap();
        let detail = ContextDetail::from(d);
        assert_eq!(detail.tally_per_candidate[1], CandidateTally { count: 1, weight: 70 });
    }
}
