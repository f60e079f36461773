use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::block::Slot;
use crate::rpc::config::Commitment;
use crate::rpc::types::{
    RawConfirmedTransaction, RawInstruction, RawMeta, RawTransaction,
    RawTransactionWithMeta,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Finalized,
    Processed,
    Failed,
}

impl TransactionStatus {
    pub fn derive(
        meta: Option<&RawMeta>,
        slot: Slot,
        commitment: Commitment,
    ) -> Self {
        if meta.is_some_and(RawMeta::has_error) {
            TransactionStatus::Failed
        } else if slot == 0 {
            TransactionStatus::Processed
        } else {
            match commitment {
                Commitment::Finalized => TransactionStatus::Finalized,
                Commitment::Confirmed => TransactionStatus::Confirmed,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub transaction_hash: String,
    pub slot: Slot,
    pub block_time: Option<i64>,
    pub status: TransactionStatus,
    pub fee: u64,
    pub accounts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionData {
    pub program_id: String,
    pub accounts: Vec<String>,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetailData {
    #[serde(flatten)]
    pub transaction: TransactionData,
    pub instructions: Vec<InstructionData>,
    pub logs: Vec<String>,
}

/// Static keys followed by lookup-table addresses, writable then readonly.
/// Compiled instructions index into this list.
fn account_keys(transaction: &RawTransaction, meta: Option<&RawMeta>) -> Vec<String> {
    let static_keys = transaction
        .message
        .account_keys
        .iter()
        .map(|key| key.pubkey().to_string());
    let loaded_keys = meta
        .and_then(|meta| meta.loaded_addresses.as_ref())
        .into_iter()
        .flat_map(|loaded| loaded.writable.iter().chain(loaded.readonly.iter()))
        .cloned();

    static_keys.chain(loaded_keys).collect()
}

fn resolve_key(accounts: &[String], index: usize) -> String {
    accounts.get(index).cloned().unwrap_or_else(|| {
        tracing::warn!(index, "Instruction references unknown account index");
        String::new()
    })
}

impl InstructionData {
    fn from_raw(instruction: &RawInstruction, accounts: &[String]) -> Self {
        match instruction {
            RawInstruction::Compiled {
                program_id_index,
                accounts: indices,
                data,
            } => Self {
                program_id: resolve_key(accounts, *program_id_index),
                accounts: indices
                    .iter()
                    .map(|index| resolve_key(accounts, *index))
                    .collect(),
                data: data.clone(),
            },
            RawInstruction::Parsed {
                program_id,
                accounts,
                data,
                ..
            } => Self {
                program_id: program_id.clone(),
                accounts: accounts.clone(),
                data: data.clone().unwrap_or_default(),
            },
        }
    }
}

impl TransactionData {
    fn from_parts(
        transaction: &RawTransaction,
        meta: Option<&RawMeta>,
        slot: Slot,
        block_time: Option<i64>,
        commitment: Commitment,
    ) -> Self {
        Self {
            transaction_hash: transaction
                .signatures
                .first()
                .cloned()
                .unwrap_or_default(),
            slot,
            block_time,
            status: TransactionStatus::derive(meta, slot, commitment),
            fee: meta.map(|meta| meta.fee).unwrap_or_default(),
            accounts: account_keys(transaction, meta),
        }
    }

    /// One entry of a `getBlock` result.
    pub fn from_block_entry(
        entry: &RawTransactionWithMeta,
        slot: Slot,
        block_time: Option<i64>,
        commitment: Commitment,
    ) -> Self {
        Self::from_parts(
            &entry.transaction,
            entry.meta.as_ref(),
            slot,
            block_time,
            commitment,
        )
    }
}

impl TransactionDetailData {
    pub fn from_raw(
        signature: &str,
        raw: &RawConfirmedTransaction,
        commitment: Commitment,
    ) -> Self {
        let meta = raw.meta.as_ref();
        let mut transaction = TransactionData::from_parts(
            &raw.transaction,
            meta,
            raw.slot,
            raw.block_time,
            commitment,
        );
        // The caller asked by signature; report it even if the node's
        // signature list is empty.
        transaction.transaction_hash = signature.to_string();

        let instructions = raw
            .transaction
            .message
            .instructions
            .iter()
            .map(|instruction| {
                InstructionData::from_raw(instruction, &transaction.accounts)
            })
            .collect();

        Self {
            transaction,
            instructions,
            logs: meta
                .and_then(|meta| meta.log_messages.clone())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn block_entry(err: serde_json::Value) -> RawTransactionWithMeta {
        serde_json::from_value(json!({
            "transaction": {
                "signatures": ["signature_95_1"],
                "message": {
                    "accountKeys": ["account_95_1", "program_1"],
                    "instructions": [
                        {"programIdIndex": 1, "accounts": [0], "data": "3Bxs"},
                    ],
                },
            },
            "meta": {"err": err, "fee": 5000},
        }))
        .unwrap()
    }

    #[test]
    fn successful_block_transaction_is_confirmed() {
        let transaction = TransactionData::from_block_entry(
            &block_entry(json!(null)),
            95,
            Some(1_700_000_000),
            Commitment::Confirmed,
        );

        assert_eq!(transaction.transaction_hash, "signature_95_1");
        assert_eq!(transaction.slot, 95);
        assert_eq!(transaction.status, TransactionStatus::Confirmed);
        assert_eq!(transaction.fee, 5000);
        assert_eq!(transaction.accounts, vec!["account_95_1", "program_1"]);
    }

    #[test]
    fn finalized_commitment_reports_finalized() {
        let transaction = TransactionData::from_block_entry(
            &block_entry(json!(null)),
            95,
            None,
            Commitment::Finalized,
        );

        assert_eq!(transaction.status, TransactionStatus::Finalized);
    }

    #[test]
    fn error_in_meta_means_failed() {
        let transaction = TransactionData::from_block_entry(
            &block_entry(json!({"InstructionError": [0, "Custom"]})),
            95,
            None,
            Commitment::Confirmed,
        );

        assert_eq!(transaction.status, TransactionStatus::Failed);
    }

    #[test]
    fn missing_meta_uses_defaults() {
        let entry: RawTransactionWithMeta = serde_json::from_value(json!({
            "transaction": {"signatures": ["sig"], "message": {}},
        }))
        .unwrap();
        let transaction =
            TransactionData::from_block_entry(&entry, 7, None, Commitment::Confirmed);

        assert_eq!(transaction.fee, 0);
        assert_eq!(transaction.status, TransactionStatus::Confirmed);
        assert!(transaction.accounts.is_empty());
    }

    #[test]
    fn no_slot_means_processed() {
        assert_eq!(
            TransactionStatus::derive(None, 0, Commitment::Confirmed),
            TransactionStatus::Processed
        );
    }

    #[test]
    fn loaded_addresses_follow_static_keys() {
        let entry: RawTransactionWithMeta = serde_json::from_value(json!({
            "transaction": {
                "signatures": ["sig"],
                "message": {
                    "accountKeys": ["payer", "program"],
                    "instructions": [
                        {"programIdIndex": 1, "accounts": [0, 2, 3], "data": ""},
                    ],
                },
            },
            "meta": {
                "err": null,
                "fee": 5000,
                "loadedAddresses": {"writable": ["w1"], "readonly": ["r1"]},
            },
        }))
        .unwrap();
        let raw = RawConfirmedTransaction {
            slot: 10,
            block_time: None,
            transaction: entry.transaction,
            meta: entry.meta,
        };
        let detail =
            TransactionDetailData::from_raw("sig", &raw, Commitment::Confirmed);

        assert_eq!(
            detail.transaction.accounts,
            vec!["payer", "program", "w1", "r1"]
        );
        assert_eq!(detail.instructions[0].program_id, "program");
        assert_eq!(detail.instructions[0].accounts, vec!["payer", "w1", "r1"]);
    }

    #[test]
    fn parsed_transaction_detail_keeps_instruction_order_and_logs() {
        let raw: RawConfirmedTransaction = serde_json::from_value(json!({
            "slot": 95,
            "blockTime": 1_700_000_000,
            "meta": {
                "err": null,
                "fee": 5000,
                "logMessages": ["Log message for signature_95_1"],
            },
            "transaction": {
                "signatures": ["signature_95_1"],
                "message": {
                    "accountKeys": [
                        {"pubkey": "account_95_1", "signer": true, "writable": true},
                    ],
                    "instructions": [
                        {"programId": "program_id_1",
                         "accounts": ["account_95_1"],
                         "data": "test_data"},
                        {"programId": "11111111111111111111111111111111",
                         "program": "system",
                         "parsed": {"type": "transfer"}},
                    ],
                },
            },
        }))
        .unwrap();

        let detail = TransactionDetailData::from_raw(
            "signature_95_1",
            &raw,
            Commitment::Confirmed,
        );

        assert_eq!(detail.transaction.transaction_hash, "signature_95_1");
        assert_eq!(detail.transaction.slot, 95);
        assert_eq!(detail.transaction.status, TransactionStatus::Confirmed);
        assert_eq!(detail.transaction.accounts, vec!["account_95_1"]);
        assert_eq!(detail.instructions.len(), 2);
        assert_eq!(detail.instructions[0].program_id, "program_id_1");
        assert_eq!(detail.instructions[0].data, "test_data");
        assert_eq!(detail.instructions[1].data, "");
        assert_eq!(detail.logs, vec!["Log message for signature_95_1"]);
    }

    #[test]
    fn detail_serializes_flat() {
        let raw: RawConfirmedTransaction = serde_json::from_value(json!({
            "slot": 3,
            "transaction": {"signatures": ["s"], "message": {}},
        }))
        .unwrap();
        let value = serde_json::to_value(TransactionDetailData::from_raw(
            "s",
            &raw,
            Commitment::Confirmed,
        ))
        .unwrap();

        assert_eq!(value["transactionHash"], json!("s"));
        assert_eq!(value["status"], json!("confirmed"));
        assert_eq!(value["logs"], json!([]));
        assert_eq!(value["blockTime"], json!(null));
    }
}
