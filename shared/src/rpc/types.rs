//! Wire shapes of the Solana RPC results the explorer consumes. Every field
//! the node may omit is defaulted so mapping never fails on a sparse
//! response.

use serde::Deserialize;
use serde_json::Value;

use crate::block::Slot;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default)]
    pub blockhash: String,
    #[serde(default)]
    pub previous_blockhash: String,
    #[serde(default)]
    pub parent_slot: Slot,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub block_height: Option<u64>,
    /// Present when requested with `transactionDetails: "full"`.
    #[serde(default)]
    pub transactions: Option<Vec<RawTransactionWithMeta>>,
    /// Present when requested with `transactionDetails: "signatures"`.
    #[serde(default)]
    pub signatures: Option<Vec<String>>,
}

impl RawBlock {
    pub fn transaction_count(&self) -> usize {
        match (&self.transactions, &self.signatures) {
            (Some(transactions), _) => transactions.len(),
            (None, Some(signatures)) => signatures.len(),
            (None, None) => 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTransactionWithMeta {
    #[serde(default)]
    pub transaction: RawTransaction,
    #[serde(default)]
    pub meta: Option<RawMeta>,
}

/// `getTransaction` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfirmedTransaction {
    #[serde(default)]
    pub slot: Slot,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub transaction: RawTransaction,
    #[serde(default)]
    pub meta: Option<RawMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub signatures: Vec<String>,
    #[serde(default)]
    pub message: RawMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub account_keys: Vec<RawAccountKey>,
    #[serde(default)]
    pub instructions: Vec<RawInstruction>,
}

/// `json` encoding lists keys as strings, `jsonParsed` as objects.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawAccountKey {
    Plain(String),
    Parsed { pubkey: String },
}

impl RawAccountKey {
    pub fn pubkey(&self) -> &str {
        match self {
            RawAccountKey::Plain(pubkey) => pubkey,
            RawAccountKey::Parsed { pubkey } => pubkey,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawInstruction {
    Compiled {
        #[serde(rename = "programIdIndex")]
        program_id_index: usize,
        #[serde(default)]
        accounts: Vec<usize>,
        #[serde(default)]
        data: String,
    },
    Parsed {
        #[serde(rename = "programId")]
        program_id: String,
        #[serde(default)]
        accounts: Vec<String>,
        #[serde(default)]
        data: Option<String>,
        #[serde(default)]
        parsed: Option<Value>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
    #[serde(default)]
    pub loaded_addresses: Option<RawLoadedAddresses>,
}

impl RawMeta {
    pub fn has_error(&self) -> bool {
        self.err.as_ref().is_some_and(|err| !err.is_null())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLoadedAddresses {
    #[serde(default)]
    pub writable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWithContext<T> {
    pub value: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sparse_block_deserializes() {
        let block: RawBlock =
            serde_json::from_value(json!({"blockhash": "abc"})).unwrap();

        assert_eq!(block.blockhash, "abc");
        assert_eq!(block.block_time, None);
        assert_eq!(block.transaction_count(), 0);
    }

    #[test]
    fn transaction_count_prefers_full_transactions() {
        let block: RawBlock = serde_json::from_value(json!({
            "blockhash": "abc",
            "transactions": [
                {"transaction": {"signatures": ["s1"]}, "meta": null},
            ],
            "signatures": ["s1", "s2"],
        }))
        .unwrap();
        assert_eq!(block.transaction_count(), 1);

        let block: RawBlock = serde_json::from_value(json!({
            "blockhash": "abc",
            "signatures": ["s1", "s2"],
        }))
        .unwrap();
        assert_eq!(block.transaction_count(), 2);
    }

    #[test]
    fn both_instruction_encodings_deserialize() {
        let instructions: Vec<RawInstruction> = serde_json::from_value(json!([
            {"programIdIndex": 2, "accounts": [0, 1], "data": "3Bxs"},
            {"programId": "Vote111", "accounts": ["a"], "data": "xyz"},
            {"programId": "11111111111111111111111111111111",
             "program": "system",
             "parsed": {"type": "transfer"}},
        ]))
        .unwrap();

        assert!(matches!(
            &instructions[0],
            RawInstruction::Compiled { program_id_index: 2, .. }
        ));
        assert!(matches!(
            &instructions[1],
            RawInstruction::Parsed { data: Some(data), .. } if data == "xyz"
        ));
        assert!(matches!(
            &instructions[2],
            RawInstruction::Parsed { data: None, parsed: Some(_), .. }
        ));
    }

    #[test]
    fn both_account_key_encodings_deserialize() {
        let keys: Vec<RawAccountKey> = serde_json::from_value(json!([
            "plainKey",
            {"pubkey": "parsedKey", "signer": true, "writable": true},
        ]))
        .unwrap();

        assert_eq!(keys[0].pubkey(), "plainKey");
        assert_eq!(keys[1].pubkey(), "parsedKey");
    }

    #[test]
    fn null_error_is_no_error() {
        let meta: RawMeta =
            serde_json::from_value(json!({"err": null, "fee": 5000})).unwrap();
        assert!(!meta.has_error());

        let meta: RawMeta = serde_json::from_value(
            json!({"err": {"InstructionError": [0, "Custom"]}, "fee": 5000}),
        )
        .unwrap();
        assert!(meta.has_error());
    }
}
