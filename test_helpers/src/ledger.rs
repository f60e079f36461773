use std::collections::HashSet;

use serde_json::{json, Value};
use shared::block::Slot;
use shared::network::Network;
use shared::rpc::{TransportError, TransportResponse};

use crate::transport::{MockTransport, Reply};

pub const CURRENT_SLOT: Slot = 100;
pub const TRANSACTION_FEE: u64 = 5000;
pub const GENESIS_TIME: i64 = 1_700_000_000;

const SLOT_SKIPPED: i64 = -32007;
const METHOD_NOT_FOUND: i64 = -32601;

const SIGNATURE_LEN: usize = 64;
const KNOWN_TAG: u8 = 1;
const FAILING_TAG: u8 = 2;
const UNKNOWN_TAG: u8 = 3;

pub fn blockhash(slot: Slot) -> String {
    format!("blockhash_{slot}")
}

fn encode_signature(tag: u8, slot: Slot) -> String {
    let mut bytes = [7u8; SIGNATURE_LEN];
    bytes[0] = tag;
    bytes[1..9].copy_from_slice(&slot.to_be_bytes());
    bs58::encode(bytes).into_string()
}

fn decode_signature(signature: &str) -> Option<(u8, Slot)> {
    let bytes = bs58::decode(signature).into_vec().ok()?;
    if bytes.len() != SIGNATURE_LEN {
        return None;
    }
    let slot = Slot::from_be_bytes(bytes[1..9].try_into().ok()?);
    Some((bytes[0], slot))
}

/// Signature of the single transaction in `slot`.
pub fn signature(slot: Slot) -> String {
    encode_signature(KNOWN_TAG, slot)
}

/// Well formed, but looking it up fails upstream.
pub fn failing_signature() -> String {
    encode_signature(FAILING_TAG, 0)
}

/// Well formed, but the node has no such transaction.
pub fn unknown_signature() -> String {
    encode_signature(UNKNOWN_TAG, 0)
}

pub fn account(slot: Slot) -> String {
    format!("account_{slot}_1")
}

pub fn leader(slot: Slot) -> String {
    format!("leader_{slot}")
}

pub fn block_time(slot: Slot) -> i64 {
    GENESIS_TIME + slot as i64
}

/// A deterministic chain: every slot up to [`CURRENT_SLOT`] holds one block
/// with one successful transfer, except the slots marked as skipped.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    skipped: HashSet<Slot>,
    failing: HashSet<Slot>,
    untimed: HashSet<Slot>,
    throttled: HashSet<Slot>,
    throttled_block_time: HashSet<Slot>,
    leaderless: bool,
    network: Option<Network>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node reports the slot as skipped.
    pub fn skip(mut self, slot: Slot) -> Self {
        self.skipped.insert(slot);
        self
    }

    /// `getBlock` for the slot fails with a server error.
    pub fn fail(mut self, slot: Slot) -> Self {
        self.failing.insert(slot);
        self
    }

    /// The block comes back without a `blockTime`.
    pub fn without_block_time(mut self, slot: Slot) -> Self {
        self.untimed.insert(slot);
        self
    }

    /// `getBlock` for the slot is always answered with HTTP 429.
    pub fn throttle(mut self, slot: Slot) -> Self {
        self.throttled.insert(slot);
        self
    }

    /// `getBlockTime` for the slot is always answered with HTTP 429.
    pub fn throttle_block_time(mut self, slot: Slot) -> Self {
        self.throttled_block_time.insert(slot);
        self
    }

    /// `getSlotLeaders` fails with a server error.
    pub fn without_leaders(mut self) -> Self {
        self.leaderless = true;
        self
    }

    /// Network to report in every response, as the proxy does.
    pub fn reporting(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    pub fn into_transport(self) -> MockTransport {
        MockTransport::new(move |_, method, params| self.respond(method, params))
    }

    pub fn respond(&self, method: &str, params: &[Value]) -> Reply {
        let result = match method {
            "getSlot" => json!(CURRENT_SLOT),
            "getBlock" => return self.block(params),
            "getTransaction" => return self.transaction(params),
            "getSlotLeaders" => {
                let start = slot_param(params, 0)?;
                if self.leaderless {
                    return Err(TransportError::Http {
                        status: 500,
                        body: "leader schedule unavailable".to_string(),
                    });
                }
                json!([leader(start)])
            }
            "getBlocks" => {
                let start = slot_param(params, 0)?;
                let end = slot_param(params, 1)?.min(CURRENT_SLOT);
                json!((start..=end)
                    .filter(|slot| !self.skipped.contains(slot))
                    .collect::<Vec<_>>())
            }
            "getBlockTime" => {
                let slot = slot_param(params, 0)?;
                if self.throttled_block_time.contains(&slot) {
                    return Err(too_many_requests());
                }
                json!(block_time(slot))
            }
            "getLatestBlockhash" => json!({
                "context": {"slot": CURRENT_SLOT},
                "value": {
                    "blockhash": blockhash(CURRENT_SLOT),
                    "lastValidBlockHeight": CURRENT_SLOT + 150,
                },
            }),
            _ => {
                return Err(TransportError::Rpc {
                    code: METHOD_NOT_FOUND,
                    message: "Method not found".to_string(),
                })
            }
        };

        Ok(TransportResponse {
            result,
            network: self.network,
        })
    }

    fn block(&self, params: &[Value]) -> Reply {
        let slot = slot_param(params, 0)?;

        if self.throttled.contains(&slot) {
            return Err(too_many_requests());
        }
        if self.failing.contains(&slot) {
            return Err(TransportError::Http {
                status: 500,
                body: format!("failed to load slot {slot}"),
            });
        }
        if self.skipped.contains(&slot) {
            return Err(TransportError::Rpc {
                code: SLOT_SKIPPED,
                message: format!(
                    "Slot {slot} was skipped, or missing due to ledger jump \
                     to recent snapshot"
                ),
            });
        }
        if slot > CURRENT_SLOT {
            return self.reply(Value::Null);
        }

        let full = params
            .get(1)
            .and_then(|config| config.get("transactionDetails"))
            .and_then(Value::as_str)
            == Some("full");

        let mut block = json!({
            "blockhash": blockhash(slot),
            "previousBlockhash": blockhash(slot.saturating_sub(1)),
            "parentSlot": slot.saturating_sub(1),
            "blockHeight": slot,
        });
        if !self.untimed.contains(&slot) {
            block["blockTime"] = json!(block_time(slot));
        }
        if full {
            block["transactions"] = json!([{
                "transaction": {
                    "signatures": [signature(slot)],
                    "message": {
                        "accountKeys": [account(slot), "11111111111111111111111111111111"],
                        "instructions": [
                            {"programIdIndex": 1, "accounts": [0], "data": "3Bxs"},
                        ],
                    },
                },
                "meta": {
                    "err": null,
                    "fee": TRANSACTION_FEE,
                    "logMessages": [format!("Log message for {}", signature(slot))],
                },
            }]);
        } else {
            block["signatures"] = json!([signature(slot)]);
        }

        self.reply(block)
    }

    /// [`signature`] resolves to that slot's transaction and
    /// [`failing_signature`] fails upstream; everything else is unknown.
    fn transaction(&self, params: &[Value]) -> Reply {
        let signature = params.first().and_then(Value::as_str).unwrap_or_default();

        let slot = match decode_signature(signature) {
            Some((FAILING_TAG, _)) => {
                return Err(TransportError::Http {
                    status: 500,
                    body: "internal error".to_string(),
                })
            }
            Some((KNOWN_TAG, slot))
                if slot <= CURRENT_SLOT && !self.skipped.contains(&slot) =>
            {
                slot
            }
            _ => return self.reply(Value::Null),
        };

        self.reply(json!({
            "slot": slot,
            "blockTime": block_time(slot),
            "meta": {
                "err": null,
                "fee": TRANSACTION_FEE,
                "logMessages": [format!("Log message for {signature}")],
            },
            "transaction": {
                "signatures": [signature],
                "message": {
                    "accountKeys": [
                        {"pubkey": account(slot), "signer": true, "writable": true},
                    ],
                    "instructions": [
                        {"programId": "program_id_1",
                         "accounts": [account(slot)],
                         "data": "test_data"},
                    ],
                },
            },
        }))
    }

    fn reply(&self, result: Value) -> Reply {
        Ok(TransportResponse {
            result,
            network: self.network,
        })
    }
}

fn too_many_requests() -> TransportError {
    TransportError::Http {
        status: 429,
        body: "Too many requests".to_string(),
    }
}

fn slot_param(params: &[Value], index: usize) -> Result<Slot, TransportError> {
    params
        .get(index)
        .and_then(Value::as_u64)
        .ok_or_else(|| TransportError::Rpc {
            code: -32602,
            message: format!("Invalid params: expected slot at {index}"),
        })
}
