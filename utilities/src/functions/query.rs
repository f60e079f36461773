use anyhow::Context;
use serde_json::{json, Value};
use shared::explorer;
use shared::rpc::RpcClient;

use crate::config::Command;

pub async fn run(client: &RpcClient, command: &Command) -> anyhow::Result<Value> {
    let output = match command {
        Command::Blocks { limit } => {
            let blocks = explorer::get_recent_blocks(client, *limit)
                .await
                .context("Failed to fetch recent blocks")?;
            serde_json::to_value(blocks)?
        }
        Command::Block { slot } => {
            let block = explorer::get_block_by_slot(client, *slot)
                .await
                .with_context(|| format!("Failed to fetch block {slot}"))?;
            serde_json::to_value(block)?
        }
        Command::Transactions { slot } => {
            let transactions =
                explorer::get_transactions_from_block(client, *slot)
                    .await
                    .with_context(|| {
                        format!("Failed to fetch transactions of block {slot}")
                    })?;
            serde_json::to_value(transactions)?
        }
        Command::Transaction { signature } => {
            let transaction =
                explorer::get_transaction_by_signature(client, signature)
                    .await
                    .with_context(|| {
                        format!("Failed to fetch transaction {signature}")
                    })?;
            serde_json::to_value(transaction)?
        }
        Command::Leader { slot } => json!({
            "slot": slot,
            "leader": explorer::get_slot_leader(client, *slot).await,
        }),
        Command::Children { slot } => json!({
            "slot": slot,
            "childSlots": explorer::get_child_slots(client, *slot).await,
        }),
        Command::Status => {
            let status = explorer::get_chain_status(client)
                .await
                .context("Failed to fetch chain status")?;
            serde_json::to_value(status)?
        }
        Command::Network => json!({"network": explorer::get_network(client)}),
    };

    Ok(output)
}
