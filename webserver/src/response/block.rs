use serde::Serialize;
use shared::block::Slot;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderResponse {
    pub slot: Slot,
    pub leader: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenResponse {
    pub slot: Slot,
    pub child_slots: Vec<Slot>,
}
