use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_RECENT_BLOCKS: usize = 10;

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RecentBlocksQueryParams {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

impl RecentBlocksQueryParams {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_RECENT_BLOCKS)
    }
}
