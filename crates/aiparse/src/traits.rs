use std::collections::BTreeMap;

use crate::Result;

/// Reads per-player scores off a results screenshot.
#[async_trait::async_trait]
pub trait ScoreReader: Send + Sync {
    async fn read_scores(&self, image: &[u8], players: &[String]) -> Result<BTreeMap<String, u32>>;
}
