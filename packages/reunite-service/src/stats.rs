use serde::{Deserialize, Serialize};

use crate::{MatchService, Result};
use reunite_storage::models::NamespaceCounts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
	pub total_vectors: u64,
	pub vectors_by_namespace: NamespaceCounts,
}

impl MatchService {
	pub async fn stats(&self) -> Result<StatsResponse> {
		let counts = self.store.stats().await?;

		Ok(StatsResponse { total_vectors: counts.total(), vectors_by_namespace: counts })
	}
}
