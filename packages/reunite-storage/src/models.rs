use serde::{Deserialize, Serialize};

/// Metadata stored alongside an identity vector. `reporter_id` drives the
/// self-exclusion filter on search; absent means the record never matches a
/// reporter filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
	pub reporter_id: Option<String>,
	pub registered_at: Option<String>,
}

/// One ranked search result, in the store's similarity-descending order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredMatch {
	pub identity_key: String,
	pub score: f32,
	pub metadata: IdentityMetadata,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceCounts {
	pub report: u64,
	pub find: u64,
	pub unconfirmed: u64,
}
impl NamespaceCounts {
	pub fn total(&self) -> u64 {
		self.report + self.find + self.unconfirmed
	}
}
