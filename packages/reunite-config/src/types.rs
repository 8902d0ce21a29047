use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub matching: Matching,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub photos: PhotoFetchConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoFetchConfig {
	pub timeout_ms: u64,
	/// Photos larger than this are dropped before they reach the embedding
	/// provider.
	pub max_photo_bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct Matching {
	/// Similarity floor applied when a search supplies no threshold.
	pub default_threshold: f32,
	/// Nearest neighbors fetched from the store before policy filtering.
	pub top_k: u32,
	/// Matches returned to the caller after filtering.
	pub max_matches: u32,
	/// Persist the query vector into the `unconfirmed` namespace when a
	/// search finds nothing. Mutates state on a failed search, hence opt-in.
	#[serde(default)]
	pub store_unmatched_queries: bool,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}
