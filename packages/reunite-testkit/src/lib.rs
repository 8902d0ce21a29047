//! Test doubles for the matching engine: an in-memory cosine-scoring vector
//! store and deterministic photo/embedding providers, so service and API
//! tests run without live qdrant or a face-embedding deployment.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use color_eyre::eyre;

use reunite_config::{EmbeddingProviderConfig, PhotoFetchConfig};
use reunite_domain::Namespace;
use reunite_service::{BoxFuture, FaceEmbeddingProvider, PhotoFetcher, Providers, VectorStore};
use reunite_storage::models::{IdentityMetadata, NamespaceCounts, ScoredMatch};

#[derive(Clone, Debug)]
struct StoredRecord {
	vector: Vec<f32>,
	metadata: IdentityMetadata,
}

/// In-memory stand-in for the qdrant adapter. Scores with real cosine
/// similarity and returns candidates similarity-descending, so threshold and
/// ranking policy tests exercise the same ordering contract as the real
/// store.
#[derive(Default)]
pub struct MemoryStore {
	records: Mutex<HashMap<(Namespace, String), StoredRecord>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record_count(&self, namespace: Namespace) -> usize {
		self.records
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.keys()
			.filter(|(stored, _)| *stored == namespace)
			.count()
	}

	pub fn stored_vector(&self, namespace: Namespace, identity_key: &str) -> Option<Vec<f32>> {
		self.records
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.get(&(namespace, identity_key.to_string()))
			.map(|record| record.vector.clone())
	}
}
impl VectorStore for MemoryStore {
	fn upsert<'a>(
		&'a self,
		namespace: Namespace,
		identity_key: &'a str,
		vector: Vec<f32>,
		metadata: &'a IdentityMetadata,
	) -> BoxFuture<'a, reunite_storage::Result<()>> {
		let record = StoredRecord { vector, metadata: metadata.clone() };

		self.records
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert((namespace, identity_key.to_string()), record);

		Box::pin(async { Ok(()) })
	}

	fn query<'a>(
		&'a self,
		namespace: Namespace,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, reunite_storage::Result<Vec<ScoredMatch>>> {
		let mut scored: Vec<ScoredMatch> = self
			.records
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.iter()
			.filter(|((stored, _), _)| *stored == namespace)
			.map(|((_, identity_key), record)| ScoredMatch {
				identity_key: identity_key.clone(),
				score: cosine_similarity(&vector, &record.vector),
				metadata: record.metadata.clone(),
			})
			.collect();

		scored.sort_by(|a, b| b.score.total_cmp(&a.score));
		scored.truncate(top_k as usize);

		Box::pin(async { Ok(scored) })
	}

	fn stats<'a>(&'a self) -> BoxFuture<'a, reunite_storage::Result<NamespaceCounts>> {
		let counts = NamespaceCounts {
			report: self.record_count(Namespace::Report) as u64,
			find: self.record_count(Namespace::Find) as u64,
			unconfirmed: self.record_count(Namespace::Unconfirmed) as u64,
		};

		Box::pin(async move { Ok(counts) })
	}
}

/// A store whose every operation fails, for storage-error propagation tests.
pub struct FailingStore;
impl VectorStore for FailingStore {
	fn upsert<'a>(
		&'a self,
		_namespace: Namespace,
		_identity_key: &'a str,
		_vector: Vec<f32>,
		_metadata: &'a IdentityMetadata,
	) -> BoxFuture<'a, reunite_storage::Result<()>> {
		Box::pin(async { Err(reunite_storage::Error::Unavailable("upsert refused".to_string())) })
	}

	fn query<'a>(
		&'a self,
		_namespace: Namespace,
		_vector: Vec<f32>,
		_top_k: u32,
	) -> BoxFuture<'a, reunite_storage::Result<Vec<ScoredMatch>>> {
		Box::pin(async { Err(reunite_storage::Error::Unavailable("query refused".to_string())) })
	}

	fn stats<'a>(&'a self) -> BoxFuture<'a, reunite_storage::Result<NamespaceCounts>> {
		Box::pin(async { Err(reunite_storage::Error::Unavailable("stats refused".to_string())) })
	}
}

/// Deterministic embedding provider driven by the photo bytes themselves:
/// a JSON array yields that vector, `no-face` yields no detection, `error`
/// simulates a provider transport failure.
pub struct FixtureEmbedding;
impl FaceEmbeddingProvider for FixtureEmbedding {
	fn embed_face<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		photo: Vec<u8>,
	) -> BoxFuture<'a, color_eyre::Result<Option<Vec<f32>>>> {
		Box::pin(async move {
			let text = String::from_utf8_lossy(&photo);

			if text.trim() == "error" {
				return Err(eyre::eyre!("embedding provider unreachable"));
			}
			if let Ok(serde_json::Value::Array(values)) =
				serde_json::from_str::<serde_json::Value>(&text)
			{
				let mut vector = Vec::with_capacity(values.len());

				for value in values {
					let Some(number) = value.as_f64() else {
						return Err(eyre::eyre!("fixture vector must be numeric"));
					};

					vector.push(number as f32);
				}

				return Ok(Some(vector));
			}

			Ok(None)
		})
	}
}

/// Photo fetcher that returns the URL's own bytes, so tests encode fixture
/// photos directly in `photo_urls`. URLs starting with `fail:` error out.
pub struct EchoFetcher;
impl PhotoFetcher for EchoFetcher {
	fn fetch<'a>(
		&'a self,
		_cfg: &'a PhotoFetchConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<u8>>> {
		Box::pin(async move {
			if url.starts_with("fail:") {
				return Err(eyre::eyre!("photo unreachable: {url}"));
			}

			Ok(url.as_bytes().to_vec())
		})
	}
}

/// Fixture providers wired together: echo fetcher + bytes-driven embedding.
pub fn fixture_providers() -> Providers {
	Providers::new(Arc::new(FixtureEmbedding), Arc::new(EchoFetcher))
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() {
		return 0.0;
	}

	let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
	let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
	let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a * norm_b)
}
