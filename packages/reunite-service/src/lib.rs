pub mod register;
pub mod search;
pub mod stats;

mod error;

pub use error::{Error, Result};
pub use register::{RegisterRequest, RegisterResponse};
pub use search::{MatchItem, NO_MATCHES_MESSAGE, SearchRequest, SearchResponse};
pub use stats::StatsResponse;

use std::{future::Future, pin::Pin, sync::Arc};

use reunite_config::{Config, EmbeddingProviderConfig, PhotoFetchConfig};
use reunite_domain::{Namespace, PhotoEmbedding, aggregate};
use reunite_providers::{embedding, fetch};
use reunite_storage::{
	models::{IdentityMetadata, NamespaceCounts, ScoredMatch},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The face-embedding model boundary: one photo in, either a fixed-dimension
/// vector or an explicit "no detectable face" out.
pub trait FaceEmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_face<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		photo: Vec<u8>,
	) -> BoxFuture<'a, color_eyre::Result<Option<Vec<f32>>>>;
}

pub trait PhotoFetcher
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a PhotoFetchConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<u8>>>;
}

/// The vector-store contract the engine relies on: idempotent full-replace
/// upsert, similarity-descending top-K query, per-namespace counts.
pub trait VectorStore
where
	Self: Send + Sync,
{
	fn upsert<'a>(
		&'a self,
		namespace: Namespace,
		identity_key: &'a str,
		vector: Vec<f32>,
		metadata: &'a IdentityMetadata,
	) -> BoxFuture<'a, reunite_storage::Result<()>>;

	fn query<'a>(
		&'a self,
		namespace: Namespace,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, reunite_storage::Result<Vec<ScoredMatch>>>;

	fn stats<'a>(&'a self) -> BoxFuture<'a, reunite_storage::Result<NamespaceCounts>>;
}

struct DefaultProviders;

impl FaceEmbeddingProvider for DefaultProviders {
	fn embed_face<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		photo: Vec<u8>,
	) -> BoxFuture<'a, color_eyre::Result<Option<Vec<f32>>>> {
		Box::pin(embedding::embed_face(cfg, photo))
	}
}

impl PhotoFetcher for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a PhotoFetchConfig,
		url: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<u8>>> {
		Box::pin(fetch::fetch_photo(cfg, url))
	}
}

impl VectorStore for QdrantStore {
	fn upsert<'a>(
		&'a self,
		namespace: Namespace,
		identity_key: &'a str,
		vector: Vec<f32>,
		metadata: &'a IdentityMetadata,
	) -> BoxFuture<'a, reunite_storage::Result<()>> {
		Box::pin(self.upsert_identity(namespace, identity_key, vector, metadata))
	}

	fn query<'a>(
		&'a self,
		namespace: Namespace,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, reunite_storage::Result<Vec<ScoredMatch>>> {
		Box::pin(self.query_namespace(namespace, vector, top_k))
	}

	fn stats<'a>(&'a self) -> BoxFuture<'a, reunite_storage::Result<NamespaceCounts>> {
		Box::pin(self.namespace_counts())
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn FaceEmbeddingProvider>,
	pub photos: Arc<dyn PhotoFetcher>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn FaceEmbeddingProvider>, photos: Arc<dyn PhotoFetcher>) -> Self {
		Self { embedding, photos }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), photos: provider }
	}
}

/// Stateless matching engine. Every call is independent; the store handle is
/// the only shared resource and concurrent registers for the same key are
/// last-write-wins.
pub struct MatchService {
	pub cfg: Config,
	pub store: Arc<dyn VectorStore>,
	pub providers: Providers,
}
impl MatchService {
	pub fn new(cfg: Config, store: QdrantStore) -> Self {
		Self { cfg, store: Arc::new(store), providers: Providers::default() }
	}

	pub fn with_parts(cfg: Config, store: Arc<dyn VectorStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}

	/// Fetches and embeds every photo of one submission, then reduces the
	/// detected faces to a single representative vector. A photo that fails
	/// to fetch is dropped; a submission where nothing yields a face fails
	/// with `NoFaceDetected` and writes no state.
	pub(crate) async fn aggregate_submission(&self, photo_urls: &[String]) -> Result<Vec<f32>> {
		let mut outcomes = Vec::with_capacity(photo_urls.len());

		for url in photo_urls {
			let photo = match self.providers.photos.fetch(&self.cfg.providers.photos, url).await {
				Ok(photo) => photo,
				Err(err) => {
					tracing::warn!(url = %url, error = %err, "Dropping photo that failed to fetch.");

					continue;
				},
			};

			match self
				.providers
				.embedding
				.embed_face(&self.cfg.providers.embedding, photo)
				.await?
			{
				Some(vector) => {
					if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
						return Err(Error::Provider {
							message: "Embedding vector dimension mismatch.".to_string(),
						});
					}

					outcomes.push(PhotoEmbedding::Face(vector));
				},
				None => {
					tracing::debug!(url = %url, "No face detected in photo.");

					outcomes.push(PhotoEmbedding::NoFace);
				},
			}
		}

		Ok(aggregate(&outcomes)?)
	}
}
