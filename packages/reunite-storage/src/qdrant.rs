use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct,
		Query, QueryPointsBuilder, ScoredPoint, UpsertPointsBuilder, Value, VectorParamsBuilder,
		value::Kind,
	},
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{IdentityMetadata, NamespaceCounts, ScoredMatch},
};
use reunite_domain::Namespace;

pub const IDENTITY_KEY_FIELD: &str = "identity_key";
pub const NAMESPACE_FIELD: &str = "namespace";
pub const REPORTER_ID_FIELD: &str = "reporter_id";
pub const REGISTERED_AT_FIELD: &str = "registered_at";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &reunite_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the identity collection when missing. Cosine distance, single
	/// unnamed dense vector of the configured dimension.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			return Ok(());
		}

		self.client
			.create_collection(CreateCollectionBuilder::new(&self.collection).vectors_config(
				VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine),
			))
			.await?;

		tracing::info!(collection = %self.collection, dim = self.vector_dim, "Created identity collection.");

		Ok(())
	}

	/// Full-replace upsert keyed by namespace + identity key. Calling it
	/// twice leaves the second call's vector and metadata, never a merge.
	pub async fn upsert_identity(
		&self,
		namespace: Namespace,
		identity_key: &str,
		vector: Vec<f32>,
		metadata: &IdentityMetadata,
	) -> Result<()> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Vector has dimension {}, the collection expects {}.",
				vector.len(),
				self.vector_dim
			)));
		}

		let registered_at = OffsetDateTime::now_utc().format(&Rfc3339).map_err(|_| {
			Error::InvalidArgument("Failed to format registration timestamp.".to_string())
		})?;
		let mut payload = Payload::new();

		payload.insert(IDENTITY_KEY_FIELD, identity_key.to_string());
		payload.insert(NAMESPACE_FIELD, namespace.as_str().to_string());
		payload.insert(
			REPORTER_ID_FIELD,
			metadata
				.reporter_id
				.clone()
				.map(serde_json::Value::String)
				.unwrap_or(serde_json::Value::Null),
		);
		payload.insert(REGISTERED_AT_FIELD, registered_at);

		let point = PointStruct::new(point_id(namespace, identity_key), vector, payload);

		self.client
			.upsert_points(
				UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true),
			)
			.await?;

		Ok(())
	}

	/// Top-K nearest neighbors inside one namespace, similarity-descending.
	pub async fn query_namespace(
		&self,
		namespace: Namespace,
		vector: Vec<f32>,
		top_k: u32,
	) -> Result<Vec<ScoredMatch>> {
		let filter =
			Filter::must([Condition::matches(NAMESPACE_FIELD, namespace.as_str().to_string())]);
		let response = self
			.client
			.query(
				QueryPointsBuilder::new(self.collection.clone())
					.query(Query::new_nearest(vector))
					.filter(filter)
					.limit(u64::from(top_k))
					.with_payload(true),
			)
			.await?;
		let mut matches = Vec::with_capacity(response.result.len());

		for point in response.result {
			match scored_match(&point) {
				Some(found) => matches.push(found),
				None => {
					tracing::warn!(
						collection = %self.collection,
						namespace = %namespace,
						"Skipping stored point without an identity key."
					);
				},
			}
		}

		Ok(matches)
	}

	pub async fn namespace_counts(&self) -> Result<NamespaceCounts> {
		let mut counts = NamespaceCounts::default();

		for namespace in Namespace::ALL {
			let filter =
				Filter::must([Condition::matches(NAMESPACE_FIELD, namespace.as_str().to_string())]);
			let response = self
				.client
				.count(
					CountPointsBuilder::new(self.collection.clone()).filter(filter).exact(true),
				)
				.await?;
			let count = response.result.map(|result| result.count).unwrap_or(0);

			match namespace {
				Namespace::Report => counts.report = count,
				Namespace::Find => counts.find = count,
				Namespace::Unconfirmed => counts.unconfirmed = count,
			}
		}

		Ok(counts)
	}
}

/// Deterministic point id so that re-registering the same identity into the
/// same namespace overwrites instead of accumulating. Identity keys are
/// opaque caller strings; qdrant ids must be UUIDs.
pub fn point_id(namespace: Namespace, identity_key: &str) -> String {
	let name = format!("{}/{identity_key}", namespace.as_str());

	Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}

fn scored_match(point: &ScoredPoint) -> Option<ScoredMatch> {
	let identity_key = payload_str(&point.payload, IDENTITY_KEY_FIELD)?;
	let metadata = IdentityMetadata {
		reporter_id: payload_str(&point.payload, REPORTER_ID_FIELD),
		registered_at: payload_str(&point.payload, REGISTERED_AT_FIELD),
	};

	Some(ScoredMatch { identity_key, score: point.score, metadata })
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;
	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}
