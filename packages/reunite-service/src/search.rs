use serde::{Deserialize, Serialize};

use crate::{Error, MatchService, Result};
use reunite_domain::{Namespace, clamp_threshold};
use reunite_storage::models::IdentityMetadata;

pub const NO_MATCHES_MESSAGE: &str = "No matches found";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
	pub identity_key: String,
	/// The namespace to search, not the caller's own population. The paired
	/// workflow queries the opposite population: a find submission searches
	/// `report` and vice versa.
	pub namespace: Namespace,
	pub photo_urls: Vec<String>,
	pub reporter_id: Option<String>,
	pub threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchItem {
	pub identity_key: String,
	pub score: f32,
	pub metadata: IdentityMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
	pub success: bool,
	pub matches: Vec<MatchItem>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl MatchService {
	/// Ranked, thresholded nearest-neighbor search inside one namespace.
	/// Candidates sharing the caller's `reporter_id` are excluded, scores
	/// strictly below the clamped threshold are dropped, and at most
	/// `matching.max_matches` survivors are returned in the store's
	/// similarity-descending order.
	pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
		let SearchRequest { identity_key, namespace, photo_urls, reporter_id, threshold } = request;

		if identity_key.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "identity_key must be non-empty.".to_string(),
			});
		}
		if !namespace.is_population() {
			return Err(Error::InvalidRequest {
				message: format!("Cannot search the {namespace} namespace."),
			});
		}

		let vector = self.aggregate_submission(&photo_urls).await?;
		let threshold = clamp_threshold(threshold.unwrap_or(self.cfg.matching.default_threshold));
		let candidates =
			self.store.query(namespace, vector.clone(), self.cfg.matching.top_k).await?;
		let candidate_count = candidates.len();
		let matches: Vec<MatchItem> = candidates
			.into_iter()
			.filter(|candidate| match (&reporter_id, &candidate.metadata.reporter_id) {
				(Some(caller), Some(owner)) => caller != owner,
				_ => true,
			})
			.filter(|candidate| candidate.score >= threshold)
			.take(self.cfg.matching.max_matches as usize)
			.map(|candidate| MatchItem {
				identity_key: candidate.identity_key,
				score: candidate.score,
				metadata: candidate.metadata,
			})
			.collect();

		if matches.is_empty() {
			if self.cfg.matching.store_unmatched_queries {
				let metadata =
					IdentityMetadata { reporter_id: reporter_id.clone(), registered_at: None };

				self.store
					.upsert(Namespace::Unconfirmed, &identity_key, vector, &metadata)
					.await?;

				tracing::info!(
					identity_key = %identity_key,
					"Stored unmatched query vector for future matching."
				);
			}

			tracing::info!(
				identity_key = %identity_key,
				namespace = %namespace,
				candidates = candidate_count,
				threshold,
				"Search found no matches."
			);

			return Ok(SearchResponse {
				success: false,
				matches: Vec::new(),
				message: Some(NO_MATCHES_MESSAGE.to_string()),
			});
		}

		tracing::info!(
			identity_key = %identity_key,
			namespace = %namespace,
			candidates = candidate_count,
			matched = matches.len(),
			threshold,
			"Search found matches."
		);

		Ok(SearchResponse { success: true, matches, message: None })
	}
}
