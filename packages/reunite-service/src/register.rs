use serde::{Deserialize, Serialize};

use crate::{Error, MatchService, Result};
use reunite_domain::Namespace;
use reunite_storage::models::IdentityMetadata;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
	pub identity_key: String,
	pub namespace: Namespace,
	pub photo_urls: Vec<String>,
	pub reporter_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
	pub success: bool,
	pub identity_key: String,
	pub vector_dimension: usize,
}

impl MatchService {
	/// Registers one identity into a population namespace: aggregates the
	/// submitted photos into one representative vector, then performs a
	/// single full-replace upsert. No state is written when aggregation
	/// fails.
	pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse> {
		let RegisterRequest { identity_key, namespace, photo_urls, reporter_id } = request;

		if identity_key.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "identity_key must be non-empty.".to_string(),
			});
		}
		if !namespace.is_population() {
			return Err(Error::InvalidRequest {
				message: format!("Cannot register into the {namespace} namespace."),
			});
		}

		let vector = self.aggregate_submission(&photo_urls).await?;
		let vector_dimension = vector.len();
		let metadata = IdentityMetadata { reporter_id, registered_at: None };

		self.store.upsert(namespace, &identity_key, vector, &metadata).await?;

		tracing::info!(
			identity_key = %identity_key,
			namespace = %namespace,
			dimension = vector_dimension,
			"Registered identity."
		);

		Ok(RegisterResponse { success: true, identity_key, vector_dimension })
	}
}
