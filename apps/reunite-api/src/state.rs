use std::sync::Arc;

use reunite_service::MatchService;
use reunite_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MatchService>,
}
impl AppState {
	pub async fn new(config: reunite_config::Config) -> color_eyre::Result<Self> {
		let store = QdrantStore::new(&config.storage.qdrant)?;

		store.ensure_collection().await?;

		let service = MatchService::new(config, store);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn with_service(service: MatchService) -> Self {
		Self { service: Arc::new(service) }
	}
}
