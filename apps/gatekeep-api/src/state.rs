use std::sync::Arc;

use gatekeep_config::Config;
use gatekeep_providers::CallbackClient;
use gatekeep_service::{GateService, PgDocumentSearch, VectorSearchAction};
use gatekeep_storage::{db::Db, tool_calls::PgToolCallStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<GateService>,
	pub auth_token: Option<Arc<str>>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.search.vector_dim).await?;

		Self::from_db(db, config)
	}

	/// Wires the service onto a database whose schema is already in place.
	pub fn from_db(db: Db, config: Config) -> color_eyre::Result<Self> {
		let store = PgToolCallStore::new(db.pool.clone());
		let notifier = CallbackClient::new(&config.callback)?;
		let action = VectorSearchAction::new(PgDocumentSearch::new(db.pool), &config.search);
		let service =
			GateService::new(Arc::new(store), Arc::new(notifier), Arc::new(action), config.gates);

		Ok(Self::from_service(service, config.security.api_auth_token))
	}

	pub fn from_service(service: GateService, auth_token: Option<String>) -> Self {
		Self { service: Arc::new(service), auth_token: auth_token.map(Arc::from) }
	}
}
