pub mod action;
pub mod cancel;
pub mod controller;
pub mod intake;
pub mod notifier;
pub mod response;
pub mod vector_search;

mod error;

pub use action::{ActionError, ActionExecutor, ActionOutput};
pub use error::{Error, Result};
pub use intake::IntakeRequest;
pub use notifier::GateNotifier;
pub use response::{TerminalResponse, ToolCallView};
pub use vector_search::{DocumentSearch, PgDocumentSearch, VectorSearchAction};

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use gatekeep_config::Gates;
use gatekeep_storage::ToolCallStore;

pub use gatekeep_storage::BoxFuture;

/// Runs tool calls through the gated pipeline. Cheap to clone; every pipeline task owns a copy.
#[derive(Clone)]
pub struct GateService {
	pub store: Arc<dyn ToolCallStore>,
	pub notifier: Arc<dyn GateNotifier>,
	pub action: Arc<dyn ActionExecutor>,
	pub gates: Gates,
}
impl GateService {
	pub fn new(
		store: Arc<dyn ToolCallStore>,
		notifier: Arc<dyn GateNotifier>,
		action: Arc<dyn ActionExecutor>,
		gates: Gates,
	) -> Self {
		Self { store, notifier, action, gates }
	}

	pub async fn get(&self, tool_call_id: Uuid) -> Result<ToolCallView> {
		let record = self.store.get(tool_call_id).await?;

		Ok(record.into())
	}

	pub(crate) fn notify_budget(&self) -> Duration {
		Duration::from_millis(self.gates.notify_timeout_ms)
	}
}
