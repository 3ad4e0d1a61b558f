use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use gatekeep_storage::models::NewToolCall;

use crate::{ActionError, Error, GateService, Result, TerminalResponse};

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeRequest {
	#[serde(default)]
	pub tool_call_id: Option<Uuid>,
	pub callback_url: String,
	pub parameters: Value,
}

impl GateService {
	/// Validates, persists, and runs one tool call, answering only once it is terminal.
	///
	/// The pipeline runs on its own task, so dropping the returned future does not stop it.
	pub async fn submit(&self, req: IntakeRequest) -> Result<TerminalResponse> {
		let callback_url = validate_callback_url(&req.callback_url)?;

		self.action.validate(&req.parameters).map_err(|err| match err {
			ActionError::InvalidParameters { field, message } => Error::invalid(
				message,
				field.map(|field| format!("parameters.{field}")).as_deref(),
			),
			ActionError::Failed { message } => Error::invalid(message, None),
		})?;

		let tool_call_id = req.tool_call_id.unwrap_or_else(Uuid::new_v4);
		let record = self
			.store
			.create(NewToolCall {
				tool_call_id,
				parameters: req.parameters,
				callback_url: callback_url.to_string(),
			})
			.await
			.inspect_err(|err| {
				tracing::warn!(%tool_call_id, error = %err, "Tool call intake rejected.");
			})?;
		let service = self.clone();
		let pipeline = tokio::spawn(async move { service.run_pipeline(record).await });
		let response = pipeline
			.await
			.map_err(|err| Error::Internal { message: format!("Pipeline task failed: {err}") })??;

		tracing::info!(%tool_call_id, status = %response.status, "Tool call finished.");

		Ok(response)
	}
}

pub(crate) fn validate_callback_url(raw: &str) -> Result<Url> {
	let url = Url::parse(raw.trim()).map_err(|err| {
		Error::invalid(format!("callback_url is not a valid URL: {err}."), Some("callback_url"))
	})?;

	if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
		return Err(Error::invalid(
			"callback_url must be an absolute http or https URL.",
			Some("callback_url"),
		));
	}

	Ok(url)
}
