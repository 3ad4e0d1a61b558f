use serde_json::Value;

use crate::BoxFuture;

/// Output of a successful action run.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutput {
	/// Persisted verbatim as the record's `result`.
	pub result: Value,
	/// Short sentence for the terminal response and the gate 3 notice.
	pub summary: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
	#[error("{message}")]
	InvalidParameters { field: Option<String>, message: String },
	#[error("{message}")]
	Failed { message: String },
}

/// The work a tool call performs once both decision gates pass.
///
/// `execute` runs at most once per tool call and is never retried by the controller.
pub trait ActionExecutor: Send + Sync {
	/// Rejects malformed parameters before a record is created.
	fn validate(&self, parameters: &Value) -> Result<(), ActionError>;

	fn execute<'a>(
		&'a self,
		parameters: &'a Value,
	) -> BoxFuture<'a, Result<ActionOutput, ActionError>>;

	/// Rebuilds the summary from a stored result, for responses that did not run the action.
	fn summarize(&self, _result: &Value) -> String {
		"The tool call completed.".to_string()
	}
}
