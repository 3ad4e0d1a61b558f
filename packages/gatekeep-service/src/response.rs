use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use gatekeep_domain::ToolCallStatus;
use gatekeep_storage::models::ToolCallRecord;

use crate::ActionExecutor;

/// The single reply a caller receives once its tool call reaches a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalResponse {
	pub status: ToolCallStatus,
	pub tool_call_id: Uuid,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	pub message: String,
}
impl TerminalResponse {
	pub(crate) fn completed(tool_call_id: Uuid, result: Value, summary: String) -> Self {
		Self {
			status: ToolCallStatus::Completed,
			tool_call_id,
			result: Some(result),
			error: None,
			message: summary,
		}
	}

	pub(crate) fn cancelled(tool_call_id: Uuid, gate: Option<u8>) -> Self {
		Self {
			status: ToolCallStatus::Cancelled,
			tool_call_id,
			result: None,
			error: None,
			message: cancelled_message(gate),
		}
	}

	pub(crate) fn failed(tool_call_id: Uuid, error: String) -> Self {
		Self {
			status: ToolCallStatus::Failed,
			tool_call_id,
			message: format!("The tool call failed: {error}"),
			result: None,
			error: Some(error),
		}
	}

	/// Rebuilds the response from a stored terminal record. `None` while the record is in flight.
	pub(crate) fn from_record(
		record: &ToolCallRecord,
		action: &dyn ActionExecutor,
	) -> Option<Self> {
		let response = match record.status {
			ToolCallStatus::Completed => {
				let result = record.result.clone().unwrap_or(Value::Null);
				let summary = action.summarize(&result);

				Self::completed(record.tool_call_id, result, summary)
			},
			ToolCallStatus::Cancelled =>
				Self::cancelled(record.tool_call_id, record.cancelled_at_gate),
			ToolCallStatus::Failed => Self::failed(
				record.tool_call_id,
				record.error.clone().unwrap_or_else(|| "unknown error".to_string()),
			),
			_ => return None,
		};

		Some(response)
	}
}

fn cancelled_message(gate: Option<u8>) -> String {
	match gate {
		Some(gate) => format!("The tool call was cancelled at gate {gate}."),
		None => "The tool call was cancelled.".to_string(),
	}
}

/// Public view of a persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallView {
	pub tool_call_id: Uuid,
	pub status: ToolCallStatus,
	pub parameters: Value,
	pub result: Option<Value>,
	pub error: Option<String>,
	pub cancelled_at_gate: Option<u8>,
	pub callback_url: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<ToolCallRecord> for ToolCallView {
	fn from(record: ToolCallRecord) -> Self {
		Self {
			tool_call_id: record.tool_call_id,
			status: record.status,
			parameters: record.parameters,
			result: record.result,
			error: record.error,
			cancelled_at_gate: record.cancelled_at_gate,
			callback_url: record.callback_url,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}
