use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use gatekeep_domain::ToolCallStatus;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
	pub tool_call_id: Uuid,
	pub status: ToolCallStatus,
	pub parameters: Value,
	pub result: Option<Value>,
	pub error: Option<String>,
	pub cancelled_at_gate: Option<u8>,
	pub callback_url: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewToolCall {
	pub tool_call_id: Uuid,
	pub parameters: Value,
	pub callback_url: String,
}

/// A compare-and-set transition plus the fields that travel with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallUpdate {
	pub from: ToolCallStatus,
	pub to: ToolCallStatus,
	pub result: Option<Value>,
	pub error: Option<String>,
	pub cancelled_at_gate: Option<u8>,
}
impl ToolCallUpdate {
	pub fn transition(from: ToolCallStatus, to: ToolCallStatus) -> Self {
		Self { from, to, result: None, error: None, cancelled_at_gate: None }
	}

	pub fn with_result(mut self, result: Value) -> Self {
		self.result = Some(result);

		self
	}

	pub fn with_error(mut self, error: impl Into<String>) -> Self {
		self.error = Some(error.into());

		self
	}

	pub fn with_cancelled_at_gate(mut self, gate: u8) -> Self {
		self.cancelled_at_gate = Some(gate);

		self
	}

	/// Checks the shape of the update. Whether it still applies is decided by the store.
	pub fn validate(&self) -> Result<()> {
		if self.from.is_terminal() {
			// Terminal sources are rejected as conflicts by the store.
			return Ok(());
		}
		if !self.from.can_transition_to(self.to) {
			return Err(Error::InvalidArgument(format!(
				"{} -> {} is not a valid transition.",
				self.from, self.to
			)));
		}
		if self.result.is_some() && self.to != ToolCallStatus::Completed {
			return Err(Error::InvalidArgument(
				"result may only be written with COMPLETED.".to_string(),
			));
		}
		if self.error.is_some() && self.to != ToolCallStatus::Failed {
			return Err(Error::InvalidArgument(
				"error may only be written with FAILED.".to_string(),
			));
		}
		if let Some(gate) = self.cancelled_at_gate {
			if self.to != ToolCallStatus::Cancelled {
				return Err(Error::InvalidArgument(
					"cancelled_at_gate may only be written with CANCELLED.".to_string(),
				));
			}
			if !matches!(gate, 1 | 2) {
				return Err(Error::InvalidArgument(format!(
					"cancelled_at_gate must be 1 or 2, got {gate}."
				)));
			}
		}

		Ok(())
	}
}
