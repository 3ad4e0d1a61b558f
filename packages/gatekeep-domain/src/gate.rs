use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ToolCallStatus;

/// A checkpoint in the pipeline. Gates one and two ask for a decision; gate three reports the
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
	One,
	Two,
	Three,
}
impl Gate {
	pub fn number(self) -> u8 {
		match self {
			Self::One => 1,
			Self::Two => 2,
			Self::Three => 3,
		}
	}

	pub fn from_number(number: u8) -> Option<Self> {
		match number {
			1 => Some(Self::One),
			2 => Some(Self::Two),
			3 => Some(Self::Three),
			_ => None,
		}
	}

	/// Status held while this gate waits for a reply. Gate three never waits.
	pub fn pending_status(self) -> Option<ToolCallStatus> {
		match self {
			Self::One => Some(ToolCallStatus::Gate1Pending),
			Self::Two => Some(ToolCallStatus::Gate2Pending),
			Self::Three => None,
		}
	}

	/// Inverse of [`Gate::pending_status`].
	pub fn pending_at(status: ToolCallStatus) -> Option<Self> {
		match status {
			ToolCallStatus::Gate1Pending => Some(Self::One),
			ToolCallStatus::Gate2Pending => Some(Self::Two),
			_ => None,
		}
	}
}

/// Body POSTed to a tool call's `callback_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateNotification {
	pub tool_call_id: Uuid,
	pub gate: u8,
	pub status: ToolCallStatus,
	pub message: String,
}
impl GateNotification {
	/// Asks the external party whether the pipeline may pass `gate`.
	pub fn request(tool_call_id: Uuid, gate: Gate) -> Self {
		let (status, message) = match gate {
			Gate::One => (
				ToolCallStatus::Gate1Pending,
				"Preparing to run the search. Reply with cancel=true to stop it.",
			),
			Gate::Two => (
				ToolCallStatus::Gate2Pending,
				"Ready to run the search. Reply with cancel=true to stop it.",
			),
			Gate::Three => (ToolCallStatus::Completed, "The search has finished."),
		};

		Self { tool_call_id, gate: gate.number(), status, message: message.to_string() }
	}

	/// Reports that the tool call was cancelled while waiting at `gate`.
	pub fn cancelled(tool_call_id: Uuid, gate: Gate) -> Self {
		Self {
			tool_call_id,
			gate: gate.number(),
			status: ToolCallStatus::Cancelled,
			message: format!("The tool call was cancelled at gate {}.", gate.number()),
		}
	}

	/// Gate three: the result is available.
	pub fn completed(tool_call_id: Uuid, summary: impl Into<String>) -> Self {
		Self {
			tool_call_id,
			gate: Gate::Three.number(),
			status: ToolCallStatus::Completed,
			message: summary.into(),
		}
	}
}

/// Reply to a gate notification. Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReply {
	#[serde(default)]
	pub cancel: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub acknowledged: Option<bool>,
}

/// How a notify-and-wait sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
	Acknowledged(GateReply),
	/// The gate budget elapsed before any attempt produced a reply.
	Timeout,
	/// A non-retryable status (4xx other than 429).
	Rejected { status: u16 },
	/// Every attempt failed with a retryable error.
	Unreachable { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
	Continue,
	Cancel,
}
impl GateDecision {
	/// Only an explicit `cancel=true` stops the pipeline. Silence and delivery failures continue.
	pub fn from_outcome(outcome: &NotifyOutcome) -> Self {
		match outcome {
			NotifyOutcome::Acknowledged(reply) if reply.cancel => Self::Cancel,
			_ => Self::Continue,
		}
	}
}
