use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lifecycle of a tool call. Variants are listed in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolCallStatus {
	Executing,
	Gate1Pending,
	Gate2Pending,
	ActionRunning,
	Completed,
	Cancelled,
	Failed,
}
impl ToolCallStatus {
	pub const ALL: [Self; 7] = [
		Self::Executing,
		Self::Gate1Pending,
		Self::Gate2Pending,
		Self::ActionRunning,
		Self::Completed,
		Self::Cancelled,
		Self::Failed,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Executing => "EXECUTING",
			Self::Gate1Pending => "GATE1_PENDING",
			Self::Gate2Pending => "GATE2_PENDING",
			Self::ActionRunning => "ACTION_RUNNING",
			Self::Completed => "COMPLETED",
			Self::Cancelled => "CANCELLED",
			Self::Failed => "FAILED",
		}
	}

	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
	}

	/// The full transition table. Anything not listed here is rejected, including self-loops.
	pub fn can_transition_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(Self::Executing, Self::Gate1Pending)
				| (Self::Gate1Pending, Self::Gate2Pending)
				| (Self::Gate1Pending, Self::Cancelled)
				| (Self::Gate2Pending, Self::ActionRunning)
				| (Self::Gate2Pending, Self::Cancelled)
				| (Self::ActionRunning, Self::Completed)
				| (Self::ActionRunning, Self::Failed)
		)
	}

	/// Statuses an external cancellation signal may interrupt.
	pub fn is_cancellable(self) -> bool {
		self.can_transition_to(Self::Cancelled)
	}
}

impl fmt::Display for ToolCallStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tool call status {0:?}.")]
pub struct UnknownStatus(pub String);

impl FromStr for ToolCallStatus {
	type Err = UnknownStatus;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|status| status.as_str() == raw)
			.ok_or_else(|| UnknownStatus(raw.to_string()))
	}
}
