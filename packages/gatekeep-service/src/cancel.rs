use uuid::Uuid;

use gatekeep_domain::{Gate, ToolCallStatus};
use gatekeep_storage::models::ToolCallUpdate;

use crate::{Error, GateService, Result, TerminalResponse, controller::Step};

impl GateService {
	/// Cancels a tool call that is waiting at gate 1 or gate 2.
	///
	/// The in-flight pipeline notices on its next store write, which the store refuses.
	pub async fn cancel(&self, tool_call_id: Uuid) -> Result<TerminalResponse> {
		let mut record = self.store.get(tool_call_id).await?;

		loop {
			if record.status.is_terminal() {
				return Err(Error::Conflict { tool_call_id, current: record.status });
			}

			let Some(gate) = Gate::pending_at(record.status) else {
				return Err(Error::InvalidTransition {
					from: record.status,
					to: ToolCallStatus::Cancelled,
				});
			};
			let update = ToolCallUpdate::transition(record.status, ToolCallStatus::Cancelled)
				.with_cancelled_at_gate(gate.number());

			match self.transition(tool_call_id, update).await? {
				Step::Applied(cancelled) => {
					tracing::info!(%tool_call_id, gate = gate.number(), "Tool call cancelled externally.");

					self.send_cancellation_notice(&cancelled.callback_url, tool_call_id, gate).await;

					return Ok(TerminalResponse::cancelled(tool_call_id, Some(gate.number())));
				},
				// The pipeline moved on between the read and the write; judge the new status.
				Step::Superseded(current) => record = current,
			}
		}
	}
}
