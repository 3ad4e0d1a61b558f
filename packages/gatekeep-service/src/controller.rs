//! The gate state machine.
//!
//! Each tool call walks `EXECUTING -> GATE1_PENDING -> GATE2_PENDING -> ACTION_RUNNING` and ends in
//! `COMPLETED`, `CANCELLED`, or `FAILED`. Every move is checked against
//! [`ToolCallStatus::can_transition_to`] and committed through the store's compare-and-set; a move
//! the store refuses is dropped and the stored outcome wins.

use std::time::Duration;

use tokio::time;
use uuid::Uuid;

use gatekeep_domain::{Gate, GateDecision, GateNotification, NotifyOutcome, ToolCallStatus};
use gatekeep_storage::models::{ToolCallRecord, ToolCallUpdate};

use crate::{Error, GateService, Result, TerminalResponse};

pub(crate) enum Step {
	Applied(ToolCallRecord),
	/// The store refused the move; holds the record as it stands now.
	Superseded(ToolCallRecord),
}

impl GateService {
	/// Drives a freshly created record to a terminal status.
	pub async fn run_pipeline(&self, record: ToolCallRecord) -> Result<TerminalResponse> {
		let tool_call_id = record.tool_call_id;
		let callback_url = record.callback_url.as_str();

		tracing::info!(%tool_call_id, "Tool call pipeline started.");

		if let Step::Superseded(current) = self
			.transition(
				tool_call_id,
				ToolCallUpdate::transition(ToolCallStatus::Executing, ToolCallStatus::Gate1Pending),
			)
			.await?
		{
			return self.respond_with_stored(current);
		}

		for gate in [Gate::One, Gate::Two] {
			let Some(pending) = gate.pending_status() else {
				continue;
			};
			let outcome = self
				.notify_gate(
					callback_url,
					&GateNotification::request(tool_call_id, gate),
					self.gate_budget(gate),
				)
				.await;

			log_outcome(tool_call_id, gate, &outcome);

			match GateDecision::from_outcome(&outcome) {
				GateDecision::Cancel => {
					let update = ToolCallUpdate::transition(pending, ToolCallStatus::Cancelled)
						.with_cancelled_at_gate(gate.number());

					return match self.transition(tool_call_id, update).await? {
						Step::Applied(_) => {
							self.send_cancellation_notice(callback_url, tool_call_id, gate).await;

							Ok(TerminalResponse::cancelled(tool_call_id, Some(gate.number())))
						},
						Step::Superseded(current) => self.respond_with_stored(current),
					};
				},
				GateDecision::Continue => {
					let next = match gate {
						Gate::One => ToolCallStatus::Gate2Pending,
						_ => ToolCallStatus::ActionRunning,
					};

					if let Step::Superseded(current) =
						self.transition(tool_call_id, ToolCallUpdate::transition(pending, next)).await?
					{
						return self.respond_with_stored(current);
					}
				},
			}
		}

		self.run_action(&record).await
	}

	async fn run_action(&self, record: &ToolCallRecord) -> Result<TerminalResponse> {
		let tool_call_id = record.tool_call_id;

		tracing::info!(%tool_call_id, "Action started.");

		match self.action.execute(&record.parameters).await {
			Ok(output) => {
				let update =
					ToolCallUpdate::transition(ToolCallStatus::ActionRunning, ToolCallStatus::Completed)
						.with_result(output.result.clone());

				match self.transition(tool_call_id, update).await? {
					Step::Applied(_) => {
						let outcome = self
							.notify_gate(
								&record.callback_url,
								&GateNotification::completed(tool_call_id, output.summary.as_str()),
								self.notify_budget(),
							)
							.await;

						log_outcome(tool_call_id, Gate::Three, &outcome);

						Ok(TerminalResponse::completed(tool_call_id, output.result, output.summary))
					},
					Step::Superseded(current) => self.respond_with_stored(current),
				}
			},
			Err(err) => {
				let message = err.to_string();

				tracing::error!(%tool_call_id, error = %message, "Action failed.");

				let update =
					ToolCallUpdate::transition(ToolCallStatus::ActionRunning, ToolCallStatus::Failed)
						.with_error(message.as_str());

				match self.transition(tool_call_id, update).await? {
					Step::Applied(_) => Ok(TerminalResponse::failed(tool_call_id, message)),
					Step::Superseded(current) => self.respond_with_stored(current),
				}
			},
		}
	}

	/// Checks the transition table, then asks the store to commit. A store conflict is logged and
	/// reported as [`Step::Superseded`], never retried.
	pub(crate) async fn transition(
		&self,
		tool_call_id: Uuid,
		update: ToolCallUpdate,
	) -> Result<Step> {
		let (from, to) = (update.from, update.to);

		if !from.can_transition_to(to) {
			return Err(Error::InvalidTransition { from, to });
		}

		match self.store.update(tool_call_id, update).await {
			Ok(record) => {
				tracing::info!(%tool_call_id, %from, %to, "Tool call status changed.");

				Ok(Step::Applied(record))
			},
			Err(gatekeep_storage::Error::Conflict { current, .. }) => {
				tracing::warn!(
					%tool_call_id,
					%from,
					%to,
					%current,
					"Transition dropped; the stored status moved on."
				);

				Ok(Step::Superseded(self.store.get(tool_call_id).await?))
			},
			Err(err) => Err(err.into()),
		}
	}

	pub(crate) async fn send_cancellation_notice(
		&self,
		callback_url: &str,
		tool_call_id: Uuid,
		gate: Gate,
	) {
		let outcome = self
			.notify_gate(
				callback_url,
				&GateNotification::cancelled(tool_call_id, gate),
				self.notify_budget(),
			)
			.await;

		log_outcome(tool_call_id, gate, &outcome);
	}

	/// The budget is enforced here as well, so a notifier that ignores it still cannot stall a gate.
	async fn notify_gate(
		&self,
		callback_url: &str,
		notification: &GateNotification,
		budget: Duration,
	) -> NotifyOutcome {
		time::timeout(budget, self.notifier.notify(callback_url, notification, budget))
			.await
			.unwrap_or(NotifyOutcome::Timeout)
	}

	fn respond_with_stored(&self, current: ToolCallRecord) -> Result<TerminalResponse> {
		match TerminalResponse::from_record(&current, self.action.as_ref()) {
			Some(response) => Ok(response),
			None => Err(Error::Conflict { tool_call_id: current.tool_call_id, current: current.status }),
		}
	}

	fn gate_budget(&self, gate: Gate) -> Duration {
		match gate {
			Gate::One => Duration::from_millis(self.gates.gate1_timeout_ms),
			Gate::Two => Duration::from_millis(self.gates.gate2_timeout_ms),
			Gate::Three => self.notify_budget(),
		}
	}
}

fn log_outcome(tool_call_id: Uuid, gate: Gate, outcome: &NotifyOutcome) {
	let gate = gate.number();

	match outcome {
		NotifyOutcome::Acknowledged(reply) => {
			tracing::info!(%tool_call_id, gate, cancel = reply.cancel, "Gate replied.");
		},
		NotifyOutcome::Timeout => {
			tracing::info!(%tool_call_id, gate, "Gate budget elapsed; continuing.");
		},
		NotifyOutcome::Rejected { status } => {
			tracing::warn!(%tool_call_id, gate, status, "Callback rejected the notification.");
		},
		NotifyOutcome::Unreachable { message } => {
			tracing::warn!(%tool_call_id, gate, error = %message, "Callback unreachable.");
		},
	}
}
