use std::{collections::HashMap, future, sync::Mutex};

use time::OffsetDateTime;
use uuid::Uuid;

use gatekeep_domain::ToolCallStatus;

use crate::{
	BoxFuture, Error, Result, ToolCallStore,
	models::{NewToolCall, ToolCallRecord, ToolCallUpdate},
};

/// Process-local store. Every operation runs under a single lock, so each update is atomic.
#[derive(Debug, Default)]
pub struct MemoryToolCallStore {
	records: Mutex<HashMap<Uuid, ToolCallRecord>>,
}
impl MemoryToolCallStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.records.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn create_sync(&self, new: NewToolCall) -> Result<ToolCallRecord> {
		let mut records = self.records.lock().unwrap_or_else(|err| err.into_inner());

		if records.contains_key(&new.tool_call_id) {
			return Err(Error::DuplicateId(new.tool_call_id));
		}

		let now = OffsetDateTime::now_utc();
		let record = ToolCallRecord {
			tool_call_id: new.tool_call_id,
			status: ToolCallStatus::Executing,
			parameters: new.parameters,
			result: None,
			error: None,
			cancelled_at_gate: None,
			callback_url: new.callback_url,
			created_at: now,
			updated_at: now,
		};

		records.insert(record.tool_call_id, record.clone());

		Ok(record)
	}

	fn update_sync(&self, tool_call_id: Uuid, update: ToolCallUpdate) -> Result<ToolCallRecord> {
		let mut records = self.records.lock().unwrap_or_else(|err| err.into_inner());
		let Some(record) = records.get_mut(&tool_call_id) else {
			return Err(Error::NotFound(tool_call_id));
		};

		// A terminal record answers every update with a conflict, malformed or not.
		if record.status.is_terminal() {
			return Err(Error::Conflict { tool_call_id, current: record.status });
		}

		update.validate()?;

		if record.status != update.from {
			return Err(Error::Conflict { tool_call_id, current: record.status });
		}

		record.status = update.to;

		if update.result.is_some() {
			record.result = update.result;
		}
		if update.error.is_some() {
			record.error = update.error;
		}
		if update.cancelled_at_gate.is_some() {
			record.cancelled_at_gate = update.cancelled_at_gate;
		}

		record.updated_at = OffsetDateTime::now_utc();

		Ok(record.clone())
	}

	fn get_sync(&self, tool_call_id: Uuid) -> Result<ToolCallRecord> {
		let records = self.records.lock().unwrap_or_else(|err| err.into_inner());

		records.get(&tool_call_id).cloned().ok_or(Error::NotFound(tool_call_id))
	}
}
impl ToolCallStore for MemoryToolCallStore {
	fn create<'a>(&'a self, new: NewToolCall) -> BoxFuture<'a, Result<ToolCallRecord>> {
		Box::pin(future::ready(self.create_sync(new)))
	}

	fn update<'a>(
		&'a self,
		tool_call_id: Uuid,
		update: ToolCallUpdate,
	) -> BoxFuture<'a, Result<ToolCallRecord>> {
		Box::pin(future::ready(self.update_sync(tool_call_id, update)))
	}

	fn get<'a>(&'a self, tool_call_id: Uuid) -> BoxFuture<'a, Result<ToolCallRecord>> {
		Box::pin(future::ready(self.get_sync(tool_call_id)))
	}
}
