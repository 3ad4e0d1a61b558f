use serde_json::Value;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use gatekeep_domain::ToolCallStatus;

use crate::{
	BoxFuture, Error, Result, ToolCallStore,
	models::{NewToolCall, ToolCallRecord, ToolCallUpdate},
};

const RETURNING: &str = "\
RETURNING
	tool_call_id,
	status,
	parameters,
	result,
	error,
	cancelled_at_gate,
	callback_url,
	created_at,
	updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ToolCallRow {
	tool_call_id: Uuid,
	status: String,
	parameters: Value,
	result: Option<Value>,
	error: Option<String>,
	cancelled_at_gate: Option<i16>,
	callback_url: String,
	created_at: OffsetDateTime,
	updated_at: OffsetDateTime,
}
impl TryFrom<ToolCallRow> for ToolCallRecord {
	type Error = Error;

	fn try_from(row: ToolCallRow) -> Result<Self> {
		let status =
			row.status.parse::<ToolCallStatus>().map_err(|err| Error::Corrupt(err.to_string()))?;
		let cancelled_at_gate = row
			.cancelled_at_gate
			.map(|gate| {
				u8::try_from(gate).map_err(|_| {
					Error::Corrupt(format!("cancelled_at_gate {gate} is out of range."))
				})
			})
			.transpose()?;

		Ok(Self {
			tool_call_id: row.tool_call_id,
			status,
			parameters: row.parameters,
			result: row.result,
			error: row.error,
			cancelled_at_gate,
			callback_url: row.callback_url,
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

/// `tool_calls` table store. Each update is a single conditional `UPDATE`.
#[derive(Clone, Debug)]
pub struct PgToolCallStore {
	pool: PgPool,
}
impl PgToolCallStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	async fn create_inner(&self, new: NewToolCall) -> Result<ToolCallRecord> {
		let sql = format!(
			"\
INSERT INTO tool_calls (tool_call_id, status, parameters, callback_url)
VALUES ($1, $2, $3, $4)
ON CONFLICT (tool_call_id) DO NOTHING
{RETURNING}"
		);
		let row: Option<ToolCallRow> = sqlx::query_as(&sql)
			.bind(new.tool_call_id)
			.bind(ToolCallStatus::Executing.as_str())
			.bind(&new.parameters)
			.bind(new.callback_url.as_str())
			.fetch_optional(&self.pool)
			.await?;

		match row {
			Some(row) => row.try_into(),
			None => Err(Error::DuplicateId(new.tool_call_id)),
		}
	}

	async fn update_inner(
		&self,
		tool_call_id: Uuid,
		update: ToolCallUpdate,
	) -> Result<ToolCallRecord> {
		if let Err(err) = update.validate() {
			let current = self.get_inner(tool_call_id).await?;

			if current.status.is_terminal() {
				return Err(Error::Conflict { tool_call_id, current: current.status });
			}

			return Err(err);
		}

		let sql = format!(
			"\
UPDATE tool_calls
SET
	status = $3,
	result = COALESCE($4, result),
	error = COALESCE($5, error),
	cancelled_at_gate = COALESCE($6, cancelled_at_gate),
	updated_at = now()
WHERE tool_call_id = $1
	AND status = $2
	AND status NOT IN ('COMPLETED', 'CANCELLED', 'FAILED')
{RETURNING}"
		);
		let row: Option<ToolCallRow> = sqlx::query_as(&sql)
			.bind(tool_call_id)
			.bind(update.from.as_str())
			.bind(update.to.as_str())
			.bind(update.result)
			.bind(update.error)
			.bind(update.cancelled_at_gate.map(i16::from))
			.fetch_optional(&self.pool)
			.await?;

		if let Some(row) = row {
			return row.try_into();
		}

		// Nothing matched: either the id is unknown or the status moved on.
		let current = self.get_inner(tool_call_id).await?;

		Err(Error::Conflict { tool_call_id, current: current.status })
	}

	async fn get_inner(&self, tool_call_id: Uuid) -> Result<ToolCallRecord> {
		let row: Option<ToolCallRow> = sqlx::query_as(
			"\
SELECT
	tool_call_id,
	status,
	parameters,
	result,
	error,
	cancelled_at_gate,
	callback_url,
	created_at,
	updated_at
FROM tool_calls
WHERE tool_call_id = $1",
		)
		.bind(tool_call_id)
		.fetch_optional(&self.pool)
		.await?;

		row.ok_or(Error::NotFound(tool_call_id))?.try_into()
	}
}
impl ToolCallStore for PgToolCallStore {
	fn create<'a>(&'a self, new: NewToolCall) -> BoxFuture<'a, Result<ToolCallRecord>> {
		Box::pin(self.create_inner(new))
	}

	fn update<'a>(
		&'a self,
		tool_call_id: Uuid,
		update: ToolCallUpdate,
	) -> BoxFuture<'a, Result<ToolCallRecord>> {
		Box::pin(self.update_inner(tool_call_id, update))
	}

	fn get<'a>(&'a self, tool_call_id: Uuid) -> BoxFuture<'a, Result<ToolCallRecord>> {
		Box::pin(self.get_inner(tool_call_id))
	}
}
