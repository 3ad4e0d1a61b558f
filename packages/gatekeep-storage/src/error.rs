use uuid::Uuid;

use gatekeep_domain::ToolCallStatus;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Tool call {0} not found.")]
	NotFound(Uuid),
	#[error("Tool call {0} already exists.")]
	DuplicateId(Uuid),
	#[error("Tool call {tool_call_id} is {current}; transition rejected.")]
	Conflict { tool_call_id: Uuid, current: ToolCallStatus },
	#[error("Stored tool call is malformed: {0}")]
	Corrupt(String),
}
