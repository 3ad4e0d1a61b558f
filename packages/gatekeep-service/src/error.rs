use uuid::Uuid;

use gatekeep_domain::ToolCallStatus;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, fields: Vec<String> },
	#[error("Tool call {tool_call_id} not found.")]
	NotFound { tool_call_id: Uuid },
	#[error("Tool call {tool_call_id} already exists.")]
	DuplicateId { tool_call_id: Uuid },
	#[error("Tool call {tool_call_id} is already {current}.")]
	Conflict { tool_call_id: Uuid, current: ToolCallStatus },
	#[error("Cannot move a tool call from {from} to {to}.")]
	InvalidTransition { from: ToolCallStatus, to: ToolCallStatus },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>, field: Option<&str>) -> Self {
		Self::InvalidRequest {
			message: message.into(),
			fields: field.map(|field| vec![field.to_string()]).unwrap_or_default(),
		}
	}
}

impl From<gatekeep_storage::Error> for Error {
	fn from(err: gatekeep_storage::Error) -> Self {
		match err {
			gatekeep_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			gatekeep_storage::Error::Corrupt(message) => Self::Storage { message },
			// The controller builds every update, so a malformed one is a bug here.
			gatekeep_storage::Error::InvalidArgument(message) => Self::Internal { message },
			gatekeep_storage::Error::NotFound(tool_call_id) => Self::NotFound { tool_call_id },
			gatekeep_storage::Error::DuplicateId(tool_call_id) => Self::DuplicateId { tool_call_id },
			gatekeep_storage::Error::Conflict { tool_call_id, current } =>
				Self::Conflict { tool_call_id, current },
		}
	}
}
