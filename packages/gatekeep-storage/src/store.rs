use std::{future::Future, pin::Pin};

use uuid::Uuid;

use crate::{
	Result,
	models::{NewToolCall, ToolCallRecord, ToolCallUpdate},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence seam for tool-call records.
///
/// `update` is a compare-and-set: it applies only when the stored status equals `update.from`
/// and that status is not terminal. Otherwise it fails with [`crate::Error::Conflict`] and the
/// stored record is left untouched.
pub trait ToolCallStore: Send + Sync {
	fn create<'a>(&'a self, new: NewToolCall) -> BoxFuture<'a, Result<ToolCallRecord>>;

	fn update<'a>(
		&'a self,
		tool_call_id: Uuid,
		update: ToolCallUpdate,
	) -> BoxFuture<'a, Result<ToolCallRecord>>;

	fn get<'a>(&'a self, tool_call_id: Uuid) -> BoxFuture<'a, Result<ToolCallRecord>>;
}
