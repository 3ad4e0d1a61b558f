pub mod gate;
pub mod search;
pub mod status;

pub use gate::{Gate, GateDecision, GateNotification, GateReply, NotifyOutcome};
pub use search::{
	ParamError, QueryParams, SearchEnvelope, SearchLimits, SearchMatch, SearchParams,
	format_results,
};
pub use status::{ToolCallStatus, UnknownStatus};
