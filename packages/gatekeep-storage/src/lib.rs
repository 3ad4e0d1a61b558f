pub mod db;
pub mod documents;
pub mod memory;
pub mod models;
pub mod schema;
pub mod store;
pub mod tool_calls;

mod error;

pub use error::Error;
pub use store::{BoxFuture, ToolCallStore};

pub type Result<T, E = Error> = std::result::Result<T, E>;
