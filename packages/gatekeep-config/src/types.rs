use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub gates: Gates,
	#[serde(default)]
	pub callback: Callback,
	pub search: Search,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Wall-clock budgets for each notification, retries included.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Gates {
	pub gate1_timeout_ms: u64,
	pub gate2_timeout_ms: u64,
	/// Budget for the result (gate 3) and cancellation notices.
	pub notify_timeout_ms: u64,
}
impl Default for Gates {
	fn default() -> Self {
		Self { gate1_timeout_ms: 10_000, gate2_timeout_ms: 35_000, notify_timeout_ms: 10_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Callback {
	pub max_attempts: u32,
	pub backoff_base_ms: u64,
	pub backoff_max_ms: u64,
	/// Upper bound for a single HTTP attempt. The gate budget still wins when it is shorter.
	pub request_timeout_ms: u64,
	pub webhook_secret: Option<String>,
	pub default_headers: Map<String, Value>,
}
impl Default for Callback {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			backoff_base_ms: 500,
			backoff_max_ms: 8_000,
			request_timeout_ms: 10_000,
			webhook_secret: None,
			default_headers: Map::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub vector_dim: u32,
	#[serde(default = "default_max_limit")]
	pub max_limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub api_auth_token: Option<String>,
}

fn default_max_limit() -> u32 {
	crate::MAX_LIMIT_CEILING
}
