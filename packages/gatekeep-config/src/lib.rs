mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Callback, Config, Gates, Postgres, Search, Security, Service, Storage};

use std::{fs, path::Path};

/// Hard ceiling for `search.max_limit`.
pub const MAX_LIMIT_CEILING: u32 = 1_000;

const MAX_CALLBACK_ATTEMPTS: u32 = 10;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("gates.gate1_timeout_ms", cfg.gates.gate1_timeout_ms),
		("gates.gate2_timeout_ms", cfg.gates.gate2_timeout_ms),
		("gates.notify_timeout_ms", cfg.gates.notify_timeout_ms),
		("callback.backoff_base_ms", cfg.callback.backoff_base_ms),
		("callback.backoff_max_ms", cfg.callback.backoff_max_ms),
		("callback.request_timeout_ms", cfg.callback.request_timeout_ms),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	if cfg.callback.max_attempts == 0 || cfg.callback.max_attempts > MAX_CALLBACK_ATTEMPTS {
		return Err(Error::Validation {
			message: format!("callback.max_attempts must be in the range 1-{MAX_CALLBACK_ATTEMPTS}."),
		});
	}
	if cfg.callback.backoff_max_ms < cfg.callback.backoff_base_ms {
		return Err(Error::Validation {
			message: "callback.backoff_max_ms must be greater than or equal to callback.backoff_base_ms."
				.to_string(),
		});
	}
	if cfg.callback.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "callback.default_headers values must be strings.".to_string(),
		});
	}
	if cfg.search.vector_dim == 0 {
		return Err(Error::Validation {
			message: "search.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit == 0 || cfg.search.max_limit > MAX_LIMIT_CEILING {
		return Err(Error::Validation {
			message: format!("search.max_limit must be in the range 1-{MAX_LIMIT_CEILING}."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.callback.webhook_secret.as_deref().map(|secret| secret.trim().is_empty()).unwrap_or(false)
	{
		cfg.callback.webhook_secret = None;
	}
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
}
