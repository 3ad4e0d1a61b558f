use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use gatekeep_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn set_key(value: &mut Value, section: &str, key: &str, new_value: Value) {
	let mut table = value.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), new_value);
}

fn remove_section(value: &mut Value, section: &str) {
	value.as_table_mut().expect("Sample config must be a table.").remove(section);
}

fn parse_value(value: &Value) -> gatekeep_config::Result<Config> {
	let raw = toml::to_string(value).expect("Failed to render config.");

	gatekeep_config::parse(&raw)
}

fn validation_message(value: &Value) -> String {
	match parse_value(value) {
		Err(Error::Validation { message }) => message,
		other => panic!("Expected validation error, got {other:?}."),
	}
}

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock before epoch.").as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = env::temp_dir().join(format!("gatekeep_config_test_{nanos}_{seq}.toml"));

	fs::write(&path, payload).expect("Failed to write temp config.");

	path
}

#[test]
fn sample_config_loads_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let cfg = gatekeep_config::load(&path).expect("Sample config must load.");

	fs::remove_file(&path).expect("Failed to remove temp config.");

	assert_eq!(cfg.gates.gate1_timeout_ms, 10_000);
	assert_eq!(cfg.gates.gate2_timeout_ms, 35_000);
	assert_eq!(cfg.callback.max_attempts, 3);
	assert_eq!(cfg.callback.webhook_secret.as_deref(), Some("shared-secret"));
	assert_eq!(cfg.search.vector_dim, 3);
}

#[test]
fn blank_api_token_is_normalized_to_none() {
	let cfg = parse_value(&sample_value()).expect("Sample config must parse.");

	assert!(cfg.security.api_auth_token.is_none());
}

#[test]
fn gate_and_callback_sections_fall_back_to_defaults() {
	let mut value = sample_value();

	remove_section(&mut value, "gates");
	remove_section(&mut value, "callback");

	let cfg = parse_value(&value).expect("Config without optional sections must parse.");

	assert_eq!(cfg.gates.gate1_timeout_ms, 10_000);
	assert_eq!(cfg.gates.gate2_timeout_ms, 35_000);
	assert_eq!(cfg.gates.notify_timeout_ms, 10_000);
	assert_eq!(cfg.callback.max_attempts, 3);
	assert_eq!(cfg.callback.backoff_base_ms, 500);
	assert!(cfg.callback.webhook_secret.is_none());
	assert!(cfg.callback.default_headers.is_empty());
}

#[test]
fn max_limit_defaults_to_ceiling() {
	let mut value = sample_value();

	value
		.get_mut("search")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [search].")
		.remove("max_limit");

	let cfg = parse_value(&value).expect("Config must parse.");

	assert_eq!(cfg.search.max_limit, gatekeep_config::MAX_LIMIT_CEILING);
}

#[test]
fn zero_gate_timeout_is_rejected() {
	let mut value = sample_value();

	set_key(&mut value, "gates", "gate2_timeout_ms", Value::Integer(0));

	assert_eq!(validation_message(&value), "gates.gate2_timeout_ms must be greater than zero.");
}

#[test]
fn callback_attempts_must_be_bounded() {
	let mut value = sample_value();

	set_key(&mut value, "callback", "max_attempts", Value::Integer(0));

	assert!(validation_message(&value).starts_with("callback.max_attempts"));

	set_key(&mut value, "callback", "max_attempts", Value::Integer(11));

	assert!(validation_message(&value).starts_with("callback.max_attempts"));
}

#[test]
fn backoff_max_below_base_is_rejected() {
	let mut value = sample_value();

	set_key(&mut value, "callback", "backoff_base_ms", Value::Integer(1_000));
	set_key(&mut value, "callback", "backoff_max_ms", Value::Integer(10));

	assert!(validation_message(&value).starts_with("callback.backoff_max_ms"));
}

#[test]
fn non_string_default_header_is_rejected() {
	let mut value = sample_value();

	set_key(&mut value, "callback.default_headers", "X-Retry", Value::Integer(3));

	assert_eq!(validation_message(&value), "callback.default_headers values must be strings.");
}

#[test]
fn max_limit_above_ceiling_is_rejected() {
	let mut value = sample_value();

	set_key(&mut value, "search", "max_limit", Value::Integer(1_001));

	assert!(validation_message(&value).starts_with("search.max_limit"));
}

#[test]
fn zero_vector_dim_is_rejected() {
	let mut value = sample_value();

	set_key(&mut value, "search", "vector_dim", Value::Integer(0));

	assert_eq!(validation_message(&value), "search.vector_dim must be greater than zero.");
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("gatekeep_config_missing_file.toml");
	let err = gatekeep_config::load(&path).expect_err("Missing file must fail.");

	assert!(matches!(err, Error::ReadConfig { .. }), "unexpected error: {err:?}");
}

#[test]
fn malformed_file_reports_parse_error_with_path() {
	let path = write_temp_config("[service\nhttp_bind = ");
	let err = gatekeep_config::load(&path).expect_err("Malformed file must fail.");

	fs::remove_file(&path).expect("Failed to remove temp config.");

	match err {
		Error::ParseConfig { path: reported, .. } => assert_eq!(reported, path),
		other => panic!("Expected parse error, got {other:?}."),
	}
}
