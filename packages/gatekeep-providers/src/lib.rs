pub mod callback;

mod error;

pub use callback::CallbackClient;
pub use error::{Error, Result};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Headers sent with every callback: JSON content type, the configured defaults, then the shared
/// secret, which wins over a default header of the same name.
pub fn callback_headers(
	webhook_secret: Option<&str>,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	if let Some(secret) = webhook_secret {
		headers.insert(HeaderName::from_static(WEBHOOK_SECRET_HEADER), secret.parse()?);
	}

	Ok(headers)
}
