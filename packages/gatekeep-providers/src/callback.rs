use std::time::Duration;

use reqwest::{Client, StatusCode, header::HeaderMap};
use tokio::time;

use gatekeep_domain::{GateNotification, GateReply, NotifyOutcome};

use crate::{Error, Result};

/// Delivers gate notifications with bounded retries.
#[derive(Clone, Debug)]
pub struct CallbackClient {
	client: Client,
	headers: HeaderMap,
	max_attempts: u32,
	backoff_base: Duration,
	backoff_max: Duration,
}

enum Attempt {
	Done(NotifyOutcome),
	Retry(String),
}

impl CallbackClient {
	pub fn new(cfg: &gatekeep_config::Callback) -> Result<Self> {
		if cfg.max_attempts == 0 {
			return Err(Error::InvalidConfig {
				message: "callback.max_attempts must be greater than zero.".to_string(),
			});
		}

		let client =
			Client::builder().timeout(Duration::from_millis(cfg.request_timeout_ms)).build()?;
		let headers =
			crate::callback_headers(cfg.webhook_secret.as_deref(), &cfg.default_headers)?;

		Ok(Self {
			client,
			headers,
			max_attempts: cfg.max_attempts,
			backoff_base: Duration::from_millis(cfg.backoff_base_ms),
			backoff_max: Duration::from_millis(cfg.backoff_max_ms),
		})
	}

	/// POSTs `notification` to `url` and waits for a reply. `budget` bounds the whole sequence,
	/// backoff sleeps included.
	pub async fn notify(
		&self,
		url: &str,
		notification: &GateNotification,
		budget: Duration,
	) -> NotifyOutcome {
		match time::timeout(budget, self.deliver(url, notification)).await {
			Ok(outcome) => outcome,
			Err(_) => {
				tracing::info!(
					tool_call_id = %notification.tool_call_id,
					gate = notification.gate,
					budget_ms = budget.as_millis() as u64,
					"Callback budget elapsed without a reply."
				);

				NotifyOutcome::Timeout
			},
		}
	}

	async fn deliver(&self, url: &str, notification: &GateNotification) -> NotifyOutcome {
		let mut last_failure = String::new();

		for attempt in 1..=self.max_attempts {
			match self.send_once(url, notification).await {
				Attempt::Done(outcome) => return outcome,
				Attempt::Retry(message) => {
					tracing::warn!(
						tool_call_id = %notification.tool_call_id,
						gate = notification.gate,
						attempt,
						max_attempts = self.max_attempts,
						error = %message,
						"Callback attempt failed."
					);

					last_failure = message;

					if attempt < self.max_attempts {
						time::sleep(backoff_for_attempt(attempt, self.backoff_base, self.backoff_max))
							.await;
					}
				},
			}
		}

		NotifyOutcome::Unreachable {
			message: format!("Callback failed after {} attempts: {last_failure}", self.max_attempts),
		}
	}

	async fn send_once(&self, url: &str, notification: &GateNotification) -> Attempt {
		let res = match self
			.client
			.post(url)
			.headers(self.headers.clone())
			.json(notification)
			.send()
			.await
		{
			Ok(res) => res,
			Err(err) => return Attempt::Retry(err.to_string()),
		};
		let status = res.status();

		if status.is_success() {
			// An empty or malformed body still counts as an acknowledgement.
			let reply = match res.bytes().await {
				Ok(body) => serde_json::from_slice::<GateReply>(&body).unwrap_or_default(),
				Err(_) => GateReply::default(),
			};

			return Attempt::Done(NotifyOutcome::Acknowledged(reply));
		}
		if is_retryable(status) {
			return Attempt::Retry(format!("Callback returned HTTP {status}."));
		}

		Attempt::Done(NotifyOutcome::Rejected { status: status.as_u16() })
	}
}

fn is_retryable(status: StatusCode) -> bool {
	status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Delay before the retry that follows `attempt` (1-based): `base * 2^(attempt - 1)`, capped.
pub fn backoff_for_attempt(attempt: u32, base: Duration, max: Duration) -> Duration {
	let exp = attempt.max(1).saturating_sub(1).min(16);

	base.saturating_mul(1 << exp).min(max)
}
