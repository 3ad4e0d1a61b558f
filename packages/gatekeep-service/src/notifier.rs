use std::time::Duration;

use gatekeep_domain::{GateNotification, NotifyOutcome};
use gatekeep_providers::CallbackClient;

use crate::BoxFuture;

/// Outbound side of a gate. Implementations never touch persisted state.
pub trait GateNotifier: Send + Sync {
	fn notify<'a>(
		&'a self,
		url: &'a str,
		notification: &'a GateNotification,
		budget: Duration,
	) -> BoxFuture<'a, NotifyOutcome>;
}

impl GateNotifier for CallbackClient {
	fn notify<'a>(
		&'a self,
		url: &'a str,
		notification: &'a GateNotification,
		budget: Duration,
	) -> BoxFuture<'a, NotifyOutcome> {
		Box::pin(CallbackClient::notify(self, url, notification, budget))
	}
}
