use serde_json::json;
use uuid::Uuid;

use gatekeep_domain::{
	Gate, GateDecision, GateNotification, GateReply, NotifyOutcome, ParamError, SearchLimits,
	SearchMatch, SearchParams, ToolCallStatus, format_results,
};

const LIMITS: SearchLimits = SearchLimits { vector_dim: 3, max_limit: 1_000 };

fn params(limit: u32, threshold: f64) -> SearchParams {
	SearchParams { embedding: vec![0.1, 0.2, 0.3], similarity_threshold: threshold, limit }
}

fn sample_match(id: &str, distance: f64) -> SearchMatch {
	SearchMatch {
		id: id.to_string(),
		content: format!("content for {id}"),
		distance,
		metadata: json!({}),
	}
}

#[test]
fn status_only_moves_forward() {
	let order = |status: ToolCallStatus| match status {
		ToolCallStatus::Executing => 0,
		ToolCallStatus::Gate1Pending => 1,
		ToolCallStatus::Gate2Pending => 2,
		ToolCallStatus::ActionRunning => 3,
		ToolCallStatus::Completed | ToolCallStatus::Cancelled | ToolCallStatus::Failed => 4,
	};

	for from in ToolCallStatus::ALL {
		for to in ToolCallStatus::ALL {
			if from.can_transition_to(to) {
				assert!(order(to) > order(from), "{from} -> {to} moves backward");
			}
		}
	}
}

#[test]
fn happy_path_is_a_chain_of_allowed_transitions() {
	let path = [
		ToolCallStatus::Executing,
		ToolCallStatus::Gate1Pending,
		ToolCallStatus::Gate2Pending,
		ToolCallStatus::ActionRunning,
		ToolCallStatus::Completed,
	];

	for pair in path.windows(2) {
		assert!(pair[0].can_transition_to(pair[1]));
	}
}

#[test]
fn gates_cannot_be_skipped() {
	assert!(!ToolCallStatus::Executing.can_transition_to(ToolCallStatus::Gate2Pending));
	assert!(!ToolCallStatus::Gate1Pending.can_transition_to(ToolCallStatus::ActionRunning));
	assert!(!ToolCallStatus::Executing.can_transition_to(ToolCallStatus::ActionRunning));
	assert!(!ToolCallStatus::Gate2Pending.can_transition_to(ToolCallStatus::Completed));
	assert!(!ToolCallStatus::Executing.can_transition_to(ToolCallStatus::Failed));
}

#[test]
fn only_pending_gates_are_cancellable() {
	let cancellable: Vec<_> =
		ToolCallStatus::ALL.into_iter().filter(|status| status.is_cancellable()).collect();

	assert_eq!(cancellable, vec![ToolCallStatus::Gate1Pending, ToolCallStatus::Gate2Pending]);
}

#[test]
fn gate_numbers_and_pending_statuses_agree() {
	for gate in [Gate::One, Gate::Two, Gate::Three] {
		assert_eq!(Gate::from_number(gate.number()), Some(gate));

		if let Some(status) = gate.pending_status() {
			assert_eq!(Gate::pending_at(status), Some(gate));
		}
	}

	assert_eq!(Gate::from_number(4), None);
	assert_eq!(Gate::Three.pending_status(), None);
}

#[test]
fn only_explicit_cancel_stops_the_pipeline() {
	let cancel = NotifyOutcome::Acknowledged(GateReply { cancel: true, acknowledged: None });
	let proceed = NotifyOutcome::Acknowledged(GateReply::default());

	assert_eq!(GateDecision::from_outcome(&cancel), GateDecision::Cancel);
	assert_eq!(GateDecision::from_outcome(&proceed), GateDecision::Continue);
	assert_eq!(GateDecision::from_outcome(&NotifyOutcome::Timeout), GateDecision::Continue);
	assert_eq!(
		GateDecision::from_outcome(&NotifyOutcome::Rejected { status: 404 }),
		GateDecision::Continue
	);
	assert_eq!(
		GateDecision::from_outcome(&NotifyOutcome::Unreachable { message: "refused".to_string() }),
		GateDecision::Continue
	);
}

#[test]
fn gate_reply_fields_default_when_absent() {
	let reply: GateReply = serde_json::from_value(json!({})).expect("empty reply must parse");

	assert!(!reply.cancel);
	assert_eq!(reply.acknowledged, None);

	let reply: GateReply =
		serde_json::from_value(json!({ "acknowledged": true })).expect("ack reply must parse");

	assert_eq!(reply.acknowledged, Some(true));
}

#[test]
fn notification_wire_shape() {
	let id = Uuid::new_v4();
	let value = serde_json::to_value(GateNotification::request(id, Gate::Two))
		.expect("serialize notification");

	assert_eq!(value["tool_call_id"], json!(id.to_string()));
	assert_eq!(value["gate"], json!(2));
	assert_eq!(value["status"], json!("GATE2_PENDING"));
	assert!(value["message"].as_str().is_some_and(|message| !message.is_empty()));

	let cancelled = GateNotification::cancelled(id, Gate::One);

	assert_eq!(cancelled.gate, 1);
	assert_eq!(cancelled.status, ToolCallStatus::Cancelled);
}

#[test]
fn empty_match_set_formats_to_zero_results() {
	let envelope = format_results(&params(10, 0.8), Vec::new());
	let value = serde_json::to_value(&envelope).expect("serialize envelope");

	assert_eq!(envelope.total_results, 0);
	assert_eq!(value["matches"], json!([]));
	assert_eq!(value["total_results"], json!(0));
	assert_eq!(envelope.summary(), "No matching results found.");
}

#[test]
fn formats_scenario_envelope() {
	let envelope =
		format_results(&params(10, 0.8), vec![sample_match("b", 0.42), sample_match("a", 0.15)]);
	let value = serde_json::to_value(&envelope).expect("serialize envelope");

	assert_eq!(value["total_results"], json!(2));
	assert_eq!(value["query_params"], json!({ "limit": 10, "threshold": 0.8 }));
	assert_eq!(value["matches"][0]["id"], json!("a"));
	assert_eq!(value["matches"][0]["distance"], json!(0.15));
	assert_eq!(value["matches"][1]["distance"], json!(0.42));
	assert_eq!(envelope.summary(), "Found 2 matching results.");
}

#[test]
fn formatter_caps_matches_at_limit_and_breaks_ties_by_id() {
	let envelope = format_results(
		&params(2, 1.0),
		vec![sample_match("c", 0.3), sample_match("b", 0.1), sample_match("a", 0.1)],
	);
	let ids: Vec<_> = envelope.matches.iter().map(|item| item.id.as_str()).collect();

	assert_eq!(ids, vec!["a", "b"]);
	assert_eq!(envelope.total_results, 2);
}

#[test]
fn parses_valid_search_parameters() {
	let parsed = SearchParams::from_value(
		&json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": 0.8, "limit": 10 }),
		&LIMITS,
	)
	.expect("valid parameters");

	assert_eq!(parsed.limit, 10);
	assert_eq!(parsed.similarity_threshold, 0.8);
	assert_eq!(parsed.embedding.len(), 3);
}

#[test]
fn rejects_missing_and_malformed_parameters() {
	let cases = [
		(json!([1, 2, 3]), None),
		(json!({ "similarity_threshold": 0.8, "limit": 10 }), Some("embedding")),
		(json!({ "embedding": [0.1, 0.2, 0.3], "limit": 10 }), Some("similarity_threshold")),
		(json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": 0.8 }), Some("limit")),
		(json!({ "embedding": [], "similarity_threshold": 0.8, "limit": 10 }), Some("embedding")),
		(json!({ "embedding": [0.1, 0.2], "similarity_threshold": 0.8, "limit": 10 }), Some("embedding")),
		(
			json!({ "embedding": [0.1, "x", 0.3], "similarity_threshold": 0.8, "limit": 10 }),
			Some("embedding"),
		),
		(
			json!({ "embedding": [1e300, 0.0, 0.0], "similarity_threshold": 0.8, "limit": 10 }),
			Some("embedding"),
		),
		(
			json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": 2.5, "limit": 10 }),
			Some("similarity_threshold"),
		),
		(
			json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": -0.1, "limit": 10 }),
			Some("similarity_threshold"),
		),
		(json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": 0.8, "limit": 0 }), Some("limit")),
		(json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": 0.8, "limit": 2.5 }), Some("limit")),
		(json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": 0.8, "limit": 1001 }), Some("limit")),
	];

	for (value, field) in cases {
		let err = SearchParams::from_value(&value, &LIMITS).expect_err("parameters must be rejected");

		assert_eq!(err.field(), field, "unexpected error for {value}: {err}");
	}
}

#[test]
fn threshold_bounds_are_inclusive() {
	for threshold in [0.0, 2.0] {
		let value = json!({ "embedding": [0.1, 0.2, 0.3], "similarity_threshold": threshold, "limit": 1 });

		assert!(SearchParams::from_value(&value, &LIMITS).is_ok());
	}
}

#[test]
fn param_error_messages_name_the_field() {
	let err = ParamError::Missing { field: "limit" };

	assert_eq!(err.to_string(), "parameters.limit is required.");
}
