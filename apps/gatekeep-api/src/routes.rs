use axum::{
	Json, Router,
	body::Body,
	extract::{Path, Request, State, rejection::JsonRejection},
	http::{StatusCode, header::AUTHORIZATION},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use gatekeep_service::{Error as ServiceError, IntakeRequest, TerminalResponse, ToolCallView};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let api = Router::new()
		.route("/v1/tool_calls", post(submit))
		.route("/v1/tool_calls/{id}", get(get_tool_call))
		.route("/v1/tool_calls/{id}/cancel", post(cancel))
		.layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
		.with_state(state);

	Router::new().route("/health", get(health)).merge(api)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn submit(
	State(state): State<AppState>,
	payload: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<Json<TerminalResponse>, ApiError> {
	let Json(payload) = payload.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", err.body_text(), None)
	})?;
	let response = state.service.submit(payload).await?;

	Ok(Json(response))
}

async fn get_tool_call(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<ToolCallView>, ApiError> {
	let view = state.service.get(parse_id(&id)?).await?;

	Ok(Json(view))
}

async fn cancel(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<TerminalResponse>, ApiError> {
	let response = state.service.cancel(parse_id(&id)?).await?;

	Ok(Json(response))
}

async fn auth_middleware(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
	if let Some(token) = state.auth_token.as_deref() {
		let authorized = req
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("Bearer "))
			.is_some_and(|presented| presented == token);

		if !authorized {
			return json_error(
				StatusCode::UNAUTHORIZED,
				"unauthorized",
				"A valid Bearer token is required.",
				None,
			)
			.into_response();
		}
	}

	next.run(req).await
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
	Uuid::parse_str(raw).map_err(|_| {
		json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("{raw:?} is not a valid tool call id."),
			Some(vec!["tool_call_id".to_string()]),
		)
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRequest { fields, .. } => json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				(!fields.is_empty()).then_some(fields),
			),
			ServiceError::NotFound { .. } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			ServiceError::DuplicateId { .. } =>
				json_error(StatusCode::CONFLICT, "duplicate_id", message, None),
			ServiceError::Conflict { .. } =>
				json_error(StatusCode::CONFLICT, "conflict", message, None),
			ServiceError::InvalidTransition { .. } =>
				json_error(StatusCode::CONFLICT, "invalid_transition", message, None),
			ServiceError::Storage { .. } => {
				tracing::error!(error = %message, "Storage failure.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message, None)
			},
			ServiceError::Internal { .. } => {
				tracing::error!(error = %message, "Internal failure.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
