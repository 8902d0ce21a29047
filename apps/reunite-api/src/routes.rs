use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;
use reunite_service::{
	Error as ServiceError, RegisterRequest, RegisterResponse, SearchRequest, SearchResponse,
	StatsResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/identity/register", post(register))
		.route("/v1/identity/search", post(search))
		.route("/v1/stats", get(stats))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn register(
	State(state): State<AppState>,
	Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
	let response = state.service.register(payload).await?;
	Ok(Json(response))
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;
	Ok(Json(response))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
	let response = state.service.stats().await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();
		match err {
			ServiceError::NoFaceDetected =>
				Self::new(StatusCode::UNPROCESSABLE_ENTITY, "no_face_detected", message),
			ServiceError::InvalidRequest { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::Provider { .. } =>
				Self::new(StatusCode::BAD_GATEWAY, "provider_error", message),
			ServiceError::Store { .. } =>
				Self::new(StatusCode::BAD_GATEWAY, "storage_error", message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };
		(self.status, Json(body)).into_response()
	}
}
