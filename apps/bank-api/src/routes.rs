use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;
use tower_http::{
	cors::{Any, CorsLayer},
	limit::RequestBodyLimitLayer,
	timeout::TimeoutLayer,
	trace::TraceLayer,
};

use crate::state::AppState;
use bank_search::Hit;

pub fn router(state: AppState) -> Router {
	let limits = state.limits;
	let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

	Router::new()
		.route("/states/{state}", get(find_by_state))
		.route("/must/states/{state}/employers/{employer}", get(find_by_state_and_employer))
		.with_state(state)
		.layer(RequestBodyLimitLayer::new(limits.body_limit_bytes))
		.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, limits.idle_timeout))
		.layer(TraceLayer::new_for_http())
		.layer(cors)
}

async fn find_by_state(
	State(state): State<AppState>,
	Path(region): Path<String>,
) -> Result<Json<Vec<Hit>>, ApiError> {
	let hits = state.search.find_by_region(&region).await?;
	Ok(Json(hits))
}

async fn find_by_state_and_employer(
	State(state): State<AppState>,
	Path((region, employer)): Path<(String, String)>,
) -> Result<Json<Vec<Hit>>, ApiError> {
	let hits = state.search.find_by_region_and_employer(&region, &employer).await?;
	Ok(Json(hits))
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

impl From<bank_search::Error> for ApiError {
	fn from(err: bank_search::Error) -> Self {
		tracing::error!(error = %err, "Search request failed.");

		match err {
			bank_search::Error::Reqwest(_) => Self::new(
				StatusCode::BAD_GATEWAY,
				"SEARCH_BACKEND_UNAVAILABLE",
				"Search backend is unavailable.",
			),
			bank_search::Error::Status { .. } => Self::new(
				StatusCode::BAD_GATEWAY,
				"SEARCH_BACKEND_ERROR",
				"Search backend rejected the query.",
			),
			bank_search::Error::InvalidResponse { .. } => Self::new(
				StatusCode::BAD_GATEWAY,
				"SEARCH_BACKEND_INVALID_RESPONSE",
				"Search backend returned an unexpected response.",
			),
			bank_search::Error::InvalidConfig { .. } => Self::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"INTERNAL_ERROR",
				"Internal server error.",
			),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };
		(self.status, Json(body)).into_response()
	}
}
