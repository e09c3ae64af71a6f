use std::time::{Duration, Instant};

use axum::{
	Router,
	body::{self, Body},
	http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

use bank_api::{routes, state::AppState};
use bank_config::{Config, Search, Service};
use bank_testkit::{EngineReply, MockEngine, UNREACHABLE_URL};

fn test_config(search_url: &str) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			idle_timeout_secs: 30,
			body_limit_bytes: 1_024,
		},
		search: Search { url: search_url.to_string(), index: "bank".to_string() },
	}
}

fn test_app(search_url: &str) -> Router {
	app_with(&test_config(search_url))
}

fn app_with(config: &Config) -> Router {
	let state = AppState::new(config).expect("Failed to initialize app state.");

	routes::router(state)
}

/// Accepts connections and never answers.
async fn start_silent_engine() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind silent engine.");
	let addr = listener.local_addr().expect("Failed to read silent engine address.");

	tokio::spawn(async move {
		let mut held = Vec::new();

		while let Ok((stream, _)) = listener.accept().await {
			held.push(stream);
		}
	});

	format!("http://{addr}")
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
	let response = app.oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let headers = response.headers().clone();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = if body.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&body).expect("Failed to parse response.")
	};

	(status, headers, json)
}

async fn call_raw(app: Router, request: Request<Body>) -> StatusCode {
	let response = app.oneshot(request).await.expect("Failed to call router.");

	response.status()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
	let request = Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request.");
	let (status, _, json) = call(app, request).await;

	(status, json)
}

fn california_hit() -> Value {
	json!({ "_id": "1", "_source": { "state": "California", "employer": "Acme" } })
}

#[tokio::test]
async fn state_route_returns_engine_hits() {
	let engine =
		MockEngine::with_hits(vec![california_hit()]).await.expect("Failed to start mock engine.");
	let (status, json) = get(test_app(engine.url()), "/states/California").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json, json!([california_hit()]));

	let queries = engine.queries();

	assert_eq!(queries.len(), 1);
	assert_eq!(queries[0].index, "bank");
	assert_eq!(queries[0].body, json!({ "query": { "match": { "state": "California" } } }));
}

#[tokio::test]
async fn employer_route_sends_bool_must_in_order() {
	let engine =
		MockEngine::with_hits(vec![california_hit()]).await.expect("Failed to start mock engine.");
	let (status, json) =
		get(test_app(engine.url()), "/must/states/California/employers/Acme").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json, json!([california_hit()]));

	let queries = engine.queries();

	assert_eq!(queries.len(), 1);

	let must = queries[0].body["query"]["bool"]["must"]
		.as_array()
		.expect("Missing bool.must array.")
		.clone();

	assert_eq!(
		must,
		vec![
			json!({ "match": { "state": "California" } }),
			json!({ "match": { "employer": "Acme" } }),
		]
	);
}

#[tokio::test]
async fn zero_hits_is_an_empty_array() {
	let engine = MockEngine::with_hits(vec![]).await.expect("Failed to start mock engine.");
	let (status, json) = get(test_app(engine.url()), "/states/Atlantis").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json, json!([]));
}

#[tokio::test]
async fn repeated_requests_return_same_hits() {
	let hits = vec![
		json!({ "_id": "7", "_score": 2.0, "_source": { "state": "TX", "employer": "Initech" } }),
		json!({ "_id": "4", "_score": 1.5, "_source": { "state": "TX", "employer": "Initrode" } }),
	];
	let engine = MockEngine::with_hits(hits.clone()).await.expect("Failed to start mock engine.");
	let app = test_app(engine.url());
	let (first_status, first) = get(app.clone(), "/states/TX").await;
	let (second_status, second) = get(app, "/states/TX").await;

	assert_eq!(first_status, StatusCode::OK);
	assert_eq!(second_status, StatusCode::OK);
	assert_eq!(first, second);
	assert_eq!(first, Value::Array(hits));

	let queries = engine.queries();

	assert_eq!(queries.len(), 2);
	assert_eq!(queries[0], queries[1]);
}

#[tokio::test]
async fn percent_encoded_segments_are_decoded() {
	let engine = MockEngine::with_hits(vec![]).await.expect("Failed to start mock engine.");
	let (status, _) =
		get(test_app(engine.url()), "/must/states/New%20York/employers/Acme%20%26%20Co").await;

	assert_eq!(status, StatusCode::OK);

	let body = &engine.queries()[0].body;

	assert_eq!(body["query"]["bool"]["must"][0]["match"]["state"], "New York");
	assert_eq!(body["query"]["bool"]["must"][1]["match"]["employer"], "Acme & Co");
}

#[tokio::test]
async fn unreachable_engine_returns_bad_gateway() {
	let (status, json) = get(test_app(UNREACHABLE_URL), "/states/California").await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "SEARCH_BACKEND_UNAVAILABLE");

	let (status, json) =
		get(test_app(UNREACHABLE_URL), "/must/states/California/employers/Acme").await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "SEARCH_BACKEND_UNAVAILABLE");
}

#[tokio::test]
async fn engine_error_returns_bad_gateway_without_detail() {
	let engine = MockEngine::start(EngineReply::index_not_found("bank"))
		.await
		.expect("Failed to start mock engine.");
	let (status, json) = get(test_app(engine.url()), "/states/California").await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "SEARCH_BACKEND_ERROR");
	assert!(
		!json.to_string().contains("index_not_found_exception"),
		"Upstream detail leaked: {json}"
	);
}

#[tokio::test]
async fn malformed_envelope_returns_bad_gateway() {
	let engine = MockEngine::start(EngineReply::Raw {
		status: StatusCode::OK,
		body: json!({ "took": 1 }).to_string(),
	})
	.await
	.expect("Failed to start mock engine.");
	let (status, json) = get(test_app(engine.url()), "/states/California").await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "SEARCH_BACKEND_INVALID_RESPONSE");
}

#[tokio::test]
async fn unmatched_routes_are_not_found() {
	let engine = MockEngine::with_hits(vec![]).await.expect("Failed to start mock engine.");
	let app = test_app(engine.url());

	for uri in ["/states", "/must/states/California", "/must/states"] {
		let (status, _) = get(app.clone(), uri).await;

		assert_eq!(status, StatusCode::NOT_FOUND, "Unexpected status for {uri}.");
	}

	assert!(engine.queries().is_empty());
}

#[tokio::test]
async fn allows_any_origin() {
	let engine = MockEngine::with_hits(vec![]).await.expect("Failed to start mock engine.");
	let request = Request::builder()
		.uri("/states/California")
		.header(header::ORIGIN, "https://dashboard.example.com")
		.body(Body::empty())
		.expect("Failed to build request.");
	let (status, headers, _) = call(test_app(engine.url()), request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).expect("Missing CORS header."),
		"*"
	);
}

#[tokio::test]
async fn hung_engine_times_out_with_request_timeout() {
	let mut config = test_config(&start_silent_engine().await);

	config.service.idle_timeout_secs = 1;

	let started = Instant::now();
	let (status, _) = tokio::time::timeout(
		Duration::from_secs(10),
		get(app_with(&config), "/states/California"),
	)
	.await
	.expect("Router did not time out the hung search request.");

	assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
	assert!(started.elapsed() < Duration::from_secs(5), "Timeout took {:?}.", started.elapsed());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
	let engine = MockEngine::with_hits(vec![]).await.expect("Failed to start mock engine.");
	let config = test_config(engine.url());
	let payload = vec![b'x'; config.service.body_limit_bytes + 1];
	let request = Request::builder()
		.uri("/states/California")
		.header(header::CONTENT_LENGTH, payload.len())
		.body(Body::from(payload))
		.expect("Failed to build request.");
	let status = call_raw(app_with(&config), request).await;

	assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
	assert!(engine.queries().is_empty());
}
