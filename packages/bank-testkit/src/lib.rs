//! In-process stand-in for the search engine's `_search` endpoint.

mod error;

pub use error::{Error, Result};

use std::{
	future::IntoFuture,
	sync::{Arc, Mutex},
};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing,
};
use serde_json::{Value, json};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

/// Nothing listens here; requests fail with a connection error.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
	pub index: String,
	pub body: Value,
}

#[derive(Debug, Clone)]
pub enum EngineReply {
	/// `200 OK` with a standard search envelope around these hits.
	Hits(Vec<Value>),
	/// Engine-style JSON error document.
	Error { status: StatusCode, body: Value },
	/// Verbatim body, for malformed responses.
	Raw { status: StatusCode, body: String },
}
impl EngineReply {
	pub fn index_not_found(index: &str) -> Self {
		let reason = format!("no such index [{index}]");

		Self::Error {
			status: StatusCode::NOT_FOUND,
			body: json!({
				"error": {
					"root_cause": [{
						"type": "index_not_found_exception",
						"reason": reason,
						"index": index
					}],
					"type": "index_not_found_exception",
					"reason": reason,
					"index": index
				},
				"status": 404
			}),
		}
	}
}

struct EngineState {
	reply: EngineReply,
	queries: Mutex<Vec<RecordedQuery>>,
}

/// Serves `POST /{index}/_search` on an ephemeral local port and records every
/// query body it receives. Shuts down when dropped.
pub struct MockEngine {
	url: String,
	state: Arc<EngineState>,
	shutdown: Option<Sender<()>>,
}
impl MockEngine {
	pub async fn start(reply: EngineReply) -> Result<Self> {
		let state = Arc::new(EngineState { reply, queries: Mutex::new(Vec::new()) });
		let app = Router::new()
			.route("/{index}/_search", routing::post(search_handler))
			.with_state(state.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { url: format!("http://{addr}"), state, shutdown: Some(tx) })
	}

	pub async fn with_hits(hits: Vec<Value>) -> Result<Self> {
		Self::start(EngineReply::Hits(hits)).await
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn queries(&self) -> Vec<RecordedQuery> {
		self.state.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl Drop for MockEngine {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

pub fn hits_envelope(hits: &[Value]) -> Value {
	let max_score = if hits.is_empty() { Value::Null } else { json!(1.0) };

	json!({
		"took": 1,
		"timed_out": false,
		"_shards": { "total": 1, "successful": 1, "skipped": 0, "failed": 0 },
		"hits": {
			"total": { "value": hits.len(), "relation": "eq" },
			"max_score": max_score,
			"hits": hits
		}
	})
}

async fn search_handler(
	State(state): State<Arc<EngineState>>,
	Path(index): Path<String>,
	Json(body): Json<Value>,
) -> Response {
	state.queries.lock().unwrap_or_else(|err| err.into_inner()).push(RecordedQuery { index, body });

	match &state.reply {
		EngineReply::Hits(hits) => (StatusCode::OK, Json(hits_envelope(hits))).into_response(),
		EngineReply::Error { status, body } => (*status, Json(body.clone())).into_response(),
		EngineReply::Raw { status, body } => (*status, body.clone()).into_response(),
	}
}
