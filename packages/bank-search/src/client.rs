use reqwest::Client;
use serde_json::Value;

use crate::{Error, Hit, Result, SearchQuery};

const MAX_REASON_CHARS: usize = 256;

/// Client for a single index. Cheap to share behind an `Arc`; the underlying
/// `reqwest::Client` pools connections across concurrent requests.
#[derive(Debug, Clone)]
pub struct SearchClient {
	http: Client,
	search_url: String,
	index: String,
}
impl SearchClient {
	pub fn new(cfg: &bank_config::Search) -> Result<Self> {
		let base = cfg.url.trim().trim_end_matches('/');

		if base.is_empty() {
			return Err(Error::InvalidConfig {
				message: "Search engine URL must be non-empty.".to_string(),
			});
		}
		if cfg.index.is_empty() || cfg.index.contains('/') {
			return Err(Error::InvalidConfig {
				message: format!("Invalid search index name {:?}.", cfg.index),
			});
		}

		let http = Client::builder().build()?;

		Ok(Self { http, search_url: format!("{base}/{}/_search", cfg.index), index: cfg.index.clone() })
	}

	pub fn index(&self) -> &str {
		&self.index
	}

	pub fn search_url(&self) -> &str {
		&self.search_url
	}

	pub async fn find_by_region(&self, region: &str) -> Result<Vec<Hit>> {
		self.search(&SearchQuery::by_region(region)).await
	}

	pub async fn find_by_region_and_employer(
		&self,
		region: &str,
		employer: &str,
	) -> Result<Vec<Hit>> {
		self.search(&SearchQuery::by_region_and_employer(region, employer)).await
	}

	/// Submits `query` once and returns `hits.hits` exactly as the engine sent it.
	pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Hit>> {
		let body = query.to_body();

		tracing::debug!(index = %self.index, query = %body, "Submitting search query.");

		let res = self.http.post(&self.search_url).json(&body).send().await?;
		let status = res.status();

		if !status.is_success() {
			let raw = res.text().await.unwrap_or_default();

			return Err(Error::Status { status: status.as_u16(), reason: engine_reason(&raw) });
		}

		let json: Value = res.json().await?;
		let hits = parse_hits(json)?;

		tracing::debug!(index = %self.index, hits = hits.len(), "Search query completed.");

		Ok(hits)
	}
}

fn parse_hits(mut json: Value) -> Result<Vec<Hit>> {
	match json.pointer_mut("/hits/hits").map(Value::take) {
		Some(Value::Array(hits)) => Ok(hits),
		_ => Err(Error::InvalidResponse {
			message: "Search response is missing hits.hits array.".to_string(),
		}),
	}
}

fn engine_reason(raw: &str) -> String {
	if let Ok(json) = serde_json::from_str::<Value>(raw)
		&& let Some(error) = json.get("error")
	{
		let kind = error.get("type").and_then(Value::as_str);
		let reason = error.get("reason").and_then(Value::as_str);

		match (kind, reason) {
			(Some(kind), Some(reason)) => return format!("{kind}: {reason}"),
			(Some(text), None) | (None, Some(text)) => return text.to_string(),
			(None, None) =>
				if let Some(text) = error.as_str() {
					return text.to_string();
				},
		}
	}

	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return "empty response body".to_string();
	}

	trimmed.chars().take(MAX_REASON_CHARS).collect()
}
