use serde::Deserialize;

pub const DEFAULT_HTTP_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_INDEX: &str = "bank";
/// Socket safety net, not a per-request deadline.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 500;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 500 * 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	pub idle_timeout_secs: u64,
	/// Process-wide request body cap. No route reads a body.
	pub body_limit_bytes: usize,
}
impl Default for Service {
	fn default() -> Self {
		Self {
			http_bind: DEFAULT_HTTP_BIND.to_string(),
			log_level: "info".to_string(),
			idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
			body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Base URL of the search engine, e.g. `http://127.0.0.1:9200`.
	pub url: String,
	pub index: String,
}
impl Default for Search {
	fn default() -> Self {
		Self { url: String::new(), index: DEFAULT_INDEX.to_string() }
	}
}
