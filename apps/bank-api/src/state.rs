use std::{sync::Arc, time::Duration};

use bank_config::Config;
use bank_search::SearchClient;

#[derive(Clone)]
pub struct AppState {
	pub search: Arc<SearchClient>,
	pub limits: HttpLimits,
}
impl AppState {
	pub fn new(config: &Config) -> color_eyre::Result<Self> {
		let search = SearchClient::new(&config.search)?;

		Ok(Self { search: Arc::new(search), limits: HttpLimits::from(&config.service) })
	}
}

#[derive(Clone, Copy, Debug)]
pub struct HttpLimits {
	pub idle_timeout: Duration,
	pub body_limit_bytes: usize,
}
impl From<&bank_config::Service> for HttpLimits {
	fn from(service: &bank_config::Service) -> Self {
		Self {
			idle_timeout: Duration::from_secs(service.idle_timeout_secs),
			body_limit_bytes: service.body_limit_bytes,
		}
	}
}
