mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_BODY_LIMIT_BYTES, DEFAULT_HTTP_BIND, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_INDEX,
	Search, Service,
};

use std::{env, fs, net::SocketAddr, path::Path};

pub const ENV_SEARCH_URL: &str = "EL_URL";
pub const ENV_PORT: &str = "PORT";

/// Loads the optional config file, then layers the process environment on top.
pub fn load(path: Option<&Path>) -> Result<Config> {
	let mut cfg = match path {
		Some(path) => read(path)?,
		None => Config::default(),
	};

	resolve(&mut cfg, |key| env::var(key).ok())?;

	Ok(cfg)
}

/// Applies environment overrides from `lookup`, normalizes, and validates.
pub fn resolve<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	apply_env(cfg, lookup)?;

	normalize(cfg);

	validate(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.search.url.is_empty() {
		return Err(Error::Validation {
			message: format!("search.url must be non-empty. Set {ENV_SEARCH_URL} or search.url."),
		});
	}
	if !(cfg.search.url.starts_with("http://") || cfg.search.url.starts_with("https://")) {
		return Err(Error::Validation {
			message: format!(
				"search.url must start with http:// or https://, got {}.",
				cfg.search.url
			),
		});
	}
	if cfg.search.index.trim().is_empty() {
		return Err(Error::Validation { message: "search.index must be non-empty.".to_string() });
	}
	if cfg.search.index.contains('/') {
		return Err(Error::Validation {
			message: "search.index must not contain '/'.".to_string(),
		});
	}
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: format!(
				"service.http_bind must be a valid socket address, got {}.",
				cfg.service.http_bind
			),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.service.idle_timeout_secs == 0 {
		return Err(Error::Validation {
			message: "service.idle_timeout_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.service.body_limit_bytes == 0 {
		return Err(Error::Validation {
			message: "service.body_limit_bytes must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn read(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	toml::from_str(&raw).map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })
}

fn apply_env<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(url) = lookup(ENV_SEARCH_URL)
		&& !url.trim().is_empty()
	{
		cfg.search.url = url.trim().to_string();
	}
	if let Some(raw) = lookup(ENV_PORT)
		&& !raw.trim().is_empty()
	{
		let port: u16 = raw.trim().parse().map_err(|_| Error::Validation {
			message: format!("{ENV_PORT} must be a port number, got {raw}."),
		})?;
		let host = match cfg.service.http_bind.rsplit_once(':') {
			Some((host, _)) => host.to_string(),
			None => cfg.service.http_bind.clone(),
		};

		cfg.service.http_bind = format!("{host}:{port}");
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.url = cfg.search.url.trim().trim_end_matches('/').to_string();
	cfg.search.index = cfg.search.index.trim().to_string();
}
