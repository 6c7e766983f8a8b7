//! Client configuration: the GraphQL endpoint and the storage key of the session.

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{_prelude::*, error::ConfigError, store::StorageKey};

/// Validated configuration consumed by [`CustomerClient`](crate::client::CustomerClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Customer-account GraphQL endpoint every request is POSTed to.
	pub endpoint: Url,
	/// Key the token pair lives under in the [`TokenStore`](crate::store::TokenStore).
	pub storage_key: StorageKey,
}
impl ClientConfig {
	/// Creates a new builder for the provided endpoint.
	pub fn builder(endpoint: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(endpoint)
	}

	/// Parses and validates `endpoint`, using the default storage key.
	pub fn from_endpoint(endpoint: &str) -> Result<Self, ConfigError> {
		Self::builder(parse_endpoint("graphql", endpoint)?).build()
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// GraphQL endpoint.
	pub endpoint: Url,
	/// Raw storage key; defaults to [`StorageKey::DEFAULT`].
	pub storage_key: Option<String>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided endpoint.
	pub fn new(endpoint: Url) -> Self {
		Self { endpoint, storage_key: None }
	}

	/// Overrides the storage key.
	pub fn storage_key(mut self, key: impl Into<String>) -> Self {
		self.storage_key = Some(key.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		validate_endpoint("graphql", &self.endpoint)?;

		let storage_key = match self.storage_key {
			Some(raw) => StorageKey::new(raw)?,
			None => StorageKey::default(),
		};

		Ok(ClientConfig { endpoint: self.endpoint, storage_key })
	}
}

/// Parses an endpoint string and applies [`validate_endpoint`].
pub fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url =
		Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: name, source })?;

	validate_endpoint(name, &url)?;

	Ok(url)
}

/// Requires HTTPS, except for plain HTTP against loopback hosts.
pub fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
