//! Bearer-authenticated GraphQL client for storefront customer accounts - one shared token
//! refresh per rejection wave, pluggable token stores, and transport-aware observability.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod graphql;
pub mod http;
pub mod obs;
pub mod refresh;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::TokenPair,
		client::ReqwestCustomerClient,
		config::ClientConfig,
		http::ReqwestTransport,
		refresh::TokenRefresher,
		store::{MemoryStore, TokenStore},
	};

	/// Builds a reqwest client that accepts the self-signed certificates produced by `httpmock`.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Wraps [`test_reqwest_client`] in a [`ReqwestTransport`].
	pub fn test_reqwest_transport() -> ReqwestTransport {
		ReqwestTransport::with_client(test_reqwest_client())
	}

	/// Token pair valid for one hour, carrying both tokens.
	pub fn token_pair(access: &str, refresh: &str) -> TokenPair {
		TokenPair::new(access, OffsetDateTime::now_utc() + Duration::hours(1))
			.with_refresh_token(refresh)
	}

	/// Constructs a [`ReqwestCustomerClient`] for `endpoint` backed by an in-memory store.
	pub fn build_reqwest_test_client(
		endpoint: &str,
		refresher: Arc<dyn TokenRefresher>,
	) -> (ReqwestCustomerClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let config =
			ClientConfig::from_endpoint(endpoint).expect("Test endpoint should be accepted.");
		let client =
			ReqwestCustomerClient::with_transport(config, store, refresher, test_reqwest_transport());

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
