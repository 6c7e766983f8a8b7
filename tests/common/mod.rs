#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use storefront_gql::{
	auth::TokenPair,
	client::ReqwestCustomerClient,
	config::ClientConfig,
	http::ReqwestTransport,
	refresh::{OAuthRefresher, TokenRefresher},
	store::{MemoryStore, StorageKey, TokenStore},
	url::Url,
};

pub const CLIENT_ID: &str = "shp_client";

pub const UNAUTHENTICATED_BODY: &str = "{\"errors\":[{\"message\":\"Access denied\",\"extensions\":{\"code\":\"UNAUTHENTICATED\"}}]}";

pub fn token_pair(access: &str, refresh: &str) -> TokenPair {
	TokenPair::new(access, OffsetDateTime::now_utc() + Duration::hours(1))
		.with_refresh_token(refresh)
}

pub fn token_endpoint(server: &MockServer) -> Url {
	Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully.")
}

pub fn oauth_refresher(server: &MockServer) -> OAuthRefresher {
	OAuthRefresher::new(token_endpoint(server), CLIENT_ID)
		.expect("Refresher should accept the loopback token endpoint.")
}

/// Builds a client against the mock `/graphql` endpoint with `seed` already signed in.
pub fn seeded_client(
	server: &MockServer,
	refresher: Arc<dyn TokenRefresher>,
	seed: Option<TokenPair>,
) -> (ReqwestCustomerClient, Arc<MemoryStore>) {
	let store_backend = Arc::new(match seed {
		Some(tokens) => MemoryStore::seeded(StorageKey::default(), tokens),
		None => MemoryStore::default(),
	});
	let store: Arc<dyn TokenStore> = store_backend.clone();
	let config = ClientConfig::from_endpoint(&server.url("/graphql"))
		.expect("Mock GraphQL endpoint should be accepted.");
	let client =
		ReqwestCustomerClient::with_transport(config, store, refresher, ReqwestTransport::default());

	(client, store_backend)
}

pub async fn stored(store: &MemoryStore) -> Option<TokenPair> {
	store.get(&StorageKey::default()).await.expect("Memory store read should succeed.")
}
