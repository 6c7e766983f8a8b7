//! Authenticated GraphQL client for customer-account APIs.
//!
//! [`CustomerClient`] reads the customer's token pair from a [`TokenStore`], sends it as the
//! bearer credential, and transparently recovers from a rejected access token: every caller that
//! hits an authentication failure while a refresh is running awaits the same refresh, then retries
//! its own request exactly once.

mod coordinator;
mod request;

// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	config::ClientConfig,
	graphql::{AuthFailureClassifier, DefaultAuthClassifier},
	http::GraphQlTransport,
	refresh::{RefreshMetrics, TokenRefresher},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use coordinator::RefreshCoordinator;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestCustomerClient = CustomerClient<ReqwestTransport>;

/// Bearer-authenticated GraphQL client with single-flight token refresh.
///
/// Clones share the transport, store, refresher, metrics, and refresh state, so a refresh started
/// through one clone is joined by callers using any other.
pub struct CustomerClient<T>
where
	T: ?Sized + GraphQlTransport,
{
	/// Transport used for every GraphQL POST.
	pub transport: Arc<T>,
	/// Store holding the customer's token pair.
	pub store: Arc<dyn TokenStore>,
	/// Collaborator that exchanges a stale pair for a fresh one.
	pub refresher: Arc<dyn TokenRefresher>,
	/// Decides which GraphQL errors are recoverable authentication failures.
	pub classifier: Arc<dyn AuthFailureClassifier>,
	/// Endpoint and storage key.
	pub config: ClientConfig,
	/// Shared counters for refresh activity.
	pub refresh_metrics: Arc<RefreshMetrics>,
	coordinator: RefreshCoordinator,
}
impl<T> CustomerClient<T>
where
	T: ?Sized + GraphQlTransport,
{
	/// Creates a client around a caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		refresher: Arc<dyn TokenRefresher>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			refresher,
			classifier: Arc::new(DefaultAuthClassifier::default()),
			config,
			refresh_metrics: Default::default(),
			coordinator: Default::default(),
		}
	}

	/// Replaces the authentication-failure classifier.
	pub fn with_classifier(mut self, classifier: impl 'static + AuthFailureClassifier) -> Self {
		self.classifier = Arc::new(classifier);

		self
	}

	/// Stores the pair obtained by the sign-in flow, replacing any previous session.
	pub async fn login(&self, tokens: TokenPair) -> Result<()> {
		self.store.set(&self.config.storage_key, tokens).await?;

		Ok(())
	}

	/// Clears the stored pair; returns `true` when a session existed.
	pub async fn logout(&self) -> Result<bool> {
		Ok(self.store.clear(&self.config.storage_key).await?.is_some())
	}

	/// Returns the stored pair, if any.
	pub async fn current_tokens(&self) -> Result<Option<TokenPair>> {
		Ok(self.store.get(&self.config.storage_key).await?)
	}

	/// Returns `true` when a pair is stored. The access token may still be expired.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.current_tokens().await?.is_some())
	}

	/// Returns `true` while a token refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.coordinator.is_refreshing()
	}

	/// Returns the shared refresh counters.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}
}
#[cfg(feature = "reqwest")]
impl CustomerClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		refresher: Arc<dyn TokenRefresher>,
	) -> Self {
		Self::with_transport(config, store, refresher, ReqwestTransport::default())
	}
}
impl<T> Clone for CustomerClient<T>
where
	T: ?Sized + GraphQlTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			refresher: self.refresher.clone(),
			classifier: self.classifier.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<T> Debug for CustomerClient<T>
where
	T: ?Sized + GraphQlTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CustomerClient")
			.field("endpoint", &self.config.endpoint.as_str())
			.field("storage_key", &self.config.storage_key)
			.field("refreshing", &self.coordinator.is_refreshing())
			.finish()
	}
}
