//! Token refresh collaborators.
//!
//! The client treats refreshing as opaque: a [`TokenRefresher`] receives the stored pair and
//! returns its replacement, and the client persists whatever comes back. [`OAuthRefresher`]
//! implements the OAuth 2.0 `refresh_token` grant used by the customer-account platform; tests
//! and custom identity providers can plug in their own implementation.

mod metrics;
#[cfg(feature = "reqwest")] mod oauth;

pub use metrics::{RefreshMetrics, RefreshSnapshot};
pub(crate) use metrics::RefreshEvent;
#[cfg(feature = "reqwest")] pub use oauth::*;

// self
use crate::{_prelude::*, auth::TokenPair};

/// Boxed future returned by [`TokenRefresher::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenPair>> + 'a + Send>>;

/// Exchanges a stale token pair for a fresh one.
pub trait TokenRefresher
where
	Self: Send + Sync,
{
	/// Returns the pair that replaces `current`.
	///
	/// Any error is treated as a failed refresh; the client clears the stored pair and reports
	/// [`Error::AuthenticationFailed`] to every caller waiting on the refresh.
	fn refresh(&self, current: TokenPair) -> RefreshFuture<'_>;
}
