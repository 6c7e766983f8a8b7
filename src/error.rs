//! Client-level error types shared across requests, refreshes, and stores.

// self
use crate::_prelude::*;

/// Result defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The token store failed.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// See [`ConfigError`].
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (non-2xx status, network, malformed body); never retried here.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// No token pair is stored; the caller must sign the customer in.
	#[error("No customer session is stored; sign in first.")]
	AuthenticationRequired,
	/// Refresh failed or the retried request was still rejected; stored tokens were cleared.
	#[error("Customer session could not be re-established: {reason}.")]
	AuthenticationFailed {
		/// Refresh- or API-supplied reason string.
		reason: String,
	},
	/// Application-level GraphQL error (the first entry of the `errors` list).
	#[error("GraphQL request failed: {message}.")]
	GraphQl {
		/// Message of the first reported error.
		message: String,
		/// `extensions.code` of the first reported error, when present.
		code: Option<String>,
	},
	/// The `data` payload did not match the caller's response type.
	#[error("GraphQL data could not be decoded into the requested type.")]
	Decode(#[source] serde_path_to_error::Error<serde_json::Error>),
}
impl Error {
	/// Returns `true` when the caller must route the customer back to sign-in.
	pub fn requires_login(&self) -> bool {
		matches!(self, Self::AuthenticationRequired | Self::AuthenticationFailed { .. })
	}
}

/// Problems with how the client, its endpoints, or a token response are set up.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The underlying HTTP client refused its builder settings.
	#[error("Could not build the HTTP client.")]
	ClientBuild(#[source] BoxError),
	/// A token request could not be assembled.
	#[cfg(feature = "reqwest")]
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// An endpoint string is not a URL.
	#[error("Could not parse the {endpoint} endpoint.")]
	InvalidEndpoint {
		/// `"graphql"` or `"token"`.
		endpoint: &'static str,
		/// Parser failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("Refusing plain-HTTP {endpoint} endpoint {url}.")]
	InsecureEndpoint {
		/// `"graphql"` or `"token"`.
		endpoint: &'static str,
		/// Rejected URL.
		url: String,
	},
	/// Storage keys must contain at least one non-whitespace character.
	#[error("Storage key must not be empty.")]
	EmptyStorageKey,

	/// A refresh was requested for a pair without a refresh token.
	#[error("No refresh token is stored for this session.")]
	MissingRefreshToken,
	/// The token endpoint did not say when the new access token expires.
	#[error("Refresh response carried no expires_in.")]
	MissingExpiresIn,
	/// `expires_in` does not fit the clock.
	#[error("Refresh response expires_in is too large.")]
	ExpiresInOutOfRange,
	/// `expires_in` was zero.
	#[error("Refresh response expires_in is zero.")]
	NonPositiveExpiresIn,
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::ClientBuild(Box::new(e))
	}
}

/// Failures below the GraphQL layer. None of these trigger a refresh.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The request never produced a response.
	#[error("Could not reach the endpoint.")]
	Network {
		/// Client-specific cause.
		#[source]
		source: BoxError,
	},
	/// Local I/O failed while talking to the endpoint.
	#[error("I/O failure while talking to the endpoint.")]
	Io(#[from] std::io::Error),
	/// Endpoint answered with a non-2xx status.
	#[error("Endpoint answered with HTTP {status}.")]
	Status {
		/// Status code.
		status: u16,
		/// Parsed `Retry-After`, if present.
		retry_after: Option<Duration>,
		/// Leading slice of the response body.
		body_preview: Option<String>,
	},
	/// The body was not the JSON shape expected.
	#[error("Endpoint returned an unreadable body.")]
	ResponseParse {
		/// Decoder failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Status of the response, when it is known.
		status: Option<u16>,
	},
	/// Anything else the HTTP layer reported.
	#[error("HTTP layer failed: {message}.")]
	Unexpected {
		/// Description supplied by the HTTP layer.
		message: String,
	},
}
impl TransportError {
	/// Boxes a client-specific network failure.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Status code carried by the failure, if one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::ResponseParse { status, .. } => *status,
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
