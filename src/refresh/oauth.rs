//! OAuth 2.0 `refresh_token` grant backed by the `oauth2` crate and reqwest.

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, HttpRequest, HttpResponse, RefreshToken, RequestTokenError, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	config,
	error::{ConfigError, TransportError},
	refresh::{RefreshFuture, TokenRefresher},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Refreshes customer sessions against an OAuth 2.0 token endpoint.
///
/// Public clients (no secret) send `client_id` in the form body. Confidential clients use HTTP
/// Basic authentication unless [`with_secret_in_body`](Self::with_secret_in_body) is set. When the
/// provider does not rotate the refresh token, the previous one is carried into the new pair.
#[derive(Clone)]
pub struct OAuthRefresher {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestClient,
	token_endpoint: Url,
}
impl OAuthRefresher {
	/// Creates a refresher for a public client.
	///
	/// The token endpoint must satisfy [`config::validate_endpoint`]. The default HTTP client never
	/// follows redirects.
	pub fn new(token_endpoint: Url, client_id: impl Into<String>) -> Result<Self, ConfigError> {
		config::validate_endpoint("token", &token_endpoint)?;

		let token_url = TokenUrl::new(token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.into())).set_token_uri(token_url);
		let http_client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self { oauth_client, http_client, token_endpoint })
	}

	/// Attaches a client secret; sent with HTTP Basic authentication by default.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.oauth_client = self.oauth_client.set_client_secret(ClientSecret::new(secret.into()));

		self
	}

	/// Sends `client_id`/`client_secret` as form parameters instead of HTTP Basic credentials.
	pub fn with_secret_in_body(mut self) -> Self {
		self.oauth_client = self.oauth_client.set_auth_type(AuthType::RequestBody);

		self
	}

	/// Replaces the HTTP client used for token requests.
	pub fn with_http_client(mut self, client: ReqwestClient) -> Self {
		self.http_client = client;

		self
	}

	/// Token endpoint the refresher POSTs to.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}
}
impl Debug for OAuthRefresher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthRefresher")
			.field("client_id", &self.oauth_client.client_id().as_str())
			.field("token_endpoint", &self.token_endpoint.as_str())
			.finish()
	}
}
impl TokenRefresher for OAuthRefresher {
	fn refresh(&self, current: TokenPair) -> RefreshFuture<'_> {
		Box::pin(async move {
			let previous = current.refresh_token.ok_or(ConfigError::MissingRefreshToken)?;
			let handle = ReqwestHandle(self.http_client.clone());
			let refresh_secret = RefreshToken::new(previous.expose().to_owned());
			let response = self
				.oauth_client
				.exchange_refresh_token(&refresh_secret)
				.request_async(&handle)
				.await
				.map_err(map_request_error)?;

			map_refresh_response(response, previous, OffsetDateTime::now_utc())
		})
	}
}

/// [`AsyncHttpClient`] adapter over a shared reqwest client.
struct ReqwestHandle(ReqwestClient);
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut reply = HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*reply.status_mut() = status;
			*reply.headers_mut() = headers;

			Ok(reply)
		})
	}
}

fn map_refresh_response(
	response: BasicTokenResponse,
	previous: TokenSecret,
	issued_at: OffsetDateTime,
) -> Result<TokenPair> {
	let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	let issued = TokenPair::issued(
		response.access_token().secret().as_str(),
		issued_at,
		Duration::seconds(expires_in),
	)
	.ok_or(ConfigError::ExpiresInOutOfRange)?;
	let refresh_token = match response.refresh_token() {
		Some(rotated) => TokenSecret::new(rotated.secret().as_str()),
		None => previous,
	};

	Ok(TokenPair { refresh_token: Some(refresh_token), ..issued })
}

fn map_request_error(err: BasicRequestTokenError<HttpClientError<ReqwestError>>) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => map_server_response(response),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) =>
			TransportError::ResponseParse { source, status: None }.into(),
		RequestTokenError::Other(message) => TransportError::Unexpected {
			message: format!("Token endpoint returned an unexpected response: {message}"),
		}
		.into(),
	}
}

fn map_server_response(response: BasicErrorResponse) -> Error {
	let code = response.error().as_ref().to_owned();
	let reason = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code,
	};

	Error::AuthenticationFailed { reason }
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Unexpected { message }.into(),
		_ => TransportError::Unexpected { message: "Unknown token transport failure".into() }
			.into(),
	}
}
