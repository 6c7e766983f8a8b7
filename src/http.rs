//! Transport primitives for GraphQL requests.
//!
//! [`GraphQlTransport`] is the client's only dependency on an HTTP stack. It POSTs an already
//! built [`GraphQlRequest`] with a bearer credential and hands back the raw [`HttpReply`]; status
//! checks and JSON decoding happen in [`graphql`](crate::graphql) so every transport reports
//! failures the same way.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{ACCEPT, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError, graphql::GraphQlRequest};

/// Boxed future returned by [`GraphQlTransport::post`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpReply, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of POSTing GraphQL documents.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every clone
/// of a client, and must not retry on their own: retry policy belongs to the caller.
pub trait GraphQlTransport
where
	Self: 'static + Send + Sync,
{
	/// POSTs `request` as JSON to `endpoint` with `Authorization: Bearer <bearer>`.
	fn post<'a>(
		&'a self,
		endpoint: &'a Url,
		bearer: &'a str,
		request: &'a GraphQlRequest,
	) -> TransportFuture<'a>;
}

/// Raw HTTP response handed back by a [`GraphQlTransport`].
#[derive(Clone, Debug, Default)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Builds a reply carrying a JSON body.
	pub fn json(status: u16, body: &JsonValue) -> Self {
		Self { status, retry_after: None, body: body.to_string().into_bytes() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// [`GraphQlTransport`] over a reqwest [`ReqwestClient`].
///
/// Redirects, timeouts, and TLS follow whatever the wrapped client was built with.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Uses `client` for every request.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestTransport(..)")
	}
}
#[cfg(feature = "reqwest")]
impl GraphQlTransport for ReqwestTransport {
	fn post<'a>(
		&'a self,
		endpoint: &'a Url,
		bearer: &'a str,
		request: &'a GraphQlRequest,
	) -> TransportFuture<'a> {
		Box::pin(async move {
			let response = self
				.0
				.post(endpoint.clone())
				.bearer_auth(bearer)
				.header(ACCEPT, "application/json")
				.json(request)
				.send()
				.await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(HttpReply { status, retry_after, body })
		})
	}
}

/// Reads `Retry-After` as either delta-seconds or an HTTP date still in the future.
#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	match raw.parse::<u64>() {
		Ok(secs) => Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))),
		Err(_) => OffsetDateTime::parse(raw, &Rfc2822)
			.ok()
			.map(|at| at - OffsetDateTime::now_utc())
			.filter(|delta| delta.is_positive()),
	}
}
