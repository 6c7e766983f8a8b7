//! GraphQL wire types and the classification of responses into data, auth failures, and
//! application errors.
//!
//! The customer-account API reports a rejected bearer token inside an HTTP 200 body, so the
//! client cannot rely on status codes. [`AuthFailureClassifier`] decides which entries of the
//! `errors` list mean "refresh and retry"; everything else is surfaced as
//! [`Error::GraphQl`](crate::error::Error::GraphQl).

// self
use crate::{_prelude::*, error::TransportError, http::HttpReply};

/// Body POSTed to the GraphQL endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphQlRequest {
	/// Query or mutation document.
	pub query: String,
	/// Operation variables; omitted from the body when absent.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub variables: Option<JsonValue>,
}
impl GraphQlRequest {
	/// Creates a request without variables.
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: query.into(), variables: None }
	}

	/// Overrides the variables map.
	pub fn with_variables(mut self, variables: Option<JsonValue>) -> Self {
		self.variables = variables;

		self
	}
}

/// Response envelope: `{ data?, errors? }`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphQlResponse {
	/// Operation result, when execution produced one.
	#[serde(default)]
	pub data: Option<JsonValue>,
	/// Top-level errors reported by the server.
	#[serde(default)]
	pub errors: Option<Vec<GraphQlErrorEntry>>,
}
impl GraphQlResponse {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Checks the HTTP status and decodes the body of a transport reply.
	pub fn from_reply(reply: HttpReply) -> Result<Self, TransportError> {
		if !reply.is_success() {
			let body_preview = (!reply.body.is_empty())
				.then(|| truncate_preview(String::from_utf8_lossy(&reply.body).into_owned()));

			return Err(TransportError::Status {
				status: reply.status,
				retry_after: reply.retry_after,
				body_preview,
			});
		}

		Self::parse(&reply.body, Some(reply.status))
	}

	/// Decodes a JSON body, reporting the failing path on malformed input.
	pub fn parse(body: &[u8], status: Option<u16>) -> Result<Self, TransportError> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| TransportError::ResponseParse { source, status })
	}

	/// Splits the response into data, a recoverable auth failure, or an application error.
	pub fn classify(self, classifier: &dyn AuthFailureClassifier) -> ResponseOutcome {
		let errors = self.errors.unwrap_or_default();

		if let Some(entry) = errors.iter().find(|entry| classifier.is_auth_failure(entry)) {
			return ResponseOutcome::AuthFailure { message: entry.message.clone() };
		}
		if let Some(first) = errors.into_iter().next() {
			let code = first.code().map(ToOwned::to_owned);

			return ResponseOutcome::Failed { message: first.message, code };
		}

		match self.data {
			Some(data) if !data.is_null() => ResponseOutcome::Data(data),
			_ => ResponseOutcome::Failed {
				message: "GraphQL response contained no data".into(),
				code: None,
			},
		}
	}
}

/// One entry of the `errors` list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GraphQlErrorEntry {
	/// Human-readable error message.
	pub message: String,
	/// Vendor extensions; only `code` is interpreted.
	#[serde(default)]
	pub extensions: Option<GraphQlErrorExtensions>,
}
impl GraphQlErrorEntry {
	/// Creates an entry without extensions.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), extensions: None }
	}

	/// Attaches an `extensions.code` value.
	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.extensions = Some(GraphQlErrorExtensions { code: Some(code.into()) });

		self
	}

	/// Returns `extensions.code`, when present.
	pub fn code(&self) -> Option<&str> {
		self.extensions.as_ref().and_then(|ext| ext.code.as_deref())
	}
}

/// Extensions block of a GraphQL error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct GraphQlErrorExtensions {
	/// Machine-readable error code (for example `UNAUTHENTICATED`).
	#[serde(default)]
	pub code: Option<String>,
}

/// Classified result of one GraphQL round trip.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseOutcome {
	/// The `data` payload.
	Data(JsonValue),
	/// The bearer token was rejected; a refresh may recover.
	AuthFailure {
		/// Message of the entry that triggered the classification.
		message: String,
	},
	/// Application-level error carrying the first entry.
	Failed {
		/// Message of the first entry.
		message: String,
		/// Code of the first entry, when present.
		code: Option<String>,
	},
}

/// Decides whether a GraphQL error means the bearer token was rejected.
pub trait AuthFailureClassifier: Send + Sync {
	/// Returns `true` when `error` is a recoverable authentication failure.
	fn is_auth_failure(&self, error: &GraphQlErrorEntry) -> bool;
}

/// Matches the `UNAUTHENTICATED` code and, unless built with [`strict`](Self::strict), any
/// message containing `Unauthorized`.
#[derive(Clone, Copy, Debug)]
pub struct DefaultAuthClassifier {
	match_message_marker: bool,
}
impl DefaultAuthClassifier {
	/// Error code the customer-account API uses for rejected tokens.
	pub const UNAUTHENTICATED_CODE: &'static str = "UNAUTHENTICATED";
	/// Message substring treated as an auth failure by the lenient classifier.
	pub const UNAUTHORIZED_MARKER: &'static str = "Unauthorized";

	/// Classifier that only trusts the structured error code.
	pub const fn strict() -> Self {
		Self { match_message_marker: false }
	}

	/// Returns `true` when message matching is enabled.
	pub const fn matches_message_marker(&self) -> bool {
		self.match_message_marker
	}
}
impl Default for DefaultAuthClassifier {
	fn default() -> Self {
		Self { match_message_marker: true }
	}
}
impl AuthFailureClassifier for DefaultAuthClassifier {
	fn is_auth_failure(&self, error: &GraphQlErrorEntry) -> bool {
		if error.code().is_some_and(|code| code.eq_ignore_ascii_case(Self::UNAUTHENTICATED_CODE)) {
			return true;
		}

		self.match_message_marker && error.message.contains(Self::UNAUTHORIZED_MARKER)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= GraphQlResponse::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= GraphQlResponse::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn parse(body: &str) -> GraphQlResponse {
		GraphQlResponse::parse(body.as_bytes(), Some(200)).expect("Fixture body should parse.")
	}

	#[test]
	fn request_omits_absent_variables() {
		let bare = serde_json::to_value(GraphQlRequest::new("{ customer { id } }"))
			.expect("Request should serialize.");

		assert_eq!(bare, serde_json::json!({ "query": "{ customer { id } }" }));

		let with_vars = GraphQlRequest::new("query($id: ID!) { order(id: $id) { id } }")
			.with_variables(Some(serde_json::json!({ "id": "gid://shopify/Order/1" })));
		let value = serde_json::to_value(with_vars).expect("Request should serialize.");

		assert_eq!(value["variables"]["id"], "gid://shopify/Order/1");
	}

	#[test]
	fn data_without_errors_is_returned() {
		let outcome = parse(r#"{"data":{"customer":{"id":"1"}}}"#)
			.classify(&DefaultAuthClassifier::default());

		assert_eq!(outcome, ResponseOutcome::Data(serde_json::json!({ "customer": { "id": "1" } })));
	}

	#[test]
	fn unauthenticated_code_is_an_auth_failure() {
		let outcome = parse(
			r#"{"errors":[{"message":"Access denied","extensions":{"code":"UNAUTHENTICATED"}}]}"#,
		)
		.classify(&DefaultAuthClassifier::strict());

		assert_eq!(outcome, ResponseOutcome::AuthFailure { message: "Access denied".into() });
	}

	#[test]
	fn message_marker_only_applies_to_lenient_classifier() {
		let body = r#"{"errors":[{"message":"Unauthorized: token expired"}]}"#;

		assert!(matches!(
			parse(body).classify(&DefaultAuthClassifier::default()),
			ResponseOutcome::AuthFailure { .. }
		));
		assert_eq!(
			parse(body).classify(&DefaultAuthClassifier::strict()),
			ResponseOutcome::Failed { message: "Unauthorized: token expired".into(), code: None }
		);
	}

	#[test]
	fn application_error_carries_first_entry() {
		let outcome = parse(
			r#"{"errors":[{"message":"Invalid input","extensions":{"code":"BAD_USER_INPUT"}},{"message":"second"}],"data":null}"#,
		)
		.classify(&DefaultAuthClassifier::default());

		assert_eq!(
			outcome,
			ResponseOutcome::Failed {
				message: "Invalid input".into(),
				code: Some("BAD_USER_INPUT".into())
			}
		);
	}

	#[test]
	fn auth_entry_anywhere_in_list_wins() {
		let outcome = parse(
			r#"{"errors":[{"message":"Throttled"},{"message":"nope","extensions":{"code":"unauthenticated"}}]}"#,
		)
		.classify(&DefaultAuthClassifier::strict());

		assert!(matches!(outcome, ResponseOutcome::AuthFailure { .. }));
	}

	#[test]
	fn empty_payload_is_an_application_error() {
		for body in [r#"{}"#, r#"{"data":null,"errors":[]}"#] {
			assert!(matches!(
				parse(body).classify(&DefaultAuthClassifier::default()),
				ResponseOutcome::Failed { code: None, .. }
			));
		}
	}

	#[test]
	fn non_success_status_becomes_transport_error() {
		let reply = HttpReply {
			status: 503,
			retry_after: Some(Duration::seconds(5)),
			body: "x".repeat(300).into_bytes(),
		};
		let err = GraphQlResponse::from_reply(reply).expect_err("503 should be rejected.");

		match err {
			TransportError::Status { status, retry_after, body_preview } => {
				assert_eq!(status, 503);
				assert_eq!(retry_after, Some(Duration::seconds(5)));

				let preview = body_preview.expect("Body preview should be captured.");

				assert_eq!(preview.chars().count(), GraphQlResponse::BODY_PREVIEW_LIMIT + 1);
				assert!(preview.ends_with('…'));
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn malformed_json_reports_path() {
		let err = GraphQlResponse::parse(br#"{"errors":[{"message":42}]}"#, Some(200))
			.expect_err("Non-string message should be rejected.");

		match err {
			TransportError::ResponseParse { source, status } => {
				assert_eq!(status, Some(200));
				assert_eq!(source.path().to_string(), "errors[0].message");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}
