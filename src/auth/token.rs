//! Customer token pair and its persisted layout.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Bearer credentials for one signed-in customer.
///
/// Serialized as `{"access_token", "refresh_token"?, "expires_at"}` with an RFC 3339 expiry, which
/// is the record kept under the client's storage key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Access token sent as the bearer credential.
	pub access_token: TokenSecret,
	/// Refresh token exchanged for a new access token, when the platform issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Instant after which the access token is no longer accepted.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
}
impl TokenPair {
	/// Creates a pair without a refresh token.
	pub fn new(access_token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), refresh_token: None, expires_at }
	}

	/// Creates a pair whose access token lives for `lifetime` past `issued_at`.
	///
	/// Returns `None` when the expiry would overflow the calendar.
	pub fn issued(
		access_token: impl Into<String>,
		issued_at: OffsetDateTime,
		lifetime: Duration,
	) -> Option<Self> {
		issued_at.checked_add(lifetime).map(|expires_at| Self::new(access_token, expires_at))
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the access token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the access token expires within `window` of `instant`.
	pub fn expires_within(&self, instant: OffsetDateTime, window: Duration) -> bool {
		self.expires_at - instant <= window
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access_token", &self.access_token)
			.field("refresh_token", &self.refresh_token)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn persisted_layout_uses_snake_case_and_rfc3339() {
		let pair = TokenPair::new("access", macros::datetime!(2025-01-01 01:00 UTC))
			.with_refresh_token("refresh");
		let value = serde_json::to_value(&pair).expect("Token pair should serialize.");

		assert_eq!(
			value,
			serde_json::json!({
				"access_token": "access",
				"refresh_token": "refresh",
				"expires_at": "2025-01-01T01:00:00Z",
			})
		);

		let without_refresh = TokenPair::new("access", macros::datetime!(2025-01-01 01:00 UTC));
		let value = serde_json::to_value(&without_refresh).expect("Token pair should serialize.");

		assert!(value.get("refresh_token").is_none());

		let parsed: TokenPair = serde_json::from_value(value)
			.expect("Persisted record without refresh token should parse.");

		assert_eq!(parsed, without_refresh);
	}

	#[test]
	fn issued_pairs_measure_lifetime_from_issue_time() {
		let pair = TokenPair::issued(
			"secret",
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::minutes(30),
		)
		.expect("Thirty minutes should fit the calendar.");

		assert_eq!(pair.expires_at, macros::datetime!(2025-01-01 00:30 UTC));
		assert!(pair.refresh_token.is_none());
		assert!(TokenPair::issued("secret", OffsetDateTime::now_utc(), Duration::MAX).is_none());
	}

	#[test]
	fn expiry_helpers_use_half_open_window() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let pair = TokenPair::new("access", expires);

		assert!(!pair.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(pair.is_expired_at(expires));
		assert!(pair.expires_within(macros::datetime!(2025-01-01 00:59 UTC), Duration::minutes(1)));
		assert!(!pair.expires_within(macros::datetime!(2025-01-01 00:58 UTC), Duration::minutes(1)));
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let pair = TokenPair::new("top-secret", OffsetDateTime::now_utc()).with_refresh_token("r");
		let rendered = format!("{pair:?}");

		assert!(!rendered.contains("top-secret"));
		assert!(rendered.contains("<redacted>"));
	}
}
