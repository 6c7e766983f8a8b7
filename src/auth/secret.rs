//! Redacting wrapper for bearer and refresh token values.

// crates.io
use serde::{Deserializer, Serializer};
// self
use crate::_prelude::*;

/// Token value that never shows up in `Debug` or `Display` output.
///
/// Serializes as a plain string so persisted pairs stay readable by other consumers of the
/// store. Clones share one allocation.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(Arc<str>);
impl TokenSecret {
	/// Wraps a token value.
	pub fn new(value: impl Into<String>) -> Self {
		let value: String = value.into();

		Self(Arc::from(value))
	}

	/// Returns the raw value. Never log it.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self(Arc::from(value))
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(<redacted>)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
impl Serialize for TokenSecret {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}
impl<'de> Deserialize<'de> for TokenSecret {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(Self::new)
	}
}
