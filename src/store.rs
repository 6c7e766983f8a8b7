//! Storage contracts and built-in store implementations for customer token pairs.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, auth::TokenPair, error::ConfigError};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable key/value storage for token pairs, mirroring the browser's local storage.
///
/// The client only ever reads and writes the single key it was configured with. Readers other
/// than the client must tolerate the key being absent or stale at any time.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the pair stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a StorageKey) -> StoreFuture<'a, Option<TokenPair>>;

	/// Persists or replaces the pair stored under `key`.
	fn set<'a>(&'a self, key: &'a StorageKey, tokens: TokenPair) -> StoreFuture<'a, ()>;

	/// Removes the pair stored under `key`, returning the previous value.
	fn clear<'a>(&'a self, key: &'a StorageKey) -> StoreFuture<'a, Option<TokenPair>>;
}

/// Failure reported by a [`TokenStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Stored bytes could not be encoded or decoded as token pairs.
	#[error("Token store contents are unreadable: {message}.")]
	Serialization {
		/// What failed and where.
		message: String,
	},
	/// The storage medium itself failed.
	#[error("Token store is unavailable: {message}.")]
	Backend {
		/// What failed and where.
		message: String,
	},
}

/// Key the token pair is stored under.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(String);
impl StorageKey {
	/// Key used by the storefront for the customer-account session.
	pub const DEFAULT: &'static str = "customer_account_token";

	/// Creates a key after rejecting empty or whitespace-only values.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ConfigError> {
		match value.as_ref().trim() {
			"" => Err(ConfigError::EmptyStorageKey),
			key => Ok(Self(key.to_owned())),
		}
	}
}
impl Default for StorageKey {
	fn default() -> Self {
		Self(Self::DEFAULT.to_owned())
	}
}
impl Deref for StorageKey {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for StorageKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<StorageKey> for String {
	fn from(value: StorageKey) -> Self {
		value.0
	}
}
impl TryFrom<String> for StorageKey {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Debug for StorageKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "StorageKey({})", self.0)
	}
}
impl Display for StorageKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
