//! In-process [`TokenStore`] for tests and short-lived sessions.

// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	store::{StorageKey, StoreFuture, TokenStore},
};

/// Keeps token pairs in process memory. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<StorageKey, TokenPair>>>);
impl MemoryStore {
	/// Creates a store pre-populated with `tokens` under `key`.
	pub fn seeded(key: StorageKey, tokens: TokenPair) -> Self {
		let store = Self::default();

		store.0.write().insert(key, tokens);

		store
	}

	/// Number of keys currently held.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no key is held.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a StorageKey) -> StoreFuture<'a, Option<TokenPair>> {
		Box::pin(async move { Ok(self.0.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a StorageKey, tokens: TokenPair) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.0.write().insert(key.clone(), tokens);

			Ok(())
		})
	}

	fn clear<'a>(&'a self, key: &'a StorageKey) -> StoreFuture<'a, Option<TokenPair>> {
		Box::pin(async move { Ok(self.0.write().remove(key)) })
	}
}
