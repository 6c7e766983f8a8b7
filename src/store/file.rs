//! File-backed [`TokenStore`] that behaves like the browser's durable local storage.

// std
use std::{
	fs::{self, OpenOptions},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	store::{StorageKey, StoreError, StoreFuture, TokenStore},
};

type Entries = HashMap<StorageKey, TokenPair>;

/// Persists token pairs to a JSON object (`{ "<key>": <pair> }`) after each mutation.
///
/// Writes go to a sibling `.tmp` file that is synced and then renamed over the original, so a
/// crash mid-write leaves the previous contents readable. The in-memory view only changes once
/// the write has landed.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	entries: Arc<RwLock<Entries>>,
}
impl FileStore {
	/// Opens the store at `path`, loading any pairs already persisted there.
	///
	/// A missing or empty file starts an empty store. Missing parent directories are created.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		create_parent(&path)?;

		let entries = read_entries(&path)?;

		Ok(Self { path, entries: Arc::new(RwLock::new(entries)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn flush(&self, entries: &Entries) -> Result<(), StoreError> {
		let json = serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode token pairs: {e}"),
		})?;

		create_parent(&self.path)?;
		replace_contents(&self.path, &json)
	}
}
impl TokenStore for FileStore {
	fn get<'a>(&'a self, key: &'a StorageKey) -> StoreFuture<'a, Option<TokenPair>> {
		Box::pin(async move { Ok(self.entries.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a StorageKey, tokens: TokenPair) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut entries = self.entries.write();
			let mut next = entries.clone();

			next.insert(key.clone(), tokens);
			self.flush(&next)?;
			*entries = next;

			Ok(())
		})
	}

	fn clear<'a>(&'a self, key: &'a StorageKey) -> StoreFuture<'a, Option<TokenPair>> {
		Box::pin(async move {
			let mut entries = self.entries.write();

			if !entries.contains_key(key) {
				return Ok(None);
			}

			let mut next = entries.clone();
			let previous = next.remove(key);

			self.flush(&next)?;
			*entries = next;

			Ok(previous)
		})
	}
}

fn backend<'a>(
	action: &'static str,
	path: &'a Path,
) -> impl FnOnce(std::io::Error) -> StoreError + 'a {
	move |e| StoreError::Backend { message: format!("Could not {action} {}: {e}", path.display()) }
}

fn read_entries(path: &Path) -> Result<Entries, StoreError> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
		Err(e) => return Err(backend("read", path)(e)),
	};

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Entries::new());
	}

	serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
		message: format!("{} does not hold stored token pairs: {e}", path.display()),
	})
}

fn create_parent(path: &Path) -> Result<(), StoreError> {
	match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() =>
			fs::create_dir_all(dir).map_err(backend("create directory", dir)),
		_ => Ok(()),
	}
}

fn replace_contents(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
	let staging = path.with_extension("tmp");
	let mut file = OpenOptions::new()
		.write(true)
		.create(true)
		.truncate(true)
		.open(&staging)
		.map_err(backend("open", &staging))?;

	file.write_all(bytes).map_err(backend("write", &staging))?;
	file.sync_all().map_err(backend("sync", &staging))?;
	drop(file);

	fs::rename(&staging, path).map_err(backend("replace", path))
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	struct ScratchFile(PathBuf);
	impl ScratchFile {
		fn new(label: &str) -> Self {
			Self(env::temp_dir().join(format!(
				"storefront_gql_file_store_{label}_{}_{}.json",
				process::id(),
				OffsetDateTime::now_utc().unix_timestamp_nanos(),
			)))
		}
	}
	impl Drop for ScratchFile {
		fn drop(&mut self) {
			let _ = fs::remove_file(&self.0);
		}
	}

	fn pair() -> TokenPair {
		TokenPair::new("access-token", OffsetDateTime::now_utc() + Duration::hours(1))
			.with_refresh_token("refresh-token")
	}

	#[tokio::test]
	async fn pairs_survive_reopen_as_plain_json() {
		let scratch = ScratchFile::new("reload");
		let store = FileStore::open(&scratch.0).expect("Store should open on a fresh path.");
		let key = StorageKey::default();
		let tokens = pair();

		store.set(&key, tokens.clone()).await.expect("Write should succeed.");
		drop(store);

		let reopened = FileStore::open(&scratch.0).expect("Store should reopen.");
		let fetched = reopened
			.get(&key)
			.await
			.expect("Read should succeed.")
			.expect("Pair should be present after reopen.");

		assert_eq!(fetched, tokens);

		let raw: JsonValue =
			serde_json::from_slice(&fs::read(&scratch.0).expect("Store file should exist."))
				.expect("Store file should contain JSON.");

		assert_eq!(raw[StorageKey::DEFAULT]["access_token"], "access-token");
		assert!(!scratch.0.with_extension("tmp").exists());
	}

	#[tokio::test]
	async fn clearing_is_persisted_and_idempotent() {
		let scratch = ScratchFile::new("clear");
		let store = FileStore::open(&scratch.0).expect("Store should open on a fresh path.");
		let key = StorageKey::default();

		store.set(&key, pair()).await.expect("Write should succeed.");

		assert!(store.clear(&key).await.expect("Clear should succeed.").is_some());
		assert!(store.clear(&key).await.expect("Second clear should succeed.").is_none());

		let reopened = FileStore::open(&scratch.0).expect("Store should reopen.");

		assert!(reopened.get(&key).await.expect("Read should succeed.").is_none());
	}

	#[tokio::test]
	async fn failed_writes_leave_memory_matching_disk() {
		let dir = env::temp_dir().join(format!(
			"storefront_gql_file_store_unwritable_{}_{}",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		));
		let path = dir.join("session.json");
		let store = FileStore::open(&path).expect("Store should open in a fresh directory.");
		let key = StorageKey::default();
		let tokens = pair();

		store.set(&key, tokens.clone()).await.expect("Write should succeed.");

		// Replace the parent directory with a plain file so every later write fails.
		fs::remove_dir_all(&dir).expect("Store directory should be removable.");
		fs::write(&dir, b"").expect("Blocking file should be written.");

		let replacement = TokenPair::new("other", OffsetDateTime::now_utc() + Duration::hours(1));
		let set_err = store.set(&key, replacement).await;
		let clear_err = store.clear(&key).await;

		let _ = fs::remove_file(&dir);

		assert!(matches!(set_err, Err(StoreError::Backend { .. })));
		assert!(matches!(clear_err, Err(StoreError::Backend { .. })));
		assert_eq!(store.get(&key).await.expect("Read should succeed."), Some(tokens));
	}

	#[test]
	fn blank_file_opens_empty_but_garbage_is_rejected() {
		let scratch = ScratchFile::new("contents");

		fs::write(&scratch.0, b"  \n").expect("Fixture should be written.");

		assert!(FileStore::open(&scratch.0).is_ok());

		fs::write(&scratch.0, b"not json").expect("Fixture should be written.");

		let err = FileStore::open(&scratch.0).expect_err("Garbage should be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));
	}
}
