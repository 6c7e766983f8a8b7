//! Single-flight refresh state shared by every clone of a client.

// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
// self
use crate::{_prelude::*, auth::TokenPair};

/// Reason a shared refresh failed; cloned to every waiter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RefreshFailure {
	pub reason: String,
}

pub(crate) type RefreshOutcome = std::result::Result<TokenPair, RefreshFailure>;
pub(crate) type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
	Idle,
	Refreshing(SharedRefresh),
}

/// Hands the in-flight refresh to late callers and resets to idle once it settles.
#[derive(Clone)]
pub(crate) struct RefreshCoordinator {
	state: Arc<Mutex<RefreshState>>,
}
impl RefreshCoordinator {
	pub(crate) fn is_refreshing(&self) -> bool {
		matches!(*self.state.lock(), RefreshState::Refreshing(_))
	}

	/// Returns the in-flight refresh, or starts one with `start` when idle.
	///
	/// The boolean is `true` when the caller joined a refresh started by someone else. `start`
	/// runs under the state lock and must only build the future.
	pub(crate) fn join_or_start<F>(&self, start: F) -> (SharedRefresh, bool)
	where
		F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
	{
		let mut state = self.state.lock();

		if let RefreshState::Refreshing(shared) = &*state {
			return (shared.clone(), true);
		}

		let weak = Arc::downgrade(&self.state);
		let refresh = start();
		let shared = async move {
			let outcome = refresh.await;

			if let Some(state) = weak.upgrade() {
				*state.lock() = RefreshState::Idle;
			}

			outcome
		}
		.boxed()
		.shared();

		*state = RefreshState::Refreshing(shared.clone());

		(shared, false)
	}
}
impl Default for RefreshCoordinator {
	fn default() -> Self {
		Self { state: Arc::new(Mutex::new(RefreshState::Idle)) }
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator").field("refreshing", &self.is_refreshing()).finish()
	}
}
