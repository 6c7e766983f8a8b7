// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle events counted by [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RefreshEvent {
	/// The refresher was invoked.
	Started,
	/// The refreshed pair was written to the store.
	Stored,
	/// The refresher or the store write failed.
	Failed,
	/// A caller awaited a refresh another caller had already started.
	Joined,
}

/// Counters shared by every clone of a client.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	started: AtomicU64,
	stored: AtomicU64,
	failed: AtomicU64,
	joined: AtomicU64,
}
impl RefreshMetrics {
	/// Returns a point-in-time copy of the counters.
	pub fn snapshot(&self) -> RefreshSnapshot {
		RefreshSnapshot {
			attempts: self.started.load(Ordering::Relaxed),
			successes: self.stored.load(Ordering::Relaxed),
			failures: self.failed.load(Ordering::Relaxed),
			joined: self.joined.load(Ordering::Relaxed),
		}
	}

	pub(crate) fn record(&self, event: RefreshEvent) {
		let counter = match event {
			RefreshEvent::Started => &self.started,
			RefreshEvent::Stored => &self.stored,
			RefreshEvent::Failed => &self.failed,
			RefreshEvent::Joined => &self.joined,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}

/// Values read by [`RefreshMetrics::snapshot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSnapshot {
	/// Refresh calls handed to the refresher.
	pub attempts: u64,
	/// Refreshes whose new pair was stored.
	pub successes: u64,
	/// Refreshes that failed and cleared the session.
	pub failures: u64,
	/// Callers that awaited a refresh started by someone else.
	pub joined: u64,
}
