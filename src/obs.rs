//! Optional observability hooks for client operations.
//!
//! # Feature Flags
//!
//! - `tracing`: every request and every shared refresh runs inside an
//!   `info_span!("storefront_gql.operation")` carrying `operation` and `stage`. The single retry
//!   emits a debug event, giving up on a session emits a warning, and failing to clear it
//!   emits an error.
//! - `metrics`: increments `storefront_gql_operation_total{operation, outcome}`.
//!
//! Without either feature the hooks compile to no-ops.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// A caller-issued GraphQL request.
	Request,
	/// The single retry of a request whose bearer token was rejected.
	Retry,
	/// The shared token refresh.
	Refresh,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Request => "request",
			Self::Retry => "retry",
			Self::Refresh => "refresh",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// The operation started.
	Attempt,
	/// The operation completed.
	Success,
	/// The operation failed and the error was returned.
	Failure,
	/// The caller awaited a refresh someone else started instead of starting its own.
	Joined,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
			Self::Joined => "joined",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
