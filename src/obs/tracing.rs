// self
use crate::{_prelude::*, obs::OperationKind};

/// Future returned by [`OperationSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`OperationSpan::instrument`].
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// `storefront_gql.operation` span for one request or refresh.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a span labelled with `kind` and the calling `stage`.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"storefront_gql.operation",
					operation = kind.as_str(),
					stage
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Attaches the span to `fut` without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Debug event emitted right before the single retry.
///
/// `refreshed` is `false` when the retry reuses a token another caller already stored.
pub fn record_retry(refreshed: bool) {
	#[cfg(feature = "tracing")]
	tracing::debug!(
		operation = OperationKind::Retry.as_str(),
		refreshed,
		"retrying with new bearer"
	);

	#[cfg(not(feature = "tracing"))]
	let _ = refreshed;
}

/// Warning emitted when the client clears the session and stops recovering.
pub fn record_give_up(kind: OperationKind, reason: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(operation = kind.as_str(), reason, "customer session dropped");

	#[cfg(not(feature = "tracing"))]
	let _ = (kind, reason);
}

/// Error emitted when a session that should have been dropped could not be cleared from the
/// store.
pub fn record_clear_failure(kind: OperationKind, error: &str) {
	#[cfg(feature = "tracing")]
	tracing::error!(operation = kind.as_str(), error, "failed to clear customer session");

	#[cfg(not(feature = "tracing"))]
	let _ = (kind, error);
}
