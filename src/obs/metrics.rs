// self
use crate::obs::{OperationKind, OperationOutcome};

/// Increments `storefront_gql_operation_total` through the global recorder, if one is installed.
pub fn record_operation_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"storefront_gql_operation_total",
		"operation" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}
