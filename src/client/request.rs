//! Request execution: send with the stored bearer, refresh once on rejection, retry once.

// crates.io
use futures::future::{BoxFuture, FutureExt};
// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	client::{
		CustomerClient,
		coordinator::{RefreshFailure, RefreshOutcome},
	},
	graphql::{GraphQlRequest, GraphQlResponse, ResponseOutcome},
	http::GraphQlTransport,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	refresh::RefreshEvent,
	store::{StorageKey, StoreError, TokenStore},
};

const SESSION_CLEARED: &str = "Customer session was cleared before it could be refreshed";

enum Delivery {
	Data(JsonValue),
	Unauthenticated(String),
}

impl<T> CustomerClient<T>
where
	T: ?Sized + GraphQlTransport,
{
	/// Runs `query` with `variables` and decodes the `data` payload into `R`.
	///
	/// See [`request_value`](Self::request_value) for the authentication contract.
	pub async fn request<R>(&self, query: &str, variables: Option<JsonValue>) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let data = self.request_value(query, variables).await?;

		serde_path_to_error::deserialize(data).map_err(Error::Decode)
	}

	/// Runs `query` with `variables` and returns the raw `data` payload.
	///
	/// - No stored pair: [`Error::AuthenticationRequired`] without touching the network.
	/// - Rejected bearer: one shared refresh, then exactly one retry with the refreshed token. If
	///   another caller already replaced the stored token, the retry uses it without refreshing.
	/// - Refresh failure or a retry that is still rejected: the stored pair is cleared and the
	///   call fails with [`Error::AuthenticationFailed`].
	/// - Transport failures and other GraphQL errors are returned as-is and never retried.
	pub async fn request_value(
		&self,
		query: &str,
		variables: Option<JsonValue>,
	) -> Result<JsonValue> {
		const KIND: OperationKind = OperationKind::Request;

		let span = OperationSpan::new(KIND, "request_value");
		let request = GraphQlRequest::new(query).with_variables(variables);

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.execute(&request)).await;
		let outcome =
			if result.is_ok() { OperationOutcome::Success } else { OperationOutcome::Failure };

		obs::record_operation_outcome(KIND, outcome);

		result
	}

	async fn execute(&self, request: &GraphQlRequest) -> Result<JsonValue> {
		let key = &self.config.storage_key;
		let tokens = self.store.get(key).await?.ok_or(Error::AuthenticationRequired)?;

		match self.send(&tokens, request).await? {
			Delivery::Data(data) => return Ok(data),
			Delivery::Unauthenticated(_) => {},
		}

		let (fresh, refreshed) = self.recover(tokens).await?;

		obs::record_retry(refreshed);
		obs::record_operation_outcome(OperationKind::Retry, OperationOutcome::Attempt);

		let retried = self.send(&fresh, request).await;
		let outcome = match &retried {
			Ok(Delivery::Data(_)) => OperationOutcome::Success,
			_ => OperationOutcome::Failure,
		};

		obs::record_operation_outcome(OperationKind::Retry, outcome);

		match retried? {
			Delivery::Data(data) => Ok(data),
			Delivery::Unauthenticated(message) => {
				obs::record_give_up(OperationKind::Retry, &message);
				clear_if_current(&*self.store, key, &fresh.access_token).await?;

				Err(Error::AuthenticationFailed { reason: message })
			},
		}
	}

	async fn send(&self, tokens: &TokenPair, request: &GraphQlRequest) -> Result<Delivery> {
		let reply =
			self.transport.post(&self.config.endpoint, tokens.access_token.expose(), request).await?;

		match GraphQlResponse::from_reply(reply)?.classify(self.classifier.as_ref()) {
			ResponseOutcome::Data(data) => Ok(Delivery::Data(data)),
			ResponseOutcome::AuthFailure { message } => Ok(Delivery::Unauthenticated(message)),
			ResponseOutcome::Failed { message, code } => Err(Error::GraphQl { message, code }),
		}
	}

	/// Produces the pair for the single retry after `used` was rejected, and whether a refresh
	/// ran to obtain it.
	async fn recover(&self, used: TokenPair) -> Result<(TokenPair, bool)> {
		let Some(stored) = self.store.get(&self.config.storage_key).await? else {
			return Err(Error::AuthenticationFailed { reason: SESSION_CLEARED.into() });
		};

		if stored.access_token != used.access_token {
			return Ok((stored, false));
		}

		let (refresh, joined) = self.coordinator.join_or_start(|| self.start_refresh(stored));

		if joined {
			self.refresh_metrics.record(RefreshEvent::Joined);
			obs::record_operation_outcome(OperationKind::Refresh, OperationOutcome::Joined);
		}

		refresh
			.await
			.map(|tokens| (tokens, true))
			.map_err(|failure| Error::AuthenticationFailed { reason: failure.reason })
	}

	fn start_refresh(&self, current: TokenPair) -> BoxFuture<'static, RefreshOutcome> {
		const KIND: OperationKind = OperationKind::Refresh;

		let refresher = self.refresher.clone();
		let store = self.store.clone();
		let key = self.config.storage_key.clone();
		let metrics = self.refresh_metrics.clone();
		let span = OperationSpan::new(KIND, "start_refresh");

		span.instrument(async move {
			let rejected = current.access_token.clone();

			// A refresh that settled after the caller read the store already replaced the pair.
			match store.get(&key).await {
				Ok(Some(stored)) if stored.access_token != rejected => return Ok(stored),
				Ok(None) => return Err(RefreshFailure { reason: SESSION_CLEARED.into() }),
				Ok(Some(_)) | Err(_) => {},
			}

			metrics.record(RefreshEvent::Started);
			obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

			let refreshed = match refresher.refresh(current).await {
				Ok(tokens) =>
					store.set(&key, tokens.clone()).await.map(|()| tokens).map_err(Error::from),
				Err(e) => Err(e),
			};

			match refreshed {
				Ok(tokens) => {
					metrics.record(RefreshEvent::Stored);
					obs::record_operation_outcome(KIND, OperationOutcome::Success);

					Ok(tokens)
				},
				Err(e) => {
					let mut reason = failure_reason(e);

					metrics.record(RefreshEvent::Failed);
					obs::record_operation_outcome(KIND, OperationOutcome::Failure);
					obs::record_give_up(KIND, &reason);

					if let Err(clear_err) = clear_if_current(&*store, &key, &rejected).await {
						obs::record_clear_failure(KIND, &clear_err.to_string());

						reason = format!("{reason} (session could not be cleared: {clear_err})");
					}

					Err(RefreshFailure { reason })
				},
			}
		})
		.boxed()
	}
}

/// Clears the session only while it still holds the rejected access token.
async fn clear_if_current(
	store: &dyn TokenStore,
	key: &StorageKey,
	rejected: &TokenSecret,
) -> Result<bool, StoreError> {
	match store.get(key).await? {
		Some(stored) if stored.access_token == *rejected => Ok(store.clear(key).await?.is_some()),
		_ => Ok(false),
	}
}

fn failure_reason(err: Error) -> String {
	match err {
		Error::AuthenticationFailed { reason } => reason,
		other => other.to_string(),
	}
}
