//! The fault-tolerant call path
//!
//! Every endpoint call goes through [`Dispatcher::execute`]: breaker
//! admission, then the retry loop around header lookup and
//! [`Transport::send`], then exactly one breaker update.

use super::request::RequestDescriptor;
use super::response::Response;
use crate::auth::HeaderProvider;
use crate::error::{Result, message_from_body};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};
use fieldops_core::{
    AttemptContext, CircuitBreaker, Error as CallError, ErrorKind, FailureSignal, RetryExecutor,
    RetryPolicy, classify,
};
use fieldops_transport::{HttpRequest, HttpResponse, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Shared state behind a [`Client`](crate::Client).
#[derive(Debug)]
pub(crate) struct Dispatcher {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) headers: Arc<dyn HeaderProvider>,
    pub(crate) breaker: Arc<CircuitBreaker>,
    pub(crate) base_url: Url,
    pub(crate) timeout: Option<Duration>,
    pub(crate) policy: RetryPolicy,
}

impl Dispatcher {
    /// Run one logical call.
    ///
    /// `policy` overrides the client's retry policy for this call only.
    pub(crate) async fn execute(
        &self,
        request: &RequestDescriptor,
        policy: Option<&RetryPolicy>,
    ) -> Result<Response> {
        let mut metadata = RequestMetadata::new(request.method().as_str(), request.path());
        if let Some(body) = request.body_bytes() {
            metadata = metadata.with_body_size(body.len());
        }
        metadata.log_request();
        let timer = RequestTimer::start();

        let url = match request.resolve_url(&self.base_url) {
            Ok(url) => url,
            Err(error) => return Err(self.fail(&metadata, timer, 0, error)),
        };

        let permit = match self.breaker.admit() {
            Ok(permit) => permit,
            Err(error) => return Err(self.fail(&metadata, timer, 0, error)),
        };

        let mut ctx = AttemptContext::new();
        if let Some(budget) = request.deadline_budget() {
            ctx = ctx.with_deadline(budget);
        }
        let timeout = request.timeout_override().or(self.timeout);
        let policy = policy.unwrap_or(&self.policy);

        let outcome = RetryExecutor::new(policy)
            .run(&mut ctx, |ctx| {
                self.attempt(request, &url, timeout, ctx.attempt())
            })
            .await;

        match outcome {
            Ok(response) => {
                permit.success();
                let elapsed = timer.elapsed();
                ResponseMetadata::new(elapsed, ctx.attempt())
                    .with_status(response.status.as_u16())
                    .with_body_size(response.body.len())
                    .log_success(&metadata);
                Ok(Response::new(
                    response.status,
                    response.headers,
                    response.body,
                    ctx.attempt(),
                    elapsed,
                ))
            }
            Err(error) => {
                // a veto raised mid-call or a deadline hit while waiting says
                // nothing about the remote's health
                if error.kind() == ErrorKind::CircuitOpen || error.is_backoff_timeout() {
                    permit.release();
                } else {
                    permit.failure(&error);
                }
                Err(self.fail(&metadata, timer, ctx.attempt(), error))
            }
        }
    }

    async fn attempt(
        &self,
        request: &RequestDescriptor,
        url: &Url,
        timeout: Option<Duration>,
        attempt: u32,
    ) -> std::result::Result<HttpResponse, CallError> {
        if attempt > 1 && self.breaker.is_open() {
            return Err(self.opened_meanwhile());
        }

        let mut headers = self.headers.headers()?;
        headers.extend(request.headers().clone());

        let mut http_request =
            HttpRequest::new(request.method().clone(), url.clone()).with_headers(headers);
        if let Some(body) = request.body_bytes() {
            http_request = http_request.with_body(body.clone());
        }
        if let Some(timeout) = timeout {
            http_request = http_request.with_timeout(timeout);
        }

        debug!(attempt, method = %request.method(), %url, "Sending attempt");
        let response = self.transport.send(http_request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let message = message_from_body(&response.body);
        Err(classify(FailureSignal::Status {
            status: response.status.as_u16(),
            headers: response.headers,
            message,
        }))
    }

    fn opened_meanwhile(&self) -> CallError {
        let snapshot = self.breaker.snapshot();
        let retry_in = self
            .breaker
            .config()
            .open_duration()
            .checked_sub(snapshot.since_transition);
        CallError::circuit_open(retry_in, "circuit opened by a concurrent call")
    }

    fn fail(
        &self,
        metadata: &RequestMetadata,
        timer: RequestTimer,
        attempts: u32,
        error: CallError,
    ) -> crate::Error {
        ResponseMetadata::new(timer.elapsed(), attempts).log_error(
            metadata,
            &error,
            self.breaker.state(),
        );
        error.into()
    }
}
