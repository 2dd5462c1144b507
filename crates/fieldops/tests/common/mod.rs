//! Common test utilities and helpers

use async_trait::async_trait;
use bytes::Bytes;
use fieldops::{BreakerConfig, Client, HttpRequest, HttpResponse, Jitter, RetryPolicy, Transport};
use fieldops_core::ManualClock;
use fieldops_transport::TransportError;
use http::{HeaderMap, HeaderValue, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Create a test API key
#[allow(dead_code)]
pub fn test_api_key() -> String {
    "fo_test_0123456789abcdef".to_string()
}

/// Retry policy with deterministic delays: `base`, `2 * base`, ...
#[allow(dead_code)]
pub fn fixed_policy(max_attempts: u32, base: Duration) -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(max_attempts)
        .base_delay(base)
        .multiplier(2.0)
        .jitter(Jitter::None)
        .build()
}

#[allow(dead_code)]
pub fn breaker(threshold: u32, open: Duration) -> BreakerConfig {
    BreakerConfig::builder()
        .failure_threshold(threshold)
        .open_duration(open)
        .build()
}

/// Client wired to a scripted transport and a manual breaker clock.
#[allow(dead_code)]
pub fn scripted_client(
    transport: Arc<ScriptedTransport>,
    policy: RetryPolicy,
    breaker: BreakerConfig,
    clock: &ManualClock,
) -> Client {
    Client::builder()
        .api_key(test_api_key())
        .base_url("https://fsm.test/api/v2/")
        .retry_policy(policy)
        .breaker(breaker)
        .transport(transport)
        .clock(Arc::new(clock.clone()))
        .build()
        .expect("Failed to build client")
}

#[allow(dead_code)]
#[derive(Debug)]
struct Reply {
    delay: Duration,
    result: Result<HttpResponse, TransportError>,
}

/// A transport that plays back queued replies and records every request.
///
/// Running out of replies is a transport error, so a test that makes more
/// attempts than it scripted fails loudly.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn status(self: &Arc<Self>, code: u16) -> Arc<Self> {
        self.push(Duration::ZERO, Ok(response(code, HeaderMap::new(), "")))
    }

    pub fn status_with_body(self: &Arc<Self>, code: u16, body: &'static str) -> Arc<Self> {
        self.push(Duration::ZERO, Ok(response(code, HeaderMap::new(), body)))
    }

    pub fn retry_after(self: &Arc<Self>, code: u16, value: &'static str) -> Arc<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static(value));
        self.push(Duration::ZERO, Ok(response(code, headers, "")))
    }

    pub fn delayed_status(self: &Arc<Self>, code: u16, delay: Duration) -> Arc<Self> {
        self.push(delay, Ok(response(code, HeaderMap::new(), "")))
    }

    pub fn error(self: &Arc<Self>, error: TransportError) -> Arc<Self> {
        self.push(Duration::ZERO, Err(error))
    }

    fn push(self: &Arc<Self>, delay: Duration, result: Result<HttpResponse, TransportError>) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply { delay, result });
        Arc::clone(self)
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(TransportError::Other("no scripted reply left".into())),
        }
    }
}

#[allow(dead_code)]
fn response(code: u16, headers: HeaderMap, body: &'static str) -> HttpResponse {
    HttpResponse::new(
        StatusCode::from_u16(code).unwrap(),
        headers,
        Bytes::from_static(body.as_bytes()),
    )
}
