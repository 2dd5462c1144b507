//! Example: retrying a flaky call behind a circuit breaker
//!
//! This example demonstrates:
//! 1. Retrying transient failures with exponential backoff
//! 2. A non-retryable failure surfacing immediately
//! 3. The breaker opening and vetoing calls without attempting them
//!
//! Run with:
//! ```bash
//! cargo run -p fieldops-core --example retry_example
//! ```

use fieldops_core::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A simulated endpoint that fails the first few times
struct FlakyEndpoint {
    attempts: AtomicU32,
    fail_count: u32,
    status: u16,
}

impl FlakyEndpoint {
    fn new(fail_count: u32, status: u16) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
            status,
        }
    }

    fn call(&self) -> Result<String, FailureSignal> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!("  Attempt {}: HTTP {}", attempt + 1, self.status);
            Err(FailureSignal::Status {
                status: self.status,
                headers: http::HeaderMap::new(),
                message: String::new(),
            })
        } else {
            println!("  Attempt {}: OK", attempt + 1);
            Ok("work order 4711".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

async fn example_transient_retry() -> Result<(), Error> {
    println!("\n=== Example 1: Transient failures are retried ===\n");

    let policy = RetryPolicy::builder()
        .max_attempts(3)
        .base_delay(Duration::from_millis(100))
        .jitter(Jitter::None)
        .build();
    let endpoint = FlakyEndpoint::new(2, 503);

    let start = Instant::now();
    let mut ctx = AttemptContext::new();
    let body = RetryExecutor::new(&policy)
        .run(&mut ctx, |_| {
            let outcome = endpoint.call();
            async move { outcome }
        })
        .await?;

    println!(
        "\nGot {body:?} after {} attempts in {:?}",
        endpoint.total_attempts(),
        start.elapsed()
    );
    Ok(())
}

async fn example_client_fault() {
    println!("\n=== Example 2: Client faults are not retried ===\n");

    let policy = RetryPolicy::default();
    let endpoint = FlakyEndpoint::new(5, 404);

    let mut ctx = AttemptContext::new();
    let result = RetryExecutor::new(&policy)
        .run(&mut ctx, |_| {
            let outcome = endpoint.call();
            async move { outcome }
        })
        .await;

    match result {
        Err(error) => println!("\nStopped with {} ({error})", error.kind()),
        Ok(body) => println!("\nUnexpected success: {body}"),
    }
}

async fn example_breaker() {
    println!("\n=== Example 3: The breaker opens ===\n");

    let breaker = CircuitBreaker::new(
        BreakerConfig::builder()
            .failure_threshold(2)
            .open_duration(Duration::from_secs(30))
            .build(),
    );
    let policy = RetryPolicy::no_retry();
    let endpoint = FlakyEndpoint::new(u32::MAX, 502);

    for call in 1..=3 {
        let permit = match breaker.admit() {
            Ok(permit) => permit,
            Err(error) => {
                println!("Call {call}: vetoed ({error})");
                continue;
            }
        };

        let mut ctx = AttemptContext::new();
        let result = RetryExecutor::new(&policy)
            .run(&mut ctx, |_| {
                let outcome = endpoint.call();
                async move { outcome }
            })
            .await;

        match result {
            Ok(_) => permit.success(),
            Err(error) => {
                println!("Call {call}: failed ({})", error.kind());
                permit.failure(&error);
            }
        }
        println!("  breaker is now {}", breaker.state());
    }

    println!("\nEndpoint was hit {} times", endpoint.total_attempts());
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    example_transient_retry().await?;
    example_client_fault().await;
    example_breaker().await;
    Ok(())
}
