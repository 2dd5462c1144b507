//! Example listing open work orders with retries and circuit breaking
//!
//! This example shows how to:
//! 1. Load the client configuration from `FIELDOPS_*` variables
//! 2. Tune the retry policy and breaker for a batch job
//! 3. Tell failure kinds apart when a call fails
//!
//! # Prerequisites
//!
//! ```bash
//! export FIELDOPS_BASE_URL=https://fsm.example.com/api/v2/
//! export FIELDOPS_API_KEY=fo_live_...
//! ```
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=fieldops=debug,fieldops_core=debug cargo run --example work_orders --features trace
//! ```

use fieldops::observability::init_tracing;
use fieldops::{
    BreakerConfig, Client, ClientConfig, ErrorKind, Jitter, RequestDescriptor, RetryPolicy,
};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct WorkOrder {
    id: u64,
    status: String,
    #[serde(default)]
    technician: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ClientConfig {
        retry: RetryPolicy::builder()
            .max_attempts(5)
            .base_delay(Duration::from_millis(250))
            .max_delay(Duration::from_secs(10))
            .jitter(Jitter::Full)
            .build(),
        breaker: BreakerConfig::builder()
            .failure_threshold(3)
            .open_duration(Duration::from_secs(15))
            .build(),
        ..Default::default()
    }
    .merge(ClientConfig::from_env()?);

    let client = Client::from_config(config)?;

    for page in 1..=3 {
        let request = RequestDescriptor::get("work-orders")
            .query("status", "open")
            .query("page", page)
            .deadline(Duration::from_secs(30));

        match client.execute(request, None).await {
            Ok(response) => {
                let orders: Vec<WorkOrder> = response.json()?;
                println!(
                    "page {page}: {} orders in {} attempt(s)",
                    orders.len(),
                    response.attempts()
                );
                for order in orders {
                    println!(
                        "  #{} {} {}",
                        order.id,
                        order.status,
                        order.technician.as_deref().unwrap_or("-")
                    );
                }
            }
            Err(error) => match error.kind() {
                Some(ErrorKind::CircuitOpen) => {
                    println!("service unhealthy, retry in {:?}", error.retry_after());
                    break;
                }
                Some(ErrorKind::Authentication) => return Err(error.into()),
                _ => println!("page {page} failed: {error}"),
            },
        }
    }

    println!("breaker: {:?}", client.breaker_snapshot());
    Ok(())
}
