//! Faucet endpoints.
//!
//! Every response is a 200 with a plain text body; failures are reported in
//! the body.

use axum::extract::{RawQuery, State};

use crate::http::server::AppState;

pub const DISPENSED: &str = "Done! go check your money.";
pub const MISSING_ADDRESS: &str = "Just give me a address!";
pub const MULTIPLE_ADDRESSES: &str = "Just give me ONE address!";

/// `GET /faucet?address=<hex>`
pub async fn faucet(State(state): State<AppState>, RawQuery(query): RawQuery) -> String {
    let address = match single_address(query.as_deref()) {
        Ok(address) => address,
        Err(reply) => return reply.to_string(),
    };
    tracing::info!(address = %address, "Faucet request");

    match state.pipeline.dispense(&address).await {
        Ok(_) => DISPENSED.to_string(),
        Err(e) => {
            tracing::warn!(address = %address, error = %e, "Dispense failed");
            format!("something is wrong: {}", e)
        }
    }
}

/// `GET /balance?address=<hex>`
pub async fn balance(State(state): State<AppState>, RawQuery(query): RawQuery) -> String {
    let address = match single_address(query.as_deref()) {
        Ok(address) => address,
        Err(reply) => return reply.to_string(),
    };

    match state.balances.balance(&address).await {
        Ok(balance) => format!("balance: {}", balance.display),
        Err(e) => {
            tracing::warn!(address = %address, error = %e, "Balance query failed");
            format!("something is wrong: {}", e)
        }
    }
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// The one `address` value in `query`, or the reply explaining what is wrong.
pub fn single_address(query: Option<&str>) -> Result<String, &'static str> {
    let values: Vec<String> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .filter(|(key, _)| key == "address")
        .map(|(_, value)| value.into_owned())
        .collect();

    match values.as_slice() {
        [] => Err(MISSING_ADDRESS),
        [one] => Ok(one.clone()),
        _ => Err(MULTIPLE_ADDRESSES),
    }
}
