//! Mock transaction debug endpoint
//!
//! Echoes the transaction set loaded at startup so clients can see the data
//! the insight endpoint summarizes.

use crate::spending::Transaction;
use axum::{Json, extract::State};
use serde::Serialize;

use crate::handlers::AppState;

/// Response body wrapping the mock transaction set
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// Mock transactions handler
pub async fn handler(State(state): State<AppState>) -> Json<TransactionsResponse> {
    Json(TransactionsResponse {
        transactions: state.transactions().to_vec(),
    })
}
