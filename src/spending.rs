//! Transaction loading and spending aggregation
//!
//! Pure, synchronous local compute: no external calls, no shared state.
//! Amounts are negative for spending and positive for income; income is
//! ignored when summarizing.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single mock transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct TransactionFile {
    transactions: Vec<Transaction>,
}

/// Load the mock transaction set from disk (once, at startup)
pub fn load_transactions(path: impl AsRef<Path>) -> AppResult<Vec<Transaction>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!(
            "Failed to read transactions file {}: {e}",
            path.display()
        ))
    })?;

    let file: TransactionFile = serde_json::from_str(&contents).map_err(|e| {
        AppError::Config(format!(
            "Failed to parse transactions file {}: {e}",
            path.display()
        ))
    })?;

    tracing::info!(
        path = %path.display(),
        count = file.transactions.len(),
        "Loaded mock transactions"
    );

    Ok(file.transactions)
}

/// Sum spending per category, ignoring income (positive amounts)
///
/// Spending amounts are stored negative; totals are their absolute values.
/// The BTreeMap keeps category iteration order deterministic.
pub fn summarize_spending(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();

    for tx in transactions {
        if tx.amount > 0.0 {
            continue;
        }
        *totals.entry(tx.category.clone()).or_insert(0.0) += tx.amount.abs();
    }

    totals
}

/// Category with the highest total spend
///
/// Ties resolve to the first category in map iteration order, which is
/// alphabetical and therefore stable.
pub fn dominant_category(totals: &BTreeMap<String, f64>) -> Option<&str> {
    totals
        .iter()
        .fold(None::<(&str, f64)>, |best, (category, &total)| match best {
            Some((_, best_total)) if total <= best_total => best,
            _ => Some((category, total)),
        })
        .map(|(category, _)| category)
}

/// Coarse classification of total weekly spend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendLevel {
    Low,
    Moderate,
    High,
}

impl SpendLevel {
    /// Classify a weekly total: below 50 is low, below 150 is moderate,
    /// everything else is high. Exactly 50 is moderate.
    pub fn from_total(total: f64) -> Self {
        if total < 50.0 {
            SpendLevel::Low
        } else if total < 150.0 {
            SpendLevel::Moderate
        } else {
            SpendLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpendLevel::Low => "low",
            SpendLevel::Moderate => "moderate",
            SpendLevel::High => "high",
        }
    }
}
