//! Expense record type and id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single expense entry.
///
/// Every record in the store has a non-empty id, unique within the store,
/// a trimmed non-empty name, and a finite amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseRecord {
    /// Opaque unique identifier, assigned by the store at creation time.
    pub id: String,

    /// Label for the expense, trimmed and non-empty.
    pub name: String,

    /// Currency-agnostic amount. Always finite, not necessarily rounded.
    pub amount: f64,
}

impl ExpenseRecord {
    /// Create a record with a freshly assigned id.
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            id: next_expense_id(),
            name: name.into(),
            amount,
        }
    }
}

// Sequence counter appended to ids so that records created within the same
// millisecond still get distinct ids.
static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh record id, unique for the lifetime of the process.
pub fn next_expense_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("expense-{}-{}", millis, seq)
}
