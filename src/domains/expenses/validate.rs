//! Strict and lenient normalization of untrusted expense input.
//!
//! Two modes of one routine. Strict mode guards fresh client input on both
//! mutation paths (REST and tool invocation) and rejects with a structured
//! reason. Lenient repair mode re-hydrates possibly corrupted persisted
//! data, substituting safe defaults so no record is ever dropped.

use serde_json::Value;

use super::error::ValidationError;
use super::record::{ExpenseRecord, next_expense_id};

/// A validated expense payload, ready to become a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidExpense {
    /// Trimmed, non-empty label.
    pub name: String,

    /// Finite amount.
    pub amount: f64,
}

/// Strict mode: validate fresh client input.
///
/// `name` must be a string that is non-empty after trimming; `amount` must
/// coerce to a finite number. Any violation produces a [`ValidationError`]
/// with one message per violated field.
pub fn validate_strict(raw: &Value) -> Result<ValidExpense, ValidationError> {
    let mut issues = Vec::new();

    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if name.is_empty() {
        issues.push("Name is required".to_string());
    }

    let amount = raw.get("amount").and_then(coerce_amount);
    if amount.is_none() {
        issues.push("Amount must be a finite number".to_string());
    }

    match amount {
        Some(amount) if issues.is_empty() => Ok(ValidExpense {
            name: name.to_string(),
            amount,
        }),
        _ => Err(ValidationError::new(issues)),
    }
}

/// Lenient/repair mode: re-hydrate a possibly corrupted persisted element.
///
/// Never rejects: a missing or empty id is synthesized, a non-string name
/// becomes the empty string, and a non-finite or non-numeric amount becomes
/// zero. Null or non-object elements repair to a fully defaulted record.
pub fn repair(raw: &Value) -> ExpenseRecord {
    let id = match raw.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => next_expense_id(),
    };

    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let amount = raw.get("amount").and_then(coerce_amount).unwrap_or(0.0);

    ExpenseRecord { id, name, amount }
}

/// Coerce a JSON value into a finite amount.
///
/// Accepts JSON numbers and number-like strings; anything else, including
/// strings that parse to NaN or infinity, yields `None`.
fn coerce_amount(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|amount| amount.is_finite())
}
