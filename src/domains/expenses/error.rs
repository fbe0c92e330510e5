//! Expense domain error types.

use thiserror::Error;

/// Rejection produced by strict validation of client input.
///
/// Carries one message per violated field; the `Display` implementation
/// joins them for human display. No record is constructed when this is
/// returned.
#[derive(Debug, Clone, Error)]
#[error("{}", .issues.join("; "))]
pub struct ValidationError {
    issues: Vec<String>,
}

impl ValidationError {
    /// Create a validation error from per-field messages.
    pub fn new(issues: Vec<String>) -> Self {
        Self { issues }
    }

    /// The individual per-field messages.
    pub fn issues(&self) -> &[String] {
        &self.issues
    }
}
