use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VentureLinkError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    /// The Gordon growth denominator is zero or negative, so the perpetuity
    /// has no finite positive value.
    #[error(
        "Non-convergent terminal value: discount rate ({discount_rate}%) must exceed terminal growth rate ({terminal_growth_rate}%)"
    )]
    NonConvergentTerminalValue {
        discount_rate: Decimal,
        terminal_growth_rate: Decimal,
    },

    #[error("Record not found: {kind} {id}")]
    RecordNotFound { kind: String, id: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl VentureLinkError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        VentureLinkError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for VentureLinkError {
    fn from(e: serde_json::Error) -> Self {
        VentureLinkError::SerializationError(e.to_string())
    }
}
