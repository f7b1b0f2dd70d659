//! Domain error types.

use thiserror::Error;

use crate::order::OrderStatus;

/// Errors raised by pure domain validation and the status table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Required shipping fields are blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// An order draft must carry at least one line.
    #[error("order has no lines")]
    EmptyOrder,

    /// Line quantity must be at least 1.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity { quantity: u32 },

    /// Line unit price must be positive.
    #[error("invalid unit price: {kobo} kobo")]
    InvalidPrice { kobo: i64 },

    /// The supplied total does not match the sum of line subtotals.
    #[error("total mismatch: expected {expected} from line subtotals, got {actual}")]
    TotalMismatch { expected: String, actual: String },

    /// The target status is not a legal successor of the current status.
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}
