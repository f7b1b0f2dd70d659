use common::OrderId;
use domain::{OrderStatus, UnknownStatus};
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The order was not found in the store.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// A check-and-set status update lost to a concurrent writer.
    /// The expected status did not match the persisted status.
    #[error("status conflict for order {order_id}: expected {expected}, found {actual}")]
    StatusConflict {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// A receipt reference is already attached to the order.
    #[error("receipt already attached to order {0}")]
    ReceiptAlreadyAttached(OrderId),

    /// The order's status no longer accepts a receipt.
    #[error("order {order_id} no longer accepts a receipt (status {status})")]
    ReceiptNotAccepted {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// A stored status string could not be parsed.
    #[error("corrupt status column: {0}")]
    InvalidStatus(#[from] UnknownStatus),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
