//! Fulfillment error types.

use common::OrderId;
use domain::{OrderError, OrderStatus};
use order_store::StoreError;
use thiserror::Error;

use crate::checkout::CheckoutStep;

/// Errors that can occur during checkout and lifecycle operations.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// Domain validation failed (missing shipping fields, bad lines).
    #[error("validation failed: {0}")]
    Validation(#[from] OrderError),

    /// The requested status change is not a legal transition.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Order not found.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// Checkout cannot submit an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Checkout cannot advance past the current step.
    #[error("checkout cannot advance from the {step} step")]
    CannotAdvance { step: CheckoutStep },

    /// Submission is only allowed at the payment step.
    #[error("submission requires the payment step (currently at {step})")]
    NotAtPayment { step: CheckoutStep },

    /// Receipt upload failed at the storage collaborator.
    #[error("receipt upload failed: {0}")]
    Upload(String),

    /// Mail dispatch failed. Never escalated out of a transition;
    /// reported through the dispatch report instead.
    #[error("mail dispatch failed: {0}")]
    Mail(String),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
