//! Domain layer for the storefront order core.
//!
//! This crate provides the pure domain pieces:
//! - The order status state machine with its explicit transition table
//! - The order record, draft, and value objects
//! - The session-local shopping cart
//! - The notification composer mapping transitions to email pairs

pub mod cart;
pub mod error;
pub mod notification;
pub mod order;

pub use cart::{Cart, CartLine, LineId};
pub use error::OrderError;
pub use notification::{Email, EmailPair, NotificationKind, compose};
pub use order::{
    Money, Order, OrderDraft, OrderLine, OrderStatus, ProductId, ShippingDetails, UnknownStatus,
    Variant,
};
