//! Order fulfillment for the storefront.
//!
//! This crate drives the two halves of the order workflow:
//! - The checkout orchestrator: the three-step interaction that turns a
//!   cart into a pending order with an uploaded payment receipt.
//! - The order lifecycle manager: validated status transitions with a
//!   check-and-set against the store, each triggering one best-effort
//!   customer/admin notification pair.
//!
//! Mail, receipt storage, and the admin recipient directory are
//! boundary traits with in-memory implementations for tests.

pub mod checkout;
pub mod error;
pub mod lifecycle;
pub mod services;

pub use checkout::{CheckoutFlow, CheckoutStep};
pub use error::{FulfillmentError, Result};
pub use lifecycle::{DispatchReport, OrderLifecycle, SendOutcome, TransitionOutcome};
pub use services::{
    AdminDirectory, InMemoryAdminDirectory, InMemoryMailer, InMemoryReceiptStorage, Mailer,
    ReceiptFile, ReceiptStorage, SentEmail,
};
