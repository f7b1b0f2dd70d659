use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Order, OrderDraft, OrderStatus};

use crate::Result;

/// Core trait for order store implementations.
///
/// The store holds the current state of every order. Status updates use
/// optimistic check-and-set: the caller states the status it observed,
/// and the update fails with `StatusConflict` if the persisted status
/// has moved on. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a draft as a new order in `Pending` status.
    ///
    /// Assigns the order ID and stamps the creation time.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order>;

    /// Retrieves an order by ID.
    async fn get_order(&self, order_id: OrderId) -> Result<Order>;

    /// Moves an order to `target` status, stamping `at` as the
    /// transition time.
    ///
    /// Fails with `StatusConflict` unless the persisted status equals
    /// `expected` at the moment of the update. At most one concurrent
    /// caller can win a transition out of a given status.
    async fn set_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        expected: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Order>;

    /// Attaches the receipt URL to an order.
    ///
    /// The receipt reference is set-once and only accepted while the
    /// order is in `Pending` or `PaymentReview`.
    async fn attach_receipt(&self, order_id: OrderId, url: &str) -> Result<Order>;

    /// Lists all orders, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;
}
