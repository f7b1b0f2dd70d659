use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Order, OrderDraft, OrderStatus};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::OrderStore,
};

/// In-memory order store implementation for testing.
///
/// This implementation stores all orders in memory and provides the
/// same interface and check-and-set semantics as the PostgreSQL
/// implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        let order = Order::from_draft(OrderId::new(), draft, Utc::now());

        let mut orders = self.orders.write().await;
        orders.insert(order.id, order.clone());

        metrics::counter!("orders_created_total").increment(1);
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        let orders = self.orders.read().await;
        orders
            .get(&order_id)
            .cloned()
            .ok_or(StoreError::NotFound(order_id))
    }

    async fn set_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        expected: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(StoreError::NotFound(order_id))?;

        // Check-and-set: the write lock makes the check and the update
        // a single atomic step.
        if order.status != expected {
            return Err(StoreError::StatusConflict {
                order_id,
                expected,
                actual: order.status,
            });
        }

        order.status = target;
        order.status_changed_at = at;
        Ok(order.clone())
    }

    async fn attach_receipt(&self, order_id: OrderId, url: &str) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(StoreError::NotFound(order_id))?;

        if order.receipt_url.is_some() {
            return Err(StoreError::ReceiptAlreadyAttached(order_id));
        }
        if !order.status.accepts_receipt() {
            return Err(StoreError::ReceiptNotAccepted {
                order_id,
                status: order.status,
            });
        }

        order.receipt_url = Some(url.to_string());
        Ok(order.clone())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
