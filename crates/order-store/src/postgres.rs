use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Money, Order, OrderDraft, OrderStatus, ShippingDetails};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::OrderStore,
};

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, \
     shipping_address, city, state, lines, total_kobo, status, receipt_url, \
     created_at, status_changed_at";

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let lines_json: serde_json::Value = row.try_get("lines")?;
        let lines = serde_json::from_value(lines_json)?;
        let status: OrderStatus = row.try_get::<String, _>("status")?.parse()?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            shipping: ShippingDetails {
                name: row.try_get("customer_name")?,
                email: row.try_get("customer_email")?,
                phone: row.try_get("customer_phone")?,
                address: row.try_get("shipping_address")?,
                city: row.try_get("city")?,
                state: row.try_get("state")?,
            },
            lines,
            total: Money::from_kobo(row.try_get("total_kobo")?),
            status,
            receipt_url: row.try_get("receipt_url")?,
            created_at: row.try_get("created_at")?,
            status_changed_at: row.try_get("status_changed_at")?,
        })
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(order_id))?;
        Self::row_to_order(row)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, draft))]
    async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        let order = Order::from_draft(OrderId::new(), draft, Utc::now());
        let lines_json = serde_json::to_value(&order.lines)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_name, customer_email, customer_phone,
                shipping_address, city, state, lines, total_kobo, status,
                receipt_url, created_at, status_changed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.shipping.name)
        .bind(&order.shipping.email)
        .bind(&order.shipping.phone)
        .bind(&order.shipping.address)
        .bind(&order.shipping.city)
        .bind(&order.shipping.state)
        .bind(&lines_json)
        .bind(order.total.kobo())
        .bind(order.status.as_str())
        .bind(&order.receipt_url)
        .bind(order.created_at)
        .bind(order.status_changed_at)
        .execute(&self.pool)
        .await?;

        metrics::counter!("orders_created_total").increment(1);
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.fetch_order(order_id).await
    }

    #[tracing::instrument(skip(self))]
    async fn set_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        expected: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Order> {
        // Check-and-set in a single statement: the WHERE clause on the
        // current status is the concurrency token.
        let sql = format!(
            "UPDATE orders SET status = $3, status_changed_at = $4 \
             WHERE id = $1 AND status = $2 RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(order_id.as_uuid())
            .bind(expected.as_str())
            .bind(target.as_str())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => {
                // Distinguish a missing order from a lost race.
                let current = self.fetch_order(order_id).await?;
                Err(StoreError::StatusConflict {
                    order_id,
                    expected,
                    actual: current.status,
                })
            }
        }
    }

    #[tracing::instrument(skip(self, url))]
    async fn attach_receipt(&self, order_id: OrderId, url: &str) -> Result<Order> {
        let sql = format!(
            "UPDATE orders SET receipt_url = $2 \
             WHERE id = $1 AND receipt_url IS NULL \
               AND status IN ('pending', 'payment_review') \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(order_id.as_uuid())
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => {
                let current = self.fetch_order(order_id).await?;
                if current.receipt_url.is_some() {
                    Err(StoreError::ReceiptAlreadyAttached(order_id))
                } else {
                    Err(StoreError::ReceiptNotAccepted {
                        order_id,
                        status: current.status,
                    })
                }
            }
        }
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }
}
