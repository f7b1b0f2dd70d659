//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use domain::{Money, OrderDraft, OrderLine, OrderStatus, ShippingDetails, Variant};
use order_store::{OrderId, OrderStore, PostgresOrderStore, StoreError};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/0001_create_orders_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE orders")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderStore::new(pool)
}

fn sample_draft() -> OrderDraft {
    let shipping = ShippingDetails {
        name: "Amina Yusuf".to_string(),
        email: "amina@example.com".to_string(),
        phone: "+2348012345678".to_string(),
        address: "12 Marina Road".to_string(),
        city: "Lagos".to_string(),
        state: "Lagos".to_string(),
    };
    let lines = vec![
        OrderLine::new(
            "SKU-001",
            "Lagos Tee",
            Variant::new("Black", "M"),
            2,
            Money::from_kobo(5000),
        ),
        OrderLine::new(
            "SKU-002",
            "Ankara Cap",
            Variant::new("Red", "OS"),
            1,
            Money::from_kobo(1500),
        ),
    ];
    OrderDraft::new(shipping, lines).unwrap()
}

#[tokio::test]
#[serial]
async fn create_and_get_roundtrip() {
    let store = get_test_store().await;

    let order = store.create_order(sample_draft()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total.kobo(), 11500);

    let fetched = store.get_order(order.id).await.unwrap();
    assert_eq!(fetched, order);
    assert_eq!(fetched.lines.len(), 2);
    assert_eq!(fetched.lines[0].variant, Variant::new("Black", "M"));
}

#[tokio::test]
#[serial]
async fn get_unknown_order_is_not_found() {
    let store = get_test_store().await;

    let result = store.get_order(OrderId::new()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn set_status_with_matching_expected_wins() {
    let store = get_test_store().await;
    let order = store.create_order(sample_draft()).await.unwrap();

    let updated = store
        .set_status(
            order.id,
            OrderStatus::PaymentReview,
            OrderStatus::Pending,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::PaymentReview);
}

#[tokio::test]
#[serial]
async fn set_status_with_stale_expected_conflicts() {
    let store = get_test_store().await;
    let order = store.create_order(sample_draft()).await.unwrap();

    store
        .set_status(
            order.id,
            OrderStatus::PaymentReview,
            OrderStatus::Pending,
            Utc::now(),
        )
        .await
        .unwrap();

    let result = store
        .set_status(
            order.id,
            OrderStatus::PaymentReview,
            OrderStatus::Pending,
            Utc::now(),
        )
        .await;

    match result {
        Err(StoreError::StatusConflict {
            expected, actual, ..
        }) => {
            assert_eq!(expected, OrderStatus::Pending);
            assert_eq!(actual, OrderStatus::PaymentReview);
        }
        other => panic!("expected StatusConflict, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn set_status_on_unknown_order_is_not_found() {
    let store = get_test_store().await;

    let result = store
        .set_status(
            OrderId::new(),
            OrderStatus::PaymentReview,
            OrderStatus::Pending,
            Utc::now(),
        )
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn attach_receipt_is_set_once() {
    let store = get_test_store().await;
    let order = store.create_order(sample_draft()).await.unwrap();

    let updated = store
        .attach_receipt(order.id, "https://cdn.example/receipts/r1.png")
        .await
        .unwrap();
    assert_eq!(
        updated.receipt_url.as_deref(),
        Some("https://cdn.example/receipts/r1.png")
    );

    let result = store
        .attach_receipt(order.id, "https://cdn.example/receipts/r2.png")
        .await;
    assert!(matches!(result, Err(StoreError::ReceiptAlreadyAttached(_))));
}

#[tokio::test]
#[serial]
async fn attach_receipt_rejected_outside_window() {
    let store = get_test_store().await;
    let order = store.create_order(sample_draft()).await.unwrap();

    store
        .set_status(
            order.id,
            OrderStatus::PaymentReview,
            OrderStatus::Pending,
            Utc::now(),
        )
        .await
        .unwrap();
    store
        .set_status(
            order.id,
            OrderStatus::Cancelled,
            OrderStatus::PaymentReview,
            Utc::now(),
        )
        .await
        .unwrap();

    let result = store
        .attach_receipt(order.id, "https://cdn.example/receipts/late.png")
        .await;
    assert!(matches!(
        result,
        Err(StoreError::ReceiptNotAccepted {
            status: OrderStatus::Cancelled,
            ..
        })
    ));
}

#[tokio::test]
#[serial]
async fn list_orders_newest_first() {
    let store = get_test_store().await;

    let first = store.create_order(sample_draft()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = store.create_order(sample_draft()).await.unwrap();

    let all = store.list_orders().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);
}

#[tokio::test]
#[serial]
async fn full_lifecycle_through_store() {
    let store = get_test_store().await;
    let order = store.create_order(sample_draft()).await.unwrap();

    let order = store
        .attach_receipt(order.id, "https://cdn.example/receipts/r1.png")
        .await
        .unwrap();
    let order = store
        .set_status(
            order.id,
            OrderStatus::PaymentReview,
            OrderStatus::Pending,
            Utc::now(),
        )
        .await
        .unwrap();
    let order = store
        .set_status(
            order.id,
            OrderStatus::Shipped,
            OrderStatus::PaymentReview,
            Utc::now(),
        )
        .await
        .unwrap();
    let order = store
        .set_status(
            order.id,
            OrderStatus::Delivered,
            OrderStatus::Shipped,
            Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.status.is_terminal());
    assert!(order.receipt_url.is_some());
}
