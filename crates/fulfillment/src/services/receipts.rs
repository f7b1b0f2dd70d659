//! Receipt storage trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;

use crate::error::FulfillmentError;

/// An uploaded payment receipt image.
///
/// The receipt is evidence of payment, not a processed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    /// Creates a new receipt file.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Trait for receipt blob storage.
#[async_trait]
pub trait ReceiptStorage: Send + Sync {
    /// Uploads a receipt keyed by the order it belongs to.
    ///
    /// Returns the public URL of the stored file.
    async fn upload_receipt(
        &self,
        file: &ReceiptFile,
        order_id: OrderId,
    ) -> Result<String, FulfillmentError>;
}

#[derive(Debug, Default)]
struct InMemoryReceiptStorageState {
    uploads: Vec<(OrderId, String)>,
    next_id: u32,
    fail_on_upload: bool,
}

/// In-memory receipt storage for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReceiptStorage {
    state: Arc<RwLock<InMemoryReceiptStorageState>>,
}

impl InMemoryReceiptStorage {
    /// Creates a new in-memory receipt storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the storage to fail on subsequent upload calls.
    pub fn set_fail_on_upload(&self, fail: bool) {
        self.state.write().unwrap().fail_on_upload = fail;
    }

    /// Returns the number of uploads performed.
    pub fn upload_count(&self) -> usize {
        self.state.read().unwrap().uploads.len()
    }

    /// Returns the URLs uploaded for a given order.
    pub fn urls_for(&self, order_id: OrderId) -> Vec<String> {
        self.state
            .read()
            .unwrap()
            .uploads
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, url)| url.clone())
            .collect()
    }
}

#[async_trait]
impl ReceiptStorage for InMemoryReceiptStorage {
    async fn upload_receipt(
        &self,
        file: &ReceiptFile,
        order_id: OrderId,
    ) -> Result<String, FulfillmentError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_upload {
            return Err(FulfillmentError::Upload(
                "storage unavailable".to_string(),
            ));
        }

        state.next_id += 1;
        let url = format!(
            "https://storage.example/receipts/{}/{:04}-{}",
            order_id, state.next_id, file.filename
        );
        state.uploads.push((order_id, url.clone()));
        Ok(url)
    }
}
