//! The checkout orchestrator.
//!
//! Drives the three-step checkout interaction (review, shipping
//! details, payment) and turns a cart plus shipping details into
//! exactly one pending order with an attached receipt, moved into
//! payment review.

use domain::{Cart, Order, OrderDraft, OrderStatus, ShippingDetails};
use order_store::{OrderId, OrderStore};
use serde::{Deserialize, Serialize};

use crate::error::{FulfillmentError, Result};
use crate::lifecycle::OrderLifecycle;
use crate::services::{AdminDirectory, Mailer, ReceiptFile, ReceiptStorage};

/// Where the shopper currently is in the checkout.
///
/// Forward movement is gated per step; `Confirmed` is only reachable
/// through a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    Review,
    Shipping,
    Payment,
    Confirmed,
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CheckoutStep::Review => "review",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Confirmed => "confirmed",
        };
        write!(f, "{name}")
    }
}

/// Progress through a submission that failed partway.
///
/// Remembered so a retry resumes at the failed stage instead of
/// creating a duplicate order or receipt.
#[derive(Debug, Clone)]
struct Submission {
    order_id: OrderId,
    receipt_attached: bool,
}

/// Orchestrates one shopper's checkout session.
///
/// Owns the session cart and shipping details. Submission runs the
/// pipeline create-order, upload-receipt, transition-to-review; the
/// cart is only cleared after the whole pipeline succeeds.
pub struct CheckoutFlow<S, M, A, R>
where
    S: OrderStore,
    M: Mailer,
    A: AdminDirectory,
    R: ReceiptStorage,
{
    store: S,
    storage: R,
    lifecycle: OrderLifecycle<S, M, A>,
    cart: Cart,
    shipping: ShippingDetails,
    step: CheckoutStep,
    submission: Option<Submission>,
}

impl<S, M, A, R> CheckoutFlow<S, M, A, R>
where
    S: OrderStore + Clone,
    M: Mailer,
    A: AdminDirectory,
    R: ReceiptStorage,
{
    /// Creates a checkout flow over the given collaborators.
    pub fn new(store: S, storage: R, mailer: M, admins: A) -> Self {
        let lifecycle = OrderLifecycle::new(store.clone(), mailer, admins);
        Self {
            store,
            storage,
            lifecycle,
            cart: Cart::new(),
            shipping: ShippingDetails::default(),
            step: CheckoutStep::Review,
            submission: None,
        }
    }

    /// Returns the current step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Returns the session cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Returns the session cart for mutation.
    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Returns the entered shipping details.
    pub fn shipping(&self) -> &ShippingDetails {
        &self.shipping
    }

    /// Returns the shipping details for mutation.
    ///
    /// Entered data survives back navigation; it is only validated on
    /// forward movement out of the shipping step.
    pub fn shipping_mut(&mut self) -> &mut ShippingDetails {
        &mut self.shipping
    }

    /// Advances to the next step, re-validating the current step's
    /// preconditions.
    pub fn advance(&mut self) -> Result<CheckoutStep> {
        match self.step {
            CheckoutStep::Review => {
                self.step = CheckoutStep::Shipping;
                Ok(self.step)
            }
            CheckoutStep::Shipping => {
                self.shipping.validate()?;
                self.step = CheckoutStep::Payment;
                Ok(self.step)
            }
            CheckoutStep::Payment | CheckoutStep::Confirmed => {
                Err(FulfillmentError::CannotAdvance { step: self.step })
            }
        }
    }

    /// Steps back to the previous step. Always permitted; discards no
    /// entered data.
    pub fn back(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Review | CheckoutStep::Shipping => CheckoutStep::Review,
            CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Confirmed => CheckoutStep::Confirmed,
        };
        self.step
    }

    /// Submits the order with the uploaded payment receipt.
    ///
    /// Runs the pipeline: create the pending order from the cart and
    /// shipping details, upload and attach the receipt, transition to
    /// payment review (which dispatches the new-order notification
    /// pair), then clear the cart and confirm. A failure at any stage
    /// halts the pipeline, keeps the cart and step intact, and is
    /// surfaced for retry; completed stages are remembered so the retry
    /// resumes where it failed.
    #[tracing::instrument(skip(self, receipt))]
    pub async fn submit(&mut self, receipt: ReceiptFile) -> Result<Order> {
        if self.step != CheckoutStep::Payment {
            return Err(FulfillmentError::NotAtPayment { step: self.step });
        }
        if self.cart.is_empty() {
            return Err(FulfillmentError::EmptyCart);
        }

        let order_id = match &self.submission {
            Some(submission) => submission.order_id,
            None => {
                let draft = OrderDraft::with_total(
                    self.shipping.clone(),
                    self.cart.to_order_lines(),
                    self.cart.total(),
                )?;
                let order = self.store.create_order(draft).await?;
                tracing::info!(order_id = %order.id, total = %order.total, "order created");
                self.submission = Some(Submission {
                    order_id: order.id,
                    receipt_attached: false,
                });
                order.id
            }
        };

        if !self.submission.as_ref().is_some_and(|s| s.receipt_attached) {
            let url = self.storage.upload_receipt(&receipt, order_id).await?;
            self.store.attach_receipt(order_id, &url).await?;
            if let Some(submission) = self.submission.as_mut() {
                submission.receipt_attached = true;
            }
        }

        let outcome = self
            .lifecycle
            .transition(order_id, OrderStatus::PaymentReview)
            .await?;

        // Only now is the unit of work complete.
        self.cart.clear();
        self.submission = None;
        self.step = CheckoutStep::Confirmed;
        Ok(outcome.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, Variant};
    use order_store::InMemoryOrderStore;

    use crate::services::{InMemoryAdminDirectory, InMemoryMailer, InMemoryReceiptStorage};

    type TestFlow = CheckoutFlow<
        InMemoryOrderStore,
        InMemoryMailer,
        InMemoryAdminDirectory,
        InMemoryReceiptStorage,
    >;

    fn flow() -> (TestFlow, InMemoryOrderStore, InMemoryMailer, InMemoryReceiptStorage) {
        let store = InMemoryOrderStore::new();
        let mailer = InMemoryMailer::new();
        let storage = InMemoryReceiptStorage::new();
        let admins = InMemoryAdminDirectory::with_recipients(vec!["ops@example.com".to_string()]);
        let flow = CheckoutFlow::new(store.clone(), storage.clone(), mailer.clone(), admins);
        (flow, store, mailer, storage)
    }

    fn fill_shipping(flow: &mut TestFlow) {
        *flow.shipping_mut() = ShippingDetails {
            name: "Amina Yusuf".to_string(),
            email: "amina@example.com".to_string(),
            phone: "+2348012345678".to_string(),
            address: "12 Marina Road".to_string(),
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
        };
    }

    fn add_line(flow: &mut TestFlow) {
        flow.cart_mut().add_item(
            "SKU-001",
            "Lagos Tee",
            Variant::new("Black", "M"),
            2,
            Money::from_kobo(5000),
        );
    }

    fn receipt() -> ReceiptFile {
        ReceiptFile::new("receipt.png", "image/png", vec![0xFF, 0xD8])
    }

    #[test]
    fn test_review_advances_unconditionally() {
        let (mut flow, _, _, _) = flow();
        assert_eq!(flow.step(), CheckoutStep::Review);
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_shipping_advance_blocked_until_fields_filled() {
        let (mut flow, _, _, _) = flow();
        flow.advance().unwrap();

        let err = flow.advance().unwrap_err();
        assert!(matches!(err, FulfillmentError::Validation(_)));
        assert_eq!(flow.step(), CheckoutStep::Shipping);

        fill_shipping(&mut flow);
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Payment);
    }

    #[test]
    fn test_back_navigation_keeps_entered_data() {
        let (mut flow, _, _, _) = flow();
        flow.advance().unwrap();
        fill_shipping(&mut flow);
        flow.advance().unwrap();

        assert_eq!(flow.back(), CheckoutStep::Shipping);
        assert_eq!(flow.shipping().name, "Amina Yusuf");
        assert_eq!(flow.back(), CheckoutStep::Review);

        // Forward again re-validates but loses nothing.
        flow.advance().unwrap();
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Payment);
    }

    #[tokio::test]
    async fn test_submit_requires_payment_step() {
        let (mut flow, _, _, _) = flow();
        add_line(&mut flow);

        let result = flow.submit(receipt()).await;
        assert!(matches!(result, Err(FulfillmentError::NotAtPayment { .. })));
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_cart() {
        let (mut flow, _, _, _) = flow();
        flow.advance().unwrap();
        fill_shipping(&mut flow);
        flow.advance().unwrap();

        let result = flow.submit(receipt()).await;
        assert!(matches!(result, Err(FulfillmentError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_successful_submission_pipeline() {
        let (mut flow, store, mailer, storage) = flow();
        add_line(&mut flow);
        flow.advance().unwrap();
        fill_shipping(&mut flow);
        flow.advance().unwrap();

        let order = flow.submit(receipt()).await.unwrap();

        assert_eq!(order.status, OrderStatus::PaymentReview);
        assert_eq!(order.total.kobo(), 10000);
        assert!(order.receipt_url.is_some());

        assert!(flow.cart().is_empty());
        assert_eq!(flow.step(), CheckoutStep::Confirmed);
        assert_eq!(storage.upload_count(), 1);
        // New-order pair: one customer email, one admin email.
        assert_eq!(mailer.sent_count(), 2);

        let persisted = store.get_order(order.id).await.unwrap();
        assert_eq!(persisted.status, OrderStatus::PaymentReview);
    }

    #[tokio::test]
    async fn test_upload_failure_halts_pipeline_and_keeps_cart() {
        let (mut flow, store, mailer, storage) = flow();
        add_line(&mut flow);
        flow.advance().unwrap();
        fill_shipping(&mut flow);
        flow.advance().unwrap();

        storage.set_fail_on_upload(true);
        let result = flow.submit(receipt()).await;
        assert!(matches!(result, Err(FulfillmentError::Upload(_))));

        // The order exists in Pending, but nothing further ran.
        assert_eq!(store.order_count().await, 1);
        assert_eq!(mailer.sent_count(), 0);
        assert!(!flow.cart().is_empty());
        assert_eq!(flow.step(), CheckoutStep::Payment);
    }

    #[tokio::test]
    async fn test_retry_resumes_without_duplicating_order() {
        let (mut flow, store, mailer, storage) = flow();
        add_line(&mut flow);
        flow.advance().unwrap();
        fill_shipping(&mut flow);
        flow.advance().unwrap();

        storage.set_fail_on_upload(true);
        assert!(flow.submit(receipt()).await.is_err());

        storage.set_fail_on_upload(false);
        let order = flow.submit(receipt()).await.unwrap();

        assert_eq!(order.status, OrderStatus::PaymentReview);
        assert_eq!(store.order_count().await, 1);
        assert_eq!(storage.upload_count(), 1);
        assert_eq!(mailer.sent_count(), 2);
        assert!(flow.cart().is_empty());
    }
}
