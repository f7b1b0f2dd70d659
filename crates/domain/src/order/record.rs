//! The order record and its creation draft.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

use super::{Money, OrderLine, OrderStatus};

/// Customer and shipping details collected at checkout.
///
/// Validation is presence-only; the surrounding system owns any
/// format checks on email and phone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
}

impl ShippingDetails {
    /// Checks that every field is non-blank.
    ///
    /// Returns the names of the blank fields on failure so the caller
    /// can point the shopper at what is missing.
    pub fn validate(&self) -> Result<(), OrderError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
        ];

        let missing: Vec<String> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OrderError::MissingFields(missing))
        }
    }
}

/// An order as produced by checkout, before persistence assigns an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub shipping: ShippingDetails,
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

impl OrderDraft {
    /// Builds a draft from validated shipping details and lines.
    ///
    /// The total is computed from the line subtotals and fixed here;
    /// it never changes for the life of the order.
    pub fn new(shipping: ShippingDetails, lines: Vec<OrderLine>) -> Result<Self, OrderError> {
        shipping.validate()?;

        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        for line in &lines {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    quantity: line.quantity,
                });
            }
            if !line.unit_price.is_positive() {
                return Err(OrderError::InvalidPrice {
                    kobo: line.unit_price.kobo(),
                });
            }
        }

        let total = lines.iter().map(OrderLine::subtotal).sum();

        Ok(Self {
            shipping,
            lines,
            total,
        })
    }

    /// Builds a draft with an externally supplied total.
    ///
    /// Fails with `TotalMismatch` unless the total equals the sum of
    /// line subtotals.
    pub fn with_total(
        shipping: ShippingDetails,
        lines: Vec<OrderLine>,
        total: Money,
    ) -> Result<Self, OrderError> {
        let draft = Self::new(shipping, lines)?;
        if draft.total != total {
            return Err(OrderError::TotalMismatch {
                expected: draft.total.to_string(),
                actual: total.to_string(),
            });
        }
        Ok(draft)
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,

    /// Customer and shipping details captured at checkout.
    pub shipping: ShippingDetails,

    /// Ordered lines with prices captured at order time.
    pub lines: Vec<OrderLine>,

    /// Total amount, fixed at creation.
    pub total: Money,

    /// Current lifecycle status.
    pub status: OrderStatus,

    /// URL of the uploaded payment receipt, set at most once.
    pub receipt_url: Option<String>,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// When the status last changed.
    pub status_changed_at: DateTime<Utc>,
}

impl Order {
    /// Materializes a draft into a persisted order record.
    pub fn from_draft(id: OrderId, draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            shipping: draft.shipping,
            lines: draft.lines,
            total: draft.total,
            status: OrderStatus::Pending,
            receipt_url: None,
            created_at,
            status_changed_at: created_at,
        }
    }

    /// Checks the transition table for a move to `target`.
    pub fn check_transition(&self, target: OrderStatus) -> Result<(), OrderError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(OrderError::IllegalTransition {
                from: self.status,
                to: target,
            })
        }
    }

    /// Returns the number of lines in the order.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}
