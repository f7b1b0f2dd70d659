//! Pure notification composer.
//!
//! Maps an order snapshot and a transition kind to the customer/admin
//! email pair for that transition. No I/O; deterministic for a given
//! order.

use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderStatus};

/// The kind of notification a transition triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Order created and receipt uploaded (the move into payment review).
    NewOrder,
    Shipped,
    Delivered,
    Cancelled,
}

impl NotificationKind {
    /// Derives the notification kind from the target status of a
    /// transition. `Pending` is never a transition target.
    pub fn for_target(target: OrderStatus) -> Option<Self> {
        match target {
            OrderStatus::PaymentReview => Some(NotificationKind::NewOrder),
            OrderStatus::Shipped => Some(NotificationKind::Shipped),
            OrderStatus::Delivered => Some(NotificationKind::Delivered),
            OrderStatus::Cancelled => Some(NotificationKind::Cancelled),
            OrderStatus::Pending => None,
        }
    }
}

/// A composed email: subject line plus HTML body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub subject: String,
    pub html: String,
}

/// The customer and admin emails for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPair {
    pub customer: Email,
    pub admin: Email,
}

/// Composes the email pair for a transition.
pub fn compose(order: &Order, kind: NotificationKind) -> EmailPair {
    match kind {
        NotificationKind::NewOrder => EmailPair {
            customer: Email {
                subject: format!("Order Confirmation - #{}", order.id),
                html: customer_body(
                    order,
                    "Thank you for your order!",
                    "We have received your order and your payment receipt is under review. \
                     We will notify you once your payment is confirmed.",
                ),
            },
            admin: Email {
                subject: format!("New Order Received - #{}", order.id),
                html: admin_body(order, "A new order has been placed and awaits payment review."),
            },
        },
        NotificationKind::Shipped => EmailPair {
            customer: Email {
                subject: format!("Your Order Has Shipped - #{}", order.id),
                html: customer_body(
                    order,
                    "Your order is on its way!",
                    "Your order has been handed to the courier and is headed to your \
                     shipping address.",
                ),
            },
            admin: Email {
                subject: format!("Order Shipped - #{}", order.id),
                html: admin_body(order, "The order below has been marked as shipped."),
            },
        },
        NotificationKind::Delivered => EmailPair {
            customer: Email {
                subject: format!("Your Order Was Delivered - #{}", order.id),
                html: customer_body(
                    order,
                    "Your order has arrived!",
                    "Your order has been delivered. We hope you enjoy it.",
                ),
            },
            admin: Email {
                subject: format!("Order Delivered - #{}", order.id),
                html: admin_body(order, "The order below has been marked as delivered."),
            },
        },
        NotificationKind::Cancelled => EmailPair {
            customer: Email {
                subject: format!("Your Order Was Cancelled - #{}", order.id),
                html: customer_body(
                    order,
                    "Your order has been cancelled.",
                    "If you believe this is a mistake, please contact us and reference \
                     your order number.",
                ),
            },
            admin: Email {
                subject: format!("Order Cancelled - #{}", order.id),
                html: admin_body(order, "The order below has been cancelled."),
            },
        },
    }
}

fn customer_body(order: &Order, headline: &str, message: &str) -> String {
    format!(
        "<h1>{headline}</h1>\
         <p>Hi {name},</p>\
         <p>{message}</p>\
         <h2>Order #{id}</h2>\
         {items}\
         <p><strong>Total: {total}</strong></p>\
         <h3>Shipping Address</h3>\
         <p>{address}, {city}, {state}</p>",
        name = order.shipping.name,
        id = order.id,
        items = items_table(order),
        total = order.total,
        address = order.shipping.address,
        city = order.shipping.city,
        state = order.shipping.state,
    )
}

fn admin_body(order: &Order, message: &str) -> String {
    format!(
        "<h1>Order #{id}</h1>\
         <p>{message}</p>\
         <p>Customer: {name} ({email}, {phone})</p>\
         {items}\
         <p><strong>Total: {total}</strong></p>\
         <p>Ship to: {address}, {city}, {state}</p>",
        id = order.id,
        name = order.shipping.name,
        email = order.shipping.email,
        phone = order.shipping.phone,
        items = items_table(order),
        total = order.total,
        address = order.shipping.address,
        city = order.shipping.city,
        state = order.shipping.state,
    )
}

fn items_table(order: &Order) -> String {
    let rows: String = order
        .lines
        .iter()
        .map(|line| {
            format!(
                "<li>{name} ({variant}) x {qty} - {subtotal}</li>",
                name = line.product_name,
                variant = line.variant,
                qty = line.quantity,
                subtotal = line.subtotal(),
            )
        })
        .collect();
    format!("<ul>{rows}</ul>")
}
