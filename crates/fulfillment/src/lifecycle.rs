//! The order lifecycle manager.
//!
//! Validates status transitions against the domain table, persists the
//! change with an optimistic check-and-set, and dispatches the
//! notification pair for the transition. Status persistence is
//! authoritative; notification dispatch is best-effort and its
//! failures never roll the status back.

use chrono::Utc;
use common::OrderId;
use domain::{NotificationKind, Order, OrderStatus, compose};
use order_store::{OrderStore, StoreError};

use crate::error::{FulfillmentError, Result};
use crate::services::{AdminDirectory, Mailer};

/// Outcome of one send attempt for a recipient class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Nothing to send (empty admin recipient set).
    Skipped,
    Failed(String),
}

impl SendOutcome {
    /// Returns true if the send succeeded.
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

/// Per-recipient-class dispatch results for one transition.
///
/// The customer and admin sends are independent; a failure in one does
/// not prevent the other from being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub customer: SendOutcome,
    pub admin: SendOutcome,
}

impl DispatchReport {
    /// Returns true if no attempted send failed.
    pub fn is_clean(&self) -> bool {
        !matches!(self.customer, SendOutcome::Failed(_))
            && !matches!(self.admin, SendOutcome::Failed(_))
    }
}

/// Result of a successful transition: the updated order plus the
/// dispatch report for its notifications.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub order: Order,
    pub notifications: DispatchReport,
}

/// Drives orders through the lifecycle graph.
pub struct OrderLifecycle<S, M, A>
where
    S: OrderStore,
    M: Mailer,
    A: AdminDirectory,
{
    store: S,
    mailer: M,
    admins: A,
}

impl<S, M, A> OrderLifecycle<S, M, A>
where
    S: OrderStore,
    M: Mailer,
    A: AdminDirectory,
{
    /// Creates a new lifecycle manager.
    pub fn new(store: S, mailer: M, admins: A) -> Self {
        Self {
            store,
            mailer,
            admins,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves an order to `target` status and dispatches the
    /// notification pair for the transition.
    ///
    /// Fails with `NotFound` for an unknown order and with
    /// `InvalidTransition` when `target` is not a legal successor of
    /// the current status. The persisted status is the concurrency
    /// token: of several concurrent attempts out of the same status,
    /// exactly one wins, so at most one notification pair is dispatched
    /// per `(order, target)` transition.
    #[tracing::instrument(skip(self))]
    pub async fn transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<TransitionOutcome> {
        let order = match self.store.get_order(order_id).await {
            Ok(order) => order,
            Err(StoreError::NotFound(id)) => return Err(FulfillmentError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        if !order.status.can_transition_to(target) {
            tracing::warn!(
                order_id = %order_id,
                from = %order.status,
                to = %target,
                "rejected illegal transition"
            );
            return Err(FulfillmentError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let updated = match self
            .store
            .set_status(order_id, target, order.status, Utc::now())
            .await
        {
            Ok(updated) => updated,
            // A concurrent transition won the race; our view is stale.
            Err(StoreError::StatusConflict { actual, .. }) => {
                tracing::warn!(
                    order_id = %order_id,
                    target = %target,
                    actual = %actual,
                    "lost transition race"
                );
                return Err(FulfillmentError::InvalidTransition {
                    from: actual,
                    to: target,
                });
            }
            Err(StoreError::NotFound(id)) => return Err(FulfillmentError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        metrics::counter!("order_transitions_total", "target" => target.as_str()).increment(1);
        tracing::info!(order_id = %order_id, from = %order.status, to = %target, "order transitioned");

        let notifications = match NotificationKind::for_target(target) {
            Some(kind) => self.dispatch(&updated, kind).await,
            // Unreachable through the table: no edge targets Pending.
            None => DispatchReport {
                customer: SendOutcome::Skipped,
                admin: SendOutcome::Skipped,
            },
        };

        Ok(TransitionOutcome {
            order: updated,
            notifications,
        })
    }

    /// Dispatches the customer and admin emails for one transition.
    async fn dispatch(&self, order: &Order, kind: NotificationKind) -> DispatchReport {
        let pair = compose(order, kind);

        let customer_recipients = vec![order.shipping.email.clone()];
        let customer = match self
            .mailer
            .send(&customer_recipients, &pair.customer.subject, &pair.customer.html)
            .await
        {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                metrics::counter!("notification_failures_total", "class" => "customer")
                    .increment(1);
                tracing::warn!(order_id = %order.id, error = %e, "customer notification failed");
                SendOutcome::Failed(e.to_string())
            }
        };

        let admin = match self.admins.list_admin_recipients().await {
            Ok(recipients) if recipients.is_empty() => {
                tracing::info!(order_id = %order.id, "no admin recipients, skipping admin copy");
                SendOutcome::Skipped
            }
            Ok(recipients) => {
                match self
                    .mailer
                    .send(&recipients, &pair.admin.subject, &pair.admin.html)
                    .await
                {
                    Ok(()) => SendOutcome::Sent,
                    Err(e) => {
                        metrics::counter!("notification_failures_total", "class" => "admin")
                            .increment(1);
                        tracing::warn!(order_id = %order.id, error = %e, "admin notification failed");
                        SendOutcome::Failed(e.to_string())
                    }
                }
            }
            Err(e) => {
                metrics::counter!("notification_failures_total", "class" => "admin").increment(1);
                tracing::warn!(order_id = %order.id, error = %e, "admin directory lookup failed");
                SendOutcome::Failed(e.to_string())
            }
        };

        DispatchReport { customer, admin }
    }
}
