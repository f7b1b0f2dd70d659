//! Mail dispatch trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::FulfillmentError;

/// A delivered email as recorded by the in-memory mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Trait for mail dispatch.
///
/// Delivery is all-or-nothing per call; the caller decides how a
/// failure affects the surrounding operation.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one email to a set of recipients.
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html: &str,
    ) -> Result<(), FulfillmentError>;
}

#[derive(Debug, Default)]
struct InMemoryMailerState {
    sent: Vec<SentEmail>,
    fail_on_send: bool,
}

/// In-memory mailer for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMailer {
    state: Arc<RwLock<InMemoryMailerState>>,
}

impl InMemoryMailer {
    /// Creates a new in-memory mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the mailer to fail on subsequent send calls.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the number of emails sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns all sent emails, in send order.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns the emails delivered to a given address.
    pub fn sent_to(&self, address: &str) -> Vec<SentEmail> {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .filter(|mail| mail.recipients.iter().any(|r| r == address))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html: &str,
    ) -> Result<(), FulfillmentError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(FulfillmentError::Mail("smtp connection refused".to_string()));
        }

        state.sent.push(SentEmail {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}
