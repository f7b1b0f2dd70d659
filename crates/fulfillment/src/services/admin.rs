//! Administrator recipient directory trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::FulfillmentError;

/// Trait for looking up administrator notification recipients.
///
/// An empty recipient set is a valid answer, not an error: the admin
/// copy of a notification is simply skipped.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Returns the email addresses of all registered administrators.
    async fn list_admin_recipients(&self) -> Result<Vec<String>, FulfillmentError>;
}

/// In-memory admin directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdminDirectory {
    recipients: Arc<RwLock<Vec<String>>>,
}

impl InMemoryAdminDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with recipients.
    pub fn with_recipients(recipients: Vec<String>) -> Self {
        Self {
            recipients: Arc::new(RwLock::new(recipients)),
        }
    }

    /// Registers an additional recipient.
    pub fn add_recipient(&self, address: impl Into<String>) {
        self.recipients.write().unwrap().push(address.into());
    }
}

#[async_trait]
impl AdminDirectory for InMemoryAdminDirectory {
    async fn list_admin_recipients(&self) -> Result<Vec<String>, FulfillmentError> {
        Ok(self.recipients.read().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_directory_is_valid() {
        let directory = InMemoryAdminDirectory::new();
        let recipients = directory.list_admin_recipients().await.unwrap();
        assert!(recipients.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_and_added_recipients() {
        let directory =
            InMemoryAdminDirectory::with_recipients(vec!["ops@example.com".to_string()]);
        directory.add_recipient("sales@example.com");

        let recipients = directory.list_admin_recipients().await.unwrap();
        assert_eq!(recipients, vec!["ops@example.com", "sales@example.com"]);
    }
}
