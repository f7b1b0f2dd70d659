//! Collaborator traits and in-memory implementations for checkout and
//! lifecycle side effects.

pub mod admin;
pub mod mailer;
pub mod receipts;

pub use admin::{AdminDirectory, InMemoryAdminDirectory};
pub use mailer::{InMemoryMailer, Mailer, SentEmail};
pub use receipts::{InMemoryReceiptStorage, ReceiptFile, ReceiptStorage};
