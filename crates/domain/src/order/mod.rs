//! Order types: status state machine, value objects, and the record.

mod record;
mod status;
mod value_objects;

pub use record::{Order, OrderDraft, ShippingDetails};
pub use status::{OrderStatus, UnknownStatus};
pub use value_objects::{Money, OrderLine, ProductId, Variant};
