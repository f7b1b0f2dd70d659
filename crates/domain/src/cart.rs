//! The shopping cart: session-local line items ahead of checkout.

use serde::{Deserialize, Serialize};

use crate::order::{Money, OrderLine, ProductId, Variant};

/// Identifier of a cart line, stable for the life of the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u64);

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    pub product_id: ProductId,
    pub product_name: String,
    pub variant: Variant,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartLine {
    /// Returns the subtotal for this line.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Session-local cart: a value container with no persistence or
/// network side effects. Single-writer; sequenced mutations produce a
/// deterministic cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    next_id: u64,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product variant to the cart.
    ///
    /// Merges with an existing line sharing the same product and
    /// variant (quantities are summed, the existing captured price is
    /// kept); otherwise appends a new line. Returns the line ID.
    pub fn add_item(
        &mut self,
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        variant: Variant,
        quantity: u32,
        unit_price: Money,
    ) -> LineId {
        let product_id = product_id.into();

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id && line.variant == variant)
        {
            line.quantity += quantity;
            return line.id;
        }

        let id = LineId(self.next_id);
        self.next_id += 1;
        self.lines.push(CartLine {
            id,
            product_id,
            product_name: product_name.into(),
            variant,
            quantity,
            unit_price,
        });
        id
    }

    /// Removes one line. Returns false when the ID is unknown.
    pub fn remove_item(&mut self, line_id: LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != line_id);
        self.lines.len() != before
    }

    /// Sets the quantity of a line.
    ///
    /// A quantity of zero removes the line. Returns false when the ID
    /// is unknown.
    pub fn update_quantity(&mut self, line_id: LineId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_item(line_id);
        }
        match self.lines.iter_mut().find(|line| line.id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Returns the cart total, recomputed from the lines on every call.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true when the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Converts the cart contents into order lines for checkout.
    pub fn to_order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|line| {
                OrderLine::new(
                    line.product_id.clone(),
                    line.product_name.clone(),
                    line.variant.clone(),
                    line.quantity,
                    line.unit_price,
                )
            })
            .collect()
    }
}
