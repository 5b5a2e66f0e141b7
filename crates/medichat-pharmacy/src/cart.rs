//! The shopping cart.
//!
//! Cart lines hold a snapshot of the product taken when it was first added.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use medichat_contracts::error::{MediChatError, MediChatResult};

use crate::catalog::Product;
use crate::money::{self, checked_sum};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// `None` when the line total overflows.
    pub fn line_total(&self) -> Option<Decimal> {
        money::line_total(self.product.price, self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    Add,
    Update,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCommand {
    pub product_id: String,
    /// Signed so that `Update` with zero or a negative count can remove.
    #[serde(default)]
    pub quantity: Option<i64>,
    pub action: CartAction,
}

impl CartCommand {
    pub fn add(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: Some(quantity),
            action: CartAction::Add,
        }
    }

    pub fn update(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: Some(quantity),
            action: CartAction::Update,
        }
    }

    pub fn remove(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: None,
            action: CartAction::Remove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
}

impl CartView {
    pub fn of(items: &[CartItem]) -> MediChatResult<Self> {
        let total_price =
            checked_sum(items.iter().map(CartItem::line_total)).ok_or_else(|| money::too_large("quantity"))?;
        Ok(Self {
            items: items.to_vec(),
            total_price,
        })
    }
}

fn to_quantity(quantity: i64) -> MediChatResult<u32> {
    u32::try_from(quantity).map_err(|_| MediChatError::invalid("quantity", "Quantity is out of range."))
}

/// Apply `command` to `items`. `product` is the catalog entry for the
/// command's product id, if one exists.
pub(crate) fn apply(
    items: &mut Vec<CartItem>,
    command: &CartCommand,
    product: Option<&Product>,
) -> MediChatResult<()> {
    let position = items.iter().position(|i| i.product.id == command.product_id);

    match command.action {
        CartAction::Add => {
            let product = product.ok_or_else(|| MediChatError::NotFound {
                entity: "product".to_string(),
                id: command.product_id.clone(),
            })?;
            let quantity = command.quantity.unwrap_or(1);
            if quantity < 1 {
                return Err(MediChatError::invalid("quantity", "Quantity must be at least 1."));
            }
            let quantity = to_quantity(quantity)?;
            match position {
                Some(i) => items[i].quantity = items[i].quantity.saturating_add(quantity),
                None => items.push(CartItem {
                    product: product.clone(),
                    quantity,
                }),
            }
        }
        CartAction::Update => {
            let Some(i) = position else {
                return Ok(());
            };
            let quantity = command.quantity.unwrap_or(0);
            if quantity <= 0 {
                items.remove(i);
            } else {
                items[i].quantity = to_quantity(quantity)?;
            }
        }
        CartAction::Remove => {
            if let Some(i) = position {
                items.remove(i);
            }
        }
    }
    Ok(())
}
