//! Orders and delivery details.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medichat_contracts::error::{MediChatError, MediChatResult};

use crate::money::{self, checked_sum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
    /// Unit price at the time of ordering.
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub lines: Vec<OrderLine>,
    pub delivery_address: DeliveryAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_address: DeliveryAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Check `new` and turn it into a pending order.
    pub(crate) fn place(new: NewOrder) -> MediChatResult<Self> {
        if new.user_id.trim().is_empty() {
            return Err(MediChatError::invalid("user_id", "A user is required to place an order."));
        }
        if new.lines.is_empty() {
            return Err(MediChatError::invalid("lines", "An order needs at least one item."));
        }
        if new.lines.iter().any(|l| l.quantity == 0) {
            return Err(MediChatError::invalid("quantity", "Quantity must be at least 1."));
        }
        if new.lines.iter().any(|l| l.price.is_sign_negative()) {
            return Err(MediChatError::invalid("price", "Prices cannot be negative."));
        }

        let total_amount = checked_sum(new.lines.iter().map(|l| money::line_total(l.price, l.quantity)))
            .ok_or_else(|| money::too_large("price"))?;
        let now = Utc::now();

        Ok(Self {
            id: format!("order_{}", Uuid::new_v4().simple()),
            user_id: new.user_id,
            lines: new.lines,
            total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            delivery_address: new.delivery_address,
            created_at: now,
            updated_at: now,
        })
    }

    pub(crate) fn mark_paid(&mut self) {
        self.status = OrderStatus::Confirmed;
        self.payment_status = PaymentStatus::Completed;
        self.updated_at = Utc::now();
    }
}
