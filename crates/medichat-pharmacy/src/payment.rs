//! Simulated payment orders.
//!
//! Amounts on a [`PaymentOrder`] are integer minor units (paise for INR,
//! cents for USD). No money moves anywhere.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medichat_contracts::error::{MediChatError, MediChatResult};

use crate::money;

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Major units, e.g. `26.97`.
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    /// Usually the id of the order being paid for.
    #[serde(default)]
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOrderStatus {
    Created,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Netbanking,
    Upi,
    Wallet,
    Paylater,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Card,
        PaymentMethod::Netbanking,
        PaymentMethod::Upi,
        PaymentMethod::Wallet,
        PaymentMethod::Paylater,
    ];
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Card => "card",
            Self::Netbanking => "netbanking",
            Self::Upi => "upi",
            Self::Wallet => "wallet",
            Self::Paylater => "paylater",
        })
    }
}

impl FromStr for PaymentMethod {
    type Err = MediChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MediChatError::invalid("method", format!("Unknown payment method '{s}'.")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOptions {
    pub card: bool,
    pub netbanking: bool,
    pub upi: bool,
    pub wallet: bool,
    pub paylater: bool,
}

impl PaymentOptions {
    pub fn all() -> Self {
        Self {
            card: true,
            netbanking: true,
            upi: true,
            wallet: true,
            paylater: true,
        }
    }

    pub fn allows(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::Card => self.card,
            PaymentMethod::Netbanking => self.netbanking,
            PaymentMethod::Upi => self.upi,
            PaymentMethod::Wallet => self.wallet,
            PaymentMethod::Paylater => self.paylater,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub entity: String,
    pub amount: i64,
    pub amount_paid: i64,
    pub amount_due: i64,
    pub currency: String,
    pub receipt: String,
    pub status: PaymentOrderStatus,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub payment_options: PaymentOptions,
    pub payment_url: String,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

/// Convert a major-unit amount to minor units, rounding half away from zero.
pub fn minor_units(amount: Decimal) -> MediChatResult<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| {
            minor
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or_else(|| money::too_large("amount"))
}

impl PaymentOrder {
    pub(crate) fn create(request: PaymentRequest) -> MediChatResult<Self> {
        if request.amount <= Decimal::ZERO {
            return Err(MediChatError::invalid("amount", "Amount must be greater than zero."));
        }
        let amount = minor_units(request.amount)?;
        let currency = request
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let created_at = Utc::now();
        let receipt = request
            .receipt
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| format!("receipt_{}", created_at.timestamp_millis()));
        let id = format!("pay_{}", Uuid::new_v4().simple());
        // The payment page reads the amount in major units.
        let payment_url = format!(
            "/payment/process?order_id={id}&amount={major}&currency={currency}",
            major = request.amount
        );

        Ok(Self {
            id,
            entity: "order".to_string(),
            amount,
            amount_paid: 0,
            amount_due: amount,
            currency,
            receipt,
            status: PaymentOrderStatus::Created,
            attempts: 0,
            created_at,
            payment_options: PaymentOptions::all(),
            payment_url,
            method: None,
        })
    }

    pub(crate) fn settle(&mut self, method: PaymentMethod) -> MediChatResult<()> {
        if self.status == PaymentOrderStatus::Paid {
            return Err(MediChatError::PaymentFailed {
                reason: format!("payment order '{}' is already paid", self.id),
            });
        }
        if !self.payment_options.allows(method) {
            return Err(MediChatError::PaymentFailed {
                reason: format!("{method} is not enabled for this order"),
            });
        }
        self.attempts += 1;
        self.amount_paid = self.amount;
        self.amount_due = 0;
        self.status = PaymentOrderStatus::Paid;
        self.method = Some(method);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: Decimal) -> PaymentRequest {
        PaymentRequest {
            amount,
            currency: None,
            receipt: None,
        }
    }

    #[test]
    fn amounts_become_minor_units() {
        let order = PaymentOrder::create(request(Decimal::new(2697, 2))).unwrap();

        assert_eq!(order.amount, 2697);
        assert_eq!(order.amount_due, 2697);
        assert_eq!(order.amount_paid, 0);
        assert_eq!(order.currency, "INR");
        assert_eq!(order.status, PaymentOrderStatus::Created);
        assert_eq!(order.entity, "order");
        assert!(order.receipt.starts_with("receipt_"));
        assert_eq!(
            order.payment_url,
            format!("/payment/process?order_id={}&amount=26.97&currency=INR", order.id)
        );
        assert_eq!(order.payment_options, PaymentOptions::all());
    }

    #[test]
    fn minor_units_round() {
        assert_eq!(minor_units(Decimal::new(10005, 3)).unwrap(), 1001);
        assert_eq!(minor_units(Decimal::from(15)).unwrap(), 1500);
    }

    #[test]
    fn minor_units_overflow_is_an_error() {
        assert!(matches!(
            minor_units(Decimal::MAX).unwrap_err(),
            MediChatError::InvalidInput { .. }
        ));
        // Fits in a Decimal after scaling, but not in an i64.
        assert!(minor_units(Decimal::from(i64::MAX)).is_err());
    }

    #[test]
    fn non_positive_amount_is_invalid() {
        for amount in [Decimal::ZERO, Decimal::new(-1, 0)] {
            let err = PaymentOrder::create(request(amount)).unwrap_err();
            assert!(matches!(err, MediChatError::InvalidInput { .. }));
        }
    }

    #[test]
    fn currency_and_receipt_are_kept() {
        let order = PaymentOrder::create(PaymentRequest {
            amount: Decimal::ONE,
            currency: Some("usd".to_string()),
            receipt: Some("order_abc".to_string()),
        })
        .unwrap();
        assert_eq!(order.currency, "USD");
        assert_eq!(order.receipt, "order_abc");
    }

    #[test]
    fn settle_once() {
        let mut order = PaymentOrder::create(request(Decimal::TEN)).unwrap();
        order.settle(PaymentMethod::Upi).unwrap();

        assert_eq!(order.status, PaymentOrderStatus::Paid);
        assert_eq!(order.attempts, 1);
        assert_eq!(order.amount_paid, 1000);
        assert_eq!(order.amount_due, 0);
        assert_eq!(order.method, Some(PaymentMethod::Upi));

        let err = order.settle(PaymentMethod::Card).unwrap_err();
        assert!(matches!(err, MediChatError::PaymentFailed { .. }));
        assert_eq!(order.attempts, 1);
    }

    #[test]
    fn method_from_str() {
        assert_eq!("UPI".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }
}
