//! Overflow-checked money arithmetic.
//!
//! `Decimal`'s operators panic when a result leaves its 96-bit range, so
//! every total in the store is built from these helpers instead.

use rust_decimal::Decimal;

use medichat_contracts::error::MediChatError;

/// `price × quantity`, or `None` on overflow.
pub fn line_total(price: Decimal, quantity: u32) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

/// Sum of `amounts`. `None` if any amount is `None` or the sum overflows.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount?))
}

pub(crate) fn too_large(field: &str) -> MediChatError {
    MediChatError::invalid(field, "Amount is too large.")
}
