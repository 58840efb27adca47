use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A monetary amount paired with its ISO-4217-ish currency code. Stored as
/// `NUMERIC` in the relational backend (via `bigdecimal`) so aggregate worth
/// (§3.3) never loses precision to floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Money {
    pub amount: BigDecimal,
    pub currency: String,
}

impl Money {
    pub fn zero(currency: impl Into<String>) -> Self {
        Self {
            amount: BigDecimal::from(0),
            currency: currency.into(),
        }
    }
}
