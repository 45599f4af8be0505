//! Payment ledger rows and ancillary charges.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a payment or refund was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the desk.
    Cash,
    /// Credit or debit card.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Online gateway or wallet.
    Online,
    /// Anything else.
    Other,
}

/// An append-only ledger row for a captured or refunded amount.
///
/// Refunds are stored with a negative `amount` and `is_refund` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// Unique identifier of the entry.
    pub id: Uuid,
    /// The stay this entry belongs to.
    pub stay_id: u64,
    /// Cash amount; negative for refunds.
    pub amount: Decimal,
    /// Settlement method.
    pub method: PaymentMethod,
    /// Marks refund entries.
    pub is_refund: bool,
    /// Discount granted at settlement. `None` on stores without the column.
    pub discount: Option<Decimal>,
    /// Round-off adjustment. `None` on stores without the column.
    pub round_off: Option<Decimal>,
    /// Whether `round_off` counts against the balance.
    pub round_off_applied: bool,
    /// External reference (card slip, transfer id).
    pub reference: Option<String>,
    /// When the entry was written.
    pub recorded_at: DateTime<Utc>,
}

impl PaymentEntry {
    /// How far this entry moves the balance: amount, plus discount, plus
    /// round-off when applied.
    ///
    /// ```
    /// use stay_engine::models::{PaymentEntry, PaymentMethod};
    /// use chrono::Utc;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let entry = PaymentEntry {
    ///     id: Uuid::new_v4(),
    ///     stay_id: 1,
    ///     amount: Decimal::new(500, 0),
    ///     method: PaymentMethod::Cash,
    ///     is_refund: false,
    ///     discount: Some(Decimal::new(50, 0)),
    ///     round_off: Some(Decimal::new(5, 0)),
    ///     round_off_applied: true,
    ///     reference: None,
    ///     recorded_at: Utc::now(),
    /// };
    /// assert_eq!(entry.applied_to_balance(), Decimal::new(555, 0));
    /// ```
    pub fn applied_to_balance(&self) -> Decimal {
        let discount = self.discount.unwrap_or(Decimal::ZERO);
        let round_off = if self.round_off_applied {
            self.round_off.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        self.amount + discount + round_off
    }
}

/// An ancillary charge posted against a stay outside the room tariff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncillaryCharge {
    /// Unique identifier of the charge.
    pub id: Uuid,
    /// The stay charged.
    pub stay_id: u64,
    /// Amount owed.
    pub amount: Decimal,
    /// What the charge is for.
    pub description: String,
    /// When the charge was posted.
    pub posted_at: DateTime<Utc>,
}
