//! Nightly allocation rows.
//!
//! Both projections carry the same [`NightlyCharge`]: one night of one room,
//! before and after discount, with its two tax components.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The charge for exactly one calendar night of one room.
///
/// # Example
///
/// ```
/// use stay_engine::models::NightlyCharge;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let night = NightlyCharge {
///     date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     rate_after_discount: Decimal::new(900, 0),
///     rate_before_discount: Decimal::new(1000, 0),
///     discount_amount: Decimal::new(100, 0),
///     tax: Decimal::new(108, 0),
///     cgst: Decimal::new(54, 0),
///     sgst: Decimal::new(54, 0),
/// };
/// assert_eq!(night.rate_before_discount - night.discount_amount, night.rate_after_discount);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightlyCharge {
    /// The night this charge is for.
    pub date: NaiveDate,
    /// Amount charged after the stay discount.
    pub rate_after_discount: Decimal,
    /// Amount before discount (base plus extra occupants).
    pub rate_before_discount: Decimal,
    /// Discount taken off this night.
    pub discount_amount: Decimal,
    /// Total tax on the after-discount amount.
    pub tax: Decimal,
    /// First tax component.
    pub cgst: Decimal,
    /// Second tax component.
    pub sgst: Decimal,
}

/// A booking-scoped night, used before rooms are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationNight {
    /// The owning stay.
    pub stay_id: u64,
    /// The night's charge for one room.
    #[serde(flatten)]
    pub charge: NightlyCharge,
}

/// A night for one assigned physical room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNight {
    /// The owning stay.
    pub stay_id: u64,
    /// The assigned room.
    pub room_id: String,
    /// The night's charge for this room.
    #[serde(flatten)]
    pub charge: NightlyCharge,
}
