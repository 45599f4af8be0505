//! Booking-level totals from nightly rows.

use rust_decimal::Decimal;

use crate::models::{NightlyCharge, StayTotals};

use super::round_money;

/// Aggregates per-room nightly rows into booking totals.
///
/// Base and both tax components are summed across nights, multiplied by the
/// number of rooms and rounded. `tax = cgst + sgst` and `total = base + tax`.
///
/// The discount is reconstructed from the rounded base rather than summed
/// night by night: `round(base / (1 − d/100)) − base`. A 100 % discount has
/// no such inverse, so the summed nightly discounts are used instead.
///
/// # Example
///
/// ```
/// use stay_engine::calculation::aggregate_totals;
/// use stay_engine::models::NightlyCharge;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let night = |day| NightlyCharge {
///     date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
///     rate_after_discount: Decimal::new(900, 0),
///     rate_before_discount: Decimal::new(1000, 0),
///     discount_amount: Decimal::new(100, 0),
///     tax: Decimal::new(108, 0),
///     cgst: Decimal::new(54, 0),
///     sgst: Decimal::new(54, 0),
/// };
/// let totals = aggregate_totals(&[night(2), night(3)], 1, Decimal::new(10, 0));
/// assert_eq!(totals.base, Decimal::new(1800, 0));
/// assert_eq!(totals.discount, Decimal::new(200, 0));
/// assert_eq!(totals.total, Decimal::new(2016, 0));
/// ```
pub fn aggregate_totals(
    nights: &[NightlyCharge],
    required_rooms: u32,
    discount_percent: Decimal,
) -> StayTotals {
    let rooms = Decimal::from(required_rooms);
    let sum = |field: fn(&NightlyCharge) -> Decimal| -> Decimal {
        round_money(nights.iter().map(field).sum::<Decimal>() * rooms)
    };

    let base = sum(|n| n.rate_after_discount);
    let cgst = sum(|n| n.cgst);
    let sgst = sum(|n| n.sgst);
    let tax = cgst + sgst;

    let discount = if discount_percent <= Decimal::ZERO {
        Decimal::ZERO
    } else if discount_percent >= Decimal::ONE_HUNDRED {
        sum(|n| n.discount_amount)
    } else {
        let remaining = Decimal::ONE - discount_percent / Decimal::ONE_HUNDRED;
        round_money(base / remaining) - base
    };

    StayTotals {
        base,
        tax,
        cgst,
        sgst,
        discount,
        total: base + tax,
    }
}
