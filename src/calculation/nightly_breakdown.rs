//! Night-by-night breakdown of a stay.
//!
//! This is the single source of truth for stay pricing: booking totals and
//! both nightly projections are derived from the rows built here.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::RateCatalog;
use crate::models::{NightlyCharge, TaxSplit};

use super::{percent_of, resolve_rate, round_money, stay_dates};

/// Inputs for building a nightly breakdown.
#[derive(Debug, Clone)]
pub struct BreakdownRequest {
    /// Rate plan to resolve nightly rates under, if any.
    pub rate_plan_id: Option<u64>,
    /// First night.
    pub check_in: NaiveDate,
    /// Departure date (not charged).
    pub check_out: NaiveDate,
    /// Base rate when no override or schedule applies.
    pub default_base: Decimal,
    /// Extra-occupant rate when no override or schedule applies.
    pub default_extra: Decimal,
    /// Guests above the room type's included occupancy.
    pub extra_guests: u32,
    /// Tax percentages.
    pub tax: TaxSplit,
}

/// The per-night rows for one room plus the discount percentage they used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightlyBreakdown {
    /// One row per night, in date order.
    pub nights: Vec<NightlyCharge>,
    /// The rate plan's discount percentage.
    pub discount_percent: Decimal,
}

/// Builds one [`NightlyCharge`] per date in `[check_in, check_out)`.
///
/// For each night the original (undiscounted) rates are resolved, then:
///
/// - `rate_before_discount = round(base + extra × extra_guests)`
/// - `discount_amount = round(rate_before_discount × discount / 100)`
/// - `rate_after_discount = rate_before_discount − discount_amount`
/// - tax and both components are each `round(rate_after_discount × pct / 100)`
///
/// # Example
///
/// ```
/// use stay_engine::calculation::{build_nightly_breakdown, BreakdownRequest};
/// use stay_engine::config::RateCatalog;
/// use stay_engine::models::TaxSplit;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let request = BreakdownRequest {
///     rate_plan_id: None,
///     check_in: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     check_out: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
///     default_base: Decimal::new(1000, 0),
///     default_extra: Decimal::new(200, 0),
///     extra_guests: 0,
///     tax: TaxSplit::new(Decimal::new(12, 0), None, None),
/// };
/// let breakdown = build_nightly_breakdown(&RateCatalog::default(), &request);
/// assert_eq!(breakdown.nights.len(), 2);
/// assert_eq!(breakdown.nights[0].cgst, Decimal::new(60, 0));
/// ```
pub fn build_nightly_breakdown(catalog: &RateCatalog, request: &BreakdownRequest) -> NightlyBreakdown {
    let mut discount_percent = Decimal::ZERO;
    let extra_guests = Decimal::from(request.extra_guests);

    let nights = stay_dates(request.check_in, request.check_out)
        .map(|date| {
            let original = resolve_rate(
                catalog,
                request.rate_plan_id,
                date,
                request.default_base,
                request.default_extra,
                false,
            );
            discount_percent = original.discount_percent;

            let rate_before_discount = round_money(original.base + original.extra * extra_guests);
            let discount_amount = if original.discount_percent > Decimal::ZERO {
                percent_of(rate_before_discount, original.discount_percent)
            } else {
                Decimal::ZERO
            };
            let rate_after_discount = rate_before_discount - discount_amount;

            NightlyCharge {
                date,
                rate_after_discount,
                rate_before_discount,
                discount_amount,
                tax: percent_of(rate_after_discount, request.tax.tax_percent),
                cgst: percent_of(rate_after_discount, request.tax.cgst_percent),
                sgst: percent_of(rate_after_discount, request.tax.sgst_percent),
            }
        })
        .collect();

    NightlyBreakdown {
        nights,
        discount_percent,
    }
}
