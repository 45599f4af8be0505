//! Nightly rate resolution.
//!
//! Resolves the base and extra-occupant rate for one night of a rate plan
//! using the priority cascade: special-day override, then day-of-week
//! schedule, then the supplied defaults.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateCatalog;

use super::round_money;

/// Where a resolved nightly rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    /// A special-day override covering the date.
    SpecialDay,
    /// A day-of-week schedule matching the date.
    WeekdaySchedule,
    /// The caller-supplied default rates.
    Default,
}

/// The rate in effect for one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    /// Nightly base rate.
    pub base: Decimal,
    /// Nightly rate per extra occupant.
    pub extra: Decimal,
    /// The plan's discount percentage, reported whether or not it was applied.
    pub discount_percent: Decimal,
    /// Which priority tier supplied the rates.
    pub tier: RateTier,
}

/// Resolves the nightly rate for `date` under a rate plan.
///
/// Without a rate plan (`None` or id `0`) the defaults are returned with no
/// discount. Otherwise the plan's discount is looked up first and reported
/// even when `apply_discount` is `false`, so callers can price the original
/// and the discounted amount separately.
///
/// When `apply_discount` is set and the discount is positive, the chosen base
/// and extra rates are each scaled by `1 − discount/100` and rounded to cents.
///
/// # Example
///
/// ```
/// use stay_engine::calculation::{resolve_rate, RateTier};
/// use stay_engine::config::RateCatalog;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let catalog = RateCatalog::default();
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let rate = resolve_rate(&catalog, None, date, Decimal::new(1000, 0), Decimal::new(200, 0), true);
/// assert_eq!(rate.base, Decimal::new(1000, 0));
/// assert_eq!(rate.discount_percent, Decimal::ZERO);
/// assert_eq!(rate.tier, RateTier::Default);
/// ```
pub fn resolve_rate(
    catalog: &RateCatalog,
    rate_plan_id: Option<u64>,
    date: NaiveDate,
    default_base: Decimal,
    default_extra: Decimal,
    apply_discount: bool,
) -> ResolvedRate {
    let plan_id = match rate_plan_id {
        Some(id) if id != 0 => id,
        _ => {
            return ResolvedRate {
                base: default_base,
                extra: default_extra,
                discount_percent: Decimal::ZERO,
                tier: RateTier::Default,
            };
        }
    };

    let discount_percent = catalog
        .plan(plan_id)
        .map(|plan| plan.discount_percent())
        .unwrap_or(Decimal::ZERO);

    let (base, extra, tier) = if let Some(special) = catalog.special_day_for(plan_id, date) {
        (special.base_rate, special.extra_occupant_rate, RateTier::SpecialDay)
    } else if let Some(weekday) = catalog.weekday_rate_for(plan_id, date.weekday()) {
        (weekday.base_rate, weekday.extra_occupant_rate, RateTier::WeekdaySchedule)
    } else {
        (default_base, default_extra, RateTier::Default)
    };

    let (base, extra) = if apply_discount && discount_percent > Decimal::ZERO {
        let factor = Decimal::ONE - discount_percent / Decimal::ONE_HUNDRED;
        (round_money(base * factor), round_money(extra * factor))
    } else {
        (base, extra)
    };

    ResolvedRate {
        base,
        extra,
        discount_percent,
        tier,
    }
}
