//! Rate master models.
//!
//! A [`RatePlan`] prices one room type for a guest segment and distribution
//! channel over a validity window. [`SpecialDayOverride`] and [`WeekdayRate`]
//! replace the plan's nightly rates on matching dates.

use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A rate plan for a room type, guest segment and channel.
///
/// `segment` and `channel` are optional: a plan that leaves one unset applies
/// to every value of it, at a lower matching priority.
///
/// # Example
///
/// ```
/// use stay_engine::models::RatePlan;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let plan = RatePlan {
///     id: 1,
///     room_type: "deluxe".to_string(),
///     segment: Some("corporate".to_string()),
///     channel: None,
///     valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     valid_to: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
///     base_rate: Decimal::new(1000, 0),
///     extra_occupant_rate: Decimal::new(200, 0),
///     tax_percent: Decimal::new(12, 0),
///     cgst_percent: None,
///     sgst_percent: None,
///     discount_percent: Some("10%".to_string()),
/// };
/// assert_eq!(plan.discount_percent(), Decimal::new(10, 0));
/// assert_eq!(plan.tax_split().cgst_percent, Decimal::new(6, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePlan {
    /// Unique identifier of the plan.
    pub id: u64,
    /// The room type this plan prices.
    pub room_type: String,
    /// Guest segment the plan is restricted to, if any.
    #[serde(default)]
    pub segment: Option<String>,
    /// Distribution channel the plan is restricted to, if any.
    #[serde(default)]
    pub channel: Option<String>,
    /// First date the plan is valid (inclusive).
    pub valid_from: NaiveDate,
    /// Last date the plan is valid (inclusive).
    pub valid_to: NaiveDate,
    /// Nightly base rate. Zero defers to the room type's base rate.
    #[serde(default)]
    pub base_rate: Decimal,
    /// Nightly rate per guest above the room type's max occupancy.
    #[serde(default)]
    pub extra_occupant_rate: Decimal,
    /// Total tax percentage.
    pub tax_percent: Decimal,
    /// Explicit first tax component percentage.
    #[serde(default)]
    pub cgst_percent: Option<Decimal>,
    /// Explicit second tax component percentage.
    #[serde(default)]
    pub sgst_percent: Option<Decimal>,
    /// Stay discount as entered in the rate master, e.g. `"10"` or `"12.5%"`.
    #[serde(default)]
    pub discount_percent: Option<String>,
}

impl RatePlan {
    /// Returns `true` if `date` falls inside the plan's validity window.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }

    /// The discount percentage in effect for this plan.
    ///
    /// See [`parse_discount_percent`] for how the free-text field is read.
    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
            .as_deref()
            .map(|raw| parse_discount_percent(self.id, raw))
            .unwrap_or(Decimal::ZERO)
    }

    /// The plan's tax percentages with both components filled in.
    pub fn tax_split(&self) -> TaxSplit {
        TaxSplit::new(self.tax_percent, self.cgst_percent, self.sgst_percent)
    }
}

/// Reads the rate master's free-text discount field.
///
/// Surrounding whitespace and a trailing `%` are ignored. Anything that does
/// not parse to a percentage in `[0, 100]` counts as no discount and is logged.
///
/// ```
/// use stay_engine::models::parse_discount_percent;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_discount_percent(1, " 12.5 % "), Decimal::new(125, 1));
/// assert_eq!(parse_discount_percent(1, "ten"), Decimal::ZERO);
/// assert_eq!(parse_discount_percent(1, "150"), Decimal::ZERO);
/// ```
pub fn parse_discount_percent(rate_plan_id: u64, raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    let numeric = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    match Decimal::from_str(numeric) {
        Ok(percent) if percent >= Decimal::ZERO && percent <= Decimal::ONE_HUNDRED => percent,
        Ok(percent) => {
            warn!(rate_plan_id, %percent, "Discount outside 0-100, treating as zero");
            Decimal::ZERO
        }
        Err(_) => {
            warn!(rate_plan_id, raw, "Unparseable discount, treating as zero");
            Decimal::ZERO
        }
    }
}

/// Total tax percentage and its two co-equal components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxSplit {
    /// Total tax percentage.
    pub tax_percent: Decimal,
    /// First component percentage.
    pub cgst_percent: Decimal,
    /// Second component percentage.
    pub sgst_percent: Decimal,
}

impl TaxSplit {
    /// Builds a split, halving the total for any component that is absent or zero.
    pub fn new(tax_percent: Decimal, cgst: Option<Decimal>, sgst: Option<Decimal>) -> Self {
        let half = tax_percent / Decimal::TWO;
        let component = |value: Option<Decimal>| match value {
            Some(pct) if !pct.is_zero() => pct,
            _ => half,
        };
        Self {
            tax_percent,
            cgst_percent: component(cgst),
            sgst_percent: component(sgst),
        }
    }
}

/// An absolute nightly rate for a date range of a rate plan.
///
/// Highest priority in rate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialDayOverride {
    /// The rate plan this override belongs to.
    pub rate_plan_id: u64,
    /// First date of the override (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the override (inclusive).
    pub end_date: NaiveDate,
    /// Nightly base rate on matching dates.
    pub base_rate: Decimal,
    /// Nightly extra-occupant rate on matching dates.
    #[serde(default)]
    pub extra_occupant_rate: Decimal,
}

impl SpecialDayOverride {
    /// Returns `true` if `date` falls inside the override's range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// An absolute nightly rate for one day of the week of a rate plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayRate {
    /// The rate plan this schedule belongs to.
    pub rate_plan_id: u64,
    /// The day of the week this rate applies to.
    pub day: Weekday,
    /// Nightly base rate on that day.
    pub base_rate: Decimal,
    /// Nightly extra-occupant rate on that day.
    #[serde(default)]
    pub extra_occupant_rate: Decimal,
}
