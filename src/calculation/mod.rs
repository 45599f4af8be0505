//! Calculation logic for the stay engine.
//!
//! Everything in this module is pure: no store access, no clock reads beyond
//! timestamps handed in by the caller. Rates resolve per night, nights build
//! into a breakdown, the breakdown aggregates into booking totals and feeds
//! both nightly projections, and payments reconcile against the totals.

mod booking_totals;
mod night_count;
mod nightly_breakdown;
mod payment_ledger;
mod rate_resolver;
mod room_night_ledger;
mod rounding;

pub use booking_totals::aggregate_totals;
pub use night_count::{count_nights, extra_guests, stay_dates};
pub use nightly_breakdown::{BreakdownRequest, NightlyBreakdown, build_nightly_breakdown};
pub use payment_ledger::{
    BalanceSnapshot, PaymentInput, PaymentWriter, apply_payment, apply_total_change,
    payment_status, reconcile_balance,
};
pub use rate_resolver::{RateTier, ResolvedRate, resolve_rate};
pub use room_night_ledger::{
    LedgerRegeneration, LedgerState, carry_forward_nights, regenerate_for_dates,
    regenerate_for_rooms, reservation_nights, room_nights, split_reservation_nights,
};
pub use rounding::{MONEY_DP, percent_of, round_money};
