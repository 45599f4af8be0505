//! Core data models for the stay engine.
//!
//! This module contains the rate catalog entries, the stay aggregate, the two
//! nightly allocation projections and the append-only payment and audit rows.

mod audit;
mod nightly;
mod payment;
mod rate_plan;
mod stay;

pub use audit::{AuditAction, AuditRecord};
pub use nightly::{NightlyCharge, ReservationNight, RoomNight};
pub use payment::{AncillaryCharge, PaymentEntry, PaymentMethod};
pub use rate_plan::{RatePlan, SpecialDayOverride, TaxSplit, WeekdayRate, parse_discount_percent};
pub use stay::{PaymentStatus, Stay, StayTotals};
