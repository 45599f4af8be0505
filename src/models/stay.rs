//! The stay (booking) aggregate root.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxSplit;

/// Payment state of a stay, derived from deposit and balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing received yet.
    #[default]
    Pending,
    /// Some cash received but the stay is not settled.
    PartiallyPaid,
    /// Balance plus outstanding charges is at or below zero.
    Paid,
}

/// Booking-level monetary totals, always derived from the nightly rows.
///
/// Invariant: `total == base + tax` and `tax == cgst + sgst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StayTotals {
    /// Sum of after-discount nightly amounts across all required rooms.
    pub base: Decimal,
    /// Total tax (`cgst + sgst`).
    pub tax: Decimal,
    /// First tax component.
    pub cgst: Decimal,
    /// Second tax component.
    pub sgst: Decimal,
    /// Discount reconstructed from `base` and the discount percentage.
    pub discount: Decimal,
    /// `base + tax`.
    pub total: Decimal,
}

/// A booking for one or more rooms of a single room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stay {
    /// Store-assigned identifier.
    pub id: u64,
    /// Human-facing booking reference, e.g. `BK-000001`.
    pub business_key: String,
    /// Name on the booking.
    #[serde(default)]
    pub guest_name: Option<String>,
    /// Room type booked.
    pub room_type: String,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date (not a charged night).
    pub check_out: NaiveDate,
    /// Adults staying per room.
    pub adults: u32,
    /// Children staying per room.
    pub children: u32,
    /// Guests above the room type's max occupancy, charged at the extra rate.
    pub extra_guests: u32,
    /// Number of rooms booked.
    pub required_rooms: u32,
    /// Guest segment used to pick the rate plan.
    #[serde(default)]
    pub segment: Option<String>,
    /// Distribution channel used to pick the rate plan.
    #[serde(default)]
    pub channel: Option<String>,
    /// Rate plan resolved at booking time.
    pub rate_plan_id: Option<u64>,
    /// Discount percentage in effect at booking time.
    pub discount_percent: Decimal,
    /// Tax percentages in effect at booking time.
    pub tax_split: TaxSplit,
    /// Derived monetary totals.
    pub totals: StayTotals,
    /// Net cash received.
    pub deposit: Decimal,
    /// Amount still owed on the room charges.
    pub balance: Decimal,
    /// Unsettled ancillary charges (minibar, laundry, ...).
    pub outstanding_charges: Decimal,
    /// Derived payment status.
    pub payment_status: PaymentStatus,
    /// Physical rooms currently assigned, in assignment order.
    #[serde(default)]
    pub assigned_rooms: Vec<String>,
    /// Set the first time a room is attached, never changed afterwards.
    pub actual_check_in: Option<DateTime<Utc>>,
    /// When the stay was created.
    pub created_at: DateTime<Utc>,
}

impl Stay {
    /// Number of calendar nights between check-in and check-out.
    pub fn night_span(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Returns `true` once at least one physical room is attached.
    pub fn is_assigned(&self) -> bool {
        !self.assigned_rooms.is_empty()
    }
}
