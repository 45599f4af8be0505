//! Request and result types for [`BookingService`](super::BookingService).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{BalanceSnapshot, LedgerState};
use crate::models::{
    AncillaryCharge, NightlyCharge, PaymentEntry, PaymentStatus, ReservationNight, RoomNight, Stay,
    StayTotals, TaxSplit,
};

/// A stay to be priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Room type to book.
    pub room_type: String,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
    /// Guest segment, e.g. `corporate`.
    #[serde(default)]
    pub segment: Option<String>,
    /// Distribution channel, e.g. `direct`.
    #[serde(default)]
    pub channel: Option<String>,
    /// Adults per room.
    pub adults: u32,
    /// Children per room.
    #[serde(default)]
    pub children: u32,
    /// Number of rooms.
    pub required_rooms: u32,
}

/// Why a stay cannot be quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Check-out is not after check-in.
    InvalidDateRange,
    /// The room type is not configured.
    UnknownRoomType,
    /// No rate plan matches the room type, segment, channel and date.
    NoMatchingRate,
    /// More rooms requested than the room type allows in one booking.
    TooManyRooms,
}

impl UnavailableReason {
    /// User-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            UnavailableReason::InvalidDateRange => "Check-out must be after check-in",
            UnavailableReason::UnknownRoomType => "Unknown room type",
            UnavailableReason::NoMatchingRate => "No matching rate found",
            UnavailableReason::TooManyRooms => "More rooms than the room type offers",
        }
    }
}

/// A priced stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Room type priced.
    pub room_type: String,
    /// Rate plan selected.
    pub rate_plan_id: Option<u64>,
    /// Arrival date.
    pub check_in: NaiveDate,
    /// Departure date.
    pub check_out: NaiveDate,
    /// Calendar nights charged, one per breakdown row.
    pub nights: usize,
    /// Guests above the room type's included occupancy.
    pub extra_guests: u32,
    /// Number of rooms.
    pub required_rooms: u32,
    /// Discount percentage in effect.
    pub discount_percent: Decimal,
    /// Tax percentages in effect.
    pub tax_split: TaxSplit,
    /// One room's charge per night.
    pub breakdown: Vec<NightlyCharge>,
    /// Booking totals across all rooms.
    pub totals: StayTotals,
}

/// Result of [`BookingService::quote`](super::BookingService::quote).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuoteOutcome {
    /// The stay can be booked at this price.
    Available(Box<Quote>),
    /// The stay cannot be priced.
    Unavailable {
        /// Why.
        reason: UnavailableReason,
    },
}

/// A booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStayRequest {
    /// What to book.
    #[serde(flatten)]
    pub quote: QuoteRequest,
    /// Name on the booking.
    #[serde(default)]
    pub guest_name: Option<String>,
    /// Who is making the booking.
    #[serde(default)]
    pub actor: Option<String>,
}

/// A newly created stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayCreated {
    /// Store id.
    pub stay_id: u64,
    /// Booking reference.
    pub business_key: String,
    /// Booking totals.
    pub totals: StayTotals,
}

/// Result of a room assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAssignment {
    /// Booking reference.
    pub business_key: String,
    /// Rooms now assigned.
    pub rooms: Vec<String>,
    /// Ledger state after the assignment.
    pub state: LedgerState,
    /// When the guest was first given a room.
    pub actual_check_in: Option<DateTime<Utc>>,
    /// Per-room rows written.
    pub room_nights: usize,
}

/// Result of a date change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateChange {
    /// Booking reference.
    pub business_key: String,
    /// New arrival date.
    pub check_in: NaiveDate,
    /// New departure date.
    pub check_out: NaiveDate,
    /// Recomputed totals.
    pub totals: StayTotals,
    /// Balance after the change.
    pub balance: Decimal,
    /// Payment status after the change.
    pub payment_status: PaymentStatus,
    /// `true` when per-room rows were split from reservation-level amounts.
    pub used_fallback: bool,
}

/// Result of a payment, refund or charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerUpdate {
    /// Booking reference.
    pub business_key: String,
    /// Id of the payment entry or charge written.
    pub entry_id: Uuid,
    /// Net cash received.
    pub deposit: Decimal,
    /// Amount still owed on the room charges.
    pub balance: Decimal,
    /// Unsettled ancillary charges.
    pub outstanding_charges: Decimal,
    /// Payment status.
    pub payment_status: PaymentStatus,
}

/// Balance after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Store id.
    pub stay_id: u64,
    /// Rebuilt deposit, balance and status.
    #[serde(flatten)]
    pub snapshot: BalanceSnapshot,
    /// Rebuilt outstanding ancillary charges.
    pub outstanding_charges: Decimal,
    /// Whether the stored figures had drifted and were corrected.
    pub healed: bool,
}

/// Everything known about a stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayView {
    /// The stay.
    pub stay: Stay,
    /// Reservation-level nights.
    pub reservation_nights: Vec<ReservationNight>,
    /// Per-room nights.
    pub room_nights: Vec<RoomNight>,
    /// Payment ledger.
    pub payments: Vec<PaymentEntry>,
    /// Ancillary charges.
    pub charges: Vec<AncillaryCharge>,
}
