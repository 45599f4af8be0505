//! Regeneration of the two nightly projections.
//!
//! Reservation-level nights are the printable plan of a booking, one row per
//! date, independent of which physical rooms are given. Per-room nights are
//! the billing rows, one per date per assigned room. Both are always rebuilt
//! wholesale: the store deletes a stay's rows and inserts the ones produced
//! here inside the same unit of work.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{NightlyCharge, ReservationNight, RoomNight};

use super::{round_money, stay_dates};

/// Where a stay's nightly projections stand after a regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerState {
    /// Only reservation-level rows exist.
    Unassigned,
    /// Per-room rows were written for the first time.
    Assigned,
    /// Per-room rows were thrown away and rebuilt for a new room set.
    Reassigned,
    /// Both projections were rebuilt for new dates.
    DatesChanged,
}

/// The full replacement row sets for one stay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRegeneration {
    /// Replacement reservation-level rows.
    pub reservation_nights: Vec<ReservationNight>,
    /// Replacement per-room rows.
    pub room_nights: Vec<RoomNight>,
    /// Resulting state.
    pub state: LedgerState,
    /// `true` when per-room rows were split from reservation-level amounts
    /// because no fresh breakdown was available.
    pub used_fallback: bool,
}

/// Reservation-level rows for a fresh breakdown.
pub fn reservation_nights(stay_id: u64, nights: &[NightlyCharge]) -> Vec<ReservationNight> {
    nights
        .iter()
        .map(|charge| ReservationNight {
            stay_id,
            charge: charge.clone(),
        })
        .collect()
}

/// Per-room rows: the same breakdown written once per room, unsplit.
///
/// Each row is one room's full nightly charge; rooms of a multi-room booking
/// are priced identically.
pub fn room_nights(stay_id: u64, room_ids: &[String], nights: &[NightlyCharge]) -> Vec<RoomNight> {
    room_ids
        .iter()
        .flat_map(|room_id| {
            nights.iter().map(move |charge| RoomNight {
                stay_id,
                room_id: room_id.clone(),
                charge: charge.clone(),
            })
        })
        .collect()
}

/// Per-room rows obtained by dividing each reservation-level night evenly
/// across `room_ids`.
pub fn split_reservation_nights(
    stay_id: u64,
    reservation: &[ReservationNight],
    room_ids: &[String],
) -> Vec<RoomNight> {
    if room_ids.is_empty() {
        return Vec::new();
    }
    let share = Decimal::from(room_ids.len() as u64);
    let split = |amount: Decimal| round_money(amount / share);

    room_ids
        .iter()
        .flat_map(|room_id| {
            reservation.iter().map(move |night| {
                let c = &night.charge;
                RoomNight {
                    stay_id,
                    room_id: room_id.clone(),
                    charge: NightlyCharge {
                        date: c.date,
                        rate_after_discount: split(c.rate_after_discount),
                        rate_before_discount: split(c.rate_before_discount),
                        discount_amount: split(c.discount_amount),
                        tax: split(c.tax),
                        cgst: split(c.cgst),
                        sgst: split(c.sgst),
                    },
                }
            })
        })
        .collect()
}

/// Moves existing reservation-level rows onto a new date range.
///
/// Dates already present keep their row; new dates take the charge of the
/// latest existing night.
pub fn carry_forward_nights(
    stay_id: u64,
    previous: &[ReservationNight],
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Vec<ReservationNight> {
    let by_date: BTreeMap<NaiveDate, &NightlyCharge> =
        previous.iter().map(|n| (n.charge.date, &n.charge)).collect();
    let Some(last) = by_date.values().next_back().copied() else {
        return Vec::new();
    };

    stay_dates(check_in, check_out)
        .map(|date| {
            let source = by_date.get(&date).copied().unwrap_or(last);
            ReservationNight {
                stay_id,
                charge: NightlyCharge {
                    date,
                    ..source.clone()
                },
            }
        })
        .collect()
}

/// Rebuilds the per-room projection after rooms are attached or changed.
///
/// `previously_assigned` distinguishes a first assignment from a
/// reassignment; the reservation-level rows are left as they are.
pub fn regenerate_for_rooms(
    stay_id: u64,
    nights: &[NightlyCharge],
    room_ids: &[String],
    previously_assigned: bool,
) -> (Vec<RoomNight>, LedgerState) {
    let state = match (room_ids.is_empty(), previously_assigned) {
        (true, _) => LedgerState::Unassigned,
        (false, false) => LedgerState::Assigned,
        (false, true) => LedgerState::Reassigned,
    };
    (room_nights(stay_id, room_ids, nights), state)
}

/// Rebuilds both projections after a date change.
///
/// With a fresh breakdown, both projections come from it. Without one, the
/// previous reservation-level rows are carried onto the new dates and each
/// assigned room gets an even share of them.
pub fn regenerate_for_dates(
    stay_id: u64,
    fresh: Option<&[NightlyCharge]>,
    previous_reservation: &[ReservationNight],
    check_in: NaiveDate,
    check_out: NaiveDate,
    assigned_rooms: &[String],
) -> LedgerRegeneration {
    match fresh {
        Some(nights) => LedgerRegeneration {
            reservation_nights: reservation_nights(stay_id, nights),
            room_nights: room_nights(stay_id, assigned_rooms, nights),
            state: LedgerState::DatesChanged,
            used_fallback: false,
        },
        None => {
            let reservation =
                carry_forward_nights(stay_id, previous_reservation, check_in, check_out);
            let rooms = split_reservation_nights(stay_id, &reservation, assigned_rooms);
            LedgerRegeneration {
                reservation_nights: reservation,
                room_nights: rooms,
                state: LedgerState::DatesChanged,
                used_fallback: !assigned_rooms.is_empty(),
            }
        }
    }
}
