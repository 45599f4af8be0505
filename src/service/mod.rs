//! Booking operations.
//!
//! [`BookingService`] ties the pure calculation components to a [`Store`].
//! Each mutating operation runs as one unit of work: the stay, both nightly
//! projections, the payment ledger and the audit trail are read, recomputed
//! and written together, and any error discards every write.
//!
//! A business key or room that resolves to nothing is reported as `Ok(None)`
//! rather than an error; the caller decides how to present it.

mod audit_trail;
mod types;

pub use audit_trail::record_audit;
pub use types::{
    CreateStayRequest, DateChange, LedgerUpdate, Quote, QuoteOutcome, QuoteRequest,
    Reconciliation, RoomAssignment, StayCreated, StayView, UnavailableReason,
};

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    BalanceSnapshot, BreakdownRequest, NightlyBreakdown, PaymentInput, PaymentWriter,
    aggregate_totals, apply_payment, apply_total_change, build_nightly_breakdown, count_nights,
    extra_guests, payment_status, reconcile_balance, regenerate_for_dates, regenerate_for_rooms,
    reservation_nights,
};
use crate::config::{ConfigLoader, HotelConfig, RoomType};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AncillaryCharge, AuditAction, AuditRecord, NightlyCharge, PaymentMethod, RatePlan, Stay,
    TaxSplit,
};
use crate::store::{InMemoryStore, Store, UnitOfWork};

/// Quotes, books and mutates stays against a store.
pub struct BookingService<S: Store = InMemoryStore> {
    config: Arc<ConfigLoader>,
    store: Arc<S>,
    payment_writer: PaymentWriter,
}

impl<S: Store> Clone for BookingService<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            payment_writer: self.payment_writer,
        }
    }
}

impl BookingService<InMemoryStore> {
    /// Creates a service backed by a fresh in-memory store.
    pub fn new(config: Arc<ConfigLoader>) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }
}

impl<S: Store> BookingService<S> {
    /// Creates a service over an existing store.
    ///
    /// The payment ledger writer is chosen here, once, from the hotel's
    /// schema capabilities.
    pub fn with_store(config: Arc<ConfigLoader>, store: Arc<S>) -> Self {
        let payment_writer =
            PaymentWriter::for_capabilities(config.config().settings().schema);
        Self {
            config,
            store,
            payment_writer,
        }
    }

    /// Returns the hotel configuration.
    pub fn config(&self) -> &HotelConfig {
        self.config.config()
    }

    /// Returns the payment ledger writer in use.
    pub fn payment_writer(&self) -> PaymentWriter {
        self.payment_writer
    }

    /// Prices a stay without booking it.
    ///
    /// Fails only on malformed input. A stay that cannot be priced comes back
    /// as [`QuoteOutcome::Unavailable`].
    pub fn quote(&self, request: &QuoteRequest) -> EngineResult<QuoteOutcome> {
        validate_occupancy(request)?;

        let config = self.config();
        let settings = config.settings();
        let clock_nights = count_nights(
            request.check_in,
            request.check_out,
            settings.check_in_time,
            settings.check_out_time,
        );
        if clock_nights <= 0 {
            return Ok(unavailable(UnavailableReason::InvalidDateRange));
        }

        let Some(room_type) = config.room_type(&request.room_type) else {
            return Ok(unavailable(UnavailableReason::UnknownRoomType));
        };
        if request.required_rooms > room_type.max_rooms {
            return Ok(unavailable(UnavailableReason::TooManyRooms));
        }
        let Some(plan) = config.catalog().best_plan(
            &request.room_type,
            request.segment.as_deref(),
            request.channel.as_deref(),
            request.check_in,
        ) else {
            return Ok(unavailable(UnavailableReason::NoMatchingRate));
        };

        let extra = extra_guests(request.adults, request.children, room_type.max_occupancy);
        let tax_split = plan.tax_split();
        let breakdown = self.breakdown(
            room_type,
            Some(plan),
            request.check_in,
            request.check_out,
            extra,
            tax_split,
        );
        if breakdown.nights.is_empty() {
            return Ok(unavailable(UnavailableReason::NoMatchingRate));
        }

        let totals = aggregate_totals(
            &breakdown.nights,
            request.required_rooms,
            breakdown.discount_percent,
        );

        Ok(QuoteOutcome::Available(Box::new(Quote {
            room_type: request.room_type.clone(),
            rate_plan_id: Some(plan.id),
            check_in: request.check_in,
            check_out: request.check_out,
            nights: breakdown.nights.len(),
            extra_guests: extra,
            required_rooms: request.required_rooms,
            discount_percent: breakdown.discount_percent,
            tax_split,
            breakdown: breakdown.nights,
            totals,
        })))
    }

    /// Books a stay and writes its reservation-level nights.
    pub fn create_stay(&self, request: &CreateStayRequest) -> EngineResult<StayCreated> {
        let quote = match self.quote(&request.quote)? {
            QuoteOutcome::Available(quote) => quote,
            QuoteOutcome::Unavailable { reason } => {
                return Err(EngineError::validation(reason.message()));
            }
        };
        let prefix = self.config().settings().business_key_prefix.clone();

        let created = self.store.transaction(|tx| {
            let stay_id = tx.next_stay_id();
            let stay = Stay {
                id: stay_id,
                business_key: format!("{}-{:06}", prefix, stay_id),
                guest_name: request.guest_name.clone(),
                room_type: quote.room_type.clone(),
                check_in: quote.check_in,
                check_out: quote.check_out,
                adults: request.quote.adults,
                children: request.quote.children,
                extra_guests: quote.extra_guests,
                required_rooms: quote.required_rooms,
                segment: request.quote.segment.clone(),
                channel: request.quote.channel.clone(),
                rate_plan_id: quote.rate_plan_id,
                discount_percent: quote.discount_percent,
                tax_split: quote.tax_split,
                totals: quote.totals,
                deposit: Decimal::ZERO,
                balance: quote.totals.total,
                outstanding_charges: Decimal::ZERO,
                payment_status: payment_status(quote.totals.total, Decimal::ZERO, Decimal::ZERO),
                assigned_rooms: Vec::new(),
                actual_check_in: None,
                created_at: Utc::now(),
            };

            tx.save_stay(stay.clone())?;
            tx.replace_reservation_nights(stay_id, reservation_nights(stay_id, &quote.breakdown))?;
            record_audit(
                tx,
                &stay,
                AuditAction::StayCreated,
                format!(
                    "Booked {} x {} from {} to {}",
                    stay.required_rooms, stay.room_type, stay.check_in, stay.check_out
                ),
                None,
                Some(json!(stay.totals)),
                request.actor.as_deref(),
            )?;

            Ok(StayCreated {
                stay_id,
                business_key: stay.business_key,
                totals: stay.totals,
            })
        })?;

        info!(
            stay_id = created.stay_id,
            business_key = %created.business_key,
            total = %created.totals.total,
            "Stay created"
        );
        Ok(created)
    }

    /// Attaches a single room, replacing any rooms already assigned.
    pub fn assign_room(
        &self,
        business_key: &str,
        room_id: &str,
        actor: Option<&str>,
    ) -> EngineResult<Option<RoomAssignment>> {
        self.assign_rooms(business_key, &[room_id.to_string()], actor)
    }

    /// Attaches a set of rooms and rebuilds the per-room nights.
    ///
    /// One room per required room. Every room must exist and be of the
    /// booked room type; one mismatched room fails the whole assignment with
    /// nothing written.
    pub fn assign_rooms(
        &self,
        business_key: &str,
        room_ids: &[String],
        actor: Option<&str>,
    ) -> EngineResult<Option<RoomAssignment>> {
        if room_ids.is_empty() {
            return Err(EngineError::validation("Room is required"));
        }
        let mut seen = HashSet::new();
        if !room_ids.iter().all(|id| seen.insert(id.as_str())) {
            return Err(EngineError::validation("Room listed more than once"));
        }

        let config = self.config();
        let assignment = self.store.transaction(|tx| {
            let Some(mut stay) = tx.stay_by_key(business_key) else {
                return Ok(None);
            };
            if room_ids.len() != stay.required_rooms as usize {
                return Err(EngineError::validation(format!(
                    "Booking requires {} room(s)",
                    stay.required_rooms
                )));
            }
            for room_id in room_ids {
                let Some(room) = config.room(room_id) else {
                    return Ok(None);
                };
                if room.room_type != stay.room_type {
                    return Err(EngineError::validation("Room type mismatch"));
                }
            }

            let nights = match self.breakdown_for_stay(&stay, stay.check_in, stay.check_out) {
                Some(breakdown) => breakdown.nights,
                None => stored_charges(&*tx, stay.id),
            };
            let (rows, state) =
                regenerate_for_rooms(stay.id, &nights, room_ids, stay.is_assigned());
            let written = rows.len();
            tx.replace_room_nights(stay.id, rows)?;

            let previous = std::mem::replace(&mut stay.assigned_rooms, room_ids.to_vec());
            if stay.actual_check_in.is_none() {
                stay.actual_check_in = Some(Utc::now());
            }
            tx.save_stay(stay.clone())?;
            record_audit(
                tx,
                &stay,
                AuditAction::RoomAssigned,
                format!(
                    "Rooms changed from [{}] to [{}]",
                    previous.join(", "),
                    stay.assigned_rooms.join(", ")
                ),
                Some(json!(previous)),
                Some(json!(stay.assigned_rooms)),
                actor,
            )?;

            Ok(Some(RoomAssignment {
                business_key: stay.business_key.clone(),
                rooms: stay.assigned_rooms.clone(),
                state,
                actual_check_in: stay.actual_check_in,
                room_nights: written,
            }))
        })?;

        if let Some(assignment) = &assignment {
            info!(
                business_key = %assignment.business_key,
                rooms = ?assignment.rooms,
                state = ?assignment.state,
                "Rooms assigned"
            );
        }
        Ok(assignment)
    }

    /// Moves a stay to new dates and rebuilds everything derived from them.
    pub fn change_dates(
        &self,
        business_key: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        actor: Option<&str>,
    ) -> EngineResult<Option<DateChange>> {
        let settings = self.config().settings();
        if count_nights(check_in, check_out, settings.check_in_time, settings.check_out_time) <= 0 {
            return Err(EngineError::validation(UnavailableReason::InvalidDateRange.message()));
        }

        let change = self.store.transaction(|tx| {
            let Some(mut stay) = tx.stay_by_key(business_key) else {
                return Ok(None);
            };

            let fresh = self.breakdown_for_stay(&stay, check_in, check_out);
            let previous = tx.reservation_nights(stay.id);
            let regen = regenerate_for_dates(
                stay.id,
                fresh.as_ref().map(|b| b.nights.as_slice()),
                &previous,
                check_in,
                check_out,
                &stay.assigned_rooms,
            );
            if regen.reservation_nights.is_empty() {
                return Err(EngineError::validation(UnavailableReason::NoMatchingRate.message()));
            }
            if fresh.is_none() {
                warn!(
                    business_key = %stay.business_key,
                    rooms = stay.assigned_rooms.len(),
                    "No fresh breakdown for new dates, carrying reservation nights forward"
                );
            }

            let discount_percent = fresh
                .as_ref()
                .map(|b| b.discount_percent)
                .unwrap_or(stay.discount_percent);
            let charges: Vec<NightlyCharge> = regen
                .reservation_nights
                .iter()
                .map(|n| n.charge.clone())
                .collect();
            let totals = aggregate_totals(&charges, stay.required_rooms, discount_percent);
            let snapshot = apply_total_change(
                snapshot_of(&stay),
                stay.outstanding_charges,
                stay.totals.total,
                totals.total,
            );

            let old_value = json!({
                "check_in": stay.check_in,
                "check_out": stay.check_out,
                "total": stay.totals.total,
            });
            stay.check_in = check_in;
            stay.check_out = check_out;
            stay.discount_percent = discount_percent;
            stay.totals = totals;
            stay.balance = snapshot.balance;
            stay.payment_status = snapshot.status;

            tx.replace_reservation_nights(stay.id, regen.reservation_nights)?;
            tx.replace_room_nights(stay.id, regen.room_nights)?;
            tx.save_stay(stay.clone())?;
            record_audit(
                tx,
                &stay,
                AuditAction::DatesChanged,
                format!("Dates changed to {} - {}", check_in, check_out),
                Some(old_value),
                Some(json!({
                    "check_in": check_in,
                    "check_out": check_out,
                    "total": totals.total,
                })),
                actor,
            )?;

            Ok(Some(DateChange {
                business_key: stay.business_key.clone(),
                check_in,
                check_out,
                totals,
                balance: stay.balance,
                payment_status: stay.payment_status,
                used_fallback: regen.used_fallback,
            }))
        })?;

        if let Some(change) = &change {
            info!(
                business_key = %change.business_key,
                total = %change.totals.total,
                balance = %change.balance,
                "Stay dates changed"
            );
        }
        Ok(change)
    }

    /// Captures a payment against a stay.
    pub fn record_payment(
        &self,
        business_key: &str,
        input: &PaymentInput,
        actor: Option<&str>,
    ) -> EngineResult<Option<LedgerUpdate>> {
        validate_amount(input.amount)?;
        if input.discount < Decimal::ZERO {
            return Err(EngineError::validation("Discount cannot be negative"));
        }
        if input.discount > max_entry_amount() || input.round_off.abs() > max_entry_amount() {
            return Err(EngineError::validation("Amount is too large"));
        }
        self.write_payment(business_key, input, false, actor)
    }

    /// Returns cash to the guest.
    ///
    /// A refund is a negative ledger entry; it cannot exceed the cash held.
    pub fn record_refund(
        &self,
        business_key: &str,
        amount: Decimal,
        method: PaymentMethod,
        reference: Option<String>,
        actor: Option<&str>,
    ) -> EngineResult<Option<LedgerUpdate>> {
        validate_amount(amount)?;
        let input = PaymentInput {
            amount,
            method,
            discount: Decimal::ZERO,
            round_off: Decimal::ZERO,
            round_off_applied: false,
            reference,
        };
        self.write_payment(business_key, &input, true, actor)
    }

    fn write_payment(
        &self,
        business_key: &str,
        input: &PaymentInput,
        is_refund: bool,
        actor: Option<&str>,
    ) -> EngineResult<Option<LedgerUpdate>> {
        let update = self.store.transaction(|tx| {
            let Some(mut stay) = tx.stay_by_key(business_key) else {
                return Ok(None);
            };
            if is_refund && input.amount > stay.deposit {
                return Err(EngineError::validation("Refund exceeds amount received"));
            }

            let entry = self
                .payment_writer
                .entry(stay.id, input, is_refund, Utc::now());
            let snapshot = apply_payment(snapshot_of(&stay), stay.outstanding_charges, &entry);
            let old_value = json!(snapshot_of(&stay));
            stay.deposit = snapshot.deposit;
            stay.balance = snapshot.balance;
            stay.payment_status = snapshot.status;

            let (action, verb) = if is_refund {
                (AuditAction::RefundRecorded, "Refunded")
            } else {
                (AuditAction::PaymentRecorded, "Received")
            };
            let entry_id = entry.id;
            let description = format!("{} {} by {:?}", verb, input.amount, input.method);
            tx.append_payment(entry)?;
            tx.save_stay(stay.clone())?;
            record_audit(
                tx,
                &stay,
                action,
                description,
                Some(old_value),
                Some(json!(snapshot)),
                actor,
            )?;

            Ok(Some(ledger_update(&stay, entry_id)))
        })?;

        if let Some(update) = &update {
            info!(
                business_key = %update.business_key,
                amount = %input.amount,
                refund = is_refund,
                balance = %update.balance,
                status = ?update.payment_status,
                "Payment recorded"
            );
        }
        Ok(update)
    }

    /// Posts an ancillary charge that must be settled before the stay is paid.
    pub fn post_charge(
        &self,
        business_key: &str,
        amount: Decimal,
        description: &str,
        actor: Option<&str>,
    ) -> EngineResult<Option<LedgerUpdate>> {
        validate_amount(amount)?;
        if description.trim().is_empty() {
            return Err(EngineError::validation("Description is required"));
        }

        let update = self.store.transaction(|tx| {
            let Some(mut stay) = tx.stay_by_key(business_key) else {
                return Ok(None);
            };
            let charge = AncillaryCharge {
                id: Uuid::new_v4(),
                stay_id: stay.id,
                amount,
                description: description.trim().to_string(),
                posted_at: Utc::now(),
            };
            let old_outstanding = stay.outstanding_charges;
            stay.outstanding_charges += amount;
            stay.payment_status =
                payment_status(stay.balance, stay.outstanding_charges, stay.deposit);

            let charge_id = charge.id;
            tx.append_charge(charge)?;
            tx.save_stay(stay.clone())?;
            record_audit(
                tx,
                &stay,
                AuditAction::ChargePosted,
                format!("Charge {} for {}", amount, description.trim()),
                Some(json!({ "outstanding_charges": old_outstanding })),
                Some(json!({ "outstanding_charges": stay.outstanding_charges })),
                actor,
            )?;

            Ok(Some(ledger_update(&stay, charge_id)))
        })?;

        if let Some(update) = &update {
            info!(
                business_key = %update.business_key,
                amount = %amount,
                outstanding = %update.outstanding_charges,
                "Charge posted"
            );
        }
        Ok(update)
    }

    /// Rebuilds deposit, balance and status from the payment ledger.
    ///
    /// Safe to call any number of times. Figures are only written, and an
    /// audit record only appended, when they had drifted.
    pub fn reconcile(
        &self,
        stay_id: u64,
        actor: Option<&str>,
    ) -> EngineResult<Option<Reconciliation>> {
        let result = self.store.transaction(|tx| {
            let Some(mut stay) = tx.stay(stay_id) else {
                return Ok(None);
            };
            let outstanding: Decimal = tx.charges(stay_id).iter().map(|c| c.amount).sum();
            let entries = tx.payments(stay_id);
            let snapshot = reconcile_balance(stay.totals.total, outstanding, &entries);

            let before = snapshot_of(&stay);
            let healed = before != snapshot || stay.outstanding_charges != outstanding;
            if healed {
                let old_value = json!({
                    "balance": before,
                    "outstanding_charges": stay.outstanding_charges,
                });
                stay.deposit = snapshot.deposit;
                stay.balance = snapshot.balance;
                stay.payment_status = snapshot.status;
                stay.outstanding_charges = outstanding;
                tx.save_stay(stay.clone())?;
                record_audit(
                    tx,
                    &stay,
                    AuditAction::BalanceReconciled,
                    "Balance rebuilt from payment ledger",
                    Some(old_value),
                    Some(json!({
                        "balance": snapshot,
                        "outstanding_charges": outstanding,
                    })),
                    actor,
                )?;
            }

            Ok(Some(Reconciliation {
                stay_id,
                snapshot,
                outstanding_charges: outstanding,
                healed,
            }))
        })?;

        if let Some(result) = &result {
            if result.healed {
                warn!(stay_id, balance = %result.snapshot.balance, "Stay balance had drifted and was rebuilt");
            } else {
                info!(stay_id, "Stay balance already consistent");
            }
        }
        Ok(result)
    }

    /// Everything stored for a stay.
    pub fn get_stay(&self, business_key: &str) -> EngineResult<Option<StayView>> {
        self.store.read(|tx| {
            tx.stay_by_key(business_key).map(|stay| StayView {
                reservation_nights: tx.reservation_nights(stay.id),
                room_nights: tx.room_nights(stay.id),
                payments: tx.payments(stay.id),
                charges: tx.charges(stay.id),
                stay,
            })
        })
    }

    /// The audit trail of a stay, oldest first.
    pub fn audit_trail(&self, business_key: &str) -> EngineResult<Option<Vec<AuditRecord>>> {
        self.store.read(|tx| {
            tx.stay_by_key(business_key)
                .map(|stay| tx.audit_records(stay.id))
        })
    }

    /// Prices a stay's current rate plan over new dates.
    ///
    /// `None` when the room type or rate plan has since left the
    /// configuration, or when the range holds no nights.
    fn breakdown_for_stay(
        &self,
        stay: &Stay,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Option<NightlyBreakdown> {
        let config = self.config();
        let room_type = config.room_type(&stay.room_type)?;
        let plan = match stay.rate_plan_id {
            Some(id) => Some(config.catalog().plan(id)?),
            None => None,
        };
        let breakdown = self.breakdown(
            room_type,
            plan,
            check_in,
            check_out,
            stay.extra_guests,
            stay.tax_split,
        );
        (!breakdown.nights.is_empty()).then_some(breakdown)
    }

    fn breakdown(
        &self,
        room_type: &RoomType,
        plan: Option<&RatePlan>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        extra_guests: u32,
        tax: TaxSplit,
    ) -> NightlyBreakdown {
        let (default_base, default_extra) = default_rates(room_type, plan);
        let request = BreakdownRequest {
            rate_plan_id: plan.map(|p| p.id),
            check_in,
            check_out,
            default_base,
            default_extra,
            extra_guests,
            tax,
        };
        build_nightly_breakdown(self.config().catalog(), &request)
    }
}

fn validate_occupancy(request: &QuoteRequest) -> EngineResult<()> {
    if request.required_rooms < 1 {
        return Err(EngineError::validation("Required rooms must be at least 1"));
    }
    if request.adults < 1 {
        return Err(EngineError::validation("At least one adult is required"));
    }
    Ok(())
}

/// Largest single payment, refund, discount, round-off or charge accepted.
fn max_entry_amount() -> Decimal {
    Decimal::new(1_000_000_000_000, 0)
}

fn validate_amount(amount: Decimal) -> EngineResult<()> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::validation("Amount must be positive"));
    }
    if amount > max_entry_amount() {
        return Err(EngineError::validation("Amount is too large"));
    }
    Ok(())
}

fn unavailable(reason: UnavailableReason) -> QuoteOutcome {
    QuoteOutcome::Unavailable { reason }
}

/// The plan's own rates when set, otherwise the room type's.
fn default_rates(room_type: &RoomType, plan: Option<&RatePlan>) -> (Decimal, Decimal) {
    let positive = |value: Decimal| (value > Decimal::ZERO).then_some(value);
    let base = plan
        .and_then(|p| positive(p.base_rate))
        .unwrap_or(room_type.base_rate);
    let extra = plan
        .and_then(|p| positive(p.extra_occupant_rate))
        .unwrap_or(room_type.extra_occupant_rate);
    (base, extra)
}

fn stored_charges<U: UnitOfWork>(tx: &U, stay_id: u64) -> Vec<NightlyCharge> {
    tx.reservation_nights(stay_id)
        .into_iter()
        .map(|n| n.charge)
        .collect()
}

fn snapshot_of(stay: &Stay) -> BalanceSnapshot {
    BalanceSnapshot {
        deposit: stay.deposit,
        balance: stay.balance,
        status: stay.payment_status,
    }
}

fn ledger_update(stay: &Stay, entry_id: Uuid) -> LedgerUpdate {
    LedgerUpdate {
        business_key: stay.business_key.clone(),
        entry_id,
        deposit: stay.deposit,
        balance: stay.balance,
        outstanding_charges: stay.outstanding_charges,
        payment_status: stay.payment_status,
    }
}
