//! Integration tests for the stay engine.
//!
//! Covers the pricing scenarios end to end through the booking service, the
//! consistency of both nightly projections across room and date changes,
//! the payment ledger, and the HTTP surface.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use stay_engine::api::{AppState, create_router};
use stay_engine::calculation::{LedgerState, PaymentInput};
use stay_engine::config::{ConfigLoader, HotelConfig, RateCatalog};
use stay_engine::models::{AuditAction, PaymentMethod, PaymentStatus};
use stay_engine::service::{
    BookingService, CreateStayRequest, QuoteOutcome, QuoteRequest, StayCreated,
};
use stay_engine::store::InMemoryStore;

// =============================================================================
// Test Helpers
// =============================================================================

fn loader() -> Arc<ConfigLoader> {
    Arc::new(ConfigLoader::load("./config/sample").expect("Failed to load config"))
}

fn service() -> BookingService {
    BookingService::new(loader())
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn quote_request(check_in: &str, check_out: &str, rooms: u32, segment: Option<&str>) -> QuoteRequest {
    QuoteRequest {
        room_type: "deluxe".to_string(),
        check_in: date(check_in),
        check_out: date(check_out),
        segment: segment.map(str::to_string),
        channel: None,
        adults: 2,
        children: 0,
        required_rooms: rooms,
    }
}

fn book(service: &BookingService, request: QuoteRequest) -> StayCreated {
    service
        .create_stay(&CreateStayRequest {
            quote: request,
            guest_name: Some("R. Traveller".to_string()),
            actor: Some("reservations".to_string()),
        })
        .expect("stay is bookable")
}

fn rooms(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn payment(amount: &str, discount: &str, round_off: &str, applied: bool) -> PaymentInput {
    PaymentInput {
        amount: dec(amount),
        method: PaymentMethod::Cash,
        discount: dec(discount),
        round_off: dec(round_off),
        round_off_applied: applied,
        reference: None,
    }
}

// =============================================================================
// Pricing Scenarios
// =============================================================================

#[test]
fn test_scenario_a_two_nights_no_discount() {
    let outcome = service()
        .quote(&quote_request("2026-03-02", "2026-03-04", 1, None))
        .unwrap();
    let QuoteOutcome::Available(quote) = outcome else {
        panic!("expected a quote");
    };

    assert_eq!(quote.rate_plan_id, Some(1));
    assert_eq!(quote.nights, 2);
    assert_eq!(quote.breakdown.len(), 2);
    assert_eq!(quote.totals.base, dec("2000"));
    assert_eq!(quote.totals.cgst, dec("120"));
    assert_eq!(quote.totals.sgst, dec("120"));
    assert_eq!(quote.totals.tax, dec("240"));
    assert_eq!(quote.totals.discount, Decimal::ZERO);
    assert_eq!(quote.totals.total, dec("2240"));
}

#[test]
fn test_scenario_b_ten_percent_discount() {
    let outcome = service()
        .quote(&quote_request("2026-03-02", "2026-03-04", 1, Some("corporate")))
        .unwrap();
    let QuoteOutcome::Available(quote) = outcome else {
        panic!("expected a quote");
    };

    assert_eq!(quote.rate_plan_id, Some(2));
    assert_eq!(quote.discount_percent, dec("10"));
    for night in &quote.breakdown {
        assert_eq!(night.rate_before_discount, dec("1000"));
        assert_eq!(night.discount_amount, dec("100"));
        assert_eq!(night.rate_after_discount, dec("900"));
    }
    assert_eq!(quote.totals.base, dec("1800"));
    assert_eq!(quote.totals.cgst, dec("108"));
    assert_eq!(quote.totals.sgst, dec("108"));
    assert_eq!(quote.totals.total, dec("2016"));
    assert_eq!(quote.totals.discount, dec("200"));
}

#[test]
fn test_scenario_c_special_day_night() {
    // 30 Dec is a Wednesday at the default rate, 31 Dec is a special day
    // that also falls on a Thursday with its own schedule
    let outcome = service()
        .quote(&quote_request("2026-12-30", "2027-01-01", 1, None))
        .unwrap();
    let QuoteOutcome::Available(quote) = outcome else {
        panic!("expected a quote");
    };

    assert_eq!(quote.breakdown[0].rate_after_discount, dec("1000"));
    assert_eq!(quote.breakdown[1].rate_after_discount, dec("1500"));
    assert_eq!(quote.totals.base, dec("2500"));
    assert_eq!(quote.totals.cgst, dec("150"));
    assert_eq!(quote.totals.total, dec("2800"));
}

#[test]
fn test_scenario_c_special_day_with_discount_and_rooms() {
    let outcome = service()
        .quote(&quote_request("2026-12-30", "2027-01-01", 2, Some("corporate")))
        .unwrap();
    let QuoteOutcome::Available(quote) = outcome else {
        panic!("expected a quote");
    };

    assert_eq!(quote.breakdown[0].rate_after_discount, dec("900"));
    assert_eq!(quote.breakdown[1].rate_after_discount, dec("1350"));
    assert_eq!(quote.totals.base, dec("4500"));
    assert_eq!(quote.totals.discount, dec("500"));
}

#[test]
fn test_weekend_schedule_applies_on_saturday() {
    let outcome = service()
        .quote(&quote_request("2026-03-06", "2026-03-08", 1, None))
        .unwrap();
    let QuoteOutcome::Available(quote) = outcome else {
        panic!("expected a quote");
    };

    // Friday default, Saturday schedule
    assert_eq!(quote.breakdown[0].rate_after_discount, dec("1000"));
    assert_eq!(quote.breakdown[1].rate_after_discount, dec("1200"));
    assert_eq!(quote.totals.base, dec("2200"));
}

#[test]
fn test_segment_and_channel_plan_wins() {
    let mut request = quote_request("2026-03-02", "2026-03-03", 1, Some("corporate"));
    request.channel = Some("direct".to_string());
    let QuoteOutcome::Available(quote) = service().quote(&request).unwrap() else {
        panic!("expected a quote");
    };

    // 950 less 5%
    assert_eq!(quote.rate_plan_id, Some(3));
    assert_eq!(quote.breakdown[0].rate_before_discount, dec("950"));
    assert_eq!(quote.breakdown[0].discount_amount, dec("47.50"));
    assert_eq!(quote.breakdown[0].rate_after_discount, dec("902.50"));
    assert_eq!(quote.breakdown[0].cgst, dec("54.15"));
}

// =============================================================================
// Room-Night Ledger
// =============================================================================

#[test]
fn test_scenario_d_multi_room_assignment() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 3, None));
    let key = &created.business_key;

    let view = service.get_stay(key).unwrap().unwrap();
    assert_eq!(view.reservation_nights.len(), 2);
    assert!(view.room_nights.is_empty());
    assert_eq!(view.stay.totals.base, dec("6000"));

    let assignment = service
        .assign_rooms(key, &rooms(&["101", "102", "103"]), Some("frontdesk"))
        .unwrap()
        .unwrap();
    assert_eq!(assignment.state, LedgerState::Assigned);
    assert_eq!(assignment.room_nights, 6);

    let view = service.get_stay(key).unwrap().unwrap();
    assert_eq!(view.room_nights.len(), 6);
    for room_night in &view.room_nights {
        let reservation = view
            .reservation_nights
            .iter()
            .find(|n| n.charge.date == room_night.charge.date)
            .unwrap();
        assert_eq!(room_night.charge, reservation.charge);
    }

    let per_room_base: Decimal = view
        .room_nights
        .iter()
        .map(|n| n.charge.rate_after_discount)
        .sum();
    assert_eq!(per_room_base, view.stay.totals.base);
}

#[test]
fn test_reassignment_replaces_room_nights_and_audits() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 2, None));
    let key = &created.business_key;

    service.assign_rooms(key, &rooms(&["101", "102"]), None).unwrap();
    let second = service
        .assign_rooms(key, &rooms(&["103", "104"]), None)
        .unwrap()
        .unwrap();
    assert_eq!(second.state, LedgerState::Reassigned);

    let view = service.get_stay(key).unwrap().unwrap();
    assert_eq!(view.room_nights.len(), 4);
    assert!(
        view.room_nights
            .iter()
            .all(|n| n.room_id == "103" || n.room_id == "104")
    );

    let trail = service.audit_trail(key).unwrap().unwrap();
    let last = trail.last().unwrap();
    assert_eq!(last.action, AuditAction::RoomAssigned);
    assert_eq!(last.old_value, Some(json!(["101", "102"])));
    assert_eq!(last.new_value, Some(json!(["103", "104"])));
}

#[test]
fn test_mismatched_room_in_list_writes_nothing() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 2, None));
    let key = &created.business_key;
    service.assign_rooms(key, &rooms(&["101", "102"]), None).unwrap();

    let err = service
        .assign_rooms(key, &rooms(&["103", "202"]), None)
        .unwrap_err();
    assert_eq!(err.to_string(), "Room type mismatch");

    let view = service.get_stay(key).unwrap().unwrap();
    assert_eq!(view.stay.assigned_rooms, rooms(&["101", "102"]));
    assert!(view.room_nights.iter().all(|n| n.room_id != "103"));
}

#[test]
fn test_date_change_rebuilds_both_projections() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 2, None));
    let key = &created.business_key;
    service.assign_rooms(key, &rooms(&["101", "102"]), None).unwrap();

    // Thursday schedule, Friday default, Saturday schedule
    let change = service
        .change_dates(key, date("2026-03-05"), date("2026-03-08"), Some("frontdesk"))
        .unwrap()
        .unwrap();
    assert!(!change.used_fallback);
    assert_eq!(change.totals.base, dec("6600"));
    assert_eq!(change.totals.total, dec("7392"));

    let view = service.get_stay(key).unwrap().unwrap();
    assert_eq!(view.reservation_nights.len(), 3);
    assert_eq!(view.room_nights.len(), 6);
    assert_eq!(view.stay.check_in, date("2026-03-05"));
    assert_eq!(view.stay.balance, dec("7392"));

    let per_room_base: Decimal = view
        .room_nights
        .iter()
        .map(|n| n.charge.rate_after_discount)
        .sum();
    assert_eq!(per_room_base, view.stay.totals.base);

    let trail = service.audit_trail(key).unwrap().unwrap();
    assert_eq!(trail.last().unwrap().action, AuditAction::DatesChanged);
}

#[test]
fn test_date_change_without_rate_plan_splits_reservation_nights() {
    let store = Arc::new(InMemoryStore::new());
    let full = BookingService::with_store(loader(), Arc::clone(&store));
    let created = book(&full, quote_request("2026-03-02", "2026-03-04", 2, None));
    let key = &created.business_key;
    full.assign_rooms(key, &rooms(&["101", "102"]), None).unwrap();

    // Same store, but the rate plans have since been withdrawn
    let sample = loader();
    let base = sample.config();
    let withdrawn = HotelConfig::new(
        base.settings().clone(),
        base.room_types().clone(),
        base.rooms().cloned().collect(),
        RateCatalog::default(),
    );
    let degraded = BookingService::with_store(
        Arc::new(ConfigLoader::from_config(withdrawn).unwrap()),
        store,
    );

    let change = degraded
        .change_dates(key, date("2026-03-02"), date("2026-03-05"), None)
        .unwrap()
        .unwrap();
    assert!(change.used_fallback);
    assert_eq!(change.totals.base, dec("6000"));

    let view = degraded.get_stay(key).unwrap().unwrap();
    assert_eq!(view.reservation_nights.len(), 3);
    assert_eq!(view.room_nights.len(), 6);
    for night in &view.room_nights {
        assert_eq!(night.charge.rate_after_discount, dec("500"));
        assert_eq!(night.charge.cgst, dec("30"));
    }
}

// =============================================================================
// Payment Ledger
// =============================================================================

#[test]
fn test_scenario_e_payment_with_discount_and_round_off() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 1, None));
    let key = &created.business_key;

    let update = service
        .record_payment(key, &payment("500", "50", "5", true), Some("cashier"))
        .unwrap()
        .unwrap();
    assert_eq!(update.balance, dec("2240") - dec("555"));
    assert_eq!(update.deposit, dec("500"));
    assert_eq!(update.payment_status, PaymentStatus::PartiallyPaid);
}

#[test]
fn test_unapplied_round_off_does_not_move_balance() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 1, None));
    let update = service
        .record_payment(&created.business_key, &payment("500", "0", "5", false), None)
        .unwrap()
        .unwrap();
    assert_eq!(update.balance, dec("1740"));
}

#[test]
fn test_full_settlement_then_refund() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 1, None));
    let key = &created.business_key;

    let paid = service
        .record_payment(key, &payment("2235", "0", "5", true), None)
        .unwrap()
        .unwrap();
    assert_eq!(paid.balance, Decimal::ZERO);
    assert_eq!(paid.payment_status, PaymentStatus::Paid);

    let refunded = service
        .record_refund(key, dec("100"), PaymentMethod::Card, Some("RF-1".to_string()), None)
        .unwrap()
        .unwrap();
    assert_eq!(refunded.balance, dec("100"));
    assert_eq!(refunded.deposit, dec("2135"));
    assert_eq!(refunded.payment_status, PaymentStatus::PartiallyPaid);

    let view = service.get_stay(key).unwrap().unwrap();
    assert_eq!(view.payments.len(), 2);
    assert!(view.payments[1].is_refund);
    assert_eq!(view.payments[1].amount, dec("-100"));
}

#[test]
fn test_reconcile_is_idempotent_after_mixed_activity() {
    let service = service();
    let created = book(&service, quote_request("2026-03-02", "2026-03-04", 2, Some("corporate")));
    let key = &created.business_key;

    service.record_payment(key, &payment("1000", "20", "0.40", true), None).unwrap();
    service.post_charge(key, dec("85.50"), "Laundry", None).unwrap();
    service
        .record_refund(key, dec("200"), PaymentMethod::Cash, None, None)
        .unwrap();
    service
        .change_dates(key, date("2026-03-02"), date("2026-03-05"), None)
        .unwrap();

    let before = service.get_stay(key).unwrap().unwrap().stay;
    let first = service.reconcile(created.stay_id, None).unwrap().unwrap();
    let second = service.reconcile(created.stay_id, None).unwrap().unwrap();

    assert!(!first.healed);
    assert_eq!(first, second);
    assert_eq!(first.snapshot.balance, before.balance);
    assert_eq!(first.snapshot.deposit, dec("800"));
    assert_eq!(first.outstanding_charges, dec("85.50"));
}

#[test]
fn test_unknown_stay_id_reconciles_to_none() {
    assert!(service().reconcile(404, None).unwrap().is_none());
}

// =============================================================================
// Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_reservation_nights_sum_to_stay_base(
        start in 0u32..300,
        nights in 1u32..10,
        rooms in 1u32..4,
        corporate in any::<bool>(),
        children in 0u32..2,
    ) {
        let service = service();
        let check_in = date("2026-01-01") + chrono::Days::new(start as u64);
        let check_out = check_in + chrono::Days::new(nights as u64);
        let mut request = quote_request("2026-01-01", "2026-01-02", rooms, corporate.then_some("corporate"));
        request.check_in = check_in;
        request.check_out = check_out;
        request.children = children;

        let created = book(&service, request);
        let view = service.get_stay(&created.business_key).unwrap().unwrap();
        prop_assert_eq!(view.reservation_nights.len() as u32, nights);

        let sum: Decimal = view
            .reservation_nights
            .iter()
            .map(|n| n.charge.rate_after_discount)
            .sum();
        let diff = (sum * Decimal::from(rooms) - view.stay.totals.base).abs();
        prop_assert!(diff <= dec("0.01"));
        prop_assert_eq!(view.stay.totals.total, view.stay.totals.base + view.stay.totals.tax);
    }
}

// =============================================================================
// HTTP
// =============================================================================

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/sample").expect("Failed to load config");
    create_router(AppState::new(config))
}

#[tokio::test]
async fn test_http_unavailable_quote() {
    let router = create_router_for_test();
    let (status, body) = send(
        &router,
        "POST",
        "/quote",
        Some(json!({
            "room_type": "deluxe",
            "check_in": "2026-03-04",
            "check_out": "2026-03-02",
            "adults": 2,
            "required_rooms": 1
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unavailable");
    assert_eq!(body["reason"], "invalid_date_range");
}

#[tokio::test]
async fn test_http_stay_lifecycle() {
    let router = create_router_for_test();

    let (status, created) = send(
        &router,
        "POST",
        "/stays",
        Some(json!({
            "room_type": "deluxe",
            "check_in": "2026-03-02",
            "check_out": "2026-03-04",
            "adults": 2,
            "required_rooms": 2,
            "guest_name": "R. Traveller"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let key = created["business_key"].as_str().unwrap().to_string();
    let stay_id = created["stay_id"].as_u64().unwrap();

    let (status, assignment) = send(
        &router,
        "PUT",
        &format!("/stays/{}/rooms", key),
        Some(json!({ "room_ids": ["101", "102"], "actor": "frontdesk" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assignment["room_nights"], 4);
    assert_eq!(assignment["state"], "assigned");

    let (status, paid) = send(
        &router,
        "POST",
        &format!("/stays/{}/payments", key),
        Some(json!({
            "amount": "500",
            "method": "card",
            "discount": "50",
            "round_off": "5",
            "round_off_applied": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(paid["balance"].as_str().unwrap()), dec("3925"));
    assert_eq!(paid["payment_status"], "partially_paid");

    let (status, charged) = send(
        &router,
        "POST",
        &format!("/stays/{}/charges", key),
        Some(json!({ "amount": "120", "description": "Airport transfer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(charged["outstanding_charges"].as_str().unwrap()), dec("120"));

    let (status, changed) = send(
        &router,
        "PUT",
        &format!("/stays/{}/dates", key),
        Some(json!({ "check_in": "2026-03-02", "check_out": "2026-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(changed["totals"]["total"].as_str().unwrap()), dec("6720"));

    let (status, reconciled) = send(&router, "POST", &format!("/reconcile/{}", stay_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reconciled["healed"], false);

    let (status, audit) = send(&router, "GET", &format!("/stays/{}/audit", key), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = audit
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["action"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        vec![
            "stay_created",
            "room_assigned",
            "payment_recorded",
            "charge_posted",
            "dates_changed"
        ]
    );

    let (status, view) = send(&router, "GET", &format!("/stays/{}", key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["reservation_nights"].as_array().unwrap().len(), 3);
    assert_eq!(view["room_nights"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_http_empty_room_list_is_rejected() {
    let router = create_router_for_test();
    let (_, created) = send(
        &router,
        "POST",
        "/stays",
        Some(json!({
            "room_type": "suite",
            "check_in": "2026-03-02",
            "check_out": "2026-03-03",
            "adults": 1,
            "required_rooms": 1
        })),
    )
    .await;
    let key = created["business_key"].as_str().unwrap();

    let (status, error) = send(
        &router,
        "PUT",
        &format!("/stays/{}/rooms", key),
        Some(json!({ "room_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Room is required");
}

#[tokio::test]
async fn test_http_unknown_reconcile_returns_404() {
    let router = create_router_for_test();
    let (status, error) = send(&router, "POST", "/reconcile/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "NOT_FOUND");
}
