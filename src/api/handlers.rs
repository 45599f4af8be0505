//! HTTP request handlers for the stay engine API.
//!
//! Handlers are thin: they parse the body, call [`BookingService`] and map
//! the result. A service `None` becomes 404, a validation failure 400.
//!
//! [`BookingService`]: crate::service::BookingService

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::service::{CreateStayRequest, QuoteRequest};

use super::request::{
    AssignRoomRequest, AssignRoomsRequest, ChangeDatesRequest, ChargeRequest, PaymentRequest,
    RefundRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/quote", post(quote_handler))
        .route("/stays", post(create_stay_handler))
        .route("/stays/:key", get(get_stay_handler))
        .route("/stays/:key/room", put(assign_room_handler))
        .route("/stays/:key/rooms", put(assign_rooms_handler))
        .route("/stays/:key/dates", put(change_dates_handler))
        .route("/stays/:key/payments", post(payment_handler))
        .route("/stays/:key/refunds", post(refund_handler))
        .route("/stays/:key/charges", post(charge_handler))
        .route("/stays/:key/audit", get(audit_handler))
        .route("/reconcile/:stay_id", post(reconcile_handler))
        .with_state(state)
}

/// Unwraps a JSON body or builds the 400 response for it.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response())
}

/// Maps a service result onto a response.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    business_key: &str,
    status: StatusCode,
    result: EngineResult<Option<T>>,
) -> Response {
    match result {
        Ok(Some(body)) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(body),
        )
            .into_response(),
        Ok(None) => {
            warn!(correlation_id = %correlation_id, business_key, "Stay or room not found");
            ApiErrorResponse::not_found(business_key).into_response()
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, business_key, error = %err, "Request failed");
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for POST /quote.
async fn quote_handler(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing quote request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.service().quote(&request).map(Some);
    respond(correlation_id, "", StatusCode::OK, result)
}

/// Handler for POST /stays.
async fn create_stay_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateStayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing booking request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.service().create_stay(&request).map(Some);
    respond(correlation_id, "", StatusCode::CREATED, result)
}

/// Handler for GET /stays/:key.
async fn get_stay_handler(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Fetching stay");

    let result = state.service().get_stay(&key);
    respond(correlation_id, &key, StatusCode::OK, result)
}

/// Handler for PUT /stays/:key/room.
async fn assign_room_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<AssignRoomRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Processing room assignment");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state
        .service()
        .assign_room(&key, &request.room_id, request.actor.as_deref());
    respond(correlation_id, &key, StatusCode::OK, result)
}

/// Handler for PUT /stays/:key/rooms.
async fn assign_rooms_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<AssignRoomsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Processing multi-room assignment");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state
        .service()
        .assign_rooms(&key, &request.room_ids, request.actor.as_deref());
    respond(correlation_id, &key, StatusCode::OK, result)
}

/// Handler for PUT /stays/:key/dates.
async fn change_dates_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<ChangeDatesRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Processing date change");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.service().change_dates(
        &key,
        request.check_in,
        request.check_out,
        request.actor.as_deref(),
    );
    respond(correlation_id, &key, StatusCode::OK, result)
}

/// Handler for POST /stays/:key/payments.
async fn payment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Processing payment");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state
        .service()
        .record_payment(&key, &request.payment, request.actor.as_deref());
    respond(correlation_id, &key, StatusCode::CREATED, result)
}

/// Handler for POST /stays/:key/refunds.
async fn refund_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<RefundRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Processing refund");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.service().record_refund(
        &key,
        request.amount,
        request.method,
        request.reference,
        request.actor.as_deref(),
    );
    respond(correlation_id, &key, StatusCode::CREATED, result)
}

/// Handler for POST /stays/:key/charges.
async fn charge_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<ChargeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Posting charge");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let result = state.service().post_charge(
        &key,
        request.amount,
        &request.description,
        request.actor.as_deref(),
    );
    respond(correlation_id, &key, StatusCode::CREATED, result)
}

/// Handler for GET /stays/:key/audit.
async fn audit_handler(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, business_key = %key, "Fetching audit trail");

    let result = state.service().audit_trail(&key);
    respond(correlation_id, &key, StatusCode::OK, result)
}

/// Handler for POST /reconcile/:stay_id.
async fn reconcile_handler(State(state): State<AppState>, Path(stay_id): Path<u64>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, stay_id, "Reconciling balance");

    let result = state.service().reconcile(stay_id, None);
    respond(correlation_id, &stay_id.to_string(), StatusCode::OK, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::service::{QuoteOutcome, StayCreated};
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/sample").expect("Failed to load config");
        AppState::new(config)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const BOOKING: &str = r#"{
        "room_type": "deluxe",
        "check_in": "2026-03-02",
        "check_out": "2026-03-04",
        "adults": 2,
        "required_rooms": 1
    }"#;

    #[tokio::test]
    async fn test_quote_returns_totals() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(json_request("POST", "/quote", BOOKING))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let outcome: QuoteOutcome = read_body(response).await;
        let QuoteOutcome::Available(quote) = outcome else {
            panic!("expected an available quote");
        };
        assert_eq!(quote.totals.total, Decimal::new(2240, 0));
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(json_request("POST", "/quote", "{invalid json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let router = create_router(create_test_state());
        let body = r#"{"room_type": "deluxe", "check_in": "2026-03-02"}"#;
        let response = router
            .oneshot(json_request("POST", "/quote", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("missing field"));
    }

    #[tokio::test]
    async fn test_create_then_fetch_stay() {
        let router = create_router(create_test_state());
        let response = router
            .clone()
            .oneshot(json_request("POST", "/stays", BOOKING))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: StayCreated = read_body(response).await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/stays/{}", created.business_key))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_stay_returns_404() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(json_request("PUT", "/stays/BK-999999/room", r#"{"room_id": "101"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_room_type_mismatch_returns_400() {
        let router = create_router(create_test_state());
        let response = router
            .clone()
            .oneshot(json_request("POST", "/stays", BOOKING))
            .await
            .unwrap();
        let created: StayCreated = read_body(response).await;

        let response = router
            .oneshot(json_request(
                "PUT",
                &format!("/stays/{}/room", created.business_key),
                r#"{"room_id": "201"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_body(response).await;
        assert_eq!(error.message, "Room type mismatch");
    }
}
