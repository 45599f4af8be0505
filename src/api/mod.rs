//! HTTP API for the stay engine.
//!
//! Exposes quoting, booking and stay mutations as JSON endpoints over the
//! booking service.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AssignRoomRequest, AssignRoomsRequest, ChangeDatesRequest, ChargeRequest, PaymentRequest,
    RefundRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
