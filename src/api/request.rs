//! Request bodies for the stay endpoints.
//!
//! Quote and booking bodies are the service types themselves; the bodies
//! here cover mutations addressed by business key in the path.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::PaymentInput;
use crate::models::PaymentMethod;

/// Body for `PUT /stays/:key/room`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRoomRequest {
    /// Room number to attach.
    pub room_id: String,
    /// Who is making the change.
    #[serde(default)]
    pub actor: Option<String>,
}

/// Body for `PUT /stays/:key/rooms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRoomsRequest {
    /// Room numbers to attach, replacing any already assigned.
    pub room_ids: Vec<String>,
    /// Who is making the change.
    #[serde(default)]
    pub actor: Option<String>,
}

/// Body for `PUT /stays/:key/dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeDatesRequest {
    /// New arrival date.
    pub check_in: NaiveDate,
    /// New departure date.
    pub check_out: NaiveDate,
    /// Who is making the change.
    #[serde(default)]
    pub actor: Option<String>,
}

/// Body for `POST /stays/:key/payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// The payment.
    #[serde(flatten)]
    pub payment: PaymentInput,
    /// Who took the payment.
    #[serde(default)]
    pub actor: Option<String>,
}

/// Body for `POST /stays/:key/refunds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Cash returned, as a positive amount.
    pub amount: Decimal,
    /// How it was returned.
    pub method: PaymentMethod,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Who issued the refund.
    #[serde(default)]
    pub actor: Option<String>,
}

/// Body for `POST /stays/:key/charges`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Amount owed.
    pub amount: Decimal,
    /// What it is for.
    pub description: String,
    /// Who posted it.
    #[serde(default)]
    pub actor: Option<String>,
}
