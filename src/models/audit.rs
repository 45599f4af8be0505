//! Audit trail records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of mutation an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A stay was booked.
    StayCreated,
    /// Rooms were attached or changed.
    RoomAssigned,
    /// Check-in or check-out moved.
    DatesChanged,
    /// A payment was captured.
    PaymentRecorded,
    /// A refund was issued.
    RefundRecorded,
    /// An ancillary charge was posted.
    ChargePosted,
    /// Deposit and balance were rebuilt from the payment history.
    BalanceReconciled,
}

/// An append-only, booking-scoped record of one mutation.
///
/// Records are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier of the record.
    pub id: Uuid,
    /// The stay mutated.
    pub stay_id: u64,
    /// The stay's business key at the time of the mutation.
    pub business_key: String,
    /// What happened.
    pub action: AuditAction,
    /// Human-readable description.
    pub description: String,
    /// Snapshot before the mutation.
    pub old_value: Option<serde_json::Value>,
    /// Snapshot after the mutation.
    pub new_value: Option<serde_json::Value>,
    /// Who performed it, when known.
    pub actor: Option<String>,
    /// When it happened.
    pub recorded_at: DateTime<Utc>,
}
