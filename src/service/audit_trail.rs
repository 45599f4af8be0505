//! Audit trail writes.
//!
//! Audit records are written through the same unit of work as the mutation
//! they describe. A failed audit write fails the whole operation.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{AuditAction, AuditRecord, Stay};
use crate::store::UnitOfWork;

/// Appends an audit record for `stay` to the current unit of work.
pub fn record_audit<U: UnitOfWork>(
    tx: &mut U,
    stay: &Stay,
    action: AuditAction,
    description: impl Into<String>,
    old_value: Option<Value>,
    new_value: Option<Value>,
    actor: Option<&str>,
) -> EngineResult<()> {
    tx.append_audit(AuditRecord {
        id: Uuid::new_v4(),
        stay_id: stay.id,
        business_key: stay.business_key.clone(),
        action,
        description: description.into(),
        old_value,
        new_value,
        actor: actor.map(str::to_string),
        recorded_at: Utc::now(),
    })
}
