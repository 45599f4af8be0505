//! Transactional persistence for stays and their derived ledgers.
//!
//! Every mutating operation runs inside [`Store::transaction`]: all reads,
//! recomputation and writes happen against one unit of work that commits only
//! if the closure returns `Ok`. Any error discards every write made so far.

mod memory;

pub use memory::{InMemoryStore, MemoryState};

use crate::error::EngineResult;
use crate::models::{AncillaryCharge, AuditRecord, PaymentEntry, ReservationNight, RoomNight, Stay};

/// Reads and writes available inside one unit of work.
pub trait UnitOfWork {
    /// Reserves the next stay id.
    fn next_stay_id(&mut self) -> u64;

    /// Looks up a stay by id.
    fn stay(&self, stay_id: u64) -> Option<Stay>;

    /// Looks up a stay by its business key.
    fn stay_by_key(&self, business_key: &str) -> Option<Stay>;

    /// Inserts or replaces a stay.
    fn save_stay(&mut self, stay: Stay) -> EngineResult<()>;

    /// Reservation-level nights of a stay, in date order.
    fn reservation_nights(&self, stay_id: u64) -> Vec<ReservationNight>;

    /// Deletes a stay's reservation-level nights and inserts `nights`.
    fn replace_reservation_nights(&mut self, stay_id: u64, nights: Vec<ReservationNight>) -> EngineResult<()>;

    /// Per-room nights of a stay, grouped by room then date.
    fn room_nights(&self, stay_id: u64) -> Vec<RoomNight>;

    /// Deletes a stay's per-room nights and inserts `nights`.
    fn replace_room_nights(&mut self, stay_id: u64, nights: Vec<RoomNight>) -> EngineResult<()>;

    /// Payment ledger of a stay, oldest first.
    fn payments(&self, stay_id: u64) -> Vec<PaymentEntry>;

    /// Appends a payment ledger entry.
    fn append_payment(&mut self, entry: PaymentEntry) -> EngineResult<()>;

    /// Ancillary charges of a stay, oldest first.
    fn charges(&self, stay_id: u64) -> Vec<AncillaryCharge>;

    /// Appends an ancillary charge.
    fn append_charge(&mut self, charge: AncillaryCharge) -> EngineResult<()>;

    /// Audit trail of a stay, oldest first.
    fn audit_records(&self, stay_id: u64) -> Vec<AuditRecord>;

    /// Appends an audit record.
    fn append_audit(&mut self, record: AuditRecord) -> EngineResult<()>;
}

/// A store that runs units of work atomically.
pub trait Store: Send + Sync {
    /// The unit of work handed to closures.
    type Tx: UnitOfWork;

    /// Runs `f` as one all-or-nothing unit of work.
    fn transaction<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Self::Tx) -> EngineResult<T>;

    /// Runs a read-only closure against committed state.
    fn read<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Self::Tx) -> T;
}
