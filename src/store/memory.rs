//! In-memory store.
//!
//! A single mutex guards the committed state. A unit of work runs against a
//! clone and replaces the committed state only on success, which gives
//! all-or-nothing commits and serialises concurrent writers.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{EngineError, EngineResult};
use crate::models::{AncillaryCharge, AuditRecord, PaymentEntry, ReservationNight, RoomNight, Stay};

use super::{Store, UnitOfWork};

/// The committed contents of an [`InMemoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    last_stay_id: u64,
    stays: BTreeMap<u64, Stay>,
    reservation_nights: BTreeMap<u64, Vec<ReservationNight>>,
    room_nights: BTreeMap<u64, Vec<RoomNight>>,
    payments: BTreeMap<u64, Vec<PaymentEntry>>,
    charges: BTreeMap<u64, Vec<AncillaryCharge>>,
    audit: BTreeMap<u64, Vec<AuditRecord>>,
}

impl MemoryState {
    fn require_stay(&self, stay_id: u64) -> EngineResult<()> {
        if self.stays.contains_key(&stay_id) {
            Ok(())
        } else {
            Err(EngineError::Store {
                message: format!("stay {} does not exist", stay_id),
            })
        }
    }

    fn require_owner(stay_id: u64, owners: impl Iterator<Item = u64>) -> EngineResult<()> {
        for owner in owners {
            if owner != stay_id {
                return Err(EngineError::Store {
                    message: format!("row for stay {} written under stay {}", owner, stay_id),
                });
            }
        }
        Ok(())
    }
}

impl UnitOfWork for MemoryState {
    fn next_stay_id(&mut self) -> u64 {
        self.last_stay_id += 1;
        self.last_stay_id
    }

    fn stay(&self, stay_id: u64) -> Option<Stay> {
        self.stays.get(&stay_id).cloned()
    }

    fn stay_by_key(&self, business_key: &str) -> Option<Stay> {
        self.stays
            .values()
            .find(|s| s.business_key == business_key)
            .cloned()
    }

    fn save_stay(&mut self, stay: Stay) -> EngineResult<()> {
        let duplicate_key = self
            .stays
            .values()
            .any(|s| s.id != stay.id && s.business_key == stay.business_key);
        if duplicate_key {
            return Err(EngineError::Store {
                message: format!("business key {} already in use", stay.business_key),
            });
        }
        self.stays.insert(stay.id, stay);
        Ok(())
    }

    fn reservation_nights(&self, stay_id: u64) -> Vec<ReservationNight> {
        self.reservation_nights
            .get(&stay_id)
            .cloned()
            .unwrap_or_default()
    }

    fn replace_reservation_nights(
        &mut self,
        stay_id: u64,
        mut nights: Vec<ReservationNight>,
    ) -> EngineResult<()> {
        self.require_stay(stay_id)?;
        Self::require_owner(stay_id, nights.iter().map(|n| n.stay_id))?;
        nights.sort_by_key(|n| n.charge.date);
        self.reservation_nights.insert(stay_id, nights);
        Ok(())
    }

    fn room_nights(&self, stay_id: u64) -> Vec<RoomNight> {
        self.room_nights.get(&stay_id).cloned().unwrap_or_default()
    }

    fn replace_room_nights(&mut self, stay_id: u64, nights: Vec<RoomNight>) -> EngineResult<()> {
        self.require_stay(stay_id)?;
        Self::require_owner(stay_id, nights.iter().map(|n| n.stay_id))?;
        self.room_nights.insert(stay_id, nights);
        Ok(())
    }

    fn payments(&self, stay_id: u64) -> Vec<PaymentEntry> {
        self.payments.get(&stay_id).cloned().unwrap_or_default()
    }

    fn append_payment(&mut self, entry: PaymentEntry) -> EngineResult<()> {
        self.require_stay(entry.stay_id)?;
        self.payments.entry(entry.stay_id).or_default().push(entry);
        Ok(())
    }

    fn charges(&self, stay_id: u64) -> Vec<AncillaryCharge> {
        self.charges.get(&stay_id).cloned().unwrap_or_default()
    }

    fn append_charge(&mut self, charge: AncillaryCharge) -> EngineResult<()> {
        self.require_stay(charge.stay_id)?;
        self.charges.entry(charge.stay_id).or_default().push(charge);
        Ok(())
    }

    fn audit_records(&self, stay_id: u64) -> Vec<AuditRecord> {
        self.audit.get(&stay_id).cloned().unwrap_or_default()
    }

    fn append_audit(&mut self, record: AuditRecord) -> EngineResult<()> {
        self.require_stay(record.stay_id)?;
        self.audit.entry(record.stay_id).or_default().push(record);
        Ok(())
    }
}

/// A [`Store`] holding everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E>(_: E) -> EngineError {
    EngineError::Store {
        message: "store lock poisoned".to_string(),
    }
}

impl Store for InMemoryStore {
    type Tx = MemoryState;

    fn transaction<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Self::Tx) -> EngineResult<T>,
    {
        let mut committed = self.state.lock().map_err(poisoned)?;
        let mut working = committed.clone();
        let result = f(&mut working)?;
        *committed = working;
        Ok(result)
    }

    fn read<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Self::Tx) -> T,
    {
        let committed = self.state.lock().map_err(poisoned)?;
        Ok(f(&committed))
    }
}
