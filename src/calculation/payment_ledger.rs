//! Payment application and balance reconciliation.
//!
//! Payments move the balance by their full applied amount (cash plus any
//! settlement discount and applied round-off) while the deposit tracks cash
//! only. Reconciliation rebuilds both from the ledger alone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::SchemaCapabilities;
use crate::models::{PaymentEntry, PaymentMethod, PaymentStatus};

/// A payment or refund as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Cash amount, always positive; refunds are negated when written.
    pub amount: Decimal,
    /// Settlement method.
    pub method: PaymentMethod,
    /// Discount granted at settlement.
    #[serde(default)]
    pub discount: Decimal,
    /// Round-off adjustment.
    #[serde(default)]
    pub round_off: Decimal,
    /// Whether the round-off counts against the balance.
    #[serde(default)]
    pub round_off_applied: bool,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Writes ledger entries in the shape the store supports.
///
/// Chosen once from [`SchemaCapabilities`] at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentWriter {
    /// Entries carry discount and round-off.
    Adjusted,
    /// The store has no adjustment columns; entries carry cash only.
    Legacy,
}

impl PaymentWriter {
    /// Selects the writer for the store's capabilities.
    pub fn for_capabilities(capabilities: SchemaCapabilities) -> Self {
        if capabilities.payment_adjustments {
            PaymentWriter::Adjusted
        } else {
            PaymentWriter::Legacy
        }
    }

    /// Builds the ledger entry for a payment or refund.
    pub fn entry(
        &self,
        stay_id: u64,
        input: &PaymentInput,
        is_refund: bool,
        recorded_at: DateTime<Utc>,
    ) -> PaymentEntry {
        let amount = if is_refund { -input.amount } else { input.amount };

        let (discount, round_off, round_off_applied) = match self {
            PaymentWriter::Adjusted => (
                Some(input.discount),
                Some(input.round_off),
                input.round_off_applied,
            ),
            PaymentWriter::Legacy => {
                if !input.discount.is_zero() || !input.round_off.is_zero() {
                    warn!(
                        stay_id,
                        discount = %input.discount,
                        round_off = %input.round_off,
                        "Store has no payment adjustment columns, recording cash amount only"
                    );
                }
                (None, None, false)
            }
        };

        PaymentEntry {
            id: Uuid::new_v4(),
            stay_id,
            amount,
            method: input.method,
            is_refund,
            discount,
            round_off,
            round_off_applied,
            reference: input.reference.clone(),
            recorded_at,
        }
    }
}

/// Deposit, balance and status of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Net cash received.
    pub deposit: Decimal,
    /// Amount still owed on the room charges.
    pub balance: Decimal,
    /// Derived status.
    pub status: PaymentStatus,
}

/// Derives the payment status.
///
/// Paid once balance plus outstanding charges is at or below zero, partially
/// paid once any cash is held, pending otherwise.
pub fn payment_status(balance: Decimal, outstanding_charges: Decimal, deposit: Decimal) -> PaymentStatus {
    if balance + outstanding_charges <= Decimal::ZERO {
        PaymentStatus::Paid
    } else if deposit > Decimal::ZERO {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::Pending
    }
}

/// Applies one ledger entry to the current deposit and balance.
pub fn apply_payment(
    current: BalanceSnapshot,
    outstanding_charges: Decimal,
    entry: &PaymentEntry,
) -> BalanceSnapshot {
    let deposit = current.deposit + entry.amount;
    let balance = current.balance - entry.applied_to_balance();
    BalanceSnapshot {
        deposit,
        balance,
        status: payment_status(balance, outstanding_charges, deposit),
    }
}

/// Rebuilds deposit, balance and status from the full payment history.
///
/// Depends only on its inputs, so calling it repeatedly gives the same answer.
pub fn reconcile_balance(
    total: Decimal,
    outstanding_charges: Decimal,
    entries: &[PaymentEntry],
) -> BalanceSnapshot {
    let deposit: Decimal = entries.iter().map(|e| e.amount).sum();
    let applied: Decimal = entries.iter().map(PaymentEntry::applied_to_balance).sum();
    let balance = total - applied;
    BalanceSnapshot {
        deposit,
        balance,
        status: payment_status(balance, outstanding_charges, deposit),
    }
}

/// Moves the balance by the change in booking total.
pub fn apply_total_change(
    current: BalanceSnapshot,
    outstanding_charges: Decimal,
    old_total: Decimal,
    new_total: Decimal,
) -> BalanceSnapshot {
    let balance = current.balance + (new_total - old_total);
    BalanceSnapshot {
        deposit: current.deposit,
        balance,
        status: payment_status(balance, outstanding_charges, current.deposit),
    }
}
