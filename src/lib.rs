//! Booking rate resolution and room-night financial allocation for hotels.
//!
//! Given a stay request, the engine resolves each night's rate through a
//! special-day, weekday and default cascade, applies the rate plan's
//! discount, splits tax into two components and aggregates the nights into
//! booking totals. It then keeps the reservation-level nights, the per-room
//! nights, the payment ledger and the audit trail consistent as the stay is
//! booked, assigned rooms, moved and paid.
//!
//! The [`calculation`] module is pure; [`service`] runs each operation as
//! one unit of work against a [`store`]; [`api`] exposes it over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
