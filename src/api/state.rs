//! Shared state for the HTTP handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::service::BookingService;

/// Shared application state.
///
/// Holds the booking service, which in turn owns the loaded hotel
/// configuration and the store.
#[derive(Clone)]
pub struct AppState {
    service: BookingService,
}

impl AppState {
    /// Creates application state over a fresh in-memory store.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            service: BookingService::new(Arc::new(config)),
        }
    }

    /// Creates application state from an existing service.
    pub fn from_service(service: BookingService) -> Self {
        Self { service }
    }

    /// Returns the booking service.
    pub fn service(&self) -> &BookingService {
        &self.service
    }
}
