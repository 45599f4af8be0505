//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the hotel
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{HotelConfig, HotelSettings, RatePlansConfig, RoomTypesConfig};

/// Loads and provides access to hotel configuration.
///
/// # Directory Structure
///
/// ```text
/// config/sample/
/// ├── hotel.yaml       # Check-in/out times, booking key prefix, schema flags
/// ├── room_types.yaml  # Room types and physical rooms
/// └── rate_plans.yaml  # Rate plans, special days, weekday schedules
/// ```
///
/// # Example
///
/// ```no_run
/// use stay_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sample").unwrap();
/// println!("Loaded hotel: {}", loader.config().settings().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: HotelConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any file is missing or malformed, or if a room or
    /// rate plan references a room type that does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<HotelSettings>(&path.join("hotel.yaml"))?;
        let room_types = Self::load_yaml::<RoomTypesConfig>(&path.join("room_types.yaml"))?;
        let rate_plans = Self::load_yaml::<RatePlansConfig>(&path.join("rate_plans.yaml"))?;

        let config = HotelConfig::new(
            settings,
            room_types.room_types,
            room_types.rooms,
            super::RateCatalog::new(
                rate_plans.rate_plans,
                rate_plans.special_days,
                rate_plans.weekday_rates,
            ),
        );

        Self::from_config(config)
    }

    /// Wraps an already-assembled configuration after checking its references.
    pub fn from_config(config: HotelConfig) -> EngineResult<Self> {
        Self::validate(&config)?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(config: &HotelConfig) -> EngineResult<()> {
        let invalid = |message: String| Err(EngineError::InvalidConfig { message });

        for room in config.rooms() {
            if config.room_type(&room.room_type).is_none() {
                return invalid(format!(
                    "room '{}' references unknown room type '{}'",
                    room.id, room.room_type
                ));
            }
        }

        let catalog = config.catalog();
        for plan in catalog.plans() {
            if config.room_type(&plan.room_type).is_none() {
                return invalid(format!(
                    "rate plan {} references unknown room type '{}'",
                    plan.id, plan.room_type
                ));
            }
            if plan.valid_to < plan.valid_from {
                return invalid(format!("rate plan {} ends before it starts", plan.id));
            }
        }

        Ok(())
    }

    /// Returns the underlying hotel configuration.
    pub fn config(&self) -> &HotelConfig {
        &self.config
    }
}
