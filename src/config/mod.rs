//! Configuration loading and management for the stay engine.
//!
//! This module loads hotel settings, room types, room inventory and the rate
//! catalog from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use stay_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sample").unwrap();
//! println!("Loaded hotel: {}", config.config().settings().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    HotelConfig, HotelSettings, RateCatalog, RatePlansConfig, Room, RoomType, RoomTypesConfig,
    SchemaCapabilities,
};
