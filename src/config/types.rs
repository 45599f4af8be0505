//! Configuration types for the stay engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, plus the assembled
//! [`HotelConfig`] and its [`RateCatalog`] lookups.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{RatePlan, SpecialDayOverride, WeekdayRate};

/// Store capabilities resolved once at startup.
///
/// Older stores lack the payment discount and round-off columns; this flag
/// selects the matching payment ledger writer instead of probing at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchemaCapabilities {
    /// Whether payment entries can carry discount and round-off.
    #[serde(default = "default_true")]
    pub payment_adjustments: bool,
}

impl Default for SchemaCapabilities {
    fn default() -> Self {
        Self {
            payment_adjustments: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_business_key_prefix() -> String {
    "BK".to_string()
}

/// Hotel-wide settings from `hotel.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct HotelSettings {
    /// Property name.
    pub name: String,
    /// Standard check-in clock time.
    pub check_in_time: NaiveTime,
    /// Standard check-out clock time.
    pub check_out_time: NaiveTime,
    /// Prefix for generated booking references.
    #[serde(default = "default_business_key_prefix")]
    pub business_key_prefix: String,
    /// Store capability flags.
    #[serde(default)]
    pub schema: SchemaCapabilities,
}

/// A sellable room category.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomType {
    /// Display name.
    pub name: String,
    /// Rack rate used when a plan carries no base rate.
    pub base_rate: Decimal,
    /// Rack extra-occupant rate used when a plan carries none.
    #[serde(default)]
    pub extra_occupant_rate: Decimal,
    /// Guests included in the base rate.
    pub max_occupancy: u32,
    /// Rooms of this type that can be sold concurrently.
    pub max_rooms: u32,
}

/// A physical room.
#[derive(Debug, Clone, Deserialize)]
pub struct Room {
    /// Room number.
    pub id: String,
    /// The room type this room belongs to.
    pub room_type: String,
}

/// `room_types.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomTypesConfig {
    /// Map of room type id to room type.
    pub room_types: HashMap<String, RoomType>,
    /// Physical room inventory.
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// `rate_plans.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RatePlansConfig {
    /// Rate plans.
    pub rate_plans: Vec<RatePlan>,
    /// Special-day overrides.
    #[serde(default)]
    pub special_days: Vec<SpecialDayOverride>,
    /// Day-of-week schedules.
    #[serde(default)]
    pub weekday_rates: Vec<WeekdayRate>,
}

/// The rate master: plans and their date-specific overrides.
#[derive(Debug, Clone, Default)]
pub struct RateCatalog {
    plans: Vec<RatePlan>,
    special_days: Vec<SpecialDayOverride>,
    weekday_rates: Vec<WeekdayRate>,
}

impl RateCatalog {
    /// Creates a catalog from its parts.
    pub fn new(
        plans: Vec<RatePlan>,
        special_days: Vec<SpecialDayOverride>,
        weekday_rates: Vec<WeekdayRate>,
    ) -> Self {
        Self {
            plans,
            special_days,
            weekday_rates,
        }
    }

    /// Returns all rate plans.
    pub fn plans(&self) -> &[RatePlan] {
        &self.plans
    }

    /// Looks up a plan by id.
    pub fn plan(&self, id: u64) -> Option<&RatePlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Picks the best plan for a room type, segment and channel on `date`.
    ///
    /// A plan that names a segment or channel only matches requests with the
    /// same value. Among matches, segment and channel together beat segment
    /// only, which beats channel only, which beats a plan naming neither.
    /// Ties go to the latest `valid_from`, then the lowest id.
    pub fn best_plan(
        &self,
        room_type: &str,
        segment: Option<&str>,
        channel: Option<&str>,
        date: NaiveDate,
    ) -> Option<&RatePlan> {
        self.plans
            .iter()
            .filter(|p| p.room_type == room_type && p.covers(date))
            .filter_map(|p| match_score(p, segment, channel).map(|score| (score, p)))
            .max_by(|(sa, a), (sb, b)| {
                sa.cmp(sb)
                    .then(a.valid_from.cmp(&b.valid_from))
                    .then(b.id.cmp(&a.id))
            })
            .map(|(_, p)| p)
    }

    /// The special-day override covering `date`, most recent start first.
    pub fn special_day_for(&self, rate_plan_id: u64, date: NaiveDate) -> Option<&SpecialDayOverride> {
        self.special_days
            .iter()
            .filter(|s| s.rate_plan_id == rate_plan_id && s.contains(date))
            .max_by_key(|s| s.start_date)
    }

    /// The day-of-week schedule for `day`.
    pub fn weekday_rate_for(&self, rate_plan_id: u64, day: Weekday) -> Option<&WeekdayRate> {
        self.weekday_rates
            .iter()
            .find(|w| w.rate_plan_id == rate_plan_id && w.day == day)
    }
}

fn match_score(plan: &RatePlan, segment: Option<&str>, channel: Option<&str>) -> Option<u8> {
    let segment_hit = match (plan.segment.as_deref(), segment) {
        (None, _) => false,
        (Some(want), Some(got)) if want == got => true,
        _ => return None,
    };
    let channel_hit = match (plan.channel.as_deref(), channel) {
        (None, _) => false,
        (Some(want), Some(got)) if want == got => true,
        _ => return None,
    };
    Some(match (segment_hit, channel_hit) {
        (true, true) => 3,
        (true, false) => 2,
        (false, true) => 1,
        (false, false) => 0,
    })
}

/// The complete hotel configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct HotelConfig {
    settings: HotelSettings,
    room_types: HashMap<String, RoomType>,
    rooms: HashMap<String, Room>,
    catalog: RateCatalog,
}

impl HotelConfig {
    /// Creates a new HotelConfig from its component parts.
    pub fn new(
        settings: HotelSettings,
        room_types: HashMap<String, RoomType>,
        rooms: Vec<Room>,
        catalog: RateCatalog,
    ) -> Self {
        Self {
            settings,
            room_types,
            rooms: rooms.into_iter().map(|r| (r.id.clone(), r)).collect(),
            catalog,
        }
    }

    /// Returns the hotel settings.
    pub fn settings(&self) -> &HotelSettings {
        &self.settings
    }

    /// Returns all room types.
    pub fn room_types(&self) -> &HashMap<String, RoomType> {
        &self.room_types
    }

    /// Looks up a room type by id.
    pub fn room_type(&self, id: &str) -> Option<&RoomType> {
        self.room_types.get(id)
    }

    /// Looks up a physical room by number.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Returns all physical rooms.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Returns the rate catalog.
    pub fn catalog(&self) -> &RateCatalog {
        &self.catalog
    }
}
