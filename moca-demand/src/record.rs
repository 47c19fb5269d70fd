//! Flat demand rows as written to the CSV.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::calendar::{Season, TimeSlot};
use crate::weather::WeatherLabel;

/// Flags are written as `0` and `1`.
#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "serde hands fields to serialize_with by reference"
)]
fn flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// One slot on one day with its features and lagged counts.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandRecord {
    /// Service date.
    pub date: NaiveDate,
    /// Booking window.
    pub time_slot: TimeSlot,
    /// Simulated bookings.
    pub demand_count: u32,
    /// Day of the week, 0 for Monday.
    pub day_of_week: u32,
    /// Month, 1 to 12.
    pub month: u32,
    /// Saturday or Sunday.
    #[serde(serialize_with = "flag")]
    pub is_weekend: bool,
    /// National holiday.
    #[serde(serialize_with = "flag")]
    pub is_holiday: bool,
    /// Schools hold classes.
    #[serde(serialize_with = "flag")]
    pub is_school_term: bool,
    /// Planting or harvest month.
    #[serde(serialize_with = "flag")]
    pub is_farming_season: bool,
    /// Start or end of the month.
    #[serde(serialize_with = "flag")]
    pub is_month_boundary: bool,
    /// Meteorological season.
    pub season: Season,
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Rainfall in millimetres.
    pub precipitation_mm: f64,
    /// Snowfall in centimetres.
    pub snowfall_cm: f64,
    /// Wind speed in metres per second.
    pub wind_speed: f64,
    /// Weather summary.
    pub weather_label: WeatherLabel,
    /// Count for the same slot on the previous day.
    pub lag_1_demand: Option<u32>,
    /// Count for the same slot a week earlier.
    pub lag_7_demand: Option<u32>,
    /// Count for the same slot two weeks earlier.
    pub lag_14_demand: Option<u32>,
    /// Mean of up to seven previous counts for the slot.
    pub rolling_7day_avg: Option<f64>,
    /// Mean of up to fourteen previous counts for the slot.
    pub rolling_14day_avg: Option<f64>,
}

/// CSV header in column order.
pub const DEMAND_COLUMNS: [&str; 21] = [
    "date",
    "time_slot",
    "demand_count",
    "day_of_week",
    "month",
    "is_weekend",
    "is_holiday",
    "is_school_term",
    "is_farming_season",
    "is_month_boundary",
    "season",
    "temperature",
    "precipitation_mm",
    "snowfall_cm",
    "wind_speed",
    "weather_label",
    "lag_1_demand",
    "lag_7_demand",
    "lag_14_demand",
    "rolling_7day_avg",
    "rolling_14day_avg",
];
