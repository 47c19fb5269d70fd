//! Synthetic on-demand bus booking data.
//!
//! Generates a seeded, reproducible table of booking counts per service
//! day and time slot. Each day gets calendar features (weekends, national
//! holidays, school term, farming season, month boundaries) and simulated
//! weather; each slot's count is drawn from a Poisson distribution whose
//! mean is a base rate adjusted by those features. Lagged counts and
//! rolling averages are attached per slot so the table can train a
//! forecasting model directly.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use moca_demand::{DemandSummary, SimulationConfig, simulate};
//!
//! let config = SimulationConfig::default()
//!     .with_start(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap_or_default())
//!     .with_end(NaiveDate::from_ymd_opt(2023, 6, 14).unwrap_or_default());
//! let records = simulate(&config)?;
//! assert_eq!(records.len(), 7 * 3);
//! let summary = DemandSummary::from_records(&records);
//! assert_eq!(summary.records, records.len());
//! # Ok::<(), moca_demand::SimulationError>(())
//! ```

#![forbid(unsafe_code)]

mod calendar;
mod demand;
mod error;
mod output;
mod record;
mod simulate;
mod summary;
mod weather;

pub use calendar::{
    CalendarDay, Season, TimeSlot, is_farming_season, is_holiday, is_month_boundary,
    is_school_term, is_weekend,
};
pub use demand::{demand_rate, sample_count};
pub use error::{DemandWriteError, SimulationError};
pub use output::{write_demand_csv, write_demand_to};
pub use record::{DEMAND_COLUMNS, DemandRecord};
pub use simulate::{DEFAULT_END, DEFAULT_SEED, DEFAULT_START, SimulationConfig, simulate};
pub use summary::DemandSummary;
pub use weather::{Weather, WeatherLabel, simulate_weather};
