//! Seeded day-by-day simulation and lag feature derivation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::calendar::{CalendarDay, TimeSlot};
use crate::demand::{demand_rate, sample_count};
use crate::error::SimulationError;
use crate::record::DemandRecord;
use crate::weather::{Weather, simulate_weather};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

const fn date_or_min(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => NaiveDate::MIN,
    }
}

/// First simulated date when none is configured.
pub const DEFAULT_START: NaiveDate = date_or_min(2022, 4, 1);
/// Last simulated date when none is configured.
pub const DEFAULT_END: NaiveDate = date_or_min(2025, 3, 31);

/// Date range and seed for a simulation run.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use moca_demand::SimulationConfig;
///
/// let config = SimulationConfig::default()
///     .with_start(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default())
///     .with_end(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap_or_default())
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// First simulated date, inclusive.
    pub start: NaiveDate,
    /// Last simulated date, inclusive.
    pub end: NaiveDate,
    /// Random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    /// Override the first simulated date.
    #[must_use]
    pub const fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    /// Override the last simulated date.
    #[must_use]
    pub const fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = end;
        self
    }

    /// Override the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the range is ordered.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidRange`] when `end` precedes `start`.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.end < self.start {
            return Err(SimulationError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// A simulated slot before lag features are attached.
struct Draw {
    day: CalendarDay,
    slot: TimeSlot,
    weather: Weather,
    count: u32,
}

/// Simulate demand over the configured range.
///
/// Each day draws its weather first, then one count per slot, all from a
/// single generator seeded with `config.seed`. Rows without a week of
/// history for their slot are dropped. The result is ordered by date and
/// then by slot label.
///
/// # Errors
/// Returns [`SimulationError::InvalidRange`] for an inverted range or
/// [`SimulationError::Distribution`] if a draw cannot be made.
pub fn simulate(config: &SimulationConfig) -> Result<Vec<DemandRecord>, SimulationError> {
    config.validate()?;
    info!(
        "simulating demand from {} to {} with seed {}",
        config.start, config.end, config.seed
    );

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut draws = Vec::new();
    for date in config.start.iter_days().take_while(|date| *date <= config.end) {
        let day = CalendarDay::new(date);
        let weather = simulate_weather(date, &mut rng)?;
        for slot in TimeSlot::ALL {
            let count = sample_count(demand_rate(&day, slot, &weather), &mut rng)?;
            draws.push(Draw {
                day,
                slot,
                weather,
                count,
            });
        }
    }
    debug!("drew {} slot counts", draws.len());

    let mut records = with_lag_features(draws);
    let simulated = records.len();
    records.retain(|record| record.lag_7_demand.is_some());
    records.sort_by(|left, right| {
        (left.date, left.time_slot.as_str()).cmp(&(right.date, right.time_slot.as_str()))
    });
    info!(
        "kept {} of {simulated} records with a week of history",
        records.len()
    );
    Ok(records)
}

fn with_lag_features(draws: Vec<Draw>) -> Vec<DemandRecord> {
    let mut history: BTreeMap<TimeSlot, Vec<u32>> = BTreeMap::new();
    draws
        .into_iter()
        .map(|draw| {
            let previous = history.entry(draw.slot).or_default();
            let record = build_record(&draw, previous);
            previous.push(draw.count);
            record
        })
        .collect()
}

fn build_record(draw: &Draw, previous: &[u32]) -> DemandRecord {
    let day = &draw.day;
    let weather = &draw.weather;
    DemandRecord {
        date: day.date,
        time_slot: draw.slot,
        demand_count: draw.count,
        day_of_week: day.day_of_week,
        month: day.month,
        is_weekend: day.is_weekend,
        is_holiday: day.is_holiday,
        is_school_term: day.is_school_term,
        is_farming_season: day.is_farming_season,
        is_month_boundary: day.is_month_boundary,
        season: day.season,
        temperature: weather.temperature,
        precipitation_mm: weather.precipitation_mm,
        snowfall_cm: weather.snowfall_cm,
        wind_speed: weather.wind_speed,
        weather_label: weather.label,
        lag_1_demand: lag(previous, 1),
        lag_7_demand: lag(previous, 7),
        lag_14_demand: lag(previous, 14),
        rolling_7day_avg: rolling_mean(previous, 7),
        rolling_14day_avg: rolling_mean(previous, 14),
    }
}

/// Count `days` entries back from the end of `previous`.
fn lag(previous: &[u32], days: usize) -> Option<u32> {
    previous
        .len()
        .checked_sub(days)
        .and_then(|index| previous.get(index))
        .copied()
}

/// Mean of the last `window` entries of `previous`, to two decimals.
#[expect(clippy::float_arithmetic, reason = "averaging counts")]
fn rolling_mean(previous: &[u32], window: usize) -> Option<f64> {
    let start = previous.len().saturating_sub(window);
    let recent = previous.get(start..)?;
    if recent.is_empty() {
        return None;
    }
    let (sum, len) = recent
        .iter()
        .fold((0.0_f64, 0.0_f64), |(total, seen), count| {
            (total + f64::from(*count), seen + 1.0)
        });
    Some(round2(sum / len))
}

#[expect(clippy::float_arithmetic, reason = "decimal rounding")]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
