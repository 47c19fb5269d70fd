//! Daily weather simulator.
//!
//! Temperatures follow a monthly normal distribution; rain falls with a
//! monthly probability and exponentially distributed amounts. Snow is only
//! possible in January and February on freezing wet days.

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal};
use serde::Serialize;

use crate::error::SimulationError;

/// Mean rainfall on a wet day, in millimetres.
const MEAN_RAINFALL_MM: f64 = 8.0;
/// Mean snowfall on a snowy day, in centimetres.
const MEAN_SNOWFALL_CM: f64 = 3.0;
/// Mean wind speed, in metres per second.
const MEAN_WIND_SPEED: f64 = 2.5;
/// Chance that a dry day is overcast.
const CLOUDY_PROBABILITY: f64 = 0.4;

/// Summary label for a day's weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherLabel {
    /// Dry and clear.
    Sunny,
    /// Dry and overcast.
    Cloudy,
    /// Rain without settling snow.
    Rainy,
    /// Snow settled.
    Snowy,
}

impl WeatherLabel {
    /// Lower-case label written to the CSV.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
        }
    }
}

impl std::fmt::Display for WeatherLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day's simulated weather. Quantities carry one decimal place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Rainfall in millimetres.
    pub precipitation_mm: f64,
    /// Snowfall in centimetres.
    pub snowfall_cm: f64,
    /// Wind speed in metres per second.
    pub wind_speed: f64,
    /// Summary label.
    pub label: WeatherLabel,
}

/// Monthly temperature mean and spread with the chance of rain.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Climate {
    mean_temperature: f64,
    temperature_spread: f64,
    rain_probability: f64,
}

impl Climate {
    const fn new(mean_temperature: f64, temperature_spread: f64, rain_probability: f64) -> Self {
        Self {
            mean_temperature,
            temperature_spread,
            rain_probability,
        }
    }

    const fn of_month(month: u32) -> Self {
        match month {
            1 => Self::new(3.5, 4.0, 0.18),
            2 => Self::new(4.5, 4.0, 0.18),
            3 => Self::new(8.5, 3.5, 0.22),
            4 => Self::new(14.5, 3.0, 0.20),
            5 => Self::new(19.5, 3.0, 0.22),
            6 => Self::new(23.5, 2.5, 0.32),
            7 => Self::new(28.0, 2.5, 0.35),
            8 => Self::new(29.5, 2.0, 0.28),
            9 => Self::new(24.5, 2.5, 0.32),
            10 => Self::new(18.0, 3.0, 0.22),
            11 => Self::new(12.0, 3.5, 0.22),
            _ => Self::new(6.0, 4.0, 0.20),
        }
    }
}

/// Round to one decimal place.
#[expect(clippy::float_arithmetic, reason = "decimal rounding")]
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn exponential(mean: f64) -> Result<Exp<f64>, SimulationError> {
    Exp::new(mean.recip()).map_err(|err| SimulationError::Distribution {
        message: err.to_string(),
    })
}

/// Draw the weather for `date`.
///
/// Draws happen in a fixed order (temperature, rain, rainfall, snowfall,
/// wind, cloud) so a seeded generator reproduces the same day.
///
/// # Errors
/// Returns [`SimulationError::Distribution`] if a distribution cannot be
/// built from the climate table.
pub fn simulate_weather<R: Rng + ?Sized>(
    date: NaiveDate,
    rng: &mut R,
) -> Result<Weather, SimulationError> {
    let month = date.month();
    let climate = Climate::of_month(month);
    let temperature_distribution = Normal::new(climate.mean_temperature, climate.temperature_spread)
        .map_err(|err| SimulationError::Distribution {
            message: err.to_string(),
        })?;

    let temperature = round1(temperature_distribution.sample(rng));
    let is_rainy = rng.r#gen::<f64>() < climate.rain_probability;
    let precipitation_mm = if is_rainy {
        round1(exponential(MEAN_RAINFALL_MM)?.sample(rng))
    } else {
        0.0
    };
    let snowfall_cm = if matches!(month, 1 | 2) && temperature <= 0.0 && is_rainy {
        round1(exponential(MEAN_SNOWFALL_CM)?.sample(rng))
    } else {
        0.0
    };
    let wind_speed = round1(exponential(MEAN_WIND_SPEED)?.sample(rng));

    let label = if snowfall_cm > 0.0 {
        WeatherLabel::Snowy
    } else if is_rainy {
        WeatherLabel::Rainy
    } else if rng.r#gen::<f64>() < CLOUDY_PROBABILITY {
        WeatherLabel::Cloudy
    } else {
        WeatherLabel::Sunny
    };

    Ok(Weather {
        temperature,
        precipitation_mm,
        snowfall_cm,
        wind_speed,
        label,
    })
}
