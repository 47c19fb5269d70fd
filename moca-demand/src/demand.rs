//! Expected bookings per slot and the Poisson draw around them.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::calendar::{CalendarDay, TimeSlot};
use crate::error::SimulationError;
use crate::weather::Weather;

/// Expected bookings for `slot` on `day` under `weather`.
///
/// Starts from [`TimeSlot::base_rate`] and applies calendar multipliers
/// (days off, school term, farming season, month boundary) followed by
/// weather multipliers (temperature, rain, snow, wind). Never negative.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use moca_demand::{CalendarDay, TimeSlot, Weather, WeatherLabel, demand_rate};
///
/// // A mild, dry Wednesday in term time.
/// let day = CalendarDay::new(NaiveDate::from_ymd_opt(2023, 11, 15).unwrap_or_default());
/// let calm = Weather {
///     temperature: 10.0,
///     precipitation_mm: 0.0,
///     snowfall_cm: 0.0,
///     wind_speed: 1.0,
///     label: WeatherLabel::Sunny,
/// };
/// let rate = demand_rate(&day, TimeSlot::Morning, &calm);
/// assert!((rate - 1.35).abs() < 1e-12);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "the rate is a product of multipliers")]
pub fn demand_rate(day: &CalendarDay, slot: TimeSlot, weather: &Weather) -> f64 {
    let mut rate = slot.base_rate();

    if day.is_day_off() {
        rate *= 0.55;
        if slot == TimeSlot::Daytime {
            rate *= 1.30;
        }
    } else if slot == TimeSlot::Morning {
        rate *= if day.is_school_term { 1.50 } else { 0.40 };
    }
    if day.is_farming_season && matches!(slot, TimeSlot::Morning | TimeSlot::Evening) {
        rate *= 1.20;
    }
    if day.is_month_boundary && slot == TimeSlot::Daytime {
        rate *= 1.35;
    }

    rate * weather_multiplier(weather)
}

#[expect(clippy::float_arithmetic, reason = "the multiplier is a product of factors")]
fn weather_multiplier(weather: &Weather) -> f64 {
    let temperature = weather.temperature;
    let heat: f64 = if temperature >= 35.0 || temperature <= -2.0 {
        0.50
    } else if temperature >= 30.0 || temperature <= 2.0 {
        0.75
    } else if (15.0..=25.0).contains(&temperature) {
        1.10
    } else {
        1.0
    };

    let rain = if weather.precipitation_mm >= 20.0 {
        0.40
    } else if weather.precipitation_mm >= 5.0 {
        0.65
    } else if weather.precipitation_mm > 0.0 {
        0.80
    } else {
        1.0
    };

    let snow = if weather.snowfall_cm >= 10.0 {
        0.20
    } else if weather.snowfall_cm > 0.0 {
        0.50
    } else {
        1.0
    };

    let wind = if weather.wind_speed >= 10.0 {
        0.70
    } else if weather.wind_speed >= 7.0 {
        0.85
    } else {
        1.0
    };

    (heat * rain * snow * wind).max(0.0)
}

/// Draw a booking count with mean `rate`.
///
/// A non-positive rate always yields zero.
///
/// # Errors
/// Returns [`SimulationError::Distribution`] when `rate` is not finite.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Poisson draws are non-negative whole numbers far below u32::MAX"
)]
pub fn sample_count<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> Result<u32, SimulationError> {
    if rate <= 0.0 {
        return Ok(0);
    }
    let poisson = Poisson::new(rate).map_err(|err| SimulationError::Distribution {
        message: err.to_string(),
    })?;
    let draw: f64 = poisson.sample(rng);
    Ok(draw as u32)
}

#[cfg(test)]
#[expect(clippy::float_arithmetic, reason = "expected rates are products")]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::weather::WeatherLabel;

    fn day(year: i32, month: u32, date: u32) -> CalendarDay {
        CalendarDay::new(NaiveDate::from_ymd_opt(year, month, date).expect("valid date"))
    }

    #[fixture]
    fn calm() -> Weather {
        Weather {
            temperature: 10.0,
            precipitation_mm: 0.0,
            snowfall_cm: 0.0,
            wind_speed: 1.0,
            label: WeatherLabel::Sunny,
        }
    }

    // 2023-11-15: Wednesday in term, no farming, mid-month.
    // 2023-11-18: Saturday.
    // 2023-08-16: Wednesday in the summer break.
    // 2023-05-16: Tuesday in term during planting.
    // 2023-11-27: Monday in term at month end.
    #[rstest]
    #[case(day(2023, 11, 15), TimeSlot::Morning, 0.90 * 1.50)]
    #[case(day(2023, 11, 15), TimeSlot::Daytime, 0.75)]
    #[case(day(2023, 11, 15), TimeSlot::Evening, 0.45)]
    #[case(day(2023, 11, 18), TimeSlot::Morning, 0.90 * 0.55)]
    #[case(day(2023, 11, 18), TimeSlot::Daytime, 0.75 * 0.55 * 1.30)]
    #[case(day(2023, 11, 3), TimeSlot::Daytime, 0.75 * 0.55 * 1.30 * 1.35)]
    #[case(day(2023, 8, 16), TimeSlot::Morning, 0.90 * 0.40)]
    #[case(day(2023, 5, 16), TimeSlot::Morning, 0.90 * 1.50 * 1.20)]
    #[case(day(2023, 5, 16), TimeSlot::Evening, 0.45 * 1.20)]
    #[case(day(2023, 11, 27), TimeSlot::Daytime, 0.75 * 1.35)]
    fn calendar_multipliers_apply(
        calm: Weather,
        #[case] service_day: CalendarDay,
        #[case] slot: TimeSlot,
        #[case] expected: f64,
    ) {
        let rate = demand_rate(&service_day, slot, &calm);
        assert!((rate - expected).abs() < 1e-12, "expected {expected}, got {rate}");
    }

    #[rstest]
    #[case(20.0, 0.0, 0.0, 1.0, 1.10)]
    #[case(36.0, 0.0, 0.0, 1.0, 0.50)]
    #[case(-2.0, 0.0, 0.0, 1.0, 0.50)]
    #[case(31.0, 0.0, 0.0, 1.0, 0.75)]
    #[case(2.0, 0.0, 0.0, 1.0, 0.75)]
    #[case(10.0, 25.0, 0.0, 1.0, 0.40)]
    #[case(10.0, 5.0, 0.0, 1.0, 0.65)]
    #[case(10.0, 0.1, 0.0, 1.0, 0.80)]
    #[case(-1.0, 3.0, 12.0, 1.0, 0.75 * 0.80 * 0.20)]
    #[case(-1.0, 3.0, 1.0, 1.0, 0.75 * 0.80 * 0.50)]
    #[case(10.0, 0.0, 0.0, 10.0, 0.70)]
    #[case(10.0, 0.0, 0.0, 7.0, 0.85)]
    fn weather_multipliers_apply(
        #[case] temperature: f64,
        #[case] precipitation_mm: f64,
        #[case] snowfall_cm: f64,
        #[case] wind_speed: f64,
        #[case] expected: f64,
    ) {
        let weather = Weather {
            temperature,
            precipitation_mm,
            snowfall_cm,
            wind_speed,
            label: WeatherLabel::Rainy,
        };
        let multiplier = weather_multiplier(&weather);
        assert!((multiplier - expected).abs() < 1e-12, "expected {expected}, got {multiplier}");
    }

    #[rstest]
    fn zero_rate_never_books() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(sample_count(0.0, &mut rng), Ok(0));
    }

    #[rstest]
    fn non_finite_rate_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            sample_count(f64::INFINITY, &mut rng),
            Err(SimulationError::Distribution { .. })
        ));
    }

    #[rstest]
    fn draws_centre_on_the_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let total: u32 = (0..10_000)
            .map(|_| sample_count(1.5, &mut rng).expect("finite rate"))
            .sum();
        let mean = f64::from(total) / 10_000.0;
        assert!((mean - 1.5).abs() < 0.1, "sample mean {mean}");
    }
}
