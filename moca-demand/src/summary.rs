//! Descriptive statistics over simulated demand.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::calendar::TimeSlot;
use crate::record::DemandRecord;
use crate::weather::WeatherLabel;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Running mean over booking counts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Mean {
    total: f64,
    samples: f64,
}

impl Mean {
    #[expect(clippy::float_arithmetic, reason = "accumulating counts")]
    fn push(&mut self, count: u32) {
        self.total += f64::from(count);
        self.samples += 1.0;
    }

    #[expect(clippy::float_arithmetic, reason = "averaging counts")]
    fn value(self) -> Option<f64> {
        (self.samples > 0.0).then(|| self.total / self.samples)
    }
}

fn means<K: Ord>(accumulators: BTreeMap<K, Mean>) -> BTreeMap<K, f64> {
    accumulators
        .into_iter()
        .filter_map(|(key, mean)| mean.value().map(|value| (key, value)))
        .collect()
}

/// Aggregate view of a simulated demand table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandSummary {
    /// Number of records.
    pub records: usize,
    /// Earliest and latest dates, when any records exist.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// How many records carry each booking count.
    pub count_distribution: BTreeMap<u32, usize>,
    /// Mean bookings per slot.
    pub mean_by_slot: BTreeMap<TimeSlot, f64>,
    /// Mean bookings per weekday, 0 for Monday.
    pub mean_by_weekday: BTreeMap<u32, f64>,
    /// Mean bookings per weather label.
    pub mean_by_weather: BTreeMap<WeatherLabel, f64>,
    /// Mean morning bookings while schools hold classes.
    pub morning_term_mean: Option<f64>,
    /// Mean morning bookings outside school term.
    pub morning_break_mean: Option<f64>,
    /// Share of records with no bookings, 0 for an empty table.
    pub zero_ratio: f64,
}

impl DemandSummary {
    /// Summarise `records`.
    #[must_use]
    pub fn from_records(records: &[DemandRecord]) -> Self {
        let mut count_distribution = BTreeMap::new();
        let mut by_slot: BTreeMap<TimeSlot, Mean> = BTreeMap::new();
        let mut by_weekday: BTreeMap<u32, Mean> = BTreeMap::new();
        let mut by_weather: BTreeMap<WeatherLabel, Mean> = BTreeMap::new();
        let mut morning_term = Mean::default();
        let mut morning_break = Mean::default();
        let mut zero = Mean::default();

        for record in records {
            let count = record.demand_count;
            *count_distribution.entry(count).or_insert(0) += 1;
            by_slot.entry(record.time_slot).or_default().push(count);
            by_weekday.entry(record.day_of_week).or_default().push(count);
            by_weather.entry(record.weather_label).or_default().push(count);
            if record.time_slot == TimeSlot::Morning {
                if record.is_school_term {
                    morning_term.push(count);
                } else {
                    morning_break.push(count);
                }
            }
            zero.push(u32::from(count == 0));
        }

        let date_range = records
            .iter()
            .map(|record| record.date)
            .min()
            .zip(records.iter().map(|record| record.date).max());

        Self {
            records: records.len(),
            date_range,
            count_distribution,
            mean_by_slot: means(by_slot),
            mean_by_weekday: means(by_weekday),
            mean_by_weather: means(by_weather),
            morning_term_mean: morning_term.value(),
            morning_break_mean: morning_break.value(),
            zero_ratio: zero.value().unwrap_or(0.0),
        }
    }
}

fn write_mean(f: &mut fmt::Formatter<'_>, label: &str, mean: Option<f64>) -> fmt::Result {
    match mean {
        Some(value) => writeln!(f, "  {label}: {value:.3}"),
        None => writeln!(f, "  {label}: n/a"),
    }
}

impl fmt::Display for DemandSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "records: {}", self.records)?;
        if let Some((first, last)) = self.date_range {
            writeln!(f, "dates: {first} to {last}")?;
        }

        writeln!(f, "count distribution:")?;
        for (count, records) in &self.count_distribution {
            writeln!(f, "  {count}: {records}")?;
        }

        writeln!(f, "mean by slot:")?;
        for (slot, mean) in &self.mean_by_slot {
            write_mean(f, slot.as_str(), Some(*mean))?;
        }

        writeln!(f, "mean by weekday:")?;
        for (weekday, mean) in &self.mean_by_weekday {
            let label = usize::try_from(*weekday)
                .ok()
                .and_then(|index| WEEKDAYS.get(index))
                .copied()
                .unwrap_or("?");
            write_mean(f, label, Some(*mean))?;
        }

        writeln!(f, "mean by weather:")?;
        for (label, mean) in &self.mean_by_weather {
            write_mean(f, label.as_str(), Some(*mean))?;
        }

        writeln!(f, "morning demand:")?;
        write_mean(f, "school term", self.morning_term_mean)?;
        write_mean(f, "school break", self.morning_break_mean)?;

        write!(f, "zero ratio: {:.3}", self.zero_ratio)
    }
}
