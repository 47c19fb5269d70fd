//! Calendar features of a service day.
//!
//! Holidays follow the national calendar for 2022 to 2025; school breaks
//! follow the local school year (summer 7/21 to 8/31, winter 12/25 to 1/7,
//! spring 3/25 to 4/7).

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// National holidays covered by the generator, as `(year, month, day)`.
const HOLIDAYS: &[(i32, u32, u32)] = &[
    (2022, 1, 1), (2022, 1, 10), (2022, 2, 11), (2022, 2, 23), (2022, 3, 21),
    (2022, 4, 29), (2022, 5, 3), (2022, 5, 4), (2022, 5, 5), (2022, 7, 18),
    (2022, 8, 11), (2022, 9, 19), (2022, 9, 23), (2022, 10, 10), (2022, 11, 3),
    (2022, 11, 23), (2022, 12, 31),
    (2023, 1, 1), (2023, 1, 2), (2023, 1, 9), (2023, 2, 11), (2023, 2, 23),
    (2023, 3, 21), (2023, 4, 29), (2023, 5, 3), (2023, 5, 4), (2023, 5, 5),
    (2023, 7, 17), (2023, 8, 11), (2023, 9, 18), (2023, 9, 23), (2023, 10, 9),
    (2023, 11, 3), (2023, 11, 23),
    (2024, 1, 1), (2024, 1, 8), (2024, 2, 11), (2024, 2, 12), (2024, 2, 23),
    (2024, 3, 20), (2024, 4, 29), (2024, 5, 3), (2024, 5, 4), (2024, 5, 5),
    (2024, 5, 6), (2024, 7, 15), (2024, 8, 11), (2024, 8, 12), (2024, 9, 16),
    (2024, 9, 22), (2024, 9, 23), (2024, 10, 14), (2024, 11, 3), (2024, 11, 4),
    (2024, 11, 23),
    (2025, 1, 1), (2025, 1, 13), (2025, 2, 11), (2025, 2, 23), (2025, 2, 24),
    (2025, 3, 20),
];

/// A booking window within the service day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    /// Commuting and school runs.
    Morning,
    /// Shopping, clinics and errands.
    Daytime,
    /// Return trips.
    Evening,
}

impl TimeSlot {
    /// Every slot in service order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Daytime, Self::Evening];

    /// Lower-case label written to the CSV.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Daytime => "daytime",
            Self::Evening => "evening",
        }
    }

    /// Expected bookings before calendar and weather adjustments.
    #[must_use]
    pub const fn base_rate(self) -> f64 {
        match self {
            Self::Morning => 0.90,
            Self::Daytime => 0.75,
            Self::Evening => 0.45,
        }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meteorological season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// March to May.
    Spring,
    /// June to August.
    Summer,
    /// September to November.
    Autumn,
    /// December to February.
    Winter,
}

impl Season {
    /// Season containing `month` (1 to 12).
    #[must_use]
    pub const fn of_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }
}

/// Report whether `date` is a listed national holiday.
#[must_use]
pub fn is_holiday(date: NaiveDate) -> bool {
    HOLIDAYS.contains(&(date.year(), date.month(), date.day()))
}

/// Report whether `date` falls on a Saturday or Sunday.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Report whether schools hold classes on `date`.
///
/// Weekends and the three school breaks are out of term. Holidays are not
/// considered.
#[must_use]
pub fn is_school_term(date: NaiveDate) -> bool {
    let on_break = match (date.month(), date.day()) {
        (7, day) => day >= 21,
        (8, _) => true,
        (12, day) => day >= 25,
        (1, day) => day <= 7,
        (3, day) => day >= 25,
        (4, day) => day <= 7,
        _ => false,
    };
    !on_break && !is_weekend(date)
}

/// Report whether `month` is rice planting (May, June) or harvest
/// (September, October) season.
#[must_use]
pub const fn is_farming_season(month: u32) -> bool {
    matches!(month, 5 | 6 | 9 | 10)
}

/// Report whether `day` is in the first five or last week of a month,
/// when clinic appointments cluster.
#[must_use]
pub const fn is_month_boundary(day: u32) -> bool {
    day <= 5 || day >= 25
}

/// Calendar features derived from one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    /// The date described.
    pub date: NaiveDate,
    /// Day of the week, 0 for Monday.
    pub day_of_week: u32,
    /// Month, 1 to 12.
    pub month: u32,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Listed national holiday.
    pub is_holiday: bool,
    /// Schools hold classes.
    pub is_school_term: bool,
    /// Planting or harvest month.
    pub is_farming_season: bool,
    /// Start or end of the month.
    pub is_month_boundary: bool,
    /// Meteorological season.
    pub season: Season,
}

impl CalendarDay {
    /// Derive every calendar feature of `date`.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            day_of_week: date.weekday().num_days_from_monday(),
            month: date.month(),
            is_weekend: is_weekend(date),
            is_holiday: is_holiday(date),
            is_school_term: is_school_term(date),
            is_farming_season: is_farming_season(date.month()),
            is_month_boundary: is_month_boundary(date.day()),
            season: Season::of_month(date.month()),
        }
    }

    /// Report whether commuting demand is absent.
    #[must_use]
    pub const fn is_day_off(&self) -> bool {
        self.is_weekend || self.is_holiday
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[rstest]
    #[case(date(2023, 7, 20), true)]
    #[case(date(2023, 7, 21), false)]
    #[case(date(2023, 8, 31), false)]
    #[case(date(2023, 9, 1), true)]
    #[case(date(2023, 12, 25), false)]
    #[case(date(2024, 1, 5), false)]
    #[case(date(2024, 1, 9), true)]
    #[case(date(2024, 3, 25), false)]
    #[case(date(2024, 4, 8), true)]
    #[case(date(2024, 4, 13), false)]
    fn school_term_excludes_breaks_and_weekends(#[case] day: NaiveDate, #[case] expected: bool) {
        assert_eq!(is_school_term(day), expected, "{day}");
    }

    #[rstest]
    #[case(date(2024, 5, 6), true)]
    #[case(date(2025, 2, 24), true)]
    #[case(date(2024, 5, 7), false)]
    #[case(date(2026, 1, 1), false)]
    fn holidays_come_from_the_fixed_list(#[case] day: NaiveDate, #[case] expected: bool) {
        assert_eq!(is_holiday(day), expected);
    }

    #[rstest]
    #[case(1, Season::Winter)]
    #[case(3, Season::Spring)]
    #[case(8, Season::Summer)]
    #[case(11, Season::Autumn)]
    #[case(12, Season::Winter)]
    fn seasons_follow_meteorological_months(#[case] month: u32, #[case] expected: Season) {
        assert_eq!(Season::of_month(month), expected);
    }

    #[rstest]
    #[case(1, true)]
    #[case(5, true)]
    #[case(6, false)]
    #[case(24, false)]
    #[case(25, true)]
    fn month_boundary_covers_both_ends(#[case] day: u32, #[case] expected: bool) {
        assert_eq!(is_month_boundary(day), expected);
    }

    #[rstest]
    fn calendar_day_collects_every_flag() {
        let day = CalendarDay::new(date(2024, 5, 4));
        assert_eq!(day.day_of_week, 5);
        assert!(day.is_weekend);
        assert!(day.is_holiday);
        assert!(!day.is_school_term);
        assert!(day.is_farming_season);
        assert!(day.is_month_boundary);
        assert_eq!(day.season, Season::Spring);
        assert!(day.is_day_off());
    }

    #[rstest]
    fn slots_are_labelled_in_lower_case() {
        let labels: Vec<_> = TimeSlot::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["morning", "daytime", "evening"]);
    }
}
