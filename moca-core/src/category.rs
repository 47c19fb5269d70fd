//! Scoring categories attached to every reference tag and enriched stop.
//!
//! The enum offers compile-time safety for score lookups, and
//! [`CategoryScores`] stores one value per category in a fixed array.
//!
//! # Examples
//! ```
//! use moca_core::Category;
//!
//! assert_eq!(Category::Education.as_str(), "education");
//! assert_eq!(Category::Education.column_name(), "education_score");
//! assert_eq!(Category::WeekendFactor.to_string(), "weekend_factor");
//! ```

/// Number of scoring categories.
pub const CATEGORY_COUNT: usize = 14;

/// A single scoring dimension for a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Schools and other education sites.
    Education,
    /// Sightseeing destinations.
    Tourism,
    /// Hospitals, clinics and care facilities.
    Welfare,
    /// Difficulty of the surrounding terrain.
    Terrain,
    /// Interchange with other transport.
    Transport,
    /// Housing density.
    Residential,
    /// Shops and services.
    Commercial,
    /// Baseline demand level.
    BaseDemand,
    /// Demand multiplier for the morning peak.
    MorningPeakFactor,
    /// Demand multiplier for the evening peak.
    EveningPeakFactor,
    /// Demand multiplier for daytime trips.
    DaytimeFactor,
    /// Demand multiplier at weekends.
    WeekendFactor,
    /// Sensitivity of demand to bad weather.
    WeatherSensitivity,
    /// Amplitude of seasonal demand swings.
    SeasonalVariation,
}

impl Category {
    /// Every category in column order.
    pub const ALL: [Self; CATEGORY_COUNT] = [
        Self::Education,
        Self::Tourism,
        Self::Welfare,
        Self::Terrain,
        Self::Transport,
        Self::Residential,
        Self::Commercial,
        Self::BaseDemand,
        Self::MorningPeakFactor,
        Self::EveningPeakFactor,
        Self::DaytimeFactor,
        Self::WeekendFactor,
        Self::WeatherSensitivity,
        Self::SeasonalVariation,
    ];

    /// Return the category as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Tourism => "tourism",
            Self::Welfare => "welfare",
            Self::Terrain => "terrain",
            Self::Transport => "transport",
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::BaseDemand => "base_demand",
            Self::MorningPeakFactor => "morning_peak_factor",
            Self::EveningPeakFactor => "evening_peak_factor",
            Self::DaytimeFactor => "daytime_factor",
            Self::WeekendFactor => "weekend_factor",
            Self::WeatherSensitivity => "weather_sensitivity",
            Self::SeasonalVariation => "seasonal_variation",
        }
    }

    /// Column header used by the taxonomy and enriched tables.
    ///
    /// The first eight categories carry a `_score` suffix; the demand
    /// modifiers are named verbatim.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Education => "education_score",
            Self::Tourism => "tourism_score",
            Self::Welfare => "welfare_score",
            Self::Terrain => "terrain_score",
            Self::Transport => "transport_score",
            Self::Residential => "residential_score",
            Self::Commercial => "commercial_score",
            Self::BaseDemand => "base_demand_score",
            other => other.as_str(),
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Accepts either the bare name or the column header.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.as_str() == lowered || category.column_name() == lowered
            })
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// One score per [`Category`].
///
/// # Examples
/// ```
/// use moca_core::{Category, CategoryScores};
///
/// let mut scores = CategoryScores::zero();
/// scores.set(Category::Tourism, 0.5);
/// assert_eq!(scores.get(Category::Tourism), 0.5);
/// assert_eq!(scores.get(Category::Welfare), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryScores {
    values: [f64; CATEGORY_COUNT],
}

impl CategoryScores {
    /// Scores with every category set to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            values: [0.0; CATEGORY_COUNT],
        }
    }

    /// Build scores from values listed in [`Category::ALL`] order.
    #[must_use]
    pub const fn from_array(values: [f64; CATEGORY_COUNT]) -> Self {
        Self { values }
    }

    /// Values in [`Category::ALL`] order.
    #[must_use]
    pub const fn as_array(&self) -> &[f64; CATEGORY_COUNT] {
        &self.values
    }

    /// Return the score for `category`.
    #[must_use]
    pub fn get(&self, category: Category) -> f64 {
        self.values.get(category.index()).copied().unwrap_or(0.0)
    }

    /// Overwrite the score for `category`.
    pub fn set(&mut self, category: Category, value: f64) {
        if let Some(slot) = self.values.get_mut(category.index()) {
            *slot = value;
        }
    }

    /// Iterate over `(category, score)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Add `weight * other` to every category.
    #[expect(
        clippy::float_arithmetic,
        reason = "accumulating weighted category scores"
    )]
    pub fn add_weighted(&mut self, other: &Self, weight: f64) {
        for (total, value) in self.values.iter_mut().zip(other.values) {
            *total += value * weight;
        }
    }

    /// Return a copy with every category divided by `divisor`.
    #[expect(
        clippy::float_arithmetic,
        reason = "averaging accumulated scores over the tag count"
    )]
    #[must_use]
    pub fn divided_by(&self, divisor: f64) -> Self {
        let mut values = self.values;
        for value in &mut values {
            *value /= divisor;
        }
        Self { values }
    }
}
