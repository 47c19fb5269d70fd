//! Acquire the points table.
//!
//! [`load_points`] reads a cached `points_cache.csv`;
//! [`fetch_or_load_points`] first downloads it from a [`PointsSource`]
//! when the cache is absent.
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use moca_data::points::{DEFAULT_POINTS_ENDPOINT, HttpPointsSource, fetch_or_load_points};
//!
//! let source = HttpPointsSource::new(DEFAULT_POINTS_ENDPOINT)?;
//! let table = fetch_or_load_points(Utf8Path::new("data/points_cache.csv"), &source)?;
//! println!("{} stops", table.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod fetch;
mod load;

pub use fetch::{
    DEFAULT_POINTS_ENDPOINT, FetchError, HttpPointsSource, HttpPointsSourceConfig, PointsSource,
    fetch_or_load_points,
};
pub use load::{PointsLoadError, load_points, read_points};
