//! Test doubles for data sources.
//!
//! [`StubPointsSource`] answers with a fixed CSV body or HTTP status and
//! counts how often it was asked, so cache behaviour can be checked without
//! a network.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::points::{FetchError, PointsSource};

/// URL reported in errors raised by [`StubPointsSource`].
pub const STUB_POINTS_URL: &str = "stub://points";

/// Stub [`PointsSource`] for testing.
///
/// # Example
///
/// ```
/// use moca_data::points::PointsSource;
/// use moca_data::test_support::StubPointsSource;
///
/// let source = StubPointsSource::with_body("stop_id,tags\n");
/// assert_eq!(source.fetch().ok().as_deref(), Some("stop_id,tags\n"));
/// assert_eq!(source.calls(), 1);
/// ```
#[derive(Debug)]
pub struct StubPointsSource {
    response: StubResponse,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Body(String),
    Status(u16),
}

impl StubPointsSource {
    /// Create a source that returns `body`.
    #[must_use]
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            response: StubResponse::Body(body.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a source that fails with HTTP `status`.
    #[must_use]
    pub const fn with_error(status: u16) -> Self {
        Self {
            response: StubResponse::Status(status),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PointsSource for StubPointsSource {
    fn fetch(&self) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            StubResponse::Body(body) => Ok(body.clone()),
            StubResponse::Status(status) => Err(FetchError::Http {
                url: STUB_POINTS_URL.to_owned(),
                status: *status,
            }),
        }
    }
}
