//! Distance matrix provider trait and per-destination row types.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;

use super::error::DistanceMatrixError;

/// Walking distance and duration to a single destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelEstimate {
    /// Network walking distance in metres.
    pub distance_meters: u32,
    /// Estimated walking time.
    pub duration: Duration,
    /// Display form of `duration`, e.g. `"12 mins"`.
    pub duration_text: String,
}

impl TravelEstimate {
    /// Build an estimate, deriving the display text from `duration`.
    #[must_use]
    pub fn new(distance_meters: u32, duration: Duration) -> Self {
        Self {
            distance_meters,
            duration,
            duration_text: duration_text(duration),
        }
    }
}

/// Outcome for one destination within a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowElement {
    /// The destination is reachable on foot.
    Reachable(TravelEstimate),
    /// The provider could not route to this destination.
    Unreachable,
}

impl RowElement {
    /// The estimate, if the destination was reachable.
    #[must_use]
    pub const fn estimate(&self) -> Option<&TravelEstimate> {
        match self {
            Self::Reachable(estimate) => Some(estimate),
            Self::Unreachable => None,
        }
    }
}

/// One element per requested destination, in request order.
pub type DistanceRow = Vec<RowElement>;

/// Fetch walking distances from one origin to many destinations.
///
/// Implementers supply [`fetch_row`](Self::fetch_row) and the destination
/// cap. Callers use [`query`](Self::query), which rejects empty and oversized
/// requests locally and checks the shape of the returned row.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use geo::Coord;
/// use refuge_core::{DistanceMatrixError, DistanceMatrixProvider, DistanceRow, coordinate};
///
/// struct Unavailable;
///
/// #[async_trait]
/// impl DistanceMatrixProvider for Unavailable {
///     fn max_destinations(&self) -> usize {
///         2
///     }
///
///     async fn fetch_row(
///         &self,
///         _origin: Coord<f64>,
///         _destinations: &[Coord<f64>],
///     ) -> Result<DistanceRow, DistanceMatrixError> {
///         Err(DistanceMatrixError::Parse { message: "offline".into() })
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let origin = coordinate(0.0, 0.0);
/// let err = Unavailable.query(origin, &[origin; 3]).await.unwrap_err();
/// assert!(matches!(err, DistanceMatrixError::OverQuota { requested: 3, limit: 2 }));
/// # });
/// ```
#[async_trait]
pub trait DistanceMatrixProvider: Send + Sync {
    /// Maximum number of destinations accepted in one call.
    fn max_destinations(&self) -> usize;

    /// Perform the provider call without local validation.
    async fn fetch_row(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<DistanceRow, DistanceMatrixError>;

    /// Query distances from `origin` to each of `destinations`.
    ///
    /// Returns [`DistanceMatrixError::EmptyInput`] for an empty slice and
    /// [`DistanceMatrixError::OverQuota`] without calling
    /// [`fetch_row`](Self::fetch_row) when the slice exceeds
    /// [`max_destinations`](Self::max_destinations).
    async fn query(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<DistanceRow, DistanceMatrixError> {
        if destinations.is_empty() {
            return Err(DistanceMatrixError::EmptyInput);
        }
        let limit = self.max_destinations();
        if destinations.len() > limit {
            return Err(DistanceMatrixError::OverQuota {
                requested: destinations.len(),
                limit,
            });
        }
        let row = self.fetch_row(origin, destinations).await?;
        if row.len() != destinations.len() {
            return Err(DistanceMatrixError::MalformedRow {
                expected: destinations.len(),
                actual: row.len(),
            });
        }
        Ok(row)
    }
}

#[async_trait]
impl<P> DistanceMatrixProvider for Arc<P>
where
    P: DistanceMatrixProvider + ?Sized,
{
    fn max_destinations(&self) -> usize {
        (**self).max_destinations()
    }

    async fn fetch_row(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<DistanceRow, DistanceMatrixError> {
        (**self).fetch_row(origin, destinations).await
    }

    async fn query(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<DistanceRow, DistanceMatrixError> {
        (**self).query(origin, destinations).await
    }
}

/// Format a walking duration the way routing front ends display it.
///
/// Durations are rounded to the nearest minute with a one-minute floor.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use refuge_core::distance_matrix::duration_text;
///
/// assert_eq!(duration_text(Duration::from_secs(20)), "1 min");
/// assert_eq!(duration_text(Duration::from_secs(12 * 60)), "12 mins");
/// assert_eq!(duration_text(Duration::from_secs(65 * 60)), "1 hour 5 mins");
/// ```
#[must_use]
pub fn duration_text(duration: Duration) -> String {
    let minutes = duration.as_secs().saturating_add(30).div_euclid(60).max(1);
    let hours = minutes.div_euclid(60);
    let rest = minutes.rem_euclid(60);
    match (hours, rest) {
        (0, m) => plural(m, "min"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} {}", plural(h, "hour"), plural(m, "min")),
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
