//! Deterministic `DistanceMatrixProvider` doubles for unit and behaviour
//! tests.
//!
//! Neither double performs I/O. [`ScriptedDistanceMatrix`] replays queued
//! answers and records every call that reached it.
//! [`StraightLineDistanceMatrix`] answers every query from haversine
//! distances.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;

use crate::resolver::DEFAULT_CANDIDATE_CAP;
use crate::{
    DistanceMatrixError, DistanceMatrixProvider, DistanceRow, RowElement, TravelEstimate,
    haversine_meters, whole_meters,
};

/// Walking pace used to derive durations, in metres per minute.
const WALKING_METERS_PER_MINUTE: u64 = 80;

/// Estimate a walk equal to the straight-line distance at a steady pace.
#[must_use]
pub fn straight_line_estimate(origin: Coord<f64>, destination: Coord<f64>) -> TravelEstimate {
    let distance_meters = whole_meters(haversine_meters(origin, destination)).unwrap_or(u32::MAX);
    let seconds = (u64::from(distance_meters) * 60).div_euclid(WALKING_METERS_PER_MINUTE);
    TravelEstimate::new(distance_meters, Duration::from_secs(seconds))
}

fn straight_line_row(origin: Coord<f64>, destinations: &[Coord<f64>]) -> DistanceRow {
    destinations
        .iter()
        .map(|&destination| RowElement::Reachable(straight_line_estimate(origin, destination)))
        .collect()
}

/// Provider answering every query with straight-line estimates.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineDistanceMatrix {
    max_destinations: usize,
}

impl StraightLineDistanceMatrix {
    /// Create a provider accepting at most `max_destinations` per call.
    #[must_use]
    pub const fn new(max_destinations: usize) -> Self {
        Self { max_destinations }
    }
}

impl Default for StraightLineDistanceMatrix {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_CAP)
    }
}

#[async_trait]
impl DistanceMatrixProvider for StraightLineDistanceMatrix {
    fn max_destinations(&self) -> usize {
        self.max_destinations
    }

    async fn fetch_row(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<DistanceRow, DistanceMatrixError> {
        Ok(straight_line_row(origin, destinations))
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Row(DistanceRow),
    Error(DistanceMatrixError),
}

/// Provider replaying a queue of scripted answers.
///
/// Each call that passes local validation pops the next answer. Once the
/// queue is empty the provider answers with straight-line estimates.
///
/// # Examples
/// ```
/// use refuge_core::test_support::ScriptedDistanceMatrix;
/// use refuge_core::{DistanceMatrixError, DistanceMatrixProvider, coordinate};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let provider = ScriptedDistanceMatrix::new(25)
///     .then_error(DistanceMatrixError::OverQuota { requested: 3, limit: 2 });
/// let origin = coordinate(41.775, 140.726);
///
/// assert!(provider.query(origin, &[origin]).await.is_err());
/// assert!(provider.query(origin, &[origin]).await.is_ok());
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug)]
pub struct ScriptedDistanceMatrix {
    max_destinations: usize,
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Vec<Coord<f64>>>>,
}

impl ScriptedDistanceMatrix {
    /// Create a provider with an empty script.
    #[must_use]
    pub fn new(max_destinations: usize) -> Self {
        Self {
            max_destinations,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful row.
    #[must_use]
    pub fn then_row(self, row: DistanceRow) -> Self {
        self.push(Scripted::Row(row))
    }

    /// Queue a failure.
    #[must_use]
    pub fn then_error(self, error: DistanceMatrixError) -> Self {
        self.push(Scripted::Error(error))
    }

    fn push(self, answer: Scripted) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(answer);
        self
    }

    /// Number of calls that reached the provider.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Destinations passed to each call, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<Coord<f64>>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DistanceMatrixProvider for ScriptedDistanceMatrix {
    fn max_destinations(&self) -> usize {
        self.max_destinations
    }

    async fn fetch_row(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<DistanceRow, DistanceMatrixError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destinations.to_vec());
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Scripted::Row(row)) => Ok(row),
            Some(Scripted::Error(error)) => Err(error),
            None => Ok(straight_line_row(origin, destinations)),
        }
    }
}
