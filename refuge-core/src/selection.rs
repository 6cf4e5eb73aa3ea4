//! Pick a single destination from ranked candidates.
//!
//! Both reducers are deterministic: ties go to the earliest candidate.

use crate::{Candidate, RowElement};

/// The destination chosen from a distance matrix row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Index into the candidate slice handed to [`reduce`].
    pub index: usize,
    /// Walking distance reported by the provider, in metres.
    pub distance_meters: u32,
    /// Display form of the walking time.
    pub duration_text: String,
}

/// Select the reachable candidate with the shortest walking distance.
///
/// Unreachable elements are skipped. Returns `None` when no element is
/// usable, in which case callers fall back to [`nearest_straight_line`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use refuge_core::{Destination, RowElement, TravelEstimate, collect, coordinate, reduce};
///
/// let origin = coordinate(41.775, 140.726);
/// let catalog = vec![
///     Destination::new("a", coordinate(41.776, 140.726)),
///     Destination::new("b", coordinate(41.777, 140.726)),
/// ];
/// let candidates = collect(origin, 700, &catalog);
/// let row = vec![
///     RowElement::Unreachable,
///     RowElement::Reachable(TravelEstimate::new(260, Duration::from_secs(200))),
/// ];
///
/// let selection = reduce(&candidates, &row).expect("one element is reachable");
/// assert_eq!(selection.index, 1);
/// assert_eq!(selection.distance_meters, 260);
/// ```
#[must_use]
pub fn reduce(candidates: &[Candidate<'_>], row: &[RowElement]) -> Option<Selection> {
    let mut best: Option<Selection> = None;
    for (index, element) in row.iter().enumerate().take(candidates.len()) {
        let Some(estimate) = element.estimate() else {
            continue;
        };
        let improves = best
            .as_ref()
            .is_none_or(|current| estimate.distance_meters < current.distance_meters);
        if improves {
            best = Some(Selection {
                index,
                distance_meters: estimate.distance_meters,
                duration_text: estimate.duration_text.clone(),
            });
        }
    }
    best
}

/// Select the candidate with the smallest straight-line distance.
///
/// Used in degraded mode when walking distances are unavailable.
#[must_use]
pub fn nearest_straight_line<'c, 'a>(candidates: &'c [Candidate<'a>]) -> Option<&'c Candidate<'a>> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(current) if current.straight_line_meters <= candidate.straight_line_meters => {
            Some(current)
        }
        _ => Some(candidate),
    })
}
