//! Radius filtering and straight-line ranking of catalog destinations.

use geo::Coord;

use crate::{Destination, haversine_meters};

/// A destination annotated with its straight-line distance from the origin.
///
/// Candidates borrow from the catalog they were collected from and are
/// recomputed for every resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    /// Position of the destination within the catalog.
    pub catalog_index: usize,
    /// The destination itself.
    pub destination: &'a Destination,
    /// Haversine distance from the origin, in metres.
    pub straight_line_meters: f64,
}

/// Collect destinations within `radius_meters` of `origin`, nearest first.
///
/// Destinations exactly on the radius are kept. Equal distances retain
/// catalog order.
///
/// # Examples
/// ```
/// use refuge_core::{Destination, collect, coordinate};
///
/// let origin = coordinate(41.775, 140.726);
/// let catalog = vec![
///     Destination::new("far", coordinate(41.800, 140.726)),
///     Destination::new("near", coordinate(41.776, 140.726)),
/// ];
///
/// let candidates = collect(origin, 700, &catalog);
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates[0].destination.name, "near");
/// ```
#[must_use]
pub fn collect(origin: Coord<f64>, radius_meters: u32, catalog: &[Destination]) -> Vec<Candidate<'_>> {
    let radius = f64::from(radius_meters);
    let mut candidates: Vec<Candidate<'_>> = catalog
        .iter()
        .enumerate()
        .map(|(catalog_index, destination)| Candidate {
            catalog_index,
            destination,
            straight_line_meters: haversine_meters(origin, destination.location),
        })
        .filter(|candidate| candidate.straight_line_meters <= radius)
        .collect();
    // `sort_by` is stable, which keeps catalog order on ties.
    candidates.sort_by(|a, b| a.straight_line_meters.total_cmp(&b.straight_line_meters));
    candidates
}

/// Keep only the `limit` nearest entries of an already ranked candidate set.
pub fn nearest(candidates: &mut Vec<Candidate<'_>>, limit: usize) {
    candidates.truncate(limit);
}
