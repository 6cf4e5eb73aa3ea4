//! Core domain logic for resolving the nearest evacuation destination.
//!
//! Given an origin and a catalog of destinations, the crate narrows the
//! catalog to a bounded candidate set, asks a [`DistanceMatrixProvider`] for
//! walking distances, and reduces the answer to a single destination. When the
//! provider is unusable the resolver degrades to straight-line distance rather
//! than failing.
//!
//! Boundaries:
//! - No I/O. Catalog loading and HTTP adapters live in `refuge-data`.
//! - Coordinates are WGS84 [`geo::Coord`] values with `x = longitude` and
//!   `y = latitude`.
//!
//! # Examples
//!
//! ```
//! use refuge_core::{Catalog, Destination, Outcome, Resolver, ResolverConfig, coordinate};
//! use refuge_core::test_support::StraightLineDistanceMatrix;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let catalog = Catalog::from_destinations(vec![Destination::new(
//!     "Central School",
//!     coordinate(41.7760, 140.7260),
//! )]);
//! let resolver = Resolver::new(StraightLineDistanceMatrix::default(), ResolverConfig::default());
//! let resolution = resolver.resolve(coordinate(41.7750, 140.7260), &catalog).await;
//! assert_eq!(resolution.result.outcome, Outcome::Found);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod candidates;
pub mod controller;
mod destination;
pub mod distance_matrix;
pub mod geodesy;
pub mod resolver;
pub mod selection;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use candidates::{Candidate, collect};
pub use controller::{CurrentResolution, Dispatch, ResolutionController, ResolutionEvent};
#[cfg(feature = "serde")]
pub use destination::lat_lng;
pub use destination::{Catalog, Destination, coordinate};
pub use distance_matrix::{
    CallStatus, DistanceMatrixError, DistanceMatrixProvider, DistanceRow, RowElement,
    TravelEstimate,
};
pub use geodesy::{EARTH_RADIUS_METERS, haversine_meters, whole_meters};
pub use resolver::{
    Attempt, Outcome, Resolution, ResolutionNotice, ResolutionResult, Resolver, ResolverConfig,
    ResolverConfigError, Tier,
};
pub use selection::{Selection, nearest_straight_line, reduce};
