//! Facade crate for the refuge nearest-destination engine.
//!
//! This crate re-exports the core resolution types and, behind the `http`
//! feature, the catalog loaders and the OSRM-backed distance provider.

#![forbid(unsafe_code)]

pub use refuge_core::{
    Attempt, CallStatus, Candidate, Catalog, Destination, DistanceMatrixError,
    DistanceMatrixProvider, DistanceRow, Outcome, Resolution, ResolutionController,
    ResolutionNotice, ResolutionResult, Resolver, ResolverConfig, RowElement, Tier, coordinate,
    haversine_meters,
};

#[cfg(feature = "http")]
pub use refuge_data::routing::{HttpDistanceMatrixConfig, HttpDistanceMatrixProvider};

#[cfg(feature = "http")]
pub use refuge_data::{CatalogLoadError, load_catalog_file, parse_catalog, walking_directions_url};
