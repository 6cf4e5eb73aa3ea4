//! Data access for refuge: catalog files and the OSRM distance adapter.
//!
//! Responsibilities:
//! - Load destination catalogs from JSON sources and normalise their shapes.
//! - Provide an HTTP [`refuge_core::DistanceMatrixProvider`] backed by OSRM.
//! - Build outbound links for route previews.
//!
//! Boundaries:
//! - Do not encode resolution rules (live in `refuge-core`).
//! - Keep blocking I/O out of async paths; the HTTP client is fully async.

pub mod catalog;
mod links;
pub mod routing;

pub use catalog::{CatalogLoadError, load_catalog_file, parse_catalog};
pub use links::walking_directions_url;
