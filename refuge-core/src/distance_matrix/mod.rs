//! Query walking distances from one origin to many destinations.
//!
//! The [`DistanceMatrixProvider`] trait abstracts a one-to-many travel
//! distance service. Callers hand over an origin and a slice of destination
//! coordinates and receive one [`RowElement`] per destination, in order.
//!
//! Providers enforce a per-call destination cap. Requests beyond the cap fail
//! with [`DistanceMatrixError::OverQuota`] before any network traffic, and
//! callers treat that as a capacity signal rather than a hard failure.

mod error;
mod provider;

pub use error::{CallStatus, DistanceMatrixError};
pub use provider::{DistanceMatrixProvider, DistanceRow, RowElement, TravelEstimate, duration_text};
