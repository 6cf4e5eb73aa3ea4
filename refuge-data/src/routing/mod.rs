//! HTTP distance matrix provider backed by an OSRM routing service.
//!
//! [`HttpDistanceMatrixProvider`] implements
//! [`refuge_core::DistanceMatrixProvider`] with one OSRM Table request per
//! query: the origin is the single source and every candidate is a
//! destination.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use refuge_core::{DistanceMatrixProvider, coordinate};
//! use refuge_data::routing::{HttpDistanceMatrixConfig, HttpDistanceMatrixProvider};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpDistanceMatrixConfig::new("http://localhost:5000")
//!     .with_profile("foot")
//!     .with_timeout(Duration::from_secs(10));
//! let provider = HttpDistanceMatrixProvider::with_config(config)?;
//!
//! let origin = coordinate(41.775, 140.726);
//! let row = provider.query(origin, &[coordinate(41.770, 140.720)]).await?;
//! println!("{:?}", row[0]);
//! # Ok(())
//! # }
//! ```

mod osrm;
mod provider;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_MAX_DESTINATIONS, DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpDistanceMatrixConfig,
    HttpDistanceMatrixProvider, ProviderBuildError,
};
