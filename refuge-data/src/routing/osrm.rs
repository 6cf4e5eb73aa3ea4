//! OSRM API response types for the Table service.
//!
//! Requests use `sources=0`, so the response holds a single row. The first
//! cell of that row is the origin itself.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// Status code OSRM returns when a table exceeds `--max-table-size`.
pub const TOO_BIG: &str = "TooBig";

/// OSRM Table API response.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"TooBig"` - The table exceeds the server's size limit
    /// - `"NoTable"` - Table computation failed
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Durations in seconds; `null` where no route exists.
    pub durations: Option<Vec<Vec<Option<f64>>>>,

    /// Distances in metres; `null` where no route exists.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}
