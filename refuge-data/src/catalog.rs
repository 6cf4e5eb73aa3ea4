//! Destination catalog loading.
//!
//! Catalog sources are JSON arrays. Each record carries a `name`, an optional
//! `name_en`, and a position given either as a nested `location` object or as
//! top-level `lat`/`lng` fields. A nested value wins over a top-level one,
//! field by field. Records are normalised into [`Destination`] values in
//! source order.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use refuge_core::{Destination, coordinate};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a catalog source.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The source could not be opened or read.
    #[error("failed to read catalog {path}")]
    Open {
        /// Path of the source.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The source is not a JSON array of destination records.
    #[error("failed to parse catalog {path}")]
    Parse {
        /// Path of the source, or `-` when parsed from a reader.
        path: Utf8PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// A record is missing a coordinate or carries one out of range.
    #[error("destination {index} ({name}) has an invalid coordinate")]
    InvalidCoordinate {
        /// Zero-based position of the record in its source.
        index: usize,
        /// Name of the offending record.
        name: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDestination {
    name: String,
    #[serde(default)]
    name_en: Option<String>,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
}

fn valid_lat(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

fn valid_lng(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

impl RawDestination {
    fn normalise(self, index: usize) -> Result<Destination, CatalogLoadError> {
        let nested = self.location.as_ref();
        let lat = nested.and_then(|loc| loc.lat).or(self.lat);
        let lng = nested.and_then(|loc| loc.lng).or(self.lng);
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return Err(CatalogLoadError::InvalidCoordinate {
                index,
                name: self.name,
            });
        };
        if !valid_lat(lat) || !valid_lng(lng) {
            return Err(CatalogLoadError::InvalidCoordinate {
                index,
                name: self.name,
            });
        }
        let destination = Destination::new(self.name, coordinate(lat, lng));
        Ok(match self.name_en {
            Some(name_en) => destination.with_name_en(name_en),
            None => destination,
        })
    }
}

fn normalise_all(
    path: &Utf8Path,
    records: Result<Vec<RawDestination>, serde_json::Error>,
) -> Result<Vec<Destination>, CatalogLoadError> {
    let records = records.map_err(|source| CatalogLoadError::Parse {
        path: path.to_owned(),
        source,
    })?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.normalise(index))
        .collect()
}

/// Parse a catalog from any reader.
///
/// # Examples
/// ```
/// use refuge_data::parse_catalog;
///
/// let json = r#"[
///     {"name": "函館市役所", "name_en": "City Hall", "location": {"lat": 41.7687, "lng": 140.7288}},
///     {"name": "Motomachi Park", "lat": 41.7654, "lng": 140.7101}
/// ]"#;
/// let destinations = parse_catalog(json.as_bytes())?;
///
/// assert_eq!(destinations[0].name_en, "City Hall");
/// assert_eq!(destinations[1].name_en, "Motomachi Park");
/// # Ok::<(), refuge_data::CatalogLoadError>(())
/// ```
///
/// # Errors
///
/// Returns [`CatalogLoadError::Parse`] for malformed JSON and
/// [`CatalogLoadError::InvalidCoordinate`] for unusable positions.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<Destination>, CatalogLoadError> {
    normalise_all(Utf8Path::new("-"), serde_json::from_reader(reader))
}

/// Load and normalise the catalog stored at `path`.
///
/// # Errors
///
/// Returns [`CatalogLoadError::Open`] when the file cannot be read, otherwise
/// the errors of [`parse_catalog`].
pub fn load_catalog_file(path: &Utf8Path) -> Result<Vec<Destination>, CatalogLoadError> {
    let contents = refuge_fs::read_utf8_file(path).map_err(|source| CatalogLoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    let destinations = normalise_all(path, serde_json::from_str(&contents))?;
    info!("loaded {} destinations from {path}", destinations.len());
    Ok(destinations)
}
