//! Test helpers for writing catalog files and stubbing the routing service.

use super::*;
use crate::nearest::{DistanceProviderBuilder, NearestConfig};
use camino::{Utf8Path, Utf8PathBuf};
use refuge_core::DistanceMatrixProvider;
use refuge_data::routing::HttpDistanceMatrixConfig;
use std::cell::RefCell;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// Origin shared by the CLI fixtures: Hakodate station forecourt.
pub(super) const ORIGIN_LAT: f64 = 41.7735;
pub(super) const ORIGIN_LNG: f64 = 140.7262;

/// Latitude offset of roughly `meters` north of the origin.
pub(super) fn lat_north(meters: f64) -> f64 {
    ORIGIN_LAT + meters / 111_195.0
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &str) {
    fs::write(path, contents).expect("write fixture file");
}

/// Temporary directory holding a buildings catalog and an evacuation point
/// catalog around the fixture origin.
pub(super) struct CatalogFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
    destinations: Utf8PathBuf,
    evac_points: Utf8PathBuf,
}

impl CatalogFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let destinations = root.join("destinations.json");
        let evac_points = root.join("evac_points.json");
        write_utf8(
            &destinations,
            &format!(
                r#"[
                    {{"name": "Civic Hall", "name_en": "Civic Hall", "location": {{"lat": {}, "lng": {ORIGIN_LNG}}}}},
                    {{"name": "Harbour School", "lat": {}, "lng": {ORIGIN_LNG}}}
                ]"#,
                lat_north(300.0),
                lat_north(450.0),
            ),
        );
        write_utf8(
            &evac_points,
            &format!(
                r#"[{{"name": "Station Square", "lat": {}, "lng": {ORIGIN_LNG}}}]"#,
                lat_north(120.0),
            ),
        );
        Self {
            _dir: dir,
            root,
            destinations,
            evac_points,
        }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn destinations(&self) -> &Utf8Path {
        &self.destinations
    }

    pub(super) fn evac_points(&self) -> &Utf8Path {
        &self.evac_points
    }

    /// Arguments pointing at the origin and both catalogs.
    pub(super) fn args(&self) -> NearestArgs {
        NearestArgs {
            lat: Some(ORIGIN_LAT),
            lng: Some(ORIGIN_LNG),
            destinations: Some(self.destinations.clone()),
            evac_points: Some(self.evac_points.clone()),
            ..NearestArgs::default()
        }
    }
}

/// Builder handing out a fixed provider and recording the routing settings
/// it was asked to honour.
pub(super) struct StubProviderBuilder {
    provider: Arc<dyn DistanceMatrixProvider>,
    seen: RefCell<Option<HttpDistanceMatrixConfig>>,
}

impl StubProviderBuilder {
    pub(super) fn new(provider: Arc<dyn DistanceMatrixProvider>) -> Self {
        Self {
            provider,
            seen: RefCell::new(None),
        }
    }

    pub(super) fn seen(&self) -> Option<HttpDistanceMatrixConfig> {
        self.seen.borrow().clone()
    }
}

impl DistanceProviderBuilder for StubProviderBuilder {
    fn build(&self, config: &NearestConfig) -> Result<Arc<dyn DistanceMatrixProvider>, CliError> {
        self.seen.replace(Some(config.routing.clone()));
        Ok(Arc::clone(&self.provider))
    }
}
