//! Nearest command implementation for the refuge CLI.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geo::Coord;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use refuge_core::resolver::{
    DEFAULT_CANDIDATE_CAP, DEFAULT_FALLBACK_RADIUS_METERS, DEFAULT_PRIMARY_RADIUS_METERS,
};
use refuge_core::{
    Catalog, DistanceMatrixProvider, Outcome, Resolution, Resolver, ResolverConfig, coordinate,
};
use refuge_data::routing::{
    DEFAULT_MAX_DESTINATIONS, HttpDistanceMatrixConfig, HttpDistanceMatrixProvider,
};
use refuge_data::{load_catalog_file, walking_directions_url};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CANDIDATE_CAP, ARG_DESTINATIONS, ARG_EVAC_POINTS, ARG_FALLBACK_RADIUS, ARG_LAT, ARG_LNG,
    ARG_MAX_DESTINATIONS, ARG_OSRM_BASE_URL, ARG_PRIMARY_RADIUS, ARG_TIMEOUT_SECS, CliError,
    ENV_DESTINATIONS, ENV_LAT, ENV_LNG,
};

/// CLI arguments for the `nearest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "nearest",
    long_about = "Resolve the nearest evacuation destination reachable on foot. \
                 Catalogs are JSON arrays of destinations; walking distances \
                 come from an OSRM table service. Values can come from CLI \
                 flags, configuration files, or environment variables.",
    about = "Find the nearest evacuation destination",
    allow_negative_numbers = true
)]
#[ortho_config(prefix = "REFUGE")]
pub(crate) struct NearestArgs {
    /// Origin latitude in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees")]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Origin longitude in degrees.
    #[arg(long = ARG_LNG, value_name = "degrees")]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Catalog of building destinations (JSON array).
    #[arg(long = ARG_DESTINATIONS, value_name = "path")]
    #[serde(default)]
    pub(crate) destinations: Option<Utf8PathBuf>,
    /// Catalog of evacuation points (JSON array).
    #[arg(long = ARG_EVAC_POINTS, value_name = "path")]
    #[serde(default)]
    pub(crate) evac_points: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Radius of the first search, in metres.
    #[arg(long = ARG_PRIMARY_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) primary_radius: Option<u32>,
    /// Radius of the narrower retry, in metres.
    #[arg(long = ARG_FALLBACK_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) fallback_radius: Option<u32>,
    /// Most candidates sent to the routing service.
    #[arg(long = ARG_CANDIDATE_CAP, value_name = "count")]
    #[serde(default)]
    pub(crate) candidate_cap: Option<usize>,
    /// Largest table the routing service accepts.
    #[arg(long = ARG_MAX_DESTINATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_destinations: Option<usize>,
    /// Routing request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl NearestArgs {
    pub(crate) fn into_config(self) -> Result<NearestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearestConfig::try_from(merged)
    }
}

/// Resolved `nearest` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearestConfig {
    /// Origin with `x = longitude`, `y = latitude`.
    pub(crate) origin: Coord<f64>,
    /// Catalog files in merge order, tagged with their flag name.
    pub(crate) sources: Vec<(&'static str, Utf8PathBuf)>,
    /// Routing service settings.
    pub(crate) routing: HttpDistanceMatrixConfig,
    /// Radii and cap for the resolver.
    pub(crate) resolver: ResolverConfig,
}

impl NearestConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        for (field, path) in &self.sources {
            Self::require_existing(path, field)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match refuge_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<NearestArgs> for NearestConfig {
    type Error = CliError;

    fn try_from(args: NearestArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_LNG,
        })?;
        if !(lat.is_finite() && (-90.0..=90.0).contains(&lat))
            || !(lng.is_finite() && (-180.0..=180.0).contains(&lng))
        {
            return Err(CliError::InvalidOrigin { lat, lng });
        }

        let sources: Vec<_> = [
            (ARG_DESTINATIONS, args.destinations),
            (ARG_EVAC_POINTS, args.evac_points),
        ]
        .into_iter()
        .filter_map(|(field, path)| path.map(|path| (field, path)))
        .collect();
        if sources.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_DESTINATIONS,
                env: ENV_DESTINATIONS,
            });
        }

        let resolver = ResolverConfig::new(
            args.primary_radius.unwrap_or(DEFAULT_PRIMARY_RADIUS_METERS),
            args.fallback_radius.unwrap_or(DEFAULT_FALLBACK_RADIUS_METERS),
            args.candidate_cap.unwrap_or(DEFAULT_CANDIDATE_CAP),
        )?;

        let mut routing = HttpDistanceMatrixConfig::default()
            .with_max_destinations(args.max_destinations.unwrap_or(DEFAULT_MAX_DESTINATIONS));
        if let Some(base_url) = args.osrm_base_url {
            routing.base_url = base_url;
        }
        if let Some(secs) = args.timeout_secs {
            routing = routing.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            origin: coordinate(lat, lng),
            sources,
            routing,
            resolver,
        })
    }
}

/// Builds the distance provider for the current invocation.
pub(super) trait DistanceProviderBuilder {
    fn build(&self, config: &NearestConfig) -> Result<Arc<dyn DistanceMatrixProvider>, CliError>;
}

pub(super) struct HttpProviderBuilder;

impl DistanceProviderBuilder for HttpProviderBuilder {
    fn build(&self, config: &NearestConfig) -> Result<Arc<dyn DistanceMatrixProvider>, CliError> {
        let provider =
            HttpDistanceMatrixProvider::with_config(config.routing.clone()).map_err(|source| {
                CliError::BuildDistanceProvider {
                    base_url: config.routing.base_url.clone(),
                    source,
                }
            })?;
        Ok(Arc::new(provider))
    }
}

/// JSON document written to stdout.
#[derive(Debug, Serialize)]
pub(super) struct NearestOutput<'a> {
    #[serde(flatten)]
    pub(super) resolution: &'a Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) directions_url: Option<String>,
}

pub(super) fn run_nearest(args: NearestArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_nearest_with(args, &HttpProviderBuilder, &mut stdout)
}

pub(super) fn run_nearest_with(
    args: NearestArgs,
    builder: &dyn DistanceProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_nearest_config(args)?;
    let catalog = load_catalog(&config)?;
    let provider = builder.build(&config)?;
    let resolution = resolve(&config, provider, &catalog)?;
    write_resolution(writer, &config, &resolution)
}

fn resolve_nearest_config(args: NearestArgs) -> Result<NearestConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Merge every configured catalog file, destinations first.
pub(super) fn load_catalog(config: &NearestConfig) -> Result<Catalog, CliError> {
    let mut catalog = Catalog::expecting(config.sources.len());
    for (_, path) in &config.sources {
        catalog.merge_source(load_catalog_file(path)?);
    }
    info!("catalog ready with {} destinations", catalog.len());
    Ok(catalog)
}

fn resolve(
    config: &NearestConfig,
    provider: Arc<dyn DistanceMatrixProvider>,
    catalog: &Catalog,
) -> Result<Resolution, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let resolver = Resolver::new(provider, config.resolver);
    let resolution = runtime.block_on(resolver.resolve(config.origin, catalog));

    if resolution.result.outcome == Outcome::DegradedStraightLine {
        warn!("walking distances unavailable; chose by straight-line distance");
    } else {
        info!(
            "resolved {:?} within {}m after {} attempt(s)",
            resolution.result.outcome,
            resolution.result.radius_meters,
            resolution.attempts.len()
        );
    }
    Ok(resolution)
}

fn write_resolution(
    writer: &mut dyn Write,
    config: &NearestConfig,
    resolution: &Resolution,
) -> Result<(), CliError> {
    let directions_url = resolution
        .result
        .selected
        .as_ref()
        .map(|destination| walking_directions_url(config.origin, destination.location))
        .transpose()
        .map_err(CliError::DirectionsUrl)?
        .map(String::from);
    let output = NearestOutput {
        resolution,
        directions_url,
    };
    let payload =
        serde_json::to_string_pretty(&output).map_err(CliError::SerializeResolution)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NearestConfig, CliError> {
    let merged = NearestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NearestConfig::try_from(merged)
}
