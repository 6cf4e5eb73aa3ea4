//! Error types emitted by the refuge CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use refuge_core::ResolverConfigError;
use refuge_data::CatalogLoadError;
use refuge_data::routing::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the refuge CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The origin lies outside valid latitude and longitude ranges.
    #[error("origin {lat},{lng} is not a valid coordinate")]
    InvalidOrigin { lat: f64, lng: f64 },
    /// Radii or cap overrides are inconsistent.
    #[error("invalid resolver settings: {0}")]
    InvalidResolverConfig(#[from] ResolverConfigError),
    /// A referenced catalog path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced catalog path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A catalog file could not be loaded.
    #[error(transparent)]
    LoadCatalog(#[from] CatalogLoadError),
    /// Constructing the distance matrix provider failed.
    #[error("failed to build distance provider for {base_url:?}: {source}")]
    BuildDistanceProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The async runtime could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The route preview link could not be built.
    #[error("failed to build directions link: {0}")]
    DirectionsUrl(#[source] url::ParseError),
    /// Serializing the resolution failed.
    #[error("failed to serialize resolution: {0}")]
    SerializeResolution(#[source] serde_json::Error),
    /// Writing the resolution failed.
    #[error("failed to write resolution: {0}")]
    WriteOutput(#[source] std::io::Error),
}
