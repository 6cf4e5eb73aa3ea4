//! `DistanceMatrixProvider` over OSRM's Table API.
//!
//! One query becomes one `GET` request with the origin as the only source.
//! Size and rate limits reported by the service surface as
//! [`DistanceMatrixError::OverQuota`] so the resolver can narrow its search.

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use log::debug;
use refuge_core::{
    DistanceMatrixError, DistanceMatrixProvider, DistanceRow, RowElement, TravelEstimate,
    whole_meters,
};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::osrm::{TOO_BIG, TableResponse};

/// Error type for [`HttpDistanceMatrixProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "refuge-routing/0.1";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "walking";

/// Default destination cap, matching OSRM's default `--max-table-size`.
pub const DEFAULT_MAX_DESTINATIONS: usize = 100;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpDistanceMatrixProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDistanceMatrixConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the request path.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Largest destination count sent in one request.
    pub max_destinations: usize,
}

impl Default for HttpDistanceMatrixConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_destinations: DEFAULT_MAX_DESTINATIONS,
        }
    }
}

impl HttpDistanceMatrixConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the destination cap.
    #[must_use]
    pub fn with_max_destinations(mut self, max_destinations: usize) -> Self {
        self.max_destinations = max_destinations;
        self
    }
}

/// HTTP-based distance matrix provider using the OSRM Table API.
#[derive(Debug, Clone)]
pub struct HttpDistanceMatrixProvider {
    client: Client,
    config: HttpDistanceMatrixConfig,
}

impl HttpDistanceMatrixProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDistanceMatrixConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: HttpDistanceMatrixConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpDistanceMatrixConfig {
        &self.config
    }

    /// Build the Table URL for one origin and its destinations.
    ///
    /// Coordinates are written as `lon,lat`, origin first.
    fn build_table_url(&self, origin: Coord<f64>, destinations: &[Coord<f64>]) -> String {
        let coords: String = std::iter::once(&origin)
            .chain(destinations)
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?sources=0&annotations=duration,distance",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }

    fn over_quota(&self, requested: usize) -> DistanceMatrixError {
        DistanceMatrixError::OverQuota {
            requested,
            limit: self.config.max_destinations,
        }
    }

    /// Convert a reqwest error to a `DistanceMatrixError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> DistanceMatrixError {
        if error.is_timeout() {
            return DistanceMatrixError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return DistanceMatrixError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        DistanceMatrixError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Convert an OSRM response into a row for `requested` destinations.
    fn convert_response(
        &self,
        response: TableResponse,
        requested: usize,
    ) -> Result<DistanceRow, DistanceMatrixError> {
        if !response.is_ok() {
            if response.code == TOO_BIG {
                return Err(self.over_quota(requested));
            }
            return Err(DistanceMatrixError::Service {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let durations = first_row(response.durations, "durations")?;
        let distances = first_row(response.distances, "distances")?;

        // The first cell pairs the origin with itself.
        let row = durations
            .into_iter()
            .zip(distances)
            .skip(1)
            .map(|(duration, distance)| element(duration, distance))
            .collect();
        Ok(row)
    }
}

fn first_row(
    matrix: Option<Vec<Vec<Option<f64>>>>,
    field: &str,
) -> Result<Vec<Option<f64>>, DistanceMatrixError> {
    matrix
        .and_then(|rows| rows.into_iter().next())
        .ok_or_else(|| DistanceMatrixError::Parse {
            message: format!("OSRM response missing {field} row"),
        })
}

/// Null, negative, NaN, infinite, or out-of-range cells mark the destination
/// unreachable.
fn element(duration: Option<f64>, distance: Option<f64>) -> RowElement {
    let usable = |value: &f64| *value >= 0.0 && value.is_finite();
    duration
        .filter(usable)
        .zip(distance.filter(usable))
        .and_then(|(seconds, meters)| {
            let duration = Duration::try_from_secs_f64(seconds).ok()?;
            Some(TravelEstimate::new(whole_meters(meters)?, duration))
        })
        .map_or(RowElement::Unreachable, RowElement::Reachable)
}

#[async_trait]
impl DistanceMatrixProvider for HttpDistanceMatrixProvider {
    fn max_destinations(&self) -> usize {
        self.config.max_destinations
    }

    async fn fetch_row(
        &self,
        origin: Coord<f64>,
        destinations: &[Coord<f64>],
    ) -> Result<DistanceRow, DistanceMatrixError> {
        let url = self.build_table_url(origin, destinations);
        debug!("requesting OSRM table for {} destinations", destinations.len());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(self.over_quota(destinations.len()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        // OSRM reports application errors with a JSON body on 4xx statuses.
        match serde_json::from_slice::<TableResponse>(&body) {
            Ok(table) => self.convert_response(table, destinations.len()),
            Err(_) if !status.is_success() => Err(DistanceMatrixError::Http {
                url,
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_owned(),
            }),
            Err(err) => Err(DistanceMatrixError::Parse {
                message: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refuge_core::coordinate;
    use rstest::{fixture, rstest};

    use crate::routing::test_support::CannedTableServer;

    #[fixture]
    fn provider() -> HttpDistanceMatrixProvider {
        HttpDistanceMatrixProvider::new("http://osrm.example.com").expect("provider should build")
    }

    fn table(durations: Vec<Option<f64>>, distances: Vec<Option<f64>>) -> TableResponse {
        TableResponse {
            code: "Ok".to_string(),
            message: None,
            durations: Some(vec![durations]),
            distances: Some(vec![distances]),
        }
    }

    #[rstest]
    fn build_table_url_puts_origin_first(provider: HttpDistanceMatrixProvider) {
        let url = provider.build_table_url(
            coordinate(41.5, 140.5),
            &[coordinate(41.6, 140.6), coordinate(41.7, 140.7)],
        );

        assert_eq!(
            url,
            "http://osrm.example.com/table/v1/walking/140.5,41.5;140.6,41.6;140.7,41.7\
             ?sources=0&annotations=duration,distance"
        );
    }

    #[rstest]
    fn build_table_url_uses_profile_and_strips_trailing_slash() {
        let provider = HttpDistanceMatrixProvider::with_config(
            HttpDistanceMatrixConfig::new("http://osrm.example.com/").with_profile("foot"),
        )
        .expect("provider should build");

        let url = provider.build_table_url(coordinate(0.0, 0.0), &[coordinate(1.0, 1.0)]);

        assert!(url.starts_with("http://osrm.example.com/table/v1/foot/"));
    }

    #[rstest]
    fn convert_response_skips_origin_cell(provider: HttpDistanceMatrixProvider) {
        let response = table(
            vec![Some(0.0), Some(120.0), None],
            vec![Some(0.0), Some(160.4), Some(300.0)],
        );

        let row = provider.convert_response(response, 2).expect("should parse");

        assert_eq!(
            row,
            vec![
                RowElement::Reachable(TravelEstimate::new(160, Duration::from_secs(120))),
                RowElement::Unreachable,
            ]
        );
    }

    #[rstest]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    #[case::beyond_duration_range(1e20)]
    fn convert_response_marks_invalid_cells_unreachable(
        provider: HttpDistanceMatrixProvider,
        #[case] bad: f64,
    ) {
        let response = table(vec![Some(0.0), Some(bad)], vec![Some(0.0), Some(10.0)]);

        let row = provider.convert_response(response, 1).expect("should parse");

        assert_eq!(row, vec![RowElement::Unreachable]);
    }

    #[rstest]
    #[case::beyond_u32(1e12)]
    #[case::infinite(f64::INFINITY)]
    fn convert_response_marks_oversized_distances_unreachable(
        provider: HttpDistanceMatrixProvider,
        #[case] bad: f64,
    ) {
        let response = table(vec![Some(0.0), Some(60.0)], vec![Some(0.0), Some(bad)]);

        let row = provider.convert_response(response, 1).expect("should parse");

        assert_eq!(row, vec![RowElement::Unreachable]);
    }

    #[rstest]
    fn too_big_maps_to_over_quota(provider: HttpDistanceMatrixProvider) {
        let response = TableResponse {
            code: TOO_BIG.to_string(),
            message: Some("Too many table coordinates".to_string()),
            durations: None,
            distances: None,
        };

        let err = provider.convert_response(response, 150).expect_err("should fail");

        assert_eq!(
            err,
            DistanceMatrixError::OverQuota {
                requested: 150,
                limit: DEFAULT_MAX_DESTINATIONS
            }
        );
        assert_eq!(err.status(), refuge_core::CallStatus::OverQuota);
    }

    #[rstest]
    fn other_codes_map_to_service_error(provider: HttpDistanceMatrixProvider) {
        let response = TableResponse {
            code: "InvalidQuery".to_string(),
            message: Some("Coordinates are invalid".to_string()),
            durations: None,
            distances: None,
        };

        let err = provider.convert_response(response, 1).expect_err("should fail");

        assert_eq!(
            err,
            DistanceMatrixError::Service {
                code: "InvalidQuery".to_string(),
                message: "Coordinates are invalid".to_string()
            }
        );
    }

    #[rstest]
    fn missing_distances_is_a_parse_error(provider: HttpDistanceMatrixProvider) {
        let response = TableResponse {
            code: "Ok".to_string(),
            message: None,
            durations: Some(vec![vec![Some(0.0), Some(1.0)]]),
            distances: None,
        };

        let err = provider.convert_response(response, 1).expect_err("should fail");

        assert!(matches!(err, DistanceMatrixError::Parse { .. }));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpDistanceMatrixConfig::new("http://example.com")
            .with_profile("foot")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0")
            .with_max_destinations(25);

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.profile, "foot");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.max_destinations, 25);
    }

    #[tokio::test]
    async fn fetches_row_over_http() {
        let server = CannedTableServer::start(
            200,
            r#"{"code":"Ok","durations":[[0,90,null]],"distances":[[0,120,null]]}"#,
        )
        .await
        .expect("server should start");
        let provider =
            HttpDistanceMatrixProvider::new(server.base_url()).expect("provider should build");

        let row = provider
            .query(
                coordinate(41.775, 140.726),
                &[coordinate(41.776, 140.726), coordinate(41.777, 140.726)],
            )
            .await
            .expect("query should succeed");

        assert_eq!(
            row,
            vec![
                RowElement::Reachable(TravelEstimate::new(120, Duration::from_secs(90))),
                RowElement::Unreachable,
            ]
        );
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("/table/v1/walking/140.726,41.775;"));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_over_quota() {
        let server = CannedTableServer::start(429, "slow down")
            .await
            .expect("server should start");
        let provider = HttpDistanceMatrixProvider::with_config(
            HttpDistanceMatrixConfig::new(server.base_url()).with_max_destinations(10),
        )
        .expect("provider should build");

        let err = provider
            .query(coordinate(0.0, 0.0), &[coordinate(0.001, 0.0)])
            .await
            .expect_err("should fail");

        assert_eq!(
            err,
            DistanceMatrixError::OverQuota {
                requested: 1,
                limit: 10
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_status_maps_to_http_error() {
        let server = CannedTableServer::start(502, "<html>bad gateway</html>")
            .await
            .expect("server should start");
        let provider =
            HttpDistanceMatrixProvider::new(server.base_url()).expect("provider should build");

        let err = provider
            .query(coordinate(0.0, 0.0), &[coordinate(0.001, 0.0)])
            .await
            .expect_err("should fail");

        assert!(matches!(err, DistanceMatrixError::Http { status: 502, .. }));
    }

    #[tokio::test]
    async fn requests_over_the_cap_never_reach_the_server() {
        let server = CannedTableServer::start(200, "{}")
            .await
            .expect("server should start");
        let provider = HttpDistanceMatrixProvider::with_config(
            HttpDistanceMatrixConfig::new(server.base_url()).with_max_destinations(1),
        )
        .expect("provider should build");

        let err = provider
            .query(coordinate(0.0, 0.0), &[coordinate(0.001, 0.0), coordinate(0.002, 0.0)])
            .await
            .expect_err("should fail");

        assert!(matches!(err, DistanceMatrixError::OverQuota { requested: 2, limit: 1 }));
        assert!(server.requests().is_empty());
    }
}
