//! Behavioural tests for [`HttpDistanceMatrixProvider`].
//!
//! Each scenario talks to a loopback [`CannedTableServer`] rather than a
//! running OSRM service.

use std::cell::RefCell;
use std::net::TcpListener;
use std::time::Duration;

use refuge_core::{
    CallStatus, DistanceMatrixError, DistanceMatrixProvider, DistanceRow, RowElement, coordinate,
};
use refuge_data::routing::test_support::CannedTableServer;
use refuge_data::routing::{HttpDistanceMatrixConfig, HttpDistanceMatrixProvider};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

/// Result cell holding the outcome of a distance query.
type ResultCell = RefCell<Option<Result<DistanceRow, DistanceMatrixError>>>;

/// Destination cap configured on every provider under test.
const MAX_DESTINATIONS: usize = 3;

/// World state for provider scenarios.
struct ProviderWorld {
    runtime: Runtime,
    server: RefCell<Option<CannedTableServer>>,
    base_url: RefCell<Option<String>>,
    result: ResultCell,
}

#[fixture]
fn world() -> ProviderWorld {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build");
    ProviderWorld {
        runtime,
        server: RefCell::new(None),
        base_url: RefCell::new(None),
        result: RefCell::new(None),
    }
}

impl ProviderWorld {
    fn install(&self, server: std::io::Result<CannedTableServer>) {
        let server = server.expect("server should start");
        self.base_url.replace(Some(server.base_url().to_owned()));
        self.server.replace(Some(server));
    }

    fn with_result<R>(&self, check: impl FnOnce(&Result<DistanceRow, DistanceMatrixError>) -> R) -> R {
        let borrowed = self.result.borrow();
        check(borrowed.as_ref().expect("query must have run"))
    }
}

// --- Given steps ---

#[given("a routing service returning a row with one unreachable destination")]
fn service_with_row(world: &ProviderWorld) {
    let server = world.runtime.block_on(CannedTableServer::start(
        200,
        r#"{"code":"Ok","durations":[[0,60,null]],"distances":[[0,80,null]]}"#,
    ));
    world.install(server);
}

#[given("a routing service rejecting the table as too big")]
fn service_too_big(world: &ProviderWorld) {
    let server = world.runtime.block_on(CannedTableServer::start(
        400,
        r#"{"code":"TooBig","message":"Too many table coordinates"}"#,
    ));
    world.install(server);
}

#[given("a routing service that never answers")]
fn service_silent(world: &ProviderWorld) {
    let server = world.runtime.block_on(CannedTableServer::silent());
    world.install(server);
}

#[given("a routing service that is not listening")]
fn service_down(world: &ProviderWorld) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    world.base_url.replace(Some(format!("http://{addr}")));
}

// --- When steps ---

#[when("I query walking distances to {count} destinations")]
fn query(world: &ProviderWorld, count: usize) {
    let base_url = world
        .base_url
        .borrow()
        .clone()
        .expect("routing service must be configured");
    let provider = HttpDistanceMatrixProvider::with_config(
        HttpDistanceMatrixConfig::new(base_url)
            .with_timeout(Duration::from_millis(300))
            .with_max_destinations(MAX_DESTINATIONS),
    )
    .expect("provider should build");
    let origin = coordinate(41.775, 140.726);
    let destinations: Vec<_> = (1..=count)
        .map(|i| coordinate(origin.y + 0.001 * f64::from(u32::try_from(i).expect("small")), origin.x))
        .collect();

    let result = world.runtime.block_on(provider.query(origin, &destinations));
    world.result.replace(Some(result));
}

// --- Then steps ---

#[then("{count} destination is reachable")]
fn then_reachable(world: &ProviderWorld, count: usize) {
    world.with_result(|result| {
        let row = result.as_ref().expect("expected Ok result");
        let reachable = row.iter().filter(|e| e.estimate().is_some()).count();
        assert_eq!(reachable, count);
    });
}

#[then("{count} destination is unreachable")]
fn then_unreachable(world: &ProviderWorld, count: usize) {
    world.with_result(|result| {
        let row = result.as_ref().expect("expected Ok result");
        let unreachable = row
            .iter()
            .filter(|e| matches!(e, RowElement::Unreachable))
            .count();
        assert_eq!(unreachable, count);
    });
}

#[then("the call status is over quota")]
fn then_over_quota(world: &ProviderWorld) {
    world.with_result(|result| {
        let err = result.as_ref().expect_err("expected an error");
        assert_eq!(err.status(), CallStatus::OverQuota, "got {err:?}");
    });
}

#[then("the call status is other error")]
fn then_other_error(world: &ProviderWorld) {
    world.with_result(|result| {
        let err = result.as_ref().expect_err("expected an error");
        assert_eq!(err.status(), CallStatus::OtherError);
    });
}

#[then("a timeout error is returned")]
fn then_timeout(world: &ProviderWorld) {
    world.with_result(|result| {
        assert!(
            matches!(result, Err(DistanceMatrixError::Timeout { .. })),
            "expected Timeout error, got {result:?}"
        );
    });
}

#[then("a network error is returned")]
fn then_network(world: &ProviderWorld) {
    world.with_result(|result| {
        assert!(
            matches!(result, Err(DistanceMatrixError::Network { .. })),
            "expected Network error, got {result:?}"
        );
    });
}

#[then("the routing service received no requests")]
fn then_no_requests(world: &ProviderWorld) {
    let server = world.server.borrow();
    let server = server.as_ref().expect("server must be running");
    assert!(server.requests().is_empty());
}

#[scenario(path = "tests/features/http_distance_matrix.feature", index = 0)]
fn row_returned(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_distance_matrix.feature", index = 1)]
fn too_big_is_over_quota(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_distance_matrix.feature", index = 2)]
fn silent_service_times_out(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_distance_matrix.feature", index = 3)]
fn down_service_is_network_error(world: ProviderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/http_distance_matrix.feature", index = 4)]
fn oversized_query_is_rejected_locally(world: ProviderWorld) {
    let _ = world;
}
