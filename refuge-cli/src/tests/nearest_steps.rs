//! Behaviour-driven step definitions driving the nearest CLI scenarios.

use super::helpers::{CatalogFiles, ORIGIN_LAT, ORIGIN_LNG, StubProviderBuilder};
use super::*;
use crate::nearest::run_nearest_with;
use refuge_core::test_support::StraightLineDistanceMatrix;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;

struct NearestWorld {
    catalogs: RefCell<Option<CatalogFiles>>,
    builder: RefCell<Option<StubProviderBuilder>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl NearestWorld {
    fn command_line(&self, origin: Option<(f64, f64)>) -> Vec<String> {
        let catalogs = self.catalogs.borrow();
        let catalogs = catalogs.as_ref().expect("catalogs must be written");
        let mut argv = vec!["refuge".to_owned(), "nearest".to_owned()];
        if let Some((lat, lng)) = origin {
            argv.extend([format!("--{ARG_LAT}"), lat.to_string()]);
            argv.extend([format!("--{ARG_LNG}"), lng.to_string()]);
        } else {
            argv.extend([format!("--{ARG_LNG}"), ORIGIN_LNG.to_string()]);
        }
        argv.extend([
            format!("--{ARG_DESTINATIONS}"),
            catalogs.destinations().as_str().to_owned(),
            format!("--{ARG_EVAC_POINTS}"),
            catalogs.evac_points().as_str().to_owned(),
        ]);
        argv
    }

    fn run(&self, argv: Vec<String>) {
        let builder = self.builder.borrow();
        let builder = builder.as_ref().expect("routing service must be configured");
        let mut stdout = self.stdout.borrow_mut();
        let outcome = Cli::try_parse_from(argv)
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| match cli.command {
                Command::Nearest(args) => run_nearest_with(args, builder, &mut *stdout),
            });
        self.result.replace(Some(outcome));
    }

    fn output(&self) -> Value {
        let borrowed = self.result.borrow();
        match borrowed.as_ref().expect("result recorded") {
            Ok(()) => serde_json::from_slice(&self.stdout.borrow()).expect("output is JSON"),
            Err(err) => panic!("expected success, found {err:?}"),
        }
    }
}

#[fixture]
fn world() -> NearestWorld {
    NearestWorld {
        catalogs: RefCell::new(None),
        builder: RefCell::new(None),
        stdout: RefCell::new(Vec::new()),
        result: RefCell::new(None),
    }
}

#[given("catalogs of buildings and evacuation points near the station")]
fn catalogs_written(#[from(world)] world: &NearestWorld) {
    world.catalogs.replace(Some(CatalogFiles::new()));
}

#[given("the routing service answers with walking distances")]
fn routing_available(#[from(world)] world: &NearestWorld) {
    world.builder.replace(Some(StubProviderBuilder::new(Arc::new(
        StraightLineDistanceMatrix::default(),
    ))));
}

#[when("I run nearest from the station")]
fn run_from_station(#[from(world)] world: &NearestWorld) {
    let argv = world.command_line(Some((ORIGIN_LAT, ORIGIN_LNG)));
    world.run(argv);
}

#[when("I run nearest without a latitude")]
fn run_without_latitude(#[from(world)] world: &NearestWorld) {
    let argv = world.command_line(None);
    world.run(argv);
}

#[when("I run nearest from the far side of the city")]
fn run_from_far_away(#[from(world)] world: &NearestWorld) {
    let argv = world.command_line(Some((ORIGIN_LAT - 0.05, ORIGIN_LNG + 0.05)));
    world.run(argv);
}

#[then("the command reports \"Station Square\" as found")]
fn reports_station_square(#[from(world)] world: &NearestWorld) {
    let output = world.output();
    assert_eq!(output["result"]["outcome"], "FOUND");
    assert_eq!(output["result"]["selected"]["name"], "Station Square");
}

#[then("the output links to walking directions")]
fn output_links_directions(#[from(world)] world: &NearestWorld) {
    let output = world.output();
    let link = output["directions_url"].as_str().expect("directions link");
    assert!(link.contains("travelmode=walking"), "{link}");
}

#[then("the CLI reports that the \"lat\" flag is missing")]
fn reports_missing_lat(#[from(world)] world: &NearestWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_LAT),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}

#[then("the command reports nothing within {radius} metres")]
fn reports_none_in_radius(#[from(world)] world: &NearestWorld, radius: u32) {
    let output = world.output();
    assert_eq!(output["result"]["outcome"], "NONE_IN_RADIUS");
    assert_eq!(output["result"]["radius_meters"], radius);
    assert!(output.get("directions_url").is_none());
}

macro_rules! register_nearest_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/nearest_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: NearestWorld) {
            let _ = world;
        }
    };
}

register_nearest_scenario!(
    choosing_closest_destination,
    "choosing the closest destination across both catalogs"
);
register_nearest_scenario!(rejecting_missing_latitude, "rejecting a run without a latitude");
register_nearest_scenario!(reporting_empty_neighbourhood, "reporting an empty neighbourhood");
