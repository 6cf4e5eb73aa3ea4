//! Outbound links for previewing a walking route.

use geo::Coord;
use url::Url;

const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/";

fn lat_lng_param(coord: Coord<f64>) -> String {
    format!("{},{}", coord.y, coord.x)
}

/// Build a Google Maps walking directions link from `origin` to `destination`.
///
/// # Examples
/// ```
/// use refuge_core::coordinate;
/// use refuge_data::walking_directions_url;
///
/// let url = walking_directions_url(coordinate(41.775, 140.726), coordinate(41.77, 140.72))?;
/// assert_eq!(
///     url.as_str(),
///     "https://www.google.com/maps/dir/?api=1&origin=41.775%2C140.726\
///      &destination=41.77%2C140.72&travelmode=walking"
/// );
/// # Ok::<(), url::ParseError>(())
/// ```
///
/// # Errors
///
/// Only fails if the fixed directions endpoint stops parsing as a URL.
pub fn walking_directions_url(
    origin: Coord<f64>,
    destination: Coord<f64>,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(DIRECTIONS_BASE)?;
    url.query_pairs_mut()
        .append_pair("api", "1")
        .append_pair("origin", &lat_lng_param(origin))
        .append_pair("destination", &lat_lng_param(destination))
        .append_pair("travelmode", "walking");
    Ok(url)
}
