//! Great-circle distance on a spherical Earth.

use geo::Coord;

/// Mean Earth radius used for all straight-line distances, in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two WGS84 coordinates, in metres.
///
/// # Examples
/// ```
/// use refuge_core::{coordinate, haversine_meters};
///
/// let a = coordinate(41.775, 140.726);
/// assert_eq!(haversine_meters(a, a), 0.0);
/// ```
#[must_use]
pub fn haversine_meters(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lng = (b.x - a.x).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Round a distance to whole metres.
///
/// Returns `None` for negative, non-finite, or values beyond `u32::MAX`.
///
/// # Examples
/// ```
/// use refuge_core::whole_meters;
///
/// assert_eq!(whole_meters(160.4), Some(160));
/// assert_eq!(whole_meters(-1.0), None);
/// assert_eq!(whole_meters(f64::NAN), None);
/// ```
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the rounded value is range-checked against u32 before the cast"
)]
pub fn whole_meters(meters: f64) -> Option<u32> {
    let rounded = meters.round();
    (0.0..=f64::from(u32::MAX))
        .contains(&rounded)
        .then(|| rounded as u32)
}
