use geo::Coord;

/// Build a WGS84 coordinate from latitude and longitude in degrees.
///
/// # Examples
/// ```
/// use refuge_core::coordinate;
///
/// let hakodate = coordinate(41.775, 140.726);
/// assert_eq!(hakodate.y, 41.775);
/// assert_eq!(hakodate.x, 140.726);
/// ```
#[must_use]
pub const fn coordinate(lat: f64, lng: f64) -> Coord<f64> {
    Coord { x: lng, y: lat }
}

/// Serde adapter writing coordinates as `{"lat": .., "lng": ..}`.
///
/// Use with `#[serde(with = "refuge_core::lat_lng")]` on `Coord<f64>` fields.
#[cfg(feature = "serde")]
pub mod lat_lng {
    use geo::Coord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::coordinate;

    #[derive(Serialize, Deserialize)]
    struct LatLng {
        lat: f64,
        lng: f64,
    }

    /// Serialise a coordinate as a latitude/longitude object.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(value: &Coord<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        LatLng {
            lat: value.y,
            lng: value.x,
        }
        .serialize(serializer)
    }

    /// Deserialise a latitude/longitude object into a coordinate.
    ///
    /// # Errors
    ///
    /// Fails when either field is missing or not a number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Coord<f64>, D::Error> {
        let LatLng { lat, lng } = LatLng::deserialize(deserializer)?;
        Ok(coordinate(lat, lng))
    }
}

/// A place a pedestrian can evacuate to.
///
/// Destinations are normalised at the catalog boundary: `name_en` is always
/// populated, duplicating `name` when a source carries no English label.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Destination {
    /// Display name in the catalog's primary language.
    pub name: String,
    /// English display name.
    pub name_en: String,
    /// Position with `x = longitude` and `y = latitude`.
    #[cfg_attr(feature = "serde", serde(with = "lat_lng"))]
    pub location: Coord<f64>,
}

impl Destination {
    /// Construct a destination whose English name duplicates `name`.
    ///
    /// # Examples
    /// ```
    /// use refuge_core::{Destination, coordinate};
    ///
    /// let shelter = Destination::new("Motomachi Park", coordinate(41.766, 140.714));
    /// assert_eq!(shelter.name_en, "Motomachi Park");
    /// ```
    pub fn new(name: impl Into<String>, location: Coord<f64>) -> Self {
        let name = name.into();
        Self {
            name_en: name.clone(),
            name,
            location,
        }
    }

    /// Replace the English display name.
    #[must_use]
    pub fn with_name_en(mut self, name_en: impl Into<String>) -> Self {
        self.name_en = name_en.into();
        self
    }
}

/// Ordered, append-only collection of destinations.
///
/// A catalog may be assembled from several sources. It tracks how many
/// sources are expected and reports [`Catalog::is_ready`] once each has been
/// merged. Merging only ever appends, so catalog indices stay stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    destinations: Vec<Destination>,
    expected_sources: usize,
    merged_sources: usize,
}

impl Catalog {
    /// Create an empty catalog waiting for `expected_sources` merges.
    #[must_use]
    pub const fn expecting(expected_sources: usize) -> Self {
        Self {
            destinations: Vec::new(),
            expected_sources,
            merged_sources: 0,
        }
    }

    /// Create a ready catalog from a single, already-normalised source.
    #[must_use]
    pub fn from_destinations(destinations: Vec<Destination>) -> Self {
        Self {
            destinations,
            expected_sources: 1,
            merged_sources: 1,
        }
    }

    /// Append one source's destinations, preserving their order.
    pub fn merge_source<I>(&mut self, source: I)
    where
        I: IntoIterator<Item = Destination>,
    {
        self.destinations.extend(source);
        self.merged_sources += 1;
    }

    /// Whether every expected source has been merged.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.merged_sources >= self.expected_sources
    }

    /// Destinations in catalog order.
    #[must_use]
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Number of destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Whether the catalog holds no destinations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}
