use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{GeoError, GeoResult};

/// Earth mean radius in kilometers. Used by every entry point in this module.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Vectorized calls with at least this many elements run on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

/// A point on the sphere, longitude and latitude in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_single(self.lon, self.lat, other.lon, other.lat)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

// Cosine of the central angle between two points given in radians.
fn central_angle_cosine(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos()
}

/// Great-circle distance using the spherical law of cosines.
/// Input lon/lat in degrees. Output in kilometers.
///
/// Rounding can push the cosine of the central angle just outside [-1, 1]. Values above 1
/// map to a distance of 0 and values below -1 map to half the circumference, so finite
/// inputs never yield NaN. A NaN or infinite coordinate yields NaN. Coordinates are not
/// range checked.
pub fn distance_single(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lon1, lat1, lon2, lat2) = (
        lon1.to_radians(),
        lat1.to_radians(),
        lon2.to_radians(),
        lat2.to_radians(),
    );
    if lon1 == lon2 && lat1 == lat2 {
        return 0.0;
    }
    let d = central_angle_cosine(lon1, lat1, lon2, lat2);
    if d > 1.0 {
        return 0.0;
    }
    // Written as a comparison so a NaN from NaN input is not turned into -1.
    let d = if d < -1.0 { -1.0 } else { d };
    d.acos() * EARTH_RADIUS_KM
}

/// Checks a host-supplied count against the slices it indexes and returns it as a `usize`.
fn checked_count(n: i64, slices: &[(&str, usize)]) -> GeoResult<usize> {
    let count = usize::try_from(n).map_err(|_| {
        debug!(n, "rejecting negative count");
        GeoError::invalid_argument(format!("count must be >= 0, got {}", n))
    })?;
    for &(name, len) in slices {
        if len < count {
            debug!(name, len, count, "rejecting short input");
            return Err(GeoError::invalid_argument(format!(
                "{} has {} elements but count is {}",
                name, len, count
            )));
        }
    }
    Ok(count)
}

/// Evaluates `f` for every index in `0..n`, in order. Large batches are split across the
/// rayon pool; each index writes only its own slot so the output is the same either way.
fn map_indices<F>(n: usize, f: F) -> Vec<f64>
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    let parallel = n >= PARALLEL_THRESHOLD;
    trace!(n, parallel, "computing distances");
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

/// Element-wise distances between `(lon1[i], lat1[i])` and `(lon2[i], lat2[i])` for `i` in
/// `0..n`. Every slice must hold at least `n` values; anything past `n` is ignored.
///
/// # Errors
/// Returns `GeoError::InvalidArgument` if `n` is negative or any slice is shorter than `n`.
pub fn distance_vector(
    lon1: &[f64],
    lat1: &[f64],
    lon2: &[f64],
    lat2: &[f64],
    n: i64,
) -> GeoResult<Vec<f64>> {
    let count = checked_count(
        n,
        &[
            ("lon1", lon1.len()),
            ("lat1", lat1.len()),
            ("lon2", lon2.len()),
            ("lat2", lat2.len()),
        ],
    )?;
    Ok(map_indices(count, |i| {
        distance_single(lon1[i], lat1[i], lon2[i], lat2[i])
    }))
}

/// Distances from the fixed point `(lon1, lat1)` to each `(lon2[i], lat2[i])` for `i` in
/// `0..n`.
///
/// # Errors
/// Returns `GeoError::InvalidArgument` if `n` is negative or either slice is shorter than `n`.
pub fn distance_one_to_many(
    lon1: f64,
    lat1: f64,
    lon2: &[f64],
    lat2: &[f64],
    n: i64,
) -> GeoResult<Vec<f64>> {
    let count = checked_count(n, &[("lon2", lon2.len()), ("lat2", lat2.len())])?;
    Ok(map_indices(count, |i| {
        distance_single(lon1, lat1, lon2[i], lat2[i])
    }))
}

/// Distances between `from[i]` and `to[i]`. Both lists must be the same length.
pub fn distance_pairs(from: &[Coordinate], to: &[Coordinate]) -> GeoResult<Vec<f64>> {
    if from.len() != to.len() {
        return Err(GeoError::invalid_argument(format!(
            "coordinate lists differ in length: {} vs {}",
            from.len(),
            to.len()
        )));
    }
    let (lon1, lat1): (Vec<f64>, Vec<f64>) = from.iter().map(|c| (c.lon, c.lat)).unzip();
    let (lon2, lat2): (Vec<f64>, Vec<f64>) = to.iter().map(|c| (c.lon, c.lat)).unzip();
    let n = i64::try_from(from.len()).map_err(|_| {
        GeoError::invalid_argument(format!("{} coordinates exceed the supported count", from.len()))
    })?;
    distance_vector(&lon1, &lat1, &lon2, &lat2, n)
}
