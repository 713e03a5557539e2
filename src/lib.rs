//! Great-circle distances between longitude/latitude points given in degrees.
//!
//! Distances use the spherical law of cosines on a sphere of radius
//! [`geo::EARTH_RADIUS_KM`] and are returned in kilometers.
//!
//! ```
//! let d = geodist::distance_single(-74.0060, 40.7128, -0.1276, 51.5074);
//! assert!((d - 5570.0).abs() < 20.0);
//!
//! let out = geodist::distance_one_to_many(0.0, 0.0, &[0.0, 90.0], &[90.0, 0.0], 2)?;
//! assert_eq!(out.len(), 2);
//! # Ok::<(), geodist::GeoError>(())
//! ```

pub mod error;
pub mod geo;

pub use error::{GeoError, GeoResult};
pub use geo::{
    distance_one_to_many, distance_pairs, distance_single, distance_vector, Coordinate,
    EARTH_RADIUS_KM,
};
