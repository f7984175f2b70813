//! Fixed-precision coordinates.
//!
//! ## Overview
//!
//! Latitude and longitude are stored as [`Decimal`] values with at most
//! [`COORDINATE_DP`] fractional digits (7, roughly one centimetre). Inputs with
//! more digits are rounded with [`Decimal::round_dp`] (banker's rounding).
//!
//! ## Fixed-Point Encoding
//!
//! For hashing, a coordinate is converted to an `i64` scaled by 10^7:
//! `-23.5505` becomes `-235_505_000`.
//!
//! ## Examples
//!
//! ```
//! use survivor_registry::types::Location;
//!
//! let loc = Location::parse("-23.5505", "-46.6333").unwrap();
//! assert_eq!(loc.latitude_fixed(), Some(-235_505_000));
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::RegistryError;

/// Fractional digits kept for each coordinate.
pub const COORDINATE_DP: u32 = 7;

/// Scale of the fixed-point encoding: 10^7
pub const COORDINATE_SCALE: i64 = 10_000_000;

const MAX_LATITUDE: i64 = 90;
const MAX_LONGITUDE: i64 = 180;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a coordinate to its fixed-point form.
///
/// Returns `None` if the value does not fit in an `i64` after scaling.
pub fn to_fixed(d: Decimal) -> Option<i64> {
    let scaled = d.checked_mul(Decimal::from(COORDINATE_SCALE))?;
    scaled.round_dp(0).to_i64()
}

/// Convert a fixed-point coordinate back to a Decimal
pub fn from_fixed(value: i64) -> Decimal {
    Decimal::new(value, COORDINATE_DP)
}

// ============================================================================
// Location
// ============================================================================

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    latitude: Decimal,
    longitude: Decimal,
}

impl Location {
    /// Build a location, rounding to [`COORDINATE_DP`] digits.
    ///
    /// # Errors
    ///
    /// `Validation` if latitude is outside [-90, 90] or longitude outside
    /// [-180, 180].
    pub fn new(latitude: Decimal, longitude: Decimal) -> Result<Self, RegistryError> {
        let latitude = latitude.round_dp(COORDINATE_DP);
        let longitude = longitude.round_dp(COORDINATE_DP);

        if latitude.abs() > Decimal::from(MAX_LATITUDE) {
            return Err(RegistryError::validation(
                "latitude",
                format!("{latitude} is outside [-90, 90]"),
            ));
        }
        if longitude.abs() > Decimal::from(MAX_LONGITUDE) {
            return Err(RegistryError::validation(
                "longitude",
                format!("{longitude} is outside [-180, 180]"),
            ));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse both coordinates from decimal strings.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, RegistryError> {
        let lat = Decimal::from_str(latitude.trim()).map_err(|e| {
            RegistryError::validation("latitude", format!("`{latitude}`: {e}"))
        })?;
        let lon = Decimal::from_str(longitude.trim()).map_err(|e| {
            RegistryError::validation("longitude", format!("`{longitude}`: {e}"))
        })?;
        Self::new(lat, lon)
    }

    #[inline]
    pub fn latitude(&self) -> Decimal {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> Decimal {
        self.longitude
    }

    pub fn latitude_fixed(&self) -> Option<i64> {
        to_fixed(self.latitude)
    }

    pub fn longitude_fixed(&self) -> Option<i64> {
        to_fixed(self.longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude.normalize(), self.longitude.normalize())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
