//! Validated, immutable location reading.
//!
//! A [`Fix`] can only be built through [`Fix::new`], which rejects
//! non-finite coordinates. Satellite count and horizontal dilution of
//! precision are optional: `None` means "unknown" and is kept distinct
//! from zero all the way to the wire.

use chrono::{DateTime, Utc};

/// Reasons a candidate reading cannot become a [`Fix`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixError {
    /// A coordinate was NaN or infinite.
    #[error("{axis} must be a finite number")]
    NonFiniteCoordinate {
        /// Which coordinate failed (`lat` or `lon`).
        axis: &'static str,
    },
}

/// One location reading for one device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    latitude: f64,
    longitude: f64,
    satellite_count: Option<u32>,
    horizontal_dilution: Option<f64>,
    observed_at: DateTime<Utc>,
}

impl Fix {
    /// Build a fix from finite coordinates observed at `observed_at`.
    ///
    /// Satellite count and HDOP start out unknown; attach them with
    /// [`Fix::with_satellite_count`] and [`Fix::with_horizontal_dilution`].
    pub fn new(latitude: f64, longitude: f64, observed_at: DateTime<Utc>) -> Result<Self, FixError> {
        if !latitude.is_finite() {
            return Err(FixError::NonFiniteCoordinate { axis: "lat" });
        }
        if !longitude.is_finite() {
            return Err(FixError::NonFiniteCoordinate { axis: "lon" });
        }
        Ok(Self {
            latitude,
            longitude,
            satellite_count: None,
            horizontal_dilution: None,
            observed_at,
        })
    }

    /// Attach the number of satellites used for the fix.
    #[must_use]
    pub const fn with_satellite_count(mut self, count: Option<u32>) -> Self {
        self.satellite_count = count;
        self
    }

    /// Attach the horizontal dilution of precision.
    ///
    /// Non-finite values are stored as unknown.
    #[must_use]
    pub fn with_horizontal_dilution(mut self, hdop: Option<f64>) -> Self {
        self.horizontal_dilution = hdop.filter(|value| value.is_finite());
        self
    }

    /// Latitude in decimal degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Satellites in view, if the device reported it.
    pub const fn satellite_count(&self) -> Option<u32> {
        self.satellite_count
    }

    /// Horizontal dilution of precision, if the device reported it.
    pub const fn horizontal_dilution(&self) -> Option<f64> {
        self.horizontal_dilution
    }

    /// Server receipt time of the reading.
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn accepts_finite_coordinates() {
        let now = Utc::now();
        let fix = Fix::new(-3.4, 119.19, now).unwrap();
        assert_eq!(fix.latitude(), -3.4);
        assert_eq!(fix.longitude(), 119.19);
        assert_eq!(fix.satellite_count(), None);
        assert_eq!(fix.horizontal_dilution(), None);
        assert_eq!(fix.observed_at(), now);
    }

    #[test]
    fn rejects_nan_latitude() {
        let err = Fix::new(f64::NAN, 1.0, Utc::now()).unwrap_err();
        assert_eq!(err, FixError::NonFiniteCoordinate { axis: "lat" });
    }

    #[test]
    fn rejects_infinite_longitude() {
        let err = Fix::new(1.0, f64::NEG_INFINITY, Utc::now()).unwrap_err();
        assert_eq!(err, FixError::NonFiniteCoordinate { axis: "lon" });
    }

    #[test]
    fn zero_satellites_is_not_unknown() {
        let fix = Fix::new(0.0, 0.0, Utc::now())
            .unwrap()
            .with_satellite_count(Some(0));
        assert_eq!(fix.satellite_count(), Some(0));
    }

    #[test]
    fn non_finite_hdop_becomes_unknown() {
        let fix = Fix::new(0.0, 0.0, Utc::now())
            .unwrap()
            .with_horizontal_dilution(Some(f64::INFINITY));
        assert_eq!(fix.horizontal_dilution(), None);

        let fix = fix.with_horizontal_dilution(Some(2.1));
        assert_eq!(fix.horizontal_dilution(), Some(2.1));
    }
}
