//! The sensor reading data model.
//!
//! [`SensorReading`] is the accepted humidity and temperature pair as it
//! lives in the cache; [`ReadingSnapshot`] is the serializable view of
//! the cache handed to status and network consumers, carrying the
//! "ever successfully read" flag.

use airsense_drivers::dht11::Measurement;

use serde::Serialize;

/// The most recently accepted humidity and temperature pair.
///
/// Both values are whole units: the `DHT11` family reports whole-percent
/// and whole-degree resolution only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct SensorReading {
    /// Relative humidity as a percentage (% RH).
    pub humidity: u8,
    /// Temperature in degrees Celsius (°C).
    pub temperature: u8,
}

impl SensorReading {
    /// Creates a [`SensorReading`].
    #[must_use]
    pub const fn new(humidity: u8, temperature: u8) -> Self {
        Self {
            humidity,
            temperature,
        }
    }
}

impl From<Measurement> for SensorReading {
    fn from(measurement: Measurement) -> Self {
        Self {
            humidity: measurement.humidity,
            temperature: measurement.temperature,
        }
    }
}

/// The view of the cache exposed to external consumers.
///
/// When `valid` is `false` no read has ever succeeded and the values are
/// the zero sentinel; when `true` the values are the last accepted
/// reading, possibly stale across a run of failed cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct ReadingSnapshot {
    /// Relative humidity as a percentage (% RH).
    pub humidity: u8,
    /// Temperature in degrees Celsius (°C).
    pub temperature: u8,
    /// Whether the sampler has ever completed a successful read.
    pub valid: bool,
}

impl From<Option<SensorReading>> for ReadingSnapshot {
    fn from(reading: Option<SensorReading>) -> Self {
        match reading {
            Some(reading) => Self {
                humidity: reading.humidity,
                temperature: reading.temperature,
                valid: true,
            },
            None => Self {
                humidity: 0,
                temperature: 0,
                valid: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_reading_from_measurement() {
        let reading = SensorReading::from(Measurement {
            humidity: 45,
            temperature: 23,
        });

        assert_eq!(reading, SensorReading::new(45, 23));
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = ReadingSnapshot::from(Some(SensorReading::new(45, 23)));
        assert_eq!(
            serde_json::to_value(snapshot).unwrap(),
            json!({
                "humidity": 45,
                "temperature": 23,
                "valid": true,
            })
        );
    }

    #[test]
    fn test_sentinel_snapshot() {
        let snapshot = ReadingSnapshot::from(None);
        assert_eq!(
            serde_json::to_value(snapshot).unwrap(),
            json!({
                "humidity": 0,
                "temperature": 0,
                "valid": false,
            })
        );
    }
}
