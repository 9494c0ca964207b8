//! The shared reading cache.
//!
//! Replaces the usual pair of bare mutable globals with an owned cell
//! behind an explicit accessor: written only by the sampler, read by any
//! number of concurrent consumers, never observed torn.

use core::cell::Cell;

use critical_section::Mutex;

use crate::reading::{ReadingSnapshot, SensorReading};

/// The cache of the most recently accepted sensor reading.
///
/// Single-writer, many-reader. The sampler replaces the whole pair
/// inside a critical section after each checksum-validated decode;
/// readers take the same critical section, so a reader can never observe
/// humidity from one cycle and temperature from another. An empty cache
/// is the never-read sentinel.
pub struct SharedReading(Mutex<Cell<Option<SensorReading>>>);

impl SharedReading {
    /// Creates an empty [`SharedReading`].
    #[must_use]
    pub const fn new() -> Self {
        Self(Mutex::new(Cell::new(None)))
    }

    /// Replaces the cached reading.
    ///
    /// Called only by the sampler, and only after a successful decode; a
    /// failed cycle never reaches this method.
    pub fn store(&self, reading: SensorReading) {
        critical_section::with(|cs| self.0.borrow(cs).set(Some(reading)))
    }

    /// The last accepted reading, or `None` if no read has ever
    /// succeeded.
    ///
    /// Never blocks beyond the critical section and never mutates the
    /// cache: consecutive calls between sampling cycles return the same
    /// value.
    #[must_use]
    pub fn latest(&self) -> Option<SensorReading> {
        critical_section::with(|cs| self.0.borrow(cs).get())
    }

    /// The serializable view of the cache for external consumers.
    #[must_use]
    pub fn snapshot(&self) -> ReadingSnapshot {
        ReadingSnapshot::from(self.latest())
    }
}

impl Default for SharedReading {
    fn default() -> Self {
        Self::new()
    }
}
