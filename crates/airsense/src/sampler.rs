//! The periodic sampler.
//!
//! One long-running task per sensor instance: it owns the sensor pin and
//! the cache write path together, so concurrent decode attempts on the
//! same line are impossible by construction. Each tick performs exactly
//! one decode attempt; persistent failures simply repeat at the next
//! tick, with no retry-within-cycle and no backoff, since each failure is
//! independent and inexpensive.

use core::fmt::Debug;

use airsense_drivers::dht11::{Dht11, Dht11Error};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use log::{info, warn};

use crate::cache::SharedReading;
use crate::reading::SensorReading;

/// Default pause between the end of one read attempt and the start of
/// the next.
pub const SAMPLE_INTERVAL_MS: u32 = 4_000;

/// Hardware floor of the sensor refresh rate.
///
/// Read attempts must never be spaced closer than this; the default
/// interval stays well above it to leave timing margin.
pub const MIN_SAMPLE_SPACING_MS: u32 = 2_000;

/// The error/observability collaborator of the sampler.
pub trait FaultSink<E> {
    /// Called once per failed sampling cycle with the classified fault
    /// and the stale-but-retained reading, if any.
    fn sensor_fault(&mut self, fault: &Dht11Error<E>, last_good: Option<SensorReading>);
}

/// The discard sink, for firmware that only wants the log output.
impl<E> FaultSink<E> for () {
    fn sensor_fault(&mut self, _fault: &Dht11Error<E>, _last_good: Option<SensorReading>) {}
}

/// The periodic sampling task body.
///
/// The embedding decides where this runs; the timing contract it must
/// honor is that one decode attempt executes without unrelated
/// scheduling in between, since bit discrimination is a single threshold
/// compare against a ~40 µs window. The task should therefore be pinned
/// to one core with a priority above housekeeping work. Jitter that
/// slips through anyway surfaces as a timeout or checksum failure, never
/// as silent bad data.
pub struct Sampler<'a, P, D, S>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    sensor: Dht11<P, D>,
    delay: D,
    readings: &'a SharedReading,
    sink: S,
}

impl<'a, P, D, S> Sampler<'a, P, D, S>
where
    P: InputPin + OutputPin,
    P::Error: Debug,
    D: DelayNs,
    S: FaultSink<P::Error>,
{
    /// Creates a [`Sampler`].
    ///
    /// `delay` paces the inter-sample cadence only; the sensor driver
    /// carries its own microsecond delay provider.
    #[must_use]
    pub fn new(sensor: Dht11<P, D>, delay: D, readings: &'a SharedReading, sink: S) -> Self {
        Self {
            sensor,
            delay,
            readings,
            sink,
        }
    }

    /// Performs exactly one decode attempt, returning whether it
    /// succeeded.
    ///
    /// On success the cached reading is replaced whole. On any fault the
    /// cache is left untouched and the classified fault is forwarded to
    /// the sink together with the retained reading; a bad cycle never
    /// affects the next one.
    pub fn sample_once(&mut self) -> bool {
        match self.sensor.read() {
            Ok(measurement) => {
                let reading = SensorReading::from(measurement);
                self.readings.store(reading);
                info!(
                    "humidity: {}% | temperature: {}°C",
                    reading.humidity, reading.temperature
                );
                true
            }
            Err(fault) => {
                warn!("sensor read failed: {fault:?}");
                self.sink.sensor_fault(&fault, self.readings.latest());
                false
            }
        }
    }

    /// Runs the sampling loop forever.
    ///
    /// Fixed-period re-arm: after every attempt, successful or not, the
    /// task sleeps [`SAMPLE_INTERVAL_MS`] before the next one. The sleep
    /// may yield the processor; its tolerance is loose.
    pub fn run(&mut self) -> ! {
        loop {
            let _ = self.sample_once();
            self.delay.delay_ms(SAMPLE_INTERVAL_MS);
        }
    }

    /// Releases the sensor driver, the cadence delay provider, and the
    /// fault sink.
    pub fn release(self) -> (Dht11<P, D>, D, S) {
        (self.sensor, self.delay, self.sink)
    }
}
