//! # DHT11 Driver
//!
//! This module provides an architecture-agnostic driver for the `DHT11`
//! temperature and humidity sensor.
//!
//! The sensor has no clock line: both command and data travel over one
//! shared digital pin, fully timing-encoded. The driver bit-bangs a start
//! sequence, detects the sensor's handshake, and samples a 40-bit frame
//! purely from pulse-width measurements, classifying each bit by the
//! duration of its high pulse. The whole driver is synchronous and
//! blocking to meet the strict timing requirements of the protocol: a bit
//! is told apart by a single threshold compare against a ~40 µs window,
//! so every wait is a microsecond-granularity busy poll.
//!
//! The `DHT11` sensor provides the following measurements:
//! - **Humidity**: Relative humidity as a percentage (% RH), whole units
//! - **Temperature**: Temperature in degrees Celsius (°C), whole units
//!
//! For detailed specifications, refer to the
//! [datasheet](https://www.alldatasheet.com/datasheet-pdf/pdf/1132088/ETC2/DHT11.html)
//! and the description of the proprietary
//! [communication protocol](https://www.ocfreaks.com/basics-interfacing-dht11-dht22-humidity-temperature-sensor-mcu/).

use core::result::Result::{self, Err, Ok};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

// Protocol-specific timing constants.
const START_SIGNAL_LOW_MS: u32 = 20; // MCU pulls the line low for at least 18 ms to wake the sensor.
const START_SIGNAL_HIGH_US: u32 = 30; // Then drives it high for 20–40 µs before releasing it.
const HANDSHAKE_TIMEOUT_US: u32 = 85; // Budget for each ~80 µs handshake pulse.
const BIT_LOW_TIMEOUT_US: u32 = 56; // Budget for the ~50 µs low delimiter preceding each bit.
const BIT_HIGH_TIMEOUT_US: u32 = 75; // Budget for the ~26–70 µs high pulse encoding each bit.
const POLL_DELAY_US: u32 = 1; // Pulse timer granularity. Coarser polling corrupts bit discrimination.
const FRAME_BITS: usize = 40;

/// High-pulse duration, in microseconds, above which a data bit is read as
/// a `1`.
///
/// Nominal pulses are 26–28 µs for a `0` and ~70 µs for a `1`; the
/// threshold sits near the midpoint. It is a named constant rather than a
/// protocol-mandated value because wiring and pull-up strength shift the
/// real timings.
pub const BIT_ONE_THRESHOLD_US: u32 = 40;

/// The timing step at which a sensor read timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the sensor to pull the line low after the start signal.
    HandshakeLow,
    /// Waiting for the sensor's acknowledge pulses to complete.
    HandshakeHigh,
    /// Waiting out the low delimiter that precedes a data bit.
    BitLow,
    /// Waiting out the high pulse that encodes a data bit.
    BitHigh,
}

/// A complete 5-byte frame read from the sensor, prior to validation.
///
/// Produced only by a timeout-free decode of all 40 bits; partial frames
/// are never surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    bytes: [u8; 5],
}

impl RawFrame {
    /// Creates a [`RawFrame`] from bytes in wire order: humidity integral,
    /// humidity fraction, temperature integral, temperature fraction,
    /// checksum.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 5]) -> Self {
        Self { bytes }
    }

    /// Integral relative humidity (% RH).
    #[must_use]
    pub const fn humidity(&self) -> u8 {
        self.bytes[0]
    }

    /// Fractional humidity byte.
    ///
    /// Defined to be zero for this sensor family; exposed for diagnostics.
    #[must_use]
    pub const fn humidity_fraction(&self) -> u8 {
        self.bytes[1]
    }

    /// Integral temperature (°C).
    #[must_use]
    pub const fn temperature(&self) -> u8 {
        self.bytes[2]
    }

    /// Fractional temperature byte.
    ///
    /// Defined to be zero for this sensor family; exposed for diagnostics.
    #[must_use]
    pub const fn temperature_fraction(&self) -> u8 {
        self.bytes[3]
    }

    /// The checksum byte transmitted by the sensor.
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.bytes[4]
    }

    /// The frame bytes in wire order.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 5] {
        self.bytes
    }

    /// The checksum expected for this frame: the low 8 bits of the sum of
    /// the four payload bytes.
    #[must_use]
    pub const fn computed_checksum(&self) -> u8 {
        self.bytes[0]
            .wrapping_add(self.bytes[1])
            .wrapping_add(self.bytes[2])
            .wrapping_add(self.bytes[3])
    }

    /// Whether the transmitted checksum matches the computed one.
    ///
    /// Pure classification; this is the single point where a structurally
    /// complete but electrically corrupted frame is rejected.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.checksum() == self.computed_checksum()
    }
}

/// A single whole-unit humidity and temperature measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Relative humidity as a percentage (% RH).
    pub humidity: u8,
    /// Temperature in degrees Celsius (°C).
    pub temperature: u8,
}

/// Errors that may occur when interacting with the `DHT11` sensor.
///
/// Every variant is local to one read attempt: no state carries over, and
/// the next attempt retries from the start signal.
#[derive(Debug)]
pub enum Dht11Error<E> {
    /// GPIO pin errors.
    Pin(E),
    /// The line failed to change state within the budget of the named
    /// timing step.
    Timeout(Phase),
    /// A structurally complete frame whose checksum byte disagrees with
    /// the sum over its payload bytes.
    ///
    /// Carries the offending frame for diagnostics.
    Checksum(RawFrame),
}

impl<E> From<E> for Dht11Error<E> {
    fn from(e: E) -> Self {
        Dht11Error::Pin(e)
    }
}

/// The `DHT11` driver.
///
/// The data pin must be open-drain with a pull-up: the driver drives the
/// line low and releases it high, and reads the level back on the same
/// pin while the sensor transmits.
///
/// One complete read is bounded: ~20 ms start signal, at most three 85 µs
/// handshake waits, and 40 × (56 + 75) µs of bit sampling, ~25 ms worst
/// case. The sensor needs at least 2 seconds between reads.
pub struct Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Creates a [`Dht11`] driver for the given pin and delay provider.
    #[must_use]
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Releases the pin and delay provider.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    /// Reads a single humidity and temperature measurement.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Reading from or writing to the pin fails
    /// - The line does not change state within a timing budget
    /// - The received frame fails checksum validation
    pub fn read(&mut self) -> Result<Measurement, Dht11Error<P::Error>> {
        let frame = self.read_frame()?;

        Ok(Measurement {
            humidity: frame.humidity(),
            temperature: frame.temperature(),
        })
    }

    /// Reads one checksum-validated [`RawFrame`] from the sensor.
    ///
    /// Drives the start sequence, waits out the sensor handshake, samples
    /// all 40 data bits, and validates the assembled frame. Aborts on the
    /// first timeout, discarding partial data.
    ///
    /// # Errors
    ///
    /// Same conditions as [`read`](Self::read).
    pub fn read_frame(&mut self) -> Result<RawFrame, Dht11Error<P::Error>> {
        self.send_start_signal()?;
        self.wait_for_handshake()?;

        // Bits are packed most-significant-bit first, in wire order:
        // humidity integral and fraction, temperature integral and
        // fraction, checksum.
        let mut bytes = [0u8; 5];
        for bit in 0..FRAME_BITS {
            let _ = self.measure_level(PinState::Low, BIT_LOW_TIMEOUT_US, Phase::BitLow)?;
            let high_us = self.measure_level(PinState::High, BIT_HIGH_TIMEOUT_US, Phase::BitHigh)?;

            bytes[bit / 8] <<= 1;
            if high_us > BIT_ONE_THRESHOLD_US {
                bytes[bit / 8] |= 1;
            }
        }

        let frame = RawFrame::from_bytes(bytes);
        if frame.is_valid() {
            Ok(frame)
        } else {
            Err(Dht11Error::Checksum(frame))
        }
    }

    fn send_start_signal(&mut self) -> Result<(), Dht11Error<P::Error>> {
        // Pull the line low for at least 18 ms to wake the sensor.
        self.pin.set_low()?;
        self.delay.delay_ms(START_SIGNAL_LOW_MS);

        // Drive it high briefly, then release it to the sensor. On an
        // open-drain pin the high level is the released state.
        self.pin.set_high()?;
        self.delay.delay_us(START_SIGNAL_HIGH_US);

        Ok(())
    }

    fn wait_for_handshake(&mut self) -> Result<(), Dht11Error<P::Error>> {
        // The sensor acknowledges by pulling the line low, holds it low
        // for ~80 µs, then drives it high for ~80 µs. After the third
        // edge the line sits at the first bit's low delimiter.
        let _ = self.measure_level(PinState::High, HANDSHAKE_TIMEOUT_US, Phase::HandshakeLow)?;
        let _ = self.measure_level(PinState::Low, HANDSHAKE_TIMEOUT_US, Phase::HandshakeHigh)?;
        let _ = self.measure_level(PinState::High, HANDSHAKE_TIMEOUT_US, Phase::HandshakeHigh)?;

        Ok(())
    }

    // The pulse timer: polls the pin once per microsecond while it stays
    // at `level` and returns the elapsed microseconds once it leaves it.
    //
    // Measurable durations range over `0..=timeout_us`; a line stuck at
    // `level` is reported as a timeout in the given phase after exactly
    // `timeout_us + 1` polls.
    fn measure_level(
        &mut self,
        level: PinState,
        timeout_us: u32,
        phase: Phase,
    ) -> Result<u32, Dht11Error<P::Error>> {
        let mut elapsed_us = 0;
        loop {
            let at_level = match level {
                PinState::High => self.pin.is_high()?,
                PinState::Low => self.pin.is_low()?,
            };
            if !at_level {
                return Ok(elapsed_us);
            }
            if elapsed_us >= timeout_us {
                return Err(Dht11Error::Timeout(phase));
            }

            self.delay.delay_us(POLL_DELAY_US);
            elapsed_us += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    // One scripted pulse: the line reads `state` for `us` polls, then the
    // poll that observes the level change.
    fn pulse(script: &mut Vec<PinTransaction>, state: State, us: u32) {
        let flipped = match state {
            State::High => State::Low,
            State::Low => State::High,
        };
        for _ in 0..us {
            script.push(PinTransaction::get(state));
        }
        script.push(PinTransaction::get(flipped));
    }

    // A full valid line script for the given frame bytes. `one_us` and
    // `zero_us` set the high-pulse duration used for 1 and 0 bits.
    fn frame_script(bytes: [u8; 5], one_us: u32, zero_us: u32) -> Vec<PinTransaction> {
        let mut script = vec![
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ];

        pulse(&mut script, State::High, 30); // Release-to-acknowledge gap.
        pulse(&mut script, State::Low, 80); // Handshake low pulse.
        pulse(&mut script, State::High, 80); // Handshake high pulse.

        for byte in bytes {
            for bit in (0..8).rev() {
                pulse(&mut script, State::Low, 50);
                let us = if byte >> bit & 1 == 1 { one_us } else { zero_us };
                pulse(&mut script, State::High, us);
            }
        }

        script
    }

    #[test]
    fn test_send_start_signal() {
        let expectations = [
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ];

        let pin = PinMock::new(&expectations);
        let mut dht11 = Dht11::new(pin, NoopDelay::new());

        dht11.send_start_signal().unwrap();

        let (mut pin, _) = dht11.release();
        pin.done();
    }

    #[test]
    fn test_measure_level_reports_pulse_duration() {
        let mut expectations = Vec::new();
        pulse(&mut expectations, State::High, 30);

        let pin = PinMock::new(&expectations);
        let mut dht11 = Dht11::new(pin, NoopDelay::new());

        let us = dht11
            .measure_level(PinState::High, HANDSHAKE_TIMEOUT_US, Phase::HandshakeLow)
            .unwrap();
        assert_eq!(us, 30);

        let (mut pin, _) = dht11.release();
        pin.done();
    }

    #[test]
    fn test_measure_level_times_out_after_budget() {
        // A line that never changes level is polled once per microsecond
        // up to and including the timeout, then reported as timed out.
        // `done` verifies the exact poll count.
        let expectations = vec![PinTransaction::get(State::High); (HANDSHAKE_TIMEOUT_US + 1) as usize];

        let pin = PinMock::new(&expectations);
        let mut dht11 = Dht11::new(pin, NoopDelay::new());

        let result = dht11.measure_level(PinState::High, HANDSHAKE_TIMEOUT_US, Phase::HandshakeLow);
        assert!(matches!(result, Err(Dht11Error::Timeout(Phase::HandshakeLow))));

        let (mut pin, _) = dht11.release();
        pin.done();
    }

    #[test]
    fn test_handshake_timeout_when_line_stays_high() {
        // The sensor never acknowledges: after the start signal the line
        // stays high past the 85 µs budget and no bit is ever sampled.
        let mut expectations = vec![
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ];
        expectations
            .extend(vec![PinTransaction::get(State::High); (HANDSHAKE_TIMEOUT_US + 1) as usize]);

        let pin = PinMock::new(&expectations);
        let mut dht11 = Dht11::new(pin, NoopDelay::new());

        let result = dht11.read_frame();
        assert!(matches!(result, Err(Dht11Error::Timeout(Phase::HandshakeLow))));

        let (mut pin, _) = dht11.release();
        pin.done();
    }

    #[test]
    fn test_read_valid_frame() {
        // Humidity 45 %, temperature 23 °C, checksum 45 + 0 + 23 + 0 = 68.
        let pin = PinMock::new(&frame_script([45, 0, 23, 0, 68], 70, 26));
        let mut dht11 = Dht11::new(pin, NoopDelay::new());

        let measurement = dht11.read().unwrap();
        assert_eq!(measurement.humidity, 45);
        assert_eq!(measurement.temperature, 23);

        let (mut pin, _) = dht11.release();
        pin.done();
    }

    #[test]
    fn test_read_checksum_mismatch_carries_frame() {
        // Same frame with the checksum byte forced off by one.
        let pin = PinMock::new(&frame_script([45, 0, 23, 0, 69], 70, 26));
        let mut dht11 = Dht11::new(pin, NoopDelay::new());

        match dht11.read_frame().unwrap_err() {
            Dht11Error::Checksum(frame) => {
                assert_eq!(frame.checksum(), 69);
                assert_eq!(frame.computed_checksum(), 68);
                assert_eq!(frame.as_bytes(), [45, 0, 23, 0, 69]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let (mut pin, _) = dht11.release();
        pin.done();
    }

    #[test]
    fn test_bit_threshold_is_strictly_greater() {
        // A frame whose 1-bits all use the given high-pulse duration. At
        // 39 µs and at exactly 40 µs every bit decodes as 0 (yielding the
        // all-zero frame with a valid zero checksum); only strictly above
        // the threshold does the bit decode as 1.
        for (one_us, expected_humidity) in [(39, 0), (40, 0), (41, 128)] {
            let pin = PinMock::new(&frame_script([128, 0, 0, 0, 128], one_us, 26));
            let mut dht11 = Dht11::new(pin, NoopDelay::new());

            let frame = dht11.read_frame().unwrap();
            assert_eq!(frame.humidity(), expected_humidity);

            let (mut pin, _) = dht11.release();
            pin.done();
        }
    }

    #[test]
    fn test_checksum_validation() {
        assert!(RawFrame::from_bytes([1, 2, 3, 4, 10]).is_valid());
        assert!(!RawFrame::from_bytes([1, 2, 3, 4, 9]).is_valid());

        // Truncated sum: 255 + 255 + 1 + 1 = 512 wraps to 0.
        assert!(RawFrame::from_bytes([255, 255, 1, 1, 0]).is_valid());
        assert_eq!(RawFrame::from_bytes([255, 255, 1, 1, 0]).computed_checksum(), 0);

        // Checksum boundary at 255.
        assert!(RawFrame::from_bytes([250, 5, 0, 0, 255]).is_valid());
        assert!(!RawFrame::from_bytes([250, 5, 0, 1, 255]).is_valid());
    }
}
