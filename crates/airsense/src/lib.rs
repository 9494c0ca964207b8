//! `airsense` is the firmware core of a WiFi-configurable environmental
//! monitor.
//!
//! This crate provides APIs to:
//!
//! - Model the accepted humidity and temperature readings of the monitor
//! - Share the most recent reading across tasks without torn reads
//! - Run the periodic sampling cycle that drives the `DHT11` sensor,
//!   classifies failed cycles, and updates the cache only on
//!   checksum-validated success
//!
//! The crate deliberately ends at the sensor boundary. The WiFi
//! provisioning state machine, the HTTP server and firmware-update flow,
//! persistent credential storage, the air-quality ADC path, and status
//! indication are external collaborators: they read the cache through
//! [`cache::SharedReading`], serialize [`reading::ReadingSnapshot`] for
//! network consumers, and may implement [`sampler::FaultSink`] to observe
//! per-cycle faults. Nothing else crosses the boundary — one sampler owns
//! the sensor pin and the cache write path.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![no_std]

/// The shared reading cache.
pub mod cache;
/// The sensor reading data model.
pub mod reading;
/// The periodic sampler.
pub mod sampler;
