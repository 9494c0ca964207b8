//! `airsense-drivers` is a library crate that provides architecture-agnostic
//! drivers for the sensors of the `airsense` environmental monitor.
//!
//! All drivers are implemented using only the [`embedded-hal`] traits,
//! ensuring compatibility with any platform that supports these
//! abstractions.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![no_std]

/// The `DHT11` driver.
#[cfg(feature = "dht11")]
pub mod dht11;
