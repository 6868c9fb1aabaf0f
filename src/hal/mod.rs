//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `stdout`: Line sink over standard output (requires `std` feature)
//! - `esp32`: ESP32-C3 SuperMini with a quadrature encoder on GPIO6/7 (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "std")]
mod stdout;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "std")]
pub use stdout::StdoutSink;

#[cfg(feature = "esp32")]
pub use esp32::*;
