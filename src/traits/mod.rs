//! Trait definitions for hardware abstraction.
//!
//! This module defines the seam between the measurement core and a board:
//! - A wrapping tick counter ([`TimeBase`])
//! - Encoder channel sampling ([`ChannelInput`]) and edge-interrupt lines ([`EdgeLines`])
//! - Text output for the status line ([`LineSink`])
//!
//! Concrete implementations live in [`crate::hal`]: mocks for desktop tests
//! and an ESP32-C3 layer behind the `esp32` feature.

pub mod hardware;

pub use hardware::*;
