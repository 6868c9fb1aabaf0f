//! Cross-context reading cell shared by the edge path and the reporter.
//!
//! The edge path (interrupt handler or poll loop) is the only producer; the
//! reporter is the only consumer. No locks are taken on either side.
//!
//! `{velocity, direction}` is packed into a single [`AtomicU32`]: velocity is
//! a non-negative `f32`, so its sign bit is always clear and carries the
//! direction instead. A reader therefore never sees a velocity from one
//! transition paired with the direction from another, on any core count.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::{Direction, Reading, SharedReading};
//!
//! static SHARED: SharedReading = SharedReading::new(0);
//!
//! SHARED.publish(Reading::new(12.5, Direction::Cw), 1_000);
//! assert_eq!(SHARED.snapshot(), Reading::new(12.5, Direction::Cw));
//!
//! // 100 ms later at 1 MHz with no new edge: the reading is expired.
//! assert!(SHARED.expire_if_stalled(101_001, 100_000));
//! assert_eq!(SHARED.snapshot().velocity_hz, 0.0);
//! assert_eq!(SHARED.snapshot().direction, Direction::Cw);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use crate::decoder::Direction;

/// Sign bit of the packed f32, repurposed for the direction.
const DIRECTION_BIT: u32 = 1 << 31;

/// Largest velocity a [`Reading`] holds: one edge per tick on the fastest
/// counter a `u32` rate can express, with one edge per revolution.
pub const MAX_VELOCITY_HZ: f32 = u32::MAX as f32;

/// One velocity/direction observation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Shaft speed in revolutions per second (always >= 0).
    pub velocity_hz: f32,
    /// Last decoded direction.
    pub direction: Direction,
}

impl Reading {
    /// Creates a reading. Negative or non-finite velocities become 0;
    /// anything above [`MAX_VELOCITY_HZ`] is clamped to it.
    #[inline]
    pub fn new(velocity_hz: f32, direction: Direction) -> Self {
        Self {
            velocity_hz: sanitize(velocity_hz),
            direction,
        }
    }

    /// Shaft speed in revolutions per minute.
    #[inline]
    pub fn rpm(&self) -> f32 {
        self.velocity_hz * 60.0
    }

    /// True when the shaft is reported as not turning.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.velocity_hz == 0.0
    }

    fn pack(self) -> u32 {
        let bits = sanitize(self.velocity_hz).to_bits() & !DIRECTION_BIT;
        match self.direction {
            Direction::Cw => bits | DIRECTION_BIT,
            Direction::Ccw => bits,
        }
    }

    fn unpack(word: u32) -> Self {
        let direction = if word & DIRECTION_BIT != 0 {
            Direction::Cw
        } else {
            Direction::Ccw
        };
        Self {
            velocity_hz: f32::from_bits(word & !DIRECTION_BIT),
            direction,
        }
    }
}

/// Maps NaN, infinities and negative values (including -0.0) to +0.0 and
/// caps the rest at [`MAX_VELOCITY_HZ`].
#[inline]
fn sanitize(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v.min(MAX_VELOCITY_HZ)
    } else {
        0.0
    }
}

/// Lock-free single-producer/single-consumer reading cell.
///
/// Holds the latest [`Reading`] and the tick of the most recent transition.
/// `const`-constructible so it can live in a `static`.
#[derive(Debug)]
pub struct SharedReading {
    reading: AtomicU32,
    edge_time: AtomicU32,
}

impl SharedReading {
    /// Creates a cell holding a zero CCW reading, with the last transition
    /// time seeded to `now`.
    pub const fn new(now: u32) -> Self {
        Self {
            // 0.0f32 with the direction bit clear: 0 Hz, CCW.
            reading: AtomicU32::new(0),
            edge_time: AtomicU32::new(now),
        }
    }

    /// Producer side: store the reading computed for a transition at `edge_time`.
    pub fn publish(&self, reading: Reading, edge_time: u32) {
        self.edge_time.store(edge_time, Ordering::Release);
        self.reading.store(reading.pack(), Ordering::Release);
    }

    /// Producer side: store a reading without moving the transition time
    /// (used when the owning context zeroes velocity on a stall).
    pub fn store(&self, reading: Reading) {
        self.reading.store(reading.pack(), Ordering::Release);
    }

    /// Consumer side: the latest reading.
    pub fn snapshot(&self) -> Reading {
        Reading::unpack(self.reading.load(Ordering::Acquire))
    }

    /// Tick of the most recent transition.
    pub fn last_edge_time(&self) -> u32 {
        self.edge_time.load(Ordering::Acquire)
    }

    /// Consumer side stall check.
    ///
    /// If more than `timeout_ticks` have elapsed since the last transition,
    /// zero the velocity (keeping the direction) and return true.
    ///
    /// The reading is loaded before the edge time, mirroring the store order
    /// in [`publish`](Self::publish): the edge time seen is never older than
    /// the reading it is checked against. The zeroing is a compare-and-swap
    /// against that reading, so a publish landing after the load makes the
    /// swap fail and is left untouched, unless it stored a bit-identical
    /// reading.
    pub fn expire_if_stalled(&self, now: u32, timeout_ticks: u32) -> bool {
        let current = self.reading.load(Ordering::Acquire);
        let edge_time = self.edge_time.load(Ordering::Acquire);
        if now.wrapping_sub(edge_time) <= timeout_ticks {
            return false;
        }

        let expired = current & DIRECTION_BIT;
        if current == expired {
            return true;
        }
        self.reading
            .compare_exchange(current, expired, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for SharedReading {
    fn default() -> Self {
        Self::new(0)
    }
}
