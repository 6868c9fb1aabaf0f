//! Hardware abstraction traits for the tick source, encoder channels, and line output.
//!
//! These are the three capabilities a board supplies to the measurement core.
//! Everything behind them (clock bring-up, pin modes, timer registers, UART
//! setup) is one-shot board configuration and lives in [`crate::hal`].
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`TimeBase`] | Free-running wrapping 32-bit tick counter |
//! | [`ChannelInput`] | Sample the A/B channel levels |
//! | [`EdgeLines`] | Pending-interrupt flags of the two channel lines |
//! | [`LineSink`] | Emit one text line |
//!
//! Capabilities other than [`LineSink`] take `&self`: they model register
//! reads (and write-one-to-clear writes), so a shared reference can be handed
//! to the core while a test keeps driving the same mock.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::traits::{Channel, ChannelInput, TimeBase};
//! use quad_tach::hal::{MockChannels, MockTimeBase};
//!
//! let time = MockTimeBase::new();
//! let channels = MockChannels::new();
//!
//! channels.set(true, false);
//! time.advance(1_000);
//!
//! assert!(channels.sample(Channel::A));
//! assert!(!channels.sample(Channel::B));
//! assert_eq!(time.now(), 1_000);
//! ```

use crate::config::TICK_RATE_HZ;

/// One of the two encoder channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Channel A (leading channel for clockwise rotation).
    A,
    /// Channel B.
    B,
}

impl Channel {
    /// Both channels, in dispatch order.
    pub const ALL: [Channel; 2] = [Channel::A, Channel::B];

    /// Index of this channel (A = 0, B = 1).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::A => 0,
            Channel::B => 1,
        }
    }
}

/// Kind of level change seen on a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeKind {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

impl EdgeKind {
    /// Edge kind implied by the level a channel settled at.
    #[inline]
    pub const fn from_level(level: bool) -> Self {
        if level {
            EdgeKind::Rising
        } else {
            EdgeKind::Falling
        }
    }
}

/// A transition on one channel: the dispatch key for the edge path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// Channel that changed.
    pub channel: Channel,
    /// Direction of the level change.
    pub kind: EdgeKind,
}

impl Edge {
    /// Creates an edge key.
    #[inline]
    pub const fn new(channel: Channel, kind: EdgeKind) -> Self {
        Self { channel, kind }
    }

    /// Edge on `channel` whose kind is taken from that channel's level in `pair`.
    #[inline]
    pub const fn observed(channel: Channel, pair: ChannelPair) -> Self {
        Self::new(channel, EdgeKind::from_level(pair.level(channel)))
    }

    /// Index into a 4-slot per-edge table (A rising, A falling, B rising, B falling).
    #[inline]
    pub const fn slot(self) -> usize {
        let kind = match self.kind {
            EdgeKind::Rising => 0,
            EdgeKind::Falling => 1,
        };
        self.channel.index() * 2 + kind
    }
}

/// Levels of both channels sampled together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelPair {
    /// Channel A level (true = high).
    pub a: bool,
    /// Channel B level (true = high).
    pub b: bool,
}

impl ChannelPair {
    /// Creates a pair from two levels.
    #[inline]
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// Level of one channel.
    #[inline]
    pub const fn level(self, channel: Channel) -> bool {
        match channel {
            Channel::A => self.a,
            Channel::B => self.b,
        }
    }

    /// True when both channels are at the same level.
    #[inline]
    pub const fn is_matched(self) -> bool {
        self.a == self.b
    }
}

/// Free-running hardware tick counter.
///
/// The count wraps modulo 2^32. Consumers only ever look at differences
/// computed with [`u32::wrapping_sub`], which stay correct across rollover
/// as long as the true elapsed time is below 2^32 ticks.
pub trait TimeBase {
    /// Current tick count.
    fn now(&self) -> u32;

    /// Counter frequency in Hz.
    ///
    /// Defaults to the canonical 1 MHz.
    fn tick_rate_hz(&self) -> u32 {
        TICK_RATE_HZ
    }
}

/// Level sampling for the two encoder channels.
pub trait ChannelInput {
    /// Returns the current level of `channel` (true = high).
    fn sample(&self, channel: Channel) -> bool;

    /// Samples A then B.
    fn read_pair(&self) -> ChannelPair {
        ChannelPair::new(self.sample(Channel::A), self.sample(Channel::B))
    }
}

/// Pending-interrupt flags of the two channel lines.
///
/// Both lines trigger on rising and falling edges. They are independent:
/// one dispatch may find either, both, or neither pending.
pub trait EdgeLines {
    /// Returns true if `channel`'s line has a pending edge interrupt.
    fn is_pending(&self, channel: Channel) -> bool;

    /// Acknowledges the pending interrupt on `channel`'s line.
    fn clear_pending(&self, channel: Channel);
}

/// Text line output (serial console, log buffer, ...).
pub trait LineSink {
    /// Error type for write failures.
    type Error;

    /// Writes `line` verbatim. The caller includes the trailing newline.
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

impl<T: TimeBase + ?Sized> TimeBase for &T {
    #[inline]
    fn now(&self) -> u32 {
        (**self).now()
    }

    #[inline]
    fn tick_rate_hz(&self) -> u32 {
        (**self).tick_rate_hz()
    }
}

impl<T: ChannelInput + ?Sized> ChannelInput for &T {
    #[inline]
    fn sample(&self, channel: Channel) -> bool {
        (**self).sample(channel)
    }

    #[inline]
    fn read_pair(&self) -> ChannelPair {
        (**self).read_pair()
    }
}

impl<T: EdgeLines + ?Sized> EdgeLines for &T {
    #[inline]
    fn is_pending(&self, channel: Channel) -> bool {
        (**self).is_pending(channel)
    }

    #[inline]
    fn clear_pending(&self, channel: Channel) {
        (**self).clear_pending(channel)
    }
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    type Error = T::Error;

    #[inline]
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        (**self).write_line(line)
    }
}
