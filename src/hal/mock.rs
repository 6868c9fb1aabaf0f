//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without an encoder attached.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockTimeBase`] | [`TimeBase`] | Controllable wrapping tick counter |
//! | [`MockChannels`] | [`ChannelInput`] | Settable A/B levels, counts samples |
//! | [`MockLines`] | [`EdgeLines`] | Raise/clear pending flags, counts clears |
//! | [`MockSink`] | [`LineSink`] | Captures emitted lines, optional failure |
//! | [`MockDelay`] | [`DelayNs`] | Accumulates requested wait time |
//!
//! Everything except [`MockSink`] and [`MockDelay`] is driven through `&self`,
//! so a test can hand `&mock` to a binding and keep changing it afterwards.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::config::EncoderConfig;
//! use quad_tach::edge::{EdgeTracker, InterruptBinding};
//! use quad_tach::hal::{MockChannels, MockLines, MockTimeBase};
//! use quad_tach::traits::{Channel, ChannelInput};
//! use quad_tach::SharedReading;
//!
//! let shared = SharedReading::new(0);
//! let time = MockTimeBase::new();
//! let channels = MockChannels::new();
//! let lines = MockLines::new();
//!
//! let tracker = EdgeTracker::new(&shared, &time, channels.read_pair(), EncoderConfig::default());
//! let mut isr = InterruptBinding::new(&lines, &channels, tracker);
//!
//! // Simulate channel A rising at t = 1 ms
//! time.set(1_000);
//! channels.set(true, false);
//! lines.raise(Channel::A);
//! assert_eq!(isr.dispatch(), 1);
//! assert_eq!(shared.last_edge_time(), 1_000);
//! ```
//!
//! [`TimeBase`]: crate::traits::TimeBase
//! [`ChannelInput`]: crate::traits::ChannelInput
//! [`EdgeLines`]: crate::traits::EdgeLines
//! [`LineSink`]: crate::traits::LineSink
//! [`DelayNs`]: embedded_hal::delay::DelayNs

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use crate::config::TICK_RATE_HZ;
use crate::traits::{Channel, ChannelInput, ChannelPair, EdgeLines, LineSink, TimeBase};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock tick counter.
///
/// # Example
///
/// ```rust
/// use quad_tach::hal::MockTimeBase;
/// use quad_tach::traits::TimeBase;
///
/// let time = MockTimeBase::new();
/// assert_eq!(time.now(), 0);
///
/// time.set(0xFFFF_FFF0);
/// time.advance(0x20);
/// assert_eq!(time.now(), 0x10); // wrapped
/// ```
#[derive(Debug)]
pub struct MockTimeBase {
    now: Cell<u32>,
    rate_hz: u32,
}

impl MockTimeBase {
    /// Creates a 1 MHz counter at tick 0.
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            rate_hz: TICK_RATE_HZ,
        }
    }

    /// Reports a different counter frequency.
    pub fn with_rate_hz(mut self, rate_hz: u32) -> Self {
        self.rate_hz = rate_hz;
        self
    }

    /// Sets the current tick.
    pub fn set(&self, ticks: u32) {
        self.now.set(ticks);
    }

    /// Advances the counter, wrapping at 2^32.
    pub fn advance(&self, ticks: u32) {
        self.now.set(self.now.get().wrapping_add(ticks));
    }
}

impl Default for MockTimeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBase for MockTimeBase {
    fn now(&self) -> u32 {
        self.now.get()
    }

    fn tick_rate_hz(&self) -> u32 {
        self.rate_hz
    }
}

/// Mock encoder channel levels.
///
/// # Example
///
/// ```rust
/// use quad_tach::hal::MockChannels;
/// use quad_tach::traits::{Channel, ChannelInput, ChannelPair};
///
/// let channels = MockChannels::new();
/// channels.toggle(Channel::B);
/// assert_eq!(channels.read_pair(), ChannelPair::new(false, true));
/// assert_eq!(channels.sample_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockChannels {
    levels: Cell<ChannelPair>,
    samples: Cell<u32>,
}

impl MockChannels {
    /// Creates channels with both levels low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates channels at the given levels.
    pub fn with_levels(a: bool, b: bool) -> Self {
        let channels = Self::new();
        channels.set(a, b);
        channels
    }

    /// Sets both levels.
    pub fn set(&self, a: bool, b: bool) {
        self.levels.set(ChannelPair::new(a, b));
    }

    /// Sets one channel's level.
    pub fn set_channel(&self, channel: Channel, level: bool) {
        let mut pair = self.levels.get();
        match channel {
            Channel::A => pair.a = level,
            Channel::B => pair.b = level,
        }
        self.levels.set(pair);
    }

    /// Inverts one channel's level.
    pub fn toggle(&self, channel: Channel) {
        let level = self.levels.get().level(channel);
        self.set_channel(channel, !level);
    }

    /// Current levels without counting a sample.
    pub fn levels(&self) -> ChannelPair {
        self.levels.get()
    }

    /// Number of single-channel samples taken.
    pub fn sample_count(&self) -> u32 {
        self.samples.get()
    }
}

impl ChannelInput for MockChannels {
    fn sample(&self, channel: Channel) -> bool {
        self.samples.set(self.samples.get() + 1);
        self.levels.get().level(channel)
    }
}

/// Mock edge interrupt lines.
///
/// # Example
///
/// ```rust
/// use quad_tach::hal::MockLines;
/// use quad_tach::traits::{Channel, EdgeLines};
///
/// let lines = MockLines::new();
/// lines.raise(Channel::A);
/// assert!(lines.is_pending(Channel::A));
/// assert!(!lines.is_pending(Channel::B));
///
/// lines.clear_pending(Channel::A);
/// assert!(!lines.is_pending(Channel::A));
/// assert_eq!(lines.clear_count(Channel::A), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockLines {
    pending: [Cell<bool>; 2],
    clears: [Cell<u32>; 2],
}

impl MockLines {
    /// Creates lines with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `channel`'s line as pending.
    pub fn raise(&self, channel: Channel) {
        self.pending[channel.index()].set(true);
    }

    /// Number of times `channel`'s line was cleared.
    pub fn clear_count(&self, channel: Channel) -> u32 {
        self.clears[channel.index()].get()
    }
}

impl EdgeLines for MockLines {
    fn is_pending(&self, channel: Channel) -> bool {
        self.pending[channel.index()].get()
    }

    fn clear_pending(&self, channel: Channel) {
        let i = channel.index();
        self.pending[i].set(false);
        self.clears[i].set(self.clears[i].get() + 1);
    }
}

/// Mock line sink for testing.
///
/// Captures every line written. Can be told to fail, immediately or after a
/// number of successful writes; failed writes are not captured.
///
/// # Example
///
/// ```rust
/// use quad_tach::hal::MockSink;
/// use quad_tach::traits::LineSink;
///
/// let mut sink = MockSink::failing_after(1);
/// assert!(sink.write_line("1.00 Hz CW\n").is_ok());
/// assert!(sink.write_line("1.00 Hz CW\n").is_err());
/// assert_eq!(sink.lines().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockSink {
    lines: Vec<String>,
    fail_after: Option<usize>,
}

impl MockSink {
    /// Creates a sink that accepts every line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose every write fails.
    pub fn failing() -> Self {
        Self::failing_after(0)
    }

    /// Creates a sink that accepts `n` lines, then fails.
    pub fn failing_after(n: usize) -> Self {
        Self {
            lines: Vec::new(),
            fail_after: Some(n),
        }
    }

    /// All captured lines, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The most recent captured line.
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Drops captured lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl LineSink for MockSink {
    type Error = ();

    fn write_line(&mut self, line: &str) -> Result<(), ()> {
        if let Some(limit) = self.fail_after {
            if self.lines.len() >= limit {
                return Err(());
            }
        }
        self.lines.push(String::from(line));
        Ok(())
    }
}

/// Mock blocking delay that only records how long it was asked to wait.
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: u64,
    calls: u32,
}

impl MockDelay {
    /// Creates a delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requested wait in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }

    /// Total requested wait in microseconds.
    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }

    /// Number of delay calls.
    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.calls += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += ms as u64 * 1_000_000;
        self.calls += 1;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // MockTimeBase Tests
    // =========================================================================

    #[test]
    fn mock_time_default() {
        let time = MockTimeBase::default();
        assert_eq!(time.now(), 0);
        assert_eq!(time.tick_rate_hz(), 1_000_000);
    }

    #[test]
    fn mock_time_set_and_advance() {
        let time = MockTimeBase::new();
        time.set(500);
        time.advance(250);
        assert_eq!(time.now(), 750);
    }

    #[test]
    fn mock_time_wraps() {
        let time = MockTimeBase::new();
        time.set(u32::MAX);
        time.advance(1);
        assert_eq!(time.now(), 0);
    }

    #[test]
    fn mock_time_custom_rate() {
        let time = MockTimeBase::new().with_rate_hz(80_000_000);
        assert_eq!(time.tick_rate_hz(), 80_000_000);
    }

    // =========================================================================
    // MockChannels Tests
    // =========================================================================

    #[test]
    fn mock_channels_default_low() {
        let channels = MockChannels::new();
        assert_eq!(channels.levels(), ChannelPair::new(false, false));
        assert_eq!(channels.sample_count(), 0);
    }

    #[test]
    fn mock_channels_set_channel() {
        let channels = MockChannels::with_levels(true, true);
        channels.set_channel(Channel::A, false);
        assert_eq!(channels.levels(), ChannelPair::new(false, true));
    }

    #[test]
    fn mock_channels_counts_samples() {
        let channels = MockChannels::new();
        channels.sample(Channel::A);
        channels.read_pair();
        assert_eq!(channels.sample_count(), 3);
    }

    #[test]
    fn mock_channels_toggle() {
        let channels = MockChannels::new();
        channels.toggle(Channel::A);
        channels.toggle(Channel::A);
        channels.toggle(Channel::B);
        assert_eq!(channels.levels(), ChannelPair::new(false, true));
    }

    // =========================================================================
    // MockLines Tests
    // =========================================================================

    #[test]
    fn mock_lines_independent() {
        let lines = MockLines::new();
        lines.raise(Channel::B);
        assert!(!lines.is_pending(Channel::A));
        assert!(lines.is_pending(Channel::B));

        lines.clear_pending(Channel::B);
        assert!(!lines.is_pending(Channel::B));
        assert_eq!(lines.clear_count(Channel::A), 0);
        assert_eq!(lines.clear_count(Channel::B), 1);
    }

    // =========================================================================
    // MockSink Tests
    // =========================================================================

    #[test]
    fn mock_sink_captures_lines() {
        let mut sink = MockSink::new();
        sink.write_line("a\n").unwrap();
        sink.write_line("b\n").unwrap();
        assert_eq!(sink.lines(), ["a\n", "b\n"]);
        assert_eq!(sink.last(), Some("b\n"));

        sink.clear();
        assert!(sink.lines().is_empty());
        assert_eq!(sink.last(), None);
    }

    #[test]
    fn mock_sink_failing() {
        let mut sink = MockSink::failing();
        assert_eq!(sink.write_line("x\n"), Err(()));
        assert!(sink.lines().is_empty());
    }

    // =========================================================================
    // MockDelay Tests
    // =========================================================================

    #[test]
    fn mock_delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_ms(200);
        delay.delay_us(500);
        delay.delay_ms(200);
        assert_eq!(delay.total_ms(), 400);
        assert_eq!(delay.calls(), 3);
    }
}
