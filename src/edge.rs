//! Edge sources: interrupt-driven and polled bindings over one decode core.
//!
//! Both bindings feed an [`EdgeTracker`], which owns the producer side of the
//! measurement: the [`EncoderState`], the time base used to timestamp edges,
//! and the [`SharedReading`] it publishes into. Dispatch is keyed by
//! [`Edge`] (channel + edge kind).
//!
//! # Interrupt binding
//!
//! [`InterruptBinding::dispatch`] is the body of the edge interrupt handler.
//! For each channel line, in order A then B, it checks the pending flag and,
//! if set, clears it, reads both channels, and runs decode + update. Both
//! lines may be serviced in one dispatch. Transitions are processed in
//! arrival order. A read that matches the last decoded pair (the second line
//! of a back-to-back pair, or a glitch that settled before the read) is not a
//! transition: the line is acknowledged and nothing is decoded.
//!
//! # Polling binding
//!
//! [`PollingBinding::poll`] samples both channels once per loop iteration
//! and declares an edge when either differs from the previous sample.
//! Transitions closer together than the poll period are coalesced: if both
//! channels changed between two samples, the intermediate state is lost and
//! only one transition is processed. Timing accuracy is bounded by the poll
//! period; prefer the interrupt binding when edge-accurate timing matters.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::config::EncoderConfig;
//! use quad_tach::edge::{EdgeTracker, PollingBinding};
//! use quad_tach::hal::{MockChannels, MockTimeBase};
//! use quad_tach::traits::ChannelInput;
//! use quad_tach::SharedReading;
//!
//! let shared = SharedReading::new(0);
//! let time = MockTimeBase::new();
//! let channels = MockChannels::new();
//!
//! let tracker = EdgeTracker::new(&shared, &time, channels.read_pair(), EncoderConfig::default());
//! let mut binding = PollingBinding::new(&channels, tracker);
//!
//! assert!(binding.poll().is_none());
//!
//! channels.set(true, false);
//! time.set(1_000);
//! assert!(binding.poll().is_some());
//! ```

use crate::config::EncoderConfig;
use crate::estimator::{EncoderState, EstimatorPhase};
use crate::state::{Reading, SharedReading};
use crate::traits::{Channel, ChannelInput, ChannelPair, Edge, EdgeLines, TimeBase};

/// Producer side of the measurement, shared by both bindings.
pub struct EdgeTracker<'a, T: TimeBase> {
    state: EncoderState,
    shared: &'a SharedReading,
    time: T,
    config: EncoderConfig,
    edge_counts: [u32; 4],
}

impl<'a, T: TimeBase> EdgeTracker<'a, T> {
    /// Creates a tracker.
    ///
    /// `initial` is the channel pair sampled at startup; the startup tick is
    /// read from `time`.
    pub fn new(
        shared: &'a SharedReading,
        time: T,
        initial: ChannelPair,
        config: EncoderConfig,
    ) -> Self {
        let now = time.now();
        Self {
            state: EncoderState::new(initial, now),
            shared,
            time,
            config,
            edge_counts: [0; 4],
        }
    }

    /// Handle `edge`, after which the channels read `pair`.
    ///
    /// Timestamps the transition, runs decode + velocity update, and
    /// publishes the resulting reading.
    pub fn on_edge(&mut self, edge: Edge, pair: ChannelPair) -> Reading {
        let now = self.time.now();
        let slot = &mut self.edge_counts[edge.slot()];
        *slot = slot.wrapping_add(1);

        let reading = self.state.on_transition(pair, now, &self.config);
        self.shared.publish(reading, now);
        reading
    }

    /// Stall check for a context that owns the tracker.
    ///
    /// Zeroes the estimator and the shared reading when stalled.
    pub fn check_stall(&mut self) -> bool {
        let now = self.time.now();
        let was_stalled = self.state.phase() == EstimatorPhase::Stalled;
        let stalled = self.state.check_stall(now, &self.config);
        if stalled && !was_stalled {
            self.shared.store(self.state.reading());
        }
        stalled
    }

    /// Number of times `edge` has been dispatched (wrapping).
    pub fn edge_count(&self, edge: Edge) -> u32 {
        self.edge_counts[edge.slot()]
    }

    /// Total dispatched edges across all channels and kinds (wrapping).
    pub fn total_edges(&self) -> u32 {
        self.edge_counts
            .iter()
            .fold(0u32, |acc, n| acc.wrapping_add(*n))
    }

    /// Estimator state.
    pub fn state(&self) -> &EncoderState {
        &self.state
    }

    /// Estimator configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// The cell this tracker publishes into.
    pub fn shared(&self) -> &'a SharedReading {
        self.shared
    }

    /// The time base edges are stamped with.
    pub fn time(&self) -> &T {
        &self.time
    }
}

// ============================================================================
// Interrupt Binding
// ============================================================================

/// Edge interrupt handler body.
///
/// Owns the line flags and channel input used from interrupt context. The
/// handler installed for the two channel lines calls [`dispatch`](Self::dispatch).
pub struct InterruptBinding<'a, L, I, T>
where
    L: EdgeLines,
    I: ChannelInput,
    T: TimeBase,
{
    lines: L,
    input: I,
    tracker: EdgeTracker<'a, T>,
    unchanged: u32,
}

impl<'a, L, I, T> InterruptBinding<'a, L, I, T>
where
    L: EdgeLines,
    I: ChannelInput,
    T: TimeBase,
{
    /// Creates the binding. The tracker should be seeded from `input`.
    pub fn new(lines: L, input: I, tracker: EdgeTracker<'a, T>) -> Self {
        Self {
            lines,
            input,
            tracker,
            unchanged: 0,
        }
    }

    /// Service every pending channel line.
    ///
    /// Returns the number of lines serviced (0, 1 or 2).
    pub fn dispatch(&mut self) -> usize {
        let mut serviced = 0;
        for channel in Channel::ALL {
            if self.service(channel) {
                serviced += 1;
            }
        }
        serviced
    }

    /// Service one line: clear, read, decode + update.
    ///
    /// Returns false if the line had nothing pending. A pending line whose
    /// read shows no change from the last decoded pair is still serviced,
    /// but skips decode and is counted in [`unchanged`](Self::unchanged).
    pub fn service(&mut self, channel: Channel) -> bool {
        if !self.lines.is_pending(channel) {
            return false;
        }
        self.lines.clear_pending(channel);

        let pair = self.input.read_pair();
        if pair == self.tracker.state().prev() {
            self.unchanged = self.unchanged.wrapping_add(1);
            return true;
        }
        self.tracker.on_edge(Edge::observed(channel, pair), pair);
        true
    }

    /// Number of serviced lines whose read showed no transition.
    pub fn unchanged(&self) -> u32 {
        self.unchanged
    }

    /// The shared decode core.
    pub fn tracker(&self) -> &EdgeTracker<'a, T> {
        &self.tracker
    }
}

// ============================================================================
// Polling Binding
// ============================================================================

/// Poll-loop edge detector.
pub struct PollingBinding<'a, I, T>
where
    I: ChannelInput,
    T: TimeBase,
{
    input: I,
    tracker: EdgeTracker<'a, T>,
    last_sample: ChannelPair,
    coalesced: u32,
}

impl<'a, I, T> PollingBinding<'a, I, T>
where
    I: ChannelInput,
    T: TimeBase,
{
    /// Creates the binding. The first comparison is against the pair the
    /// tracker was seeded with.
    pub fn new(input: I, tracker: EdgeTracker<'a, T>) -> Self {
        let last_sample = tracker.state().prev();
        Self {
            input,
            tracker,
            last_sample,
            coalesced: 0,
        }
    }

    /// One loop iteration: sample both channels and process a change.
    ///
    /// Returns the edge declared this iteration. When both channels changed
    /// since the last sample the edge is attributed to channel A and the
    /// coalescing is counted in [`coalesced`](Self::coalesced).
    pub fn poll(&mut self) -> Option<Edge> {
        let cur = self.input.read_pair();
        let prev = self.last_sample;
        if cur == prev {
            return None;
        }

        let a_changed = cur.a != prev.a;
        let b_changed = cur.b != prev.b;
        if a_changed && b_changed {
            self.coalesced = self.coalesced.wrapping_add(1);
        }

        let channel = if a_changed { Channel::A } else { Channel::B };
        let edge = Edge::observed(channel, cur);
        self.tracker.on_edge(edge, cur);
        self.last_sample = cur;
        Some(edge)
    }

    /// Stall check, run every loop iteration alongside [`poll`](Self::poll).
    pub fn check_stall(&mut self) -> bool {
        self.tracker.check_stall()
    }

    /// Number of polls that saw both channels change at once.
    pub fn coalesced(&self) -> u32 {
        self.coalesced
    }

    /// The shared decode core.
    pub fn tracker(&self) -> &EdgeTracker<'a, T> {
        &self.tracker
    }
}
