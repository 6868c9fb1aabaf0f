//! Velocity estimation from inter-edge tick deltas.
//!
//! [`EncoderState`] is owned by whichever context handles edges. Each
//! transition decodes a direction and turns the tick delta since the previous
//! transition into a speed:
//!
//! ```text
//! velocity = tick_rate_hz / delta / pulses_per_rev / edges_per_pulse
//! ```
//!
//! Two policies zero the result:
//!
//! - **plausibility**: a delta above `plausibility_max_delta` is too slow to
//!   be a real speed in the operating range, so the reading is clamped to 0;
//! - **stall**: no transition for more than `stall_timeout_ticks` forces 0.
//!   This is checked on the report cadence, not only on edges.
//!
//! # Phases
//!
//! ```text
//! Uninitialized --(2nd transition)--> Active --(stall check)--> Stalled
//!                                       ^                          |
//!                                       +------(next transition)---+
//! ```
//!
//! The first transition only seeds the timestamp; with no earlier edge to
//! diff against the velocity stays 0.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::config::EncoderConfig;
//! use quad_tach::estimator::{EncoderState, EstimatorPhase};
//! use quad_tach::traits::ChannelPair;
//!
//! let cfg = EncoderConfig::default().with_pulses_per_rev(1).with_edges_per_pulse(1);
//! let mut state = EncoderState::new(ChannelPair::new(false, false), 0);
//!
//! state.on_transition(ChannelPair::new(true, false), 1_000, &cfg);
//! assert_eq!(state.phase(), EstimatorPhase::Uninitialized);
//!
//! let reading = state.on_transition(ChannelPair::new(true, true), 2_000, &cfg);
//! assert_eq!(state.phase(), EstimatorPhase::Active);
//! assert_eq!(reading.velocity_hz, 1000.0);
//! ```

use crate::config::EncoderConfig;
use crate::decoder::{decode_pair, Direction};
use crate::state::Reading;
use crate::traits::ChannelPair;

/// Estimator lifecycle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EstimatorPhase {
    /// Fewer than two transitions seen; velocity is 0.
    #[default]
    Uninitialized,
    /// Velocity reflects the latest inter-edge delta.
    Active,
    /// No transition within the stall timeout; velocity forced to 0.
    Stalled,
}

/// Ticks elapsed from `from` to `to` on a wrapping 32-bit counter.
///
/// # Examples
///
/// ```
/// use quad_tach::estimator::tick_delta;
///
/// assert_eq!(tick_delta(1_000, 2_000), 1_000);
/// assert_eq!(tick_delta(0xFFFF_FFF0, 0x10), 0x20);
/// ```
#[inline]
pub const fn tick_delta(from: u32, to: u32) -> u32 {
    to.wrapping_sub(from)
}

/// Velocity implied by an inter-edge `delta`.
///
/// Returns `None` for a zero delta (no elapsed time: leave velocity as is),
/// `Some(0.0)` when the delta fails the plausibility check, otherwise the
/// speed in revolutions per second. Never returns a non-finite value.
pub fn velocity_from_delta(delta: u32, cfg: &EncoderConfig) -> Option<f32> {
    if delta == 0 {
        return None;
    }
    if delta > cfg.plausibility_max_delta {
        return Some(0.0);
    }

    let v = cfg.tick_rate_hz as f32
        / delta as f32
        / cfg.pulses_per_rev as f32
        / cfg.edges_per_pulse as f32;

    if v.is_finite() && v >= 0.0 {
        Some(v)
    } else {
        Some(0.0)
    }
}

/// Producer-owned decode and timing state for one encoder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderState {
    prev: ChannelPair,
    last_edge_time: u32,
    current_edge_time: u32,
    seeded: bool,
    phase: EstimatorPhase,
    direction: Direction,
    velocity: f32,
}

impl EncoderState {
    /// Creates the state at startup.
    ///
    /// `initial` is a sample of both channels taken before edges are
    /// handled; `now` seeds the transition timestamps.
    pub fn new(initial: ChannelPair, now: u32) -> Self {
        Self {
            prev: initial,
            last_edge_time: now,
            current_edge_time: now,
            seeded: false,
            phase: EstimatorPhase::Uninitialized,
            direction: Direction::default(),
            velocity: 0.0,
        }
    }

    /// Handle a transition to `cur` observed at tick `now`.
    ///
    /// Decodes the direction against the previous pair, shifts the
    /// timestamps, and recomputes the velocity from the wrapping delta.
    pub fn on_transition(&mut self, cur: ChannelPair, now: u32, cfg: &EncoderConfig) -> Reading {
        self.direction = decode_pair(self.prev, cur);
        self.prev = cur;

        self.last_edge_time = self.current_edge_time;
        self.current_edge_time = now;

        if !self.seeded {
            self.seeded = true;
            return self.reading();
        }

        self.phase = EstimatorPhase::Active;
        if let Some(v) = velocity_from_delta(self.last_delta(), cfg) {
            self.velocity = v;
        }
        self.reading()
    }

    /// Stall check at tick `now`.
    ///
    /// Once active, forces velocity to 0 and enters [`EstimatorPhase::Stalled`]
    /// when more than `stall_timeout_ticks` have passed since the last
    /// transition. Returns true while stalled.
    pub fn check_stall(&mut self, now: u32, cfg: &EncoderConfig) -> bool {
        match self.phase {
            EstimatorPhase::Uninitialized => false,
            EstimatorPhase::Stalled => true,
            EstimatorPhase::Active => {
                if tick_delta(self.current_edge_time, now) > cfg.stall_timeout_ticks {
                    self.velocity = 0.0;
                    self.phase = EstimatorPhase::Stalled;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Current `{velocity, direction}` pair.
    #[inline]
    pub fn reading(&self) -> Reading {
        Reading::new(self.velocity, self.direction)
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> EstimatorPhase {
        self.phase
    }

    /// Last decoded direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current velocity in revolutions per second.
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Channel pair the next transition is decoded against.
    #[inline]
    pub fn prev(&self) -> ChannelPair {
        self.prev
    }

    /// Tick of the transition before the most recent one.
    #[inline]
    pub fn last_edge_time(&self) -> u32 {
        self.last_edge_time
    }

    /// Tick of the most recent transition (startup tick before any).
    #[inline]
    pub fn current_edge_time(&self) -> u32 {
        self.current_edge_time
    }

    /// Wrapping delta between the two most recent transitions.
    #[inline]
    pub fn last_delta(&self) -> u32 {
        tick_delta(self.last_edge_time, self.current_edge_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: ChannelPair = ChannelPair::new(false, false);
    const A_HIGH: ChannelPair = ChannelPair::new(true, false);
    const BOTH_HIGH: ChannelPair = ChannelPair::new(true, true);
    const B_HIGH: ChannelPair = ChannelPair::new(false, true);

    fn unit_cfg() -> EncoderConfig {
        EncoderConfig::default()
            .with_pulses_per_rev(1)
            .with_edges_per_pulse(1)
    }

    /// State that has seen one transition at `t0`.
    fn seeded_at(t0: u32) -> EncoderState {
        let mut state = EncoderState::new(LOW, 0);
        state.on_transition(A_HIGH, t0, &EncoderConfig::default());
        state
    }

    // =========================================================================
    // velocity_from_delta() Tests
    // =========================================================================

    #[test]
    fn unit_constants_give_exact_hz() {
        assert_eq!(velocity_from_delta(1000, &unit_cfg()), Some(1000.0));
    }

    #[test]
    fn canonical_constants() {
        let cfg = EncoderConfig::default();
        // 1e6 / 1000 / 408 / 4
        let v = velocity_from_delta(1000, &cfg).unwrap();
        assert!((v - 0.612_745).abs() < 1e-5);
    }

    #[test]
    fn edges_per_pulse_divides() {
        let two = EncoderConfig::default().with_edges_per_pulse(2);
        let four = EncoderConfig::default().with_edges_per_pulse(4);
        let v2 = velocity_from_delta(1000, &two).unwrap();
        let v4 = velocity_from_delta(1000, &four).unwrap();
        assert!((v2 - 2.0 * v4).abs() < 1e-6);
    }

    #[test]
    fn zero_delta_is_none() {
        assert_eq!(velocity_from_delta(0, &unit_cfg()), None);
    }

    #[test]
    fn plausibility_boundary() {
        let cfg = EncoderConfig::default();
        assert!(velocity_from_delta(5_000, &cfg).unwrap() > 0.0);
        assert_eq!(velocity_from_delta(5_001, &cfg), Some(0.0));
    }

    #[test]
    fn degenerate_config_never_yields_non_finite() {
        let cfg = EncoderConfig::default().with_pulses_per_rev(0);
        assert_eq!(velocity_from_delta(10, &cfg), Some(0.0));
    }

    #[test]
    fn tick_delta_wraps() {
        assert_eq!(tick_delta(0xFFFF_FFF0, 0x10), 0x20);
        assert_eq!(tick_delta(5, 5), 0);
    }

    // =========================================================================
    // EncoderState Lifecycle Tests
    // =========================================================================

    #[test]
    fn initial_state_is_defined() {
        let state = EncoderState::new(LOW, 777);
        assert_eq!(state.phase(), EstimatorPhase::Uninitialized);
        assert_eq!(state.velocity(), 0.0);
        assert_eq!(state.direction(), Direction::Ccw);
        assert_eq!(state.current_edge_time(), 777);
        assert_eq!(state.prev(), LOW);
    }

    #[test]
    fn first_transition_only_seeds() {
        let mut state = EncoderState::new(LOW, 0);
        let r = state.on_transition(A_HIGH, 1_000, &unit_cfg());

        assert_eq!(r.velocity_hz, 0.0);
        assert_eq!(r.direction, Direction::Cw);
        assert_eq!(state.phase(), EstimatorPhase::Uninitialized);
        assert_eq!(state.current_edge_time(), 1_000);
        assert_eq!(state.prev(), A_HIGH);
    }

    #[test]
    fn second_transition_activates() {
        let mut state = EncoderState::new(LOW, 0);
        state.on_transition(A_HIGH, 1_000, &unit_cfg());
        let r = state.on_transition(BOTH_HIGH, 2_000, &unit_cfg());

        assert_eq!(state.phase(), EstimatorPhase::Active);
        assert_eq!(state.last_delta(), 1_000);
        assert_eq!(r.velocity_hz, 1000.0);
        assert_eq!(r.direction, Direction::Cw);
    }

    #[test]
    fn zero_delta_keeps_previous_velocity() {
        let mut state = EncoderState::new(LOW, 0);
        state.on_transition(A_HIGH, 1_000, &unit_cfg());
        state.on_transition(BOTH_HIGH, 2_000, &unit_cfg());
        let r = state.on_transition(B_HIGH, 2_000, &unit_cfg());

        assert_eq!(r.velocity_hz, 1000.0);
        assert_eq!(state.phase(), EstimatorPhase::Active);
    }

    #[test]
    fn slow_edge_clamped_to_zero() {
        let mut state = seeded_at(10_000);
        let r = state.on_transition(BOTH_HIGH, 15_001, &EncoderConfig::default());
        assert_eq!(state.last_delta(), 5_001);
        assert_eq!(r.velocity_hz, 0.0);
        assert_eq!(state.phase(), EstimatorPhase::Active);
    }

    #[test]
    fn wraparound_delta() {
        let mut state = seeded_at(0xFFFF_FFF0);
        state.on_transition(BOTH_HIGH, 0x10, &unit_cfg());
        assert_eq!(state.last_edge_time(), 0xFFFF_FFF0);
        assert_eq!(state.current_edge_time(), 0x10);
        assert_eq!(state.last_delta(), 0x20);
        assert_eq!(state.velocity(), 1_000_000.0 / 32.0);
    }

    // =========================================================================
    // Stall Tests
    // =========================================================================

    #[test]
    fn uninitialized_never_stalls() {
        let mut state = EncoderState::new(LOW, 0);
        assert!(!state.check_stall(1_000_000, &unit_cfg()));
        assert_eq!(state.phase(), EstimatorPhase::Uninitialized);

        state.on_transition(A_HIGH, 10, &unit_cfg());
        assert!(!state.check_stall(1_000_000, &unit_cfg()));
        assert_eq!(state.phase(), EstimatorPhase::Uninitialized);
    }

    #[test]
    fn stall_forces_zero() {
        let mut state = EncoderState::new(LOW, 0);
        state.on_transition(A_HIGH, 1_000, &unit_cfg());
        state.on_transition(BOTH_HIGH, 2_000, &unit_cfg());
        assert!(state.velocity() > 0.0);

        assert!(!state.check_stall(102_000, &unit_cfg()));
        assert_eq!(state.velocity(), 1000.0);

        assert!(state.check_stall(102_001, &unit_cfg()));
        assert_eq!(state.velocity(), 0.0);
        assert_eq!(state.phase(), EstimatorPhase::Stalled);
        assert_eq!(state.direction(), Direction::Cw);

        // Stays stalled.
        assert!(state.check_stall(102_002, &unit_cfg()));
    }

    #[test]
    fn transition_leaves_stall() {
        let mut state = EncoderState::new(LOW, 0);
        state.on_transition(A_HIGH, 1_000, &unit_cfg());
        state.on_transition(BOTH_HIGH, 2_000, &unit_cfg());
        state.check_stall(500_000, &unit_cfg());
        assert_eq!(state.phase(), EstimatorPhase::Stalled);

        // First edge after a stall: long delta, clamped by plausibility.
        state.on_transition(B_HIGH, 600_000, &unit_cfg());
        assert_eq!(state.phase(), EstimatorPhase::Active);
        assert_eq!(state.velocity(), 0.0);

        // Next edge is a real measurement again.
        state.on_transition(LOW, 602_000, &unit_cfg());
        assert_eq!(state.velocity(), 500.0);
    }

    #[test]
    fn velocity_never_negative_over_sequence() {
        let cfg = EncoderConfig::default();
        let mut state = EncoderState::new(LOW, 0);
        let pairs = [A_HIGH, BOTH_HIGH, B_HIGH, LOW];
        let mut t: u32 = 0xFFFF_0000;
        for i in 0..64u32 {
            t = t.wrapping_add((i * 997) % 7_000);
            let r = state.on_transition(pairs[(i % 4) as usize], t, &cfg);
            assert!(r.velocity_hz >= 0.0);
            assert!(r.velocity_hz.is_finite());
            state.check_stall(t.wrapping_add(i * 5_000), &cfg);
            assert!(state.velocity() >= 0.0);
        }
    }
}
