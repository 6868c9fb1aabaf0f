//! Integration tests for the interrupt and polling bindings feeding the reporter

use quad_tach::{
    config::{Config, EncoderConfig},
    hal::{MockChannels, MockLines, MockSink, MockTimeBase},
    Cadence, Channel, ChannelInput, ChannelPair, Direction, EdgeTracker, InterruptBinding,
    PollingBinding, Reading, Reporter, SharedReading, TimeBase,
};

/// One CW cycle, as (tick, A, B, channel that changed).
const SLOW_CYCLE: [(u32, bool, bool, Channel); 8] = [
    (1_000, true, false, Channel::A),
    (2_000, true, true, Channel::B),
    (3_000, false, true, Channel::A),
    (4_000, false, false, Channel::B),
    (5_500, true, false, Channel::A),
    (7_000, true, true, Channel::B),
    (8_500, false, true, Channel::A),
    (10_000, false, false, Channel::B),
];

fn run_interrupt(config: EncoderConfig) -> Vec<Reading> {
    let shared = SharedReading::new(0);
    let time = MockTimeBase::new();
    let channels = MockChannels::new();
    let lines = MockLines::new();
    let tracker = EdgeTracker::new(&shared, &time, channels.read_pair(), config);
    let mut isr = InterruptBinding::new(&lines, &channels, tracker);

    let mut out = Vec::new();
    for (t, a, b, changed) in SLOW_CYCLE {
        time.set(t);
        channels.set(a, b);
        lines.raise(changed);
        assert_eq!(isr.dispatch(), 1);
        out.push(shared.snapshot());
    }
    out
}

fn run_polling(config: EncoderConfig) -> Vec<Reading> {
    let shared = SharedReading::new(0);
    let time = MockTimeBase::new();
    let channels = MockChannels::new();
    let tracker = EdgeTracker::new(&shared, &time, channels.read_pair(), config);
    let mut binding = PollingBinding::new(&channels, tracker);

    let mut out = Vec::new();
    for (t, a, b, changed) in SLOW_CYCLE {
        // A few idle polls between edges
        for _ in 0..3 {
            assert!(binding.poll().is_none());
            assert!(!binding.check_stall());
        }
        time.set(t);
        channels.set(a, b);
        let edge = binding.poll().map(|e| e.channel);
        assert_eq!(edge, Some(changed));
        out.push(shared.snapshot());
    }
    out
}

// ============================================================================
// Binding Equivalence
// ============================================================================

#[test]
fn bindings_agree_on_slow_sequence() {
    let config = EncoderConfig::default();
    let isr = run_interrupt(config);
    let poll = run_polling(config);
    assert_eq!(isr, poll);
}

#[test]
fn bindings_agree_with_unit_geometry() {
    let config = EncoderConfig::default()
        .with_pulses_per_rev(1)
        .with_edges_per_pulse(1);
    let isr = run_interrupt(config);
    assert_eq!(isr, run_polling(config));

    assert_eq!(isr[0], Reading::new(0.0, Direction::Cw));
    assert_eq!(isr[1].velocity_hz, 1000.0);
    assert_eq!(isr[4].velocity_hz, 1_000_000.0 / 1_500.0);
}

#[test]
fn interrupt_processes_back_to_back_lines_in_order() {
    let shared = SharedReading::new(0);
    let time = MockTimeBase::new();
    let channels = MockChannels::new();
    let lines = MockLines::new();
    let tracker = EdgeTracker::new(
        &shared,
        &time,
        channels.read_pair(),
        EncoderConfig::default(),
    );
    let mut isr = InterruptBinding::new(&lines, &channels, tracker);

    // A then B both landed before the handler ran
    time.set(1_000);
    channels.set(true, true);
    lines.raise(Channel::A);
    lines.raise(Channel::B);
    assert_eq!(isr.dispatch(), 2);
    assert_eq!(isr.tracker().total_edges(), 1);
    assert_eq!(isr.unchanged(), 1);
    assert_eq!(lines.clear_count(Channel::A), 1);
    assert_eq!(lines.clear_count(Channel::B), 1);
    assert!(shared.snapshot().velocity_hz >= 0.0);
}

#[test]
fn bindings_agree_after_settled_glitch() {
    let config = EncoderConfig::default();
    let time = MockTimeBase::new();
    let channels = MockChannels::new();
    let lines = MockLines::new();

    let isr_shared = SharedReading::new(0);
    let tracker = EdgeTracker::new(&isr_shared, &time, channels.read_pair(), config);
    let mut isr = InterruptBinding::new(&lines, &channels, tracker);

    let poll_shared = SharedReading::new(0);
    let tracker = EdgeTracker::new(&poll_shared, &time, channels.read_pair(), config);
    let mut poll = PollingBinding::new(&channels, tracker);

    for (t, a, b, changed) in SLOW_CYCLE.iter().take(2).copied() {
        time.set(t);
        channels.set(a, b);
        lines.raise(changed);
        isr.dispatch();
        poll.poll();
    }

    // A pulse on A too short to survive until the handler reads the pins
    time.set(2_500);
    lines.raise(Channel::A);
    isr.dispatch();
    assert!(poll.poll().is_none());

    assert_eq!(isr_shared.snapshot(), poll_shared.snapshot());
    assert_eq!(isr_shared.snapshot().direction, Direction::Cw);
    assert_eq!(isr.tracker().state().last_delta(), 1_000);
}

#[test]
fn polling_counts_coalesced_edges() {
    let shared = SharedReading::new(0);
    let time = MockTimeBase::new();
    let channels = MockChannels::new();
    let tracker = EdgeTracker::new(
        &shared,
        &time,
        channels.read_pair(),
        EncoderConfig::default(),
    );
    let mut binding = PollingBinding::new(&channels, tracker);

    time.set(100);
    channels.set(true, true);
    binding.poll();
    time.set(200);
    channels.set(false, false);
    binding.poll();

    assert_eq!(binding.coalesced(), 2);
    assert_eq!(binding.tracker().total_edges(), 2);
}

// ============================================================================
// Binding + Reporter
// ============================================================================

#[test]
fn interrupt_then_report_then_stall() {
    let config = Config::default();
    let shared = SharedReading::new(0);
    let time = MockTimeBase::new();
    let channels = MockChannels::new();
    let lines = MockLines::new();
    let tracker = EdgeTracker::new(&shared, &time, channels.read_pair(), config.encoder);
    let mut isr = InterruptBinding::new(&lines, &channels, tracker);
    let mut reporter = Reporter::from_config(&shared, MockSink::new(), &config);

    for (t, a, b, changed) in SLOW_CYCLE.iter().take(2).copied() {
        time.set(t);
        channels.set(a, b);
        lines.raise(changed);
        isr.dispatch();
    }

    reporter.tick(50_000).unwrap();
    reporter.tick(100_000).unwrap();
    reporter.tick(102_001).unwrap();

    assert_eq!(
        reporter.sink().lines(),
        ["0.61 Hz CW\n", "0.61 Hz CW\n", "0.00 Hz CW\n"]
    );
}

#[test]
fn polled_loop_reports_on_cadence() {
    let config = Config::default();
    let time = MockTimeBase::new();
    let channels = MockChannels::new();
    let shared = SharedReading::new(time.now());
    let tracker = EdgeTracker::new(&shared, &time, channels.read_pair(), config.encoder);
    let mut binding = PollingBinding::new(&channels, tracker);
    let mut reporter = Reporter::from_config(&shared, MockSink::new(), &config);
    let mut cadence = Cadence::new(config.report_period_ticks(), time.now());

    // Shaft turning with a 2 ms edge period for 1 s, loop every 100 us
    let cycle = [(true, false), (true, true), (false, true), (false, false)];
    let mut step = 0usize;
    for t in (0..1_000_000u32).step_by(100) {
        time.set(t);
        if t > 0 && t % 2_000 == 0 {
            let (a, b) = cycle[step % 4];
            channels.set(a, b);
            step += 1;
        }
        binding.poll();
        binding.check_stall();
        if cadence.due(t) {
            reporter.tick(t).unwrap();
        }
    }

    let lines = reporter.sink().lines();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l == "0.31 Hz CW\n"));
    assert_eq!(binding.coalesced(), 0);
}

#[test]
fn static_cell_shared_with_reporter() {
    static SHARED: SharedReading = SharedReading::new(0);

    let time = MockTimeBase::new();
    let channels = MockChannels::with_levels(true, true);
    let lines = MockLines::new();
    let tracker = EdgeTracker::new(
        &SHARED,
        &time,
        channels.read_pair(),
        EncoderConfig::default(),
    );
    let mut isr = InterruptBinding::new(&lines, &channels, tracker);

    time.set(10);
    channels.set_channel(Channel::A, false);
    lines.raise(Channel::A);
    isr.dispatch();

    assert_eq!(SHARED.last_edge_time(), 10);
    assert_eq!(isr.tracker().state().prev(), ChannelPair::new(false, true));
}
