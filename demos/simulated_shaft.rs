//! Desktop simulation of an encoder shaft, for trying the measurement core
//! without hardware.
//!
//! A simulated shaft spins up, holds speed, speeds up again, and stops.
//! Its A/B levels drive the mock channels; both edge bindings run on
//! the same waveform and the interrupt-driven one prints status lines to
//! stdout on the report cadence, exactly as the firmware would.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example simulated_shaft
//! ```

use quad_tach::hal::{MockChannels, MockLines, MockTimeBase, StdoutSink};
use quad_tach::{
    Cadence, Channel, ChannelInput, Config, EdgeTracker, InterruptBinding, PollingBinding,
    Reporter, SharedReading, TimeBase,
};

/// Simulation step in ticks (10 us at 1 MHz).
const STEP_TICKS: u32 = 10;

/// Quadrature phase sequence, one step per counted edge.
const PHASES: [(bool, bool); 4] = [(false, false), (true, false), (true, true), (false, true)];

/// Edge period (ticks) over simulated time, or `None` while stopped.
fn edge_period(t: u32) -> Option<u32> {
    match t {
        0..=199_999 => None,
        200_000..=599_999 => Some(4_000 - (t - 200_000) / 200),
        600_000..=999_999 => Some(2_000),
        1_000_000..=1_399_999 => Some(1_000),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    println!("=================================");
    println!("  quad-tach Simulated Shaft");
    println!("=================================");
    println!();

    let config = Config::default();
    config.validate()?;
    println!(
        "[OK] {} PPR x {} edges, report every {} ms",
        config.encoder.pulses_per_rev, config.encoder.edges_per_pulse, config.report.period_ms
    );

    let time = MockTimeBase::new();
    let isr_channels = MockChannels::new();
    let poll_channels = MockChannels::new();
    let lines = MockLines::new();

    let isr_shared = SharedReading::new(time.now());
    let poll_shared = SharedReading::new(time.now());

    let tracker = EdgeTracker::new(&isr_shared, &time, isr_channels.read_pair(), config.encoder);
    let mut isr = InterruptBinding::new(&lines, &isr_channels, tracker);

    let tracker = EdgeTracker::new(&poll_shared, &time, poll_channels.read_pair(), config.encoder);
    let mut poll = PollingBinding::new(&poll_channels, tracker);

    let mut reporter = Reporter::from_config(&isr_shared, StdoutSink::new(), &config);
    let mut cadence = Cadence::new(config.report_period_ticks(), time.now());

    let mut phase = 0usize;
    let mut next_edge = 0u32;

    while time.now() < 1_600_000 {
        let now = time.now();

        if let Some(period) = edge_period(now) {
            if now >= next_edge {
                phase = (phase + 1) % 4;

                let (a, b) = PHASES[phase];
                let before = isr_channels.levels();
                isr_channels.set(a, b);
                poll_channels.set(a, b);
                for channel in Channel::ALL {
                    if before.level(channel) != isr_channels.levels().level(channel) {
                        lines.raise(channel);
                    }
                }
                next_edge = now + period;
            }
        }

        isr.dispatch();
        poll.poll();
        poll.check_stall();

        if cadence.due(now) {
            let printed = reporter.tick(now)?;
            let polled = poll_shared.snapshot();
            if (printed.velocity_hz - polled.velocity_hz).abs() > 0.01 {
                println!(
                    "[WARN] polling binding disagrees: {:.2} Hz {}",
                    polled.velocity_hz,
                    polled.direction.label()
                );
            }
        }

        time.advance(STEP_TICKS);
    }

    println!();
    println!(
        "[OK] {} edges dispatched, {} coalesced by polling",
        isr.tracker().total_edges(),
        poll.coalesced()
    );
    Ok(())
}
