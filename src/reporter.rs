//! Periodic status line output.
//!
//! Each report tick re-evaluates the stall condition against the shared
//! reading, then emits exactly one line:
//!
//! ```text
//! 0.61 Hz CW
//! ```
//!
//! The cadence is driven either by a blocking fixed-duration wait between
//! ticks (see [`Reporter::run_blocking`]) or by a non-blocking [`Cadence`]
//! compared against the free-running tick counter.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::reporter::Reporter;
//! use quad_tach::hal::MockSink;
//! use quad_tach::{Direction, Reading, SharedReading};
//!
//! let shared = SharedReading::new(0);
//! shared.publish(Reading::new(12.5, Direction::Cw), 1_000);
//!
//! let mut reporter = Reporter::new(&shared, MockSink::new(), 100_000, 2);
//! reporter.tick(50_000).unwrap();
//! assert_eq!(reporter.sink().last(), Some("12.50 Hz CW\n"));
//! ```

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String as HString;

use crate::config::{Config, PollConfig};
use crate::edge::PollingBinding;
use crate::state::{Reading, SharedReading};
use crate::traits::{ChannelInput, LineSink, TimeBase};

/// Capacity of a formatted status line.
pub const LINE_CAPACITY: usize = 32;

/// A formatted status line.
pub type StatusLine = HString<LINE_CAPACITY>;

/// Format `reading` as `"<velocity> Hz <CW|CCW>\n"`.
///
/// `decimals` is clamped to 2..=3.
///
/// # Examples
///
/// ```
/// use quad_tach::reporter::format_line;
/// use quad_tach::{Direction, Reading};
///
/// let line = format_line(Reading::new(0.6127, Direction::Ccw), 3);
/// assert_eq!(line.as_str(), "0.613 Hz CCW\n");
/// ```
pub fn format_line(reading: Reading, decimals: u8) -> StatusLine {
    let precision = decimals.clamp(2, 3) as usize;
    let mut line = StatusLine::new();
    // Reading caps velocity at MAX_VELOCITY_HZ, which fits the capacity.
    let _ = writeln!(
        line,
        "{:.*} Hz {}",
        precision,
        reading.velocity_hz,
        reading.direction.label()
    );
    line
}

/// Non-blocking cadence against a wrapping tick counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    period_ticks: u32,
    last: u32,
}

impl Cadence {
    /// Creates a cadence of `period_ticks`, with the first period starting at `start`.
    pub const fn new(period_ticks: u32, start: u32) -> Self {
        Self {
            period_ticks,
            last: start,
        }
    }

    /// True once more than a full period has elapsed since the last firing.
    ///
    /// Rearms from `now` when it fires.
    pub fn due(&mut self, now: u32) -> bool {
        if now.wrapping_sub(self.last) > self.period_ticks {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Period in ticks.
    pub fn period_ticks(&self) -> u32 {
        self.period_ticks
    }
}

/// Status line reporter.
///
/// Reads the shared cell only; the stall check zeroes the shared velocity
/// through [`SharedReading::expire_if_stalled`].
pub struct Reporter<'a, W: LineSink> {
    shared: &'a SharedReading,
    sink: W,
    stall_timeout_ticks: u32,
    decimals: u8,
}

impl<'a, W: LineSink> Reporter<'a, W> {
    /// Creates a reporter.
    pub fn new(shared: &'a SharedReading, sink: W, stall_timeout_ticks: u32, decimals: u8) -> Self {
        Self {
            shared,
            sink,
            stall_timeout_ticks,
            decimals,
        }
    }

    /// Creates a reporter using the stall timeout and precision from `config`.
    pub fn from_config(shared: &'a SharedReading, sink: W, config: &Config) -> Self {
        Self::new(
            shared,
            sink,
            config.encoder.stall_timeout_ticks,
            config.report.decimals,
        )
    }

    /// One report tick at time `now`: stall check, then one line.
    ///
    /// Returns the reading that was printed.
    pub fn tick(&mut self, now: u32) -> Result<Reading, W::Error> {
        self.shared.expire_if_stalled(now, self.stall_timeout_ticks);
        let reading = self.shared.snapshot();
        let line = format_line(reading, self.decimals);
        self.sink.write_line(&line)?;
        Ok(reading)
    }

    /// Report forever, waiting `period_ms` between ticks.
    ///
    /// Returns only if the sink fails.
    pub fn run_blocking<T, D>(&mut self, time: &T, delay: &mut D, period_ms: u32) -> W::Error
    where
        T: TimeBase,
        D: DelayNs,
    {
        loop {
            delay.delay_ms(period_ms);
            if let Err(e) = self.tick(time.now()) {
                return e;
            }
        }
    }

    /// One iteration of a polled main loop.
    ///
    /// Samples and decodes, runs the stall check, prints a line if `cadence`
    /// is due, then waits `poll.period_us`. That fixed wait is the aliasing
    /// bound: transitions closer together than one period are coalesced.
    /// After a line the wait also blocks for `poll.yield_ms` so other tasks
    /// get to run.
    ///
    /// Returns the printed reading, if a line was due.
    pub fn poll_step<I, T, D>(
        &mut self,
        binding: &mut PollingBinding<'_, I, T>,
        cadence: &mut Cadence,
        delay: &mut D,
        poll: &PollConfig,
    ) -> Result<Option<Reading>, W::Error>
    where
        I: ChannelInput,
        T: TimeBase,
        D: DelayNs,
    {
        binding.poll();
        binding.check_stall();

        let now = binding.tracker().time().now();
        let printed = if cadence.due(now) {
            let reading = self.tick(now)?;
            if poll.yield_ms > 0 {
                delay.delay_ms(poll.yield_ms);
            }
            Some(reading)
        } else {
            None
        };

        delay.delay_us(poll.period_us);
        Ok(printed)
    }

    /// Run [`poll_step`](Self::poll_step) forever.
    ///
    /// Returns only if the sink fails.
    pub fn run_polled<I, T, D>(
        &mut self,
        binding: &mut PollingBinding<'_, I, T>,
        cadence: &mut Cadence,
        delay: &mut D,
        poll: &PollConfig,
    ) -> W::Error
    where
        I: ChannelInput,
        T: TimeBase,
        D: DelayNs,
    {
        loop {
            if let Err(e) = self.poll_step(binding, cadence, delay, poll) {
                return e;
            }
        }
    }

    /// The output sink.
    pub fn sink(&self) -> &W {
        &self.sink
    }
}
