//! Measurement and reporting configuration.
//!
//! The canonical deployment values are `pub const` items so firmware can use
//! them at compile time. [`Config`] bundles them into runtime structs that
//! default to the same values and can be adjusted with `with_*` builders.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::config::{Config, EncoderConfig, ReportConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.encoder.pulses_per_rev, 408);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_encoder(EncoderConfig::default().with_edges_per_pulse(2))
//!     .with_report(ReportConfig::default().with_decimals(3));
//! assert!(config.validate().is_ok());
//! ```

use core::fmt;

/// Time base frequency in Hz (1 tick = 1 µs).
pub const TICK_RATE_HZ: u32 = 1_000_000;

/// Encoder pulses per shaft revolution.
pub const PULSES_PER_REV: u32 = 408;

/// Counted edges per encoder pulse (both edges of both channels).
pub const EDGES_PER_PULSE: u32 = 4;

/// Ticks without a transition before the shaft is considered stopped (100 ms).
pub const STALL_TIMEOUT_TICKS: u32 = 100_000;

/// Largest inter-edge delta still treated as a plausible speed (5 ms).
pub const PLAUSIBILITY_MAX_DELTA: u32 = 5_000;

/// Status line cadence in milliseconds.
pub const REPORT_PERIOD_MS: u32 = 200;

/// Decimal places printed for the velocity.
pub const REPORT_DECIMALS: u8 = 2;

/// Fixed wait between polling iterations in microseconds.
///
/// This is the aliasing bound of the polling binding: transitions closer
/// together than one period are sampled as one (or missed entirely when
/// both channels return to their previous levels).
pub const POLL_PERIOD_US: u32 = 50;

/// Blocking wait after each status line in the polling loop, in milliseconds.
///
/// One FreeRTOS tick at the default 100 Hz, so lower-priority tasks
/// (including the idle task that feeds the task watchdog) get to run.
pub const POLL_YIELD_MS: u32 = 10;

// ============================================================================
// Errors
// ============================================================================

/// Invalid configuration value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Tick rate must be non-zero.
    ZeroTickRate,
    /// Pulses per revolution must be non-zero.
    ZeroPulsesPerRev,
    /// Edges per pulse must be 1, 2 or 4.
    InvalidEdgesPerPulse(u32),
    /// Plausibility threshold must be below the stall timeout.
    PlausibilityNotBelowStall {
        /// Configured plausibility threshold in ticks.
        plausibility_max_delta: u32,
        /// Configured stall timeout in ticks.
        stall_timeout_ticks: u32,
    },
    /// Report period must be non-zero.
    ZeroReportPeriod,
    /// Report decimals must be 2 or 3.
    InvalidDecimals(u8),
    /// Poll period must be non-zero.
    ZeroPollPeriod,
    /// Poll period must be below the plausibility threshold.
    PollPeriodNotBelowPlausibility {
        /// Configured poll period in ticks.
        poll_period_ticks: u32,
        /// Configured plausibility threshold in ticks.
        plausibility_max_delta: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::ZeroTickRate => write!(f, "tick rate must be non-zero"),
            ConfigError::ZeroPulsesPerRev => write!(f, "pulses per revolution must be non-zero"),
            ConfigError::InvalidEdgesPerPulse(n) => {
                write!(f, "edges per pulse must be 1, 2 or 4 (got {})", n)
            }
            ConfigError::PlausibilityNotBelowStall {
                plausibility_max_delta,
                stall_timeout_ticks,
            } => write!(
                f,
                "plausibility threshold ({} ticks) must be below stall timeout ({} ticks)",
                plausibility_max_delta, stall_timeout_ticks
            ),
            ConfigError::ZeroReportPeriod => write!(f, "report period must be non-zero"),
            ConfigError::InvalidDecimals(n) => {
                write!(f, "report decimals must be 2 or 3 (got {})", n)
            }
            ConfigError::ZeroPollPeriod => write!(f, "poll period must be non-zero"),
            ConfigError::PollPeriodNotBelowPlausibility {
                poll_period_ticks,
                plausibility_max_delta,
            } => write!(
                f,
                "poll period ({} ticks) must be below plausibility threshold ({} ticks)",
                poll_period_ticks, plausibility_max_delta
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Encoder and velocity estimation settings
    pub encoder: EncoderConfig,
    /// Status line settings
    pub report: ReportConfig,
    /// Polling loop pacing
    pub poll: PollConfig,
}

impl Config {
    /// Set encoder configuration
    pub fn with_encoder(mut self, encoder: EncoderConfig) -> Self {
        self.encoder = encoder;
        self
    }

    /// Set report configuration
    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }

    /// Set polling loop configuration
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Validate every section.
    ///
    /// A poll period at or above the plausibility threshold would make every
    /// polled delta implausible, so that pairing is rejected too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.encoder.validate()?;
        self.report.validate()?;
        self.poll.validate()?;
        let poll_period_ticks = self.poll_period_ticks();
        if poll_period_ticks >= self.encoder.plausibility_max_delta {
            return Err(ConfigError::PollPeriodNotBelowPlausibility {
                poll_period_ticks,
                plausibility_max_delta: self.encoder.plausibility_max_delta,
            });
        }
        Ok(())
    }

    /// Report period expressed in encoder time base ticks.
    pub fn report_period_ticks(&self) -> u32 {
        self.report.period_ticks(self.encoder.tick_rate_hz)
    }

    /// Poll period expressed in encoder time base ticks.
    pub fn poll_period_ticks(&self) -> u32 {
        self.poll.period_ticks(self.encoder.tick_rate_hz)
    }
}

// ============================================================================
// Encoder Config
// ============================================================================

/// Encoder geometry and velocity estimation policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderConfig {
    /// Time base frequency in Hz
    pub tick_rate_hz: u32,
    /// Encoder pulses per revolution
    pub pulses_per_rev: u32,
    /// Counted edges per pulse (2 or 4 depending on wiring, 1 for raw edge rate)
    pub edges_per_pulse: u32,
    /// Ticks without an edge before velocity is forced to zero
    pub stall_timeout_ticks: u32,
    /// Largest inter-edge delta that still yields a non-zero velocity
    pub plausibility_max_delta: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::canonical()
    }
}

impl EncoderConfig {
    /// The canonical deployment values.
    pub const fn canonical() -> Self {
        Self {
            tick_rate_hz: TICK_RATE_HZ,
            pulses_per_rev: PULSES_PER_REV,
            edges_per_pulse: EDGES_PER_PULSE,
            stall_timeout_ticks: STALL_TIMEOUT_TICKS,
            plausibility_max_delta: PLAUSIBILITY_MAX_DELTA,
        }
    }

    /// Set the time base frequency
    pub fn with_tick_rate_hz(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Set pulses per revolution
    pub fn with_pulses_per_rev(mut self, ppr: u32) -> Self {
        self.pulses_per_rev = ppr;
        self
    }

    /// Set edges per pulse
    pub fn with_edges_per_pulse(mut self, edges: u32) -> Self {
        self.edges_per_pulse = edges;
        self
    }

    /// Set the stall timeout
    pub fn with_stall_timeout_ticks(mut self, ticks: u32) -> Self {
        self.stall_timeout_ticks = ticks;
        self
    }

    /// Set the plausibility threshold
    pub fn with_plausibility_max_delta(mut self, ticks: u32) -> Self {
        self.plausibility_max_delta = ticks;
        self
    }

    /// Time base ticks per millisecond (at least 1).
    pub fn ticks_per_ms(&self) -> u32 {
        (self.tick_rate_hz / 1000).max(1)
    }

    /// Counted edges per shaft revolution.
    pub fn edges_per_rev(&self) -> u32 {
        self.pulses_per_rev.saturating_mul(self.edges_per_pulse)
    }

    /// Check the values against the estimator's assumptions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.pulses_per_rev == 0 {
            return Err(ConfigError::ZeroPulsesPerRev);
        }
        if !matches!(self.edges_per_pulse, 1 | 2 | 4) {
            return Err(ConfigError::InvalidEdgesPerPulse(self.edges_per_pulse));
        }
        if self.plausibility_max_delta >= self.stall_timeout_ticks {
            return Err(ConfigError::PlausibilityNotBelowStall {
                plausibility_max_delta: self.plausibility_max_delta,
                stall_timeout_ticks: self.stall_timeout_ticks,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Report Config
// ============================================================================

/// Status line configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportConfig {
    /// Interval between status lines in milliseconds
    pub period_ms: u32,
    /// Decimal places printed for the velocity (2 or 3)
    pub decimals: u8,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            period_ms: REPORT_PERIOD_MS,
            decimals: REPORT_DECIMALS,
        }
    }
}

impl ReportConfig {
    /// Set the report period
    pub fn with_period_ms(mut self, ms: u32) -> Self {
        self.period_ms = ms;
        self
    }

    /// Set the velocity precision
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Report period in ticks of a time base running at `tick_rate_hz`.
    pub fn period_ticks(&self, tick_rate_hz: u32) -> u32 {
        self.period_ms.saturating_mul((tick_rate_hz / 1000).max(1))
    }

    /// Check the values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::ZeroReportPeriod);
        }
        if !(2..=3).contains(&self.decimals) {
            return Err(ConfigError::InvalidDecimals(self.decimals));
        }
        Ok(())
    }
}

// ============================================================================
// Poll Config
// ============================================================================

/// Pacing of the polling loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollConfig {
    /// Fixed wait between samples in microseconds (the aliasing bound)
    pub period_us: u32,
    /// Blocking wait after each status line in milliseconds (0 disables it)
    pub yield_ms: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            period_us: POLL_PERIOD_US,
            yield_ms: POLL_YIELD_MS,
        }
    }
}

impl PollConfig {
    /// Set the wait between samples
    pub fn with_period_us(mut self, us: u32) -> Self {
        self.period_us = us;
        self
    }

    /// Set the wait after each status line
    pub fn with_yield_ms(mut self, ms: u32) -> Self {
        self.yield_ms = ms;
        self
    }

    /// Poll period in ticks of a time base running at `tick_rate_hz`.
    pub fn period_ticks(&self, tick_rate_hz: u32) -> u32 {
        let ticks = u64::from(self.period_us) * u64::from(tick_rate_hz) / 1_000_000;
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    /// Check the values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_us == 0 {
            return Err(ConfigError::ZeroPollPeriod);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
