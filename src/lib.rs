//! # quad-tach
//!
//! Shaft speed and direction measurement from a two-channel quadrature
//! encoder, reported as a text line on a fixed cadence.
//!
//! ## Features
//!
//! - **Quadrature decode**: direction from every transition of either channel
//! - **Velocity estimation**: inter-edge tick deltas with stall and plausibility policy
//! - **Two edge bindings**: interrupt-driven capture or cooperative polling, one decode core
//! - **Lock-free shared reading**: single-word snapshot between edge path and reporter
//! - **Hardware abstraction**: traits for the tick source, channels, and output
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions
//! - `decoder` - Pure quadrature direction rule
//! - `estimator` - Per-transition timing state and velocity
//! - `state` - Cross-context reading cell
//! - `edge` - Interrupt and polling bindings
//! - `reporter` - Status line formatting and cadence
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use quad_tach::{
//!     Config, EdgeTracker, PollingBinding, Reporter, SharedReading,
//!     hal::{MockChannels, MockSink, MockTimeBase},
//!     traits::{ChannelInput, TimeBase},
//! };
//!
//! let config = Config::default();
//! let shared = SharedReading::new(0);
//! let time = MockTimeBase::new();
//! let channels = MockChannels::new();
//!
//! let tracker = EdgeTracker::new(&shared, &time, channels.read_pair(), config.encoder);
//! let mut binding = PollingBinding::new(&channels, tracker);
//! let mut reporter = Reporter::from_config(&shared, MockSink::new(), &config);
//!
//! // One CW quarter-cycle every 1 ms
//! for (t, (a, b)) in [(1_000, (true, false)), (2_000, (true, true))] {
//!     time.set(t);
//!     channels.set(a, b);
//!     binding.poll();
//! }
//!
//! reporter.tick(time.now()).unwrap();
//! assert_eq!(reporter.sink().last(), Some("0.61 Hz CW\n"));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Shared configuration system for desktop and ESP32.
pub mod config;
/// Quadrature direction decoding.
pub mod decoder;
/// Edge sources feeding the decode core.
pub mod edge;
/// Velocity estimation with stall and plausibility policy.
pub mod estimator;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Periodic status line output.
pub mod reporter;
/// Lock-free reading cell shared between edge path and reporter.
pub mod state;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use decoder::{decode, decode_pair, Direction};
pub use edge::{EdgeTracker, InterruptBinding, PollingBinding};
pub use estimator::{EncoderState, EstimatorPhase};
pub use reporter::{format_line, Cadence, Reporter, StatusLine};
pub use state::{MAX_VELOCITY_HZ, Reading, SharedReading};
pub use traits::{
    Channel, ChannelInput, ChannelPair, Edge, EdgeKind, EdgeLines, LineSink, TimeBase,
};

// Config re-exports
pub use config::{Config, ConfigError, EncoderConfig, PollConfig, ReportConfig};
