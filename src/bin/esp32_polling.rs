//! ESP32-C3 SuperMini encoder tachometer, polled.
//!
//! Samples both encoder channels in a paced loop instead of taking an
//! interrupt per edge. The loop body runs the decode and stall check every
//! iteration and prints a status line once per report period, measured on
//! the same tick counter used to timestamp edges.
//!
//! Each iteration ends with a busy wait of `POLL_PERIOD_US`. That period is
//! the aliasing bound: edges closer together than one period are coalesced.
//! Use `esp32_main` when the shaft turns fast enough for that to matter.
//! After every status line the loop blocks on FreeRTOS for `POLL_YIELD_MS`
//! so the idle task runs and the task watchdog stays fed.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_polling
//! espflash flash --monitor target/riscv32imc-esp-espidf/release/esp32_polling
//! ```

use esp_idf_hal::delay::Delay;
use esp_idf_hal::peripherals::Peripherals;
use quad_tach::hal::esp32::{Esp32Channels, Esp32TimeBase};
use quad_tach::hal::StdoutSink;
use quad_tach::traits::{ChannelInput, TimeBase};
use quad_tach::{Cadence, Config, EdgeTracker, PollingBinding, Reporter, SharedReading};

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();

    println!();
    println!("================================");
    println!("  quad-tach SuperMini (polling)");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::default();
    config.validate()?;
    println!(
        "[OK] Config: {} PPR x {} edges, stall {} ticks, clamp {} ticks",
        config.encoder.pulses_per_rev,
        config.encoder.edges_per_pulse,
        config.encoder.stall_timeout_ticks,
        config.encoder.plausibility_max_delta
    );
    println!(
        "[OK] Poll pacing: {} us per sample, {} ms yield per report",
        config.poll.period_us, config.poll.yield_ms
    );
    if config.poll.yield_ms == 0 {
        println!("[WARN] Poll yield disabled, task watchdog may fire");
    }

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize Encoder Channels (GPIO6/7)
    // =========================================================================
    let channels = Esp32Channels::new(peripherals.pins.gpio6, peripherals.pins.gpio7)?;
    println!("[OK] Encoder initialized (GPIO6/7, polled)");
    println!("[SKIP] Edge interrupt not used in polling mode");

    // =========================================================================
    // Initialize Time Base, Binding and Reporter
    // =========================================================================
    let time = Esp32TimeBase::new();
    let shared = SharedReading::new(time.now());
    let tracker = EdgeTracker::new(&shared, time, channels.read_pair(), config.encoder);
    let mut binding = PollingBinding::new(&channels, tracker);

    let mut reporter = Reporter::from_config(&shared, StdoutSink::new(), &config);
    let mut cadence = Cadence::new(config.report_period_ticks(), time.now());

    println!();
    println!("Reporting every {} ms...", config.report.period_ms);
    println!();

    // =========================================================================
    // Poll Loop
    // =========================================================================
    // Waits below one RTOS tick busy-wait, longer ones block on FreeRTOS.
    let mut delay = Delay::new_default();
    let err = reporter.run_polled(&mut binding, &mut cadence, &mut delay, &config.poll);
    Err(err.into())
}
