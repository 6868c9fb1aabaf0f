//! ESP32-C3 SuperMini encoder tachometer, interrupt-driven.
//!
//! This is the main entry point for the physical hardware. Every rising and
//! falling edge on either encoder channel raises a GPIO interrupt whose
//! handler decodes the transition and updates the shared reading. The main
//! task then prints one status line every report period:
//!
//! ```text
//! 12.34 Hz CW
//! ```
//!
//! # Hardware Setup
//!
//! - Encoder A → GPIO6, B → GPIO7 (internal pull-ups)
//! - Console on UART0 (USB)
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/riscv32imc-esp-espidf/release/esp32_main
//! ```

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use quad_tach::hal::esp32::{install_edge_isr, Esp32Channels, Esp32EdgeLines, Esp32TimeBase};
use quad_tach::hal::StdoutSink;
use quad_tach::traits::{ChannelInput, TimeBase};
use quad_tach::{Config, EdgeTracker, InterruptBinding, Reporter, SharedReading};

/// Reading shared between the edge interrupt and the report loop.
static SHARED: SharedReading = SharedReading::new(0);

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();

    println!();
    println!("================================");
    println!("  quad-tach SuperMini (interrupt)");
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

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize Encoder Channels (GPIO6/7)
    // =========================================================================
    let mut channels = Esp32Channels::new(peripherals.pins.gpio6, peripherals.pins.gpio7)?;
    channels.enable_edge_interrupts()?;
    let (pin_a, pin_b) = channels.pin_numbers();
    println!("[OK] Encoder initialized (GPIO{}/{}, any edge)", pin_a, pin_b);

    // =========================================================================
    // Initialize Time Base and Edge Interrupt
    // =========================================================================
    let time = Esp32TimeBase::new();
    if time.tick_rate_hz() != config.encoder.tick_rate_hz {
        println!(
            "[WARN] Time base runs at {} Hz, config expects {} Hz",
            time.tick_rate_hz(),
            config.encoder.tick_rate_hz
        );
    }

    let tracker = EdgeTracker::new(&SHARED, time, channels.read_pair(), config.encoder);
    let lines = Esp32EdgeLines::new(pin_a, pin_b);
    let _isr = install_edge_isr(InterruptBinding::new(lines, channels, tracker))?;
    println!("[OK] Edge interrupt registered");

    println!();
    println!("Reporting every {} ms...", config.report.period_ms);
    println!();

    // =========================================================================
    // Report Loop
    // =========================================================================
    let mut reporter = Reporter::from_config(&SHARED, StdoutSink::new(), &config);
    let mut delay = FreeRtos;
    let err = reporter.run_blocking(&time, &mut delay, config.report.period_ms);
    Err(err.into())
}
