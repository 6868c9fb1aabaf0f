//! ESP32-C3 SuperMini hardware abstraction layer for encoder speed measurement.
//!
//! This module supplies the three capabilities the measurement core needs:
//! a tick counter, channel sampling (with edge interrupt lines), and a
//! console to print readings on.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Encoder**: two-channel quadrature encoder, open-collector outputs
//! - **Console**: UART0 via the USB bridge (stdout)
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments matching the SuperMini layout.

mod clock;
mod encoder;
mod isr;

pub use clock::Esp32TimeBase;
pub use encoder::Esp32Channels;
pub use isr::{install_edge_isr, EdgeIsr, Esp32EdgeLines};

/// Pin assignments and GPIO registers for SuperMini ESP32-C3.
pub mod pins {
    // =========================================================================
    // Quadrature Encoder
    // =========================================================================

    /// Encoder channel A
    pub const ENC_A: i32 = 6;

    /// Encoder channel B
    pub const ENC_B: i32 = 7;

    // =========================================================================
    // GPIO Interrupt Status (ESP32-C3 TRM, GPIO matrix)
    // =========================================================================

    /// GPIO_STATUS_REG: one pending bit per GPIO
    pub const GPIO_STATUS_REG: usize = 0x6000_4044;

    /// GPIO_STATUS_W1TC_REG: write 1 to clear a pending bit
    pub const GPIO_STATUS_W1TC_REG: usize = 0x6000_404C;
}
