//! ESP32 tick source using the ESP-IDF high resolution timer.

use crate::config::TICK_RATE_HZ;
use crate::traits::TimeBase;

/// ESP32 time base over `esp_timer_get_time()`.
///
/// The ESP-IDF timer counts microseconds since boot in 64 bits; the low 32
/// bits are a free-running 1 MHz counter that wraps every ~71.6 minutes.
///
/// # Example
///
/// ```ignore
/// use quad_tach::hal::esp32::Esp32TimeBase;
/// use quad_tach::traits::TimeBase;
///
/// let time = Esp32TimeBase::new();
/// let start = time.now();
/// // ... do work ...
/// let elapsed = time.now().wrapping_sub(start);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Esp32TimeBase;

impl Esp32TimeBase {
    /// Creates a new ESP32 time base.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Esp32TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBase for Esp32TimeBase {
    #[inline]
    fn now(&self) -> u32 {
        // Safe: a read of the hardware timer, callable from ISR context
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        micros as u32
    }

    #[inline]
    fn tick_rate_hz(&self) -> u32 {
        TICK_RATE_HZ
    }
}
