//! Quadrature encoder channel inputs for ESP32.
//!
//! # Wiring
//!
//! - A → GPIO6
//! - B → GPIO7
//! - VCC → 3.3V
//! - GND → GND

use esp_idf_hal::gpio::{Input, InputPin, InterruptType, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::{esp, gpio_intr_enable, EspError};

use crate::traits::{Channel, ChannelInput};

/// Encoder A/B inputs for ESP32.
///
/// Sampling is a plain GPIO level read, so it can be used both from the poll
/// loop and from the edge interrupt handler.
///
/// # Example
///
/// ```ignore
/// use quad_tach::hal::esp32::Esp32Channels;
/// use quad_tach::traits::ChannelInput;
///
/// let peripherals = Peripherals::take()?;
/// let channels = Esp32Channels::new(
///     peripherals.pins.gpio6, // A
///     peripherals.pins.gpio7, // B
/// )?;
///
/// let pair = channels.read_pair();
/// println!("A={} B={}", pair.a, pair.b);
/// ```
pub struct Esp32Channels<'d, A, B>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
{
    /// Channel A input
    a: PinDriver<'d, A, Input>,
    /// Channel B input
    b: PinDriver<'d, B, Input>,
}

impl<'d, A, B> Esp32Channels<'d, A, B>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
{
    /// Configures both pins as inputs with internal pull-ups.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(
        a_pin: impl Peripheral<P = A> + 'd,
        b_pin: impl Peripheral<P = B> + 'd,
    ) -> Result<Self, EspError> {
        let mut a = PinDriver::input(a_pin)?;
        let mut b = PinDriver::input(b_pin)?;

        // Encoder outputs are open-collector
        a.set_pull(Pull::Up)?;
        b.set_pull(Pull::Up)?;

        Ok(Self { a, b })
    }

    /// Arms both pins to raise an interrupt on rising and falling edges.
    ///
    /// Only the interrupt type and enable bit are set here; the handler is
    /// registered with [`install_edge_isr`](super::install_edge_isr).
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO driver rejects the configuration.
    pub fn enable_edge_interrupts(&mut self) -> Result<(), EspError> {
        self.a.set_interrupt_type(InterruptType::AnyEdge)?;
        self.b.set_interrupt_type(InterruptType::AnyEdge)?;
        let (a, b) = self.pin_numbers();
        esp!(unsafe { gpio_intr_enable(a) })?;
        esp!(unsafe { gpio_intr_enable(b) })?;
        Ok(())
    }

    /// GPIO numbers of the A and B pins.
    pub fn pin_numbers(&self) -> (i32, i32) {
        (self.a.pin() as i32, self.b.pin() as i32)
    }
}

impl<A, B> ChannelInput for Esp32Channels<'_, A, B>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
{
    #[inline]
    fn sample(&self, channel: Channel) -> bool {
        match channel {
            Channel::A => self.a.is_high(),
            Channel::B => self.b.is_high(),
        }
    }
}
