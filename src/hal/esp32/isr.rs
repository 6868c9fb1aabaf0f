//! Edge interrupt lines and handler registration for ESP32-C3.
//!
//! All GPIOs share one interrupt source on the C3. A single handler is
//! registered with `gpio_isr_register`; it runs
//! [`InterruptBinding::dispatch`], which checks the pending bit of each
//! encoder line in `GPIO_STATUS_REG`, clears it through
//! `GPIO_STATUS_W1TC_REG`, then reads both channels.

use core::ffi::c_void;
use core::ptr;

use esp_idf_hal::sys::{
    esp, esp_intr_free, gpio_isr_handle_t, gpio_isr_register, EspError, ESP_INTR_FLAG_LEVEL1,
};

use super::pins::{GPIO_STATUS_REG, GPIO_STATUS_W1TC_REG};
use crate::edge::InterruptBinding;
use crate::traits::{Channel, ChannelInput, EdgeLines, TimeBase};

/// Pending-interrupt bits of the two encoder GPIOs.
#[derive(Clone, Copy, Debug)]
pub struct Esp32EdgeLines {
    masks: [u32; 2],
}

impl Esp32EdgeLines {
    /// Lines for channel A on GPIO `a` and channel B on GPIO `b`.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            masks: [1u32 << a, 1u32 << b],
        }
    }
}

impl EdgeLines for Esp32EdgeLines {
    #[inline]
    fn is_pending(&self, channel: Channel) -> bool {
        // Safe: aligned read of a memory-mapped status register
        let status = unsafe { ptr::read_volatile(GPIO_STATUS_REG as *const u32) };
        status & self.masks[channel.index()] != 0
    }

    #[inline]
    fn clear_pending(&self, channel: Channel) {
        // Safe: write-one-to-clear touches only this line's bit
        unsafe {
            ptr::write_volatile(
                GPIO_STATUS_W1TC_REG as *mut u32,
                self.masks[channel.index()],
            )
        };
    }
}

/// A registered edge interrupt handler.
///
/// Owns the binding the handler dispatches into. Dropping it frees the
/// interrupt before releasing the binding.
pub struct EdgeIsr<L, I, T>
where
    L: EdgeLines,
    I: ChannelInput,
    T: TimeBase,
{
    handle: gpio_isr_handle_t,
    binding: *mut InterruptBinding<'static, L, I, T>,
}

impl<L, I, T> Drop for EdgeIsr<L, I, T>
where
    L: EdgeLines,
    I: ChannelInput,
    T: TimeBase,
{
    fn drop(&mut self) {
        // Safe: the handle came from gpio_isr_register and the pointer from
        // Box::into_raw; once the interrupt is freed nothing else aliases it.
        unsafe {
            esp_intr_free(self.handle);
            drop(Box::from_raw(self.binding));
        }
    }
}

unsafe extern "C" fn edge_handler<L, I, T>(arg: *mut c_void)
where
    L: EdgeLines,
    I: ChannelInput,
    T: TimeBase,
{
    // Only this handler dereferences the binding while it is registered
    let binding = &mut *(arg as *mut InterruptBinding<'static, L, I, T>);
    binding.dispatch();
}

/// Registers `binding` as the GPIO interrupt handler.
///
/// The pins must already be armed (see
/// [`Esp32Channels::enable_edge_interrupts`](super::Esp32Channels::enable_edge_interrupts)).
/// Do not combine with `PinDriver::subscribe`, which installs the per-pin ISR
/// service on the same interrupt source.
///
/// # Errors
///
/// Returns an error if no interrupt could be allocated.
pub fn install_edge_isr<L, I, T>(
    binding: InterruptBinding<'static, L, I, T>,
) -> Result<EdgeIsr<L, I, T>, EspError>
where
    L: EdgeLines,
    I: ChannelInput,
    T: TimeBase,
{
    let binding = Box::into_raw(Box::new(binding));
    let mut handle: gpio_isr_handle_t = ptr::null_mut();

    let registered = esp!(unsafe {
        gpio_isr_register(
            Some(edge_handler::<L, I, T>),
            binding as *mut c_void,
            ESP_INTR_FLAG_LEVEL1 as i32,
            &mut handle,
        )
    });

    if let Err(e) = registered {
        // Safe: never handed to the interrupt controller
        drop(unsafe { Box::from_raw(binding) });
        return Err(e);
    }

    Ok(EdgeIsr { handle, binding })
}
