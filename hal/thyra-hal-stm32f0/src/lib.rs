//! STM32F0-specific backend for Thyra
//!
//! Implements the `thyra-hal` trait surface over the F0-series register
//! map: memory-mapped banks for USART1-4 and ADC1, RCC clock/port
//! gating, GPIO mode programming, NVIC control through `cortex-m` and a
//! SysTick-driven millisecond tick source.
//!
//! # Bring-up
//!
//! The unsafe constructors assert exclusive ownership of their register
//! blocks; build everything once at reset and move the buses into
//! whatever owns the main loop. A typical receive-interrupt wiring:
//!
//! ```text
//! static SERIAL: Mutex<RefCell<Option<UsartBus<F0Usart, F0Platform>>>> =
//!     Mutex::new(RefCell::new(None));
//!
//! #[interrupt]
//! fn USART1() {
//!     cortex_m::interrupt::free(|cs| {
//!         if let Some(bus) = SERIAL.borrow(cs).borrow_mut().as_mut() {
//!             bus.dispatch(UsartId::Usart1);
//!         }
//!     });
//! }
//!
//! #[exception]
//! fn SysTick() {
//!     SysTickClock::on_tick();
//! }
//! ```

#![no_std]

mod adc;
mod gpio;
mod irq;
mod mmio;
mod rcc;
mod time;
mod usart;

pub use adc::{AdcBank, F0Adc};
pub use gpio::F0Gpio;
pub use irq::Nvic;
pub use rcc::Rcc;
pub use time::SysTickClock;
pub use usart::{F0Usart, UsartBank};

use thyra_hal::platform::Platform;

/// The four chip services bundled for the bus constructors.
pub struct F0Platform {
    pub gates: Rcc,
    pub gpio: F0Gpio,
    pub clock: SysTickClock,
    pub irqs: Nvic,
}

impl F0Platform {
    pub fn new(gates: Rcc, gpio: F0Gpio, clock: SysTickClock, irqs: Nvic) -> Self {
        Self {
            gates,
            gpio,
            clock,
            irqs,
        }
    }
}

impl Platform for F0Platform {
    type Gates = Rcc;
    type Gpio = F0Gpio;
    type Clock = SysTickClock;
    type Irqs = Nvic;

    fn gates(&mut self) -> &mut Rcc {
        &mut self.gates
    }

    fn gpio(&mut self) -> &mut F0Gpio {
        &mut self.gpio
    }

    fn clock(&self) -> &SysTickClock {
        &self.clock
    }

    fn irqs(&mut self) -> &mut Nvic {
        &mut self.irqs
    }
}
