//! Platform service bundle
//!
//! The four ambient services a peripheral bus needs - clock gates, pin
//! configuration, a tick source and the interrupt controller - travel
//! together. Selecting a [`Platform`] implementation at compile time picks
//! the whole strategy: real silicon in firmware, fakes under test.

use crate::clocks::ClockGates;
use crate::gpio::GpioCtl;
use crate::irq::IrqCtl;
use crate::time::Monotonic;

/// Bundle of the chip-level services consumed by every peripheral family.
pub trait Platform {
    type Gates: ClockGates;
    type Gpio: GpioCtl;
    type Clock: Monotonic;
    type Irqs: IrqCtl;

    /// Clock and port gating.
    fn gates(&mut self) -> &mut Self::Gates;

    /// Pin mode configuration.
    fn gpio(&mut self) -> &mut Self::Gpio;

    /// Tick source for bounded polls.
    fn clock(&self) -> &Self::Clock;

    /// Interrupt controller.
    fn irqs(&mut self) -> &mut Self::Irqs;
}
