//! NVIC interrupt control.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

use thyra_hal::irq::{IrqCtl, IrqVector};

/// Raw vector number bridged into the `cortex-m` API.
#[derive(Clone, Copy)]
struct RawIrq(u16);

unsafe impl InterruptNumber for RawIrq {
    fn number(self) -> u16 {
        self.0
    }
}

/// Interrupt controller handle. Owns the NVIC peripheral so priority
/// writes have a single owner.
pub struct Nvic {
    nvic: NVIC,
}

impl Nvic {
    pub fn new(nvic: NVIC) -> Self {
        Self { nvic }
    }
}

impl IrqCtl for Nvic {
    fn enable(&mut self, vector: IrqVector) {
        // Unmasking is only done after the owning device record is
        // complete; see the bus start paths.
        unsafe { NVIC::unmask(RawIrq(vector.0)) };
    }

    fn disable(&mut self, vector: IrqVector) {
        NVIC::mask(RawIrq(vector.0));
    }

    fn set_priority(&mut self, vector: IrqVector, priority: u8) {
        // The M0 core implements the top two priority bits.
        unsafe { self.nvic.set_priority(RawIrq(vector.0), priority << 6) };
    }
}
