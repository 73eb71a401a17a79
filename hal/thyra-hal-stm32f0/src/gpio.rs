//! GPIO mode programming over the F0 port register layout.
//!
//! Claiming a pin opens its port clock gate as a side effect; the gate is
//! handed back through [`thyra_hal::clocks::ClockGates::disable_port`]
//! when the owning peripheral stops.

use thyra_hal::gpio::{Drive, GpioCtl, PinError, Port, Pull, Speed, AF_MAX, PIN_MAX};

use crate::mmio::Mmio;
use crate::rcc::{port_bit, AHBENR, RCC_BASE};

const GPIO_BASE: usize = 0x4800_0000;
const PORT_STRIDE: usize = 0x400;

// Offsets within a port block.
const MODER: usize = 0x00;
const OTYPER: usize = 0x04;
const OSPEEDR: usize = 0x08;
const PUPDR: usize = 0x0C;
const AFRL: usize = 0x20;
const AFRH: usize = 0x24;

// MODER pin modes.
const MODE_ALTERNATE: u32 = 0b10;
const MODE_ANALOG: u32 = 0b11;

/// The six F0 GPIO port blocks plus the AHB gate register feeding them.
pub struct F0Gpio {
    ports: [Mmio; 6],
    ahb: Mmio,
}

impl F0Gpio {
    /// # Safety
    ///
    /// Only one `F0Gpio` may exist; pin claims must not race other port
    /// register users from interrupt context.
    pub unsafe fn new() -> Self {
        Self {
            ports: [
                Mmio::new(GPIO_BASE),
                Mmio::new(GPIO_BASE + PORT_STRIDE),
                Mmio::new(GPIO_BASE + 2 * PORT_STRIDE),
                Mmio::new(GPIO_BASE + 3 * PORT_STRIDE),
                Mmio::new(GPIO_BASE + 4 * PORT_STRIDE),
                Mmio::new(GPIO_BASE + 5 * PORT_STRIDE),
            ],
            ahb: Mmio::new(RCC_BASE),
        }
    }

    fn claim_port(&mut self, port: Port) {
        self.ahb.modify(AHBENR, 0, port_bit(port));
    }
}

impl GpioCtl for F0Gpio {
    fn set_alternate_function(&mut self, port: Port, pin: u8, af: u8) -> Result<(), PinError> {
        if pin > PIN_MAX || af > AF_MAX {
            return Err(PinError);
        }
        self.claim_port(port);

        let shift = pin as u32 * 2;
        let block = &mut self.ports[port.index()];
        block.modify(MODER, 0b11 << shift, MODE_ALTERNATE << shift);

        let (afr, slot) = if pin < 8 {
            (AFRL, pin as u32)
        } else {
            (AFRH, pin as u32 - 8)
        };
        block.modify(afr, 0xF << (slot * 4), (af as u32) << (slot * 4));
        Ok(())
    }

    fn set_output_parameters(
        &mut self,
        port: Port,
        pin: u8,
        pull: Pull,
        drive: Drive,
        speed: Speed,
    ) -> Result<(), PinError> {
        if pin > PIN_MAX {
            return Err(PinError);
        }
        let block = &mut self.ports[port.index()];

        let otype = match drive {
            Drive::PushPull => 0,
            Drive::OpenDrain => 1,
        };
        block.modify(OTYPER, 1 << pin, otype << pin);

        let shift = pin as u32 * 2;
        let ospeed = match speed {
            Speed::Low => 0b00,
            Speed::Medium => 0b01,
            Speed::High => 0b11,
        };
        block.modify(OSPEEDR, 0b11 << shift, ospeed << shift);

        let pupd = match pull {
            Pull::None => 0b00,
            Pull::Up => 0b01,
            Pull::Down => 0b10,
        };
        block.modify(PUPDR, 0b11 << shift, pupd << shift);
        Ok(())
    }

    fn set_analog(&mut self, port: Port, pin: u8) {
        if pin > PIN_MAX {
            return;
        }
        self.claim_port(port);
        let shift = pin as u32 * 2;
        self.ports[port.index()].modify(MODER, 0b11 << shift, MODE_ANALOG << shift);
    }
}
