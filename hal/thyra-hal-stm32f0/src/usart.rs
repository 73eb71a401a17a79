//! USART register banks, gate tokens and vectors.

use thyra_hal::clocks::ClockToken;
use thyra_hal::irq::IrqVector;
use thyra_hal::regs::RegisterBank;
use thyra_hal::usart::{UsartBackend, UsartId, UsartReg, USART_COUNT};

use crate::mmio::Mmio;
use crate::rcc::{token, APB1ENR, APB2ENR};

// Offsets within a USART block.
const CR1: usize = 0x00;
const BRR: usize = 0x0C;
const ISR: usize = 0x1C;
const RDR: usize = 0x24;
const TDR: usize = 0x28;

fn offset(reg: UsartReg) -> usize {
    match reg {
        UsartReg::Cr1 => CR1,
        UsartReg::Brr => BRR,
        UsartReg::Isr => ISR,
        UsartReg::Rdr => RDR,
        UsartReg::Tdr => TDR,
    }
}

/// One USART register block.
pub struct UsartBank {
    regs: Mmio,
}

impl RegisterBank<UsartReg> for UsartBank {
    fn read(&self, reg: UsartReg) -> u32 {
        self.regs.read(offset(reg))
    }

    fn write(&mut self, reg: UsartReg, value: u32) {
        self.regs.write(offset(reg), value)
    }
}

/// USART backend for F072-class parts: four fitted instances. The last
/// two table slots keep their documented bases but report absent.
pub struct F0Usart {
    banks: [UsartBank; USART_COUNT],
    clock_hz: u32,
}

impl F0Usart {
    /// `clock_hz` is the bus clock feeding the baud generators.
    ///
    /// # Safety
    ///
    /// Only one `F0Usart` may exist; bank access must not race the
    /// receive-interrupt handlers beyond the dispatch contract.
    pub unsafe fn new(clock_hz: u32) -> Self {
        Self {
            banks: [
                UsartBank {
                    regs: Mmio::new(0x4001_3800), // USART1
                },
                UsartBank {
                    regs: Mmio::new(0x4000_4400), // USART2
                },
                UsartBank {
                    regs: Mmio::new(0x4000_4800), // USART3
                },
                UsartBank {
                    regs: Mmio::new(0x4000_4C00), // USART4
                },
                UsartBank {
                    regs: Mmio::new(0x4000_5000), // USART5 (unfitted)
                },
                UsartBank {
                    regs: Mmio::new(0x4001_1400), // USART6 (unfitted)
                },
            ],
            clock_hz,
        }
    }
}

impl UsartBackend for F0Usart {
    type Bank = UsartBank;

    fn present(&self, id: UsartId) -> bool {
        id.index() < 4
    }

    fn bank(&mut self, id: UsartId) -> &mut UsartBank {
        &mut self.banks[id.index()]
    }

    fn clock_gate(&self, id: UsartId) -> ClockToken {
        match id {
            UsartId::Usart1 => token(APB2ENR, 14),
            UsartId::Usart2 => token(APB1ENR, 17),
            UsartId::Usart3 => token(APB1ENR, 18),
            UsartId::Usart4 => token(APB1ENR, 19),
            UsartId::Usart5 => token(APB1ENR, 20),
            UsartId::Usart6 => token(APB2ENR, 5),
        }
    }

    fn irq(&self, id: UsartId) -> IrqVector {
        match id {
            UsartId::Usart1 => IrqVector(27),
            UsartId::Usart2 => IrqVector(28),
            // USART3 and up share one vector on this family.
            _ => IrqVector(29),
        }
    }

    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }
}
