//! ADC register bank, gate token and the HSI14 oscillator hooks.

use thyra_hal::adc::{AdcBackend, AdcId, AdcReg};
use thyra_hal::clocks::ClockToken;
use thyra_hal::irq::IrqVector;
use thyra_hal::regs::RegisterBank;

use crate::mmio::Mmio;
use crate::rcc::{token, APB2ENR, CR2, CR2_HSI14ON, CR2_HSI14RDY, RCC_BASE};

const ADC1_BASE: usize = 0x4001_2400;

// Offsets within the ADC block. The common control register sits in the
// shared block above the instance registers.
const ISR: usize = 0x00;
const IER: usize = 0x04;
const CR: usize = 0x08;
const CFGR1: usize = 0x0C;
const CFGR2: usize = 0x10;
const SMPR: usize = 0x14;
const CHSELR: usize = 0x28;
const DR: usize = 0x40;
const CCR: usize = 0x308;

fn offset(reg: AdcReg) -> usize {
    match reg {
        AdcReg::Isr => ISR,
        AdcReg::Ier => IER,
        AdcReg::Cr => CR,
        AdcReg::Cfgr1 => CFGR1,
        AdcReg::Cfgr2 => CFGR2,
        AdcReg::Smpr => SMPR,
        AdcReg::Chselr => CHSELR,
        AdcReg::Dr => DR,
        AdcReg::Ccr => CCR,
    }
}

/// The ADC1 register block.
pub struct AdcBank {
    regs: Mmio,
}

impl RegisterBank<AdcReg> for AdcBank {
    fn read(&self, reg: AdcReg) -> u32 {
        self.regs.read(offset(reg))
    }

    fn write(&mut self, reg: AdcReg, value: u32) {
        self.regs.write(offset(reg), value)
    }
}

/// ADC backend for F0-class parts: one fitted converter, clocked by the
/// dedicated HSI14 oscillator.
pub struct F0Adc {
    bank: AdcBank,
    osc: Mmio,
}

impl F0Adc {
    /// # Safety
    ///
    /// Only one `F0Adc` may exist; the oscillator hooks touch RCC CR2
    /// and must not race [`crate::Rcc`] from interrupt context.
    pub unsafe fn new() -> Self {
        Self {
            bank: AdcBank {
                regs: Mmio::new(ADC1_BASE),
            },
            osc: Mmio::new(RCC_BASE),
        }
    }
}

impl AdcBackend for F0Adc {
    type Bank = AdcBank;

    fn present(&self, id: AdcId) -> bool {
        id == AdcId::Adc1
    }

    fn bank(&mut self, _id: AdcId) -> &mut AdcBank {
        &mut self.bank
    }

    fn clock_gate(&self, _id: AdcId) -> ClockToken {
        token(APB2ENR, 9)
    }

    fn irq(&self, _id: AdcId) -> IrqVector {
        IrqVector(12)
    }

    fn start_sample_clock(&mut self) {
        self.osc.modify(CR2, 0, CR2_HSI14ON);
    }

    fn sample_clock_ready(&self) -> bool {
        self.osc.read(CR2) & CR2_HSI14RDY != 0
    }
}
