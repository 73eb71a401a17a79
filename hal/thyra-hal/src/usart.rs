//! USART family definitions
//!
//! Register names, control bits and the backend capability set for
//! UART-like peripherals. Register names follow the F0-series layout
//! (`ISR`/`RDR`/`TDR`); families with the combined `SR`/`DR` layout remap
//! the same names in their backend.

use crate::clocks::ClockToken;
use crate::irq::IrqVector;
use crate::regs::RegisterBank;

/// Logical USART instance. Used only as a table index within the USART
/// family; which instances physically exist is a backend property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartId {
    Usart1,
    Usart2,
    Usart3,
    Usart4,
    Usart5,
    Usart6,
}

/// Number of USART table slots.
pub const USART_COUNT: usize = 6;

impl UsartId {
    /// Every table slot, in index order.
    pub const ALL: [UsartId; USART_COUNT] = [
        UsartId::Usart1,
        UsartId::Usart2,
        UsartId::Usart3,
        UsartId::Usart4,
        UsartId::Usart5,
        UsartId::Usart6,
    ];

    /// Table index of this instance.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Named USART registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartReg {
    /// Control register 1 (enable, mode and interrupt-enable bits).
    Cr1,
    /// Baud rate register (mantissa/fraction divisor).
    Brr,
    /// Interrupt and status register.
    Isr,
    /// Receive data register.
    Rdr,
    /// Transmit data register.
    Tdr,
}

// CR1 bits
pub const CR1_UE: u32 = 1 << 0;
pub const CR1_RE: u32 = 1 << 2;
pub const CR1_TE: u32 = 1 << 3;
pub const CR1_RXNEIE: u32 = 1 << 5;

// ISR bits
pub const ISR_RXNE: u32 = 1 << 5;

// BRR fields: low 4 bits are the fractional divider, the mantissa sits
// above it. The whole register is 16 bits wide.
pub const BRR_FRACTION_MASK: u32 = 0xF;
pub const BRR_MANTISSA_POS: u32 = 4;
pub const BRR_MAX: u32 = 0xFFFF;

/// Chip-specific backend for the USART family.
pub trait UsartBackend {
    type Bank: RegisterBank<UsartReg>;

    /// Whether this instance physically exists on the compiled-for part.
    fn present(&self, id: UsartId) -> bool;

    /// Register bank of an instance. Only called for present instances.
    fn bank(&mut self, id: UsartId) -> &mut Self::Bank;

    /// Clock gate token for an instance.
    fn clock_gate(&self, id: UsartId) -> ClockToken;

    /// Interrupt vector of an instance's receive interrupt.
    fn irq(&self, id: UsartId) -> IrqVector;

    /// Reference clock feeding the baud generator, in Hz.
    fn clock_hz(&self) -> u32;
}
