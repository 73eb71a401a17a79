//! ADC family definitions
//!
//! Register names, control bits, channel selectors and the backend
//! capability set for the analog-to-digital converters. Bit positions
//! follow the F0-series layout; other families remap in their backend.

use crate::clocks::ClockToken;
use crate::gpio::Port;
use crate::irq::IrqVector;
use crate::regs::RegisterBank;

/// Logical ADC instance. Used only as a table index within the ADC
/// family; which instances physically exist is a backend property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcId {
    Adc1,
    Adc2,
    Adc3,
}

/// Number of ADC table slots.
pub const ADC_COUNT: usize = 3;

impl AdcId {
    /// Every table slot, in index order.
    pub const ALL: [AdcId; ADC_COUNT] = [AdcId::Adc1, AdcId::Adc2, AdcId::Adc3];

    /// Table index of this instance.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Named ADC registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcReg {
    /// Interrupt and status register (write 1 to clear a flag).
    Isr,
    /// Interrupt enable register.
    Ier,
    /// Control register (enable, start, stop, calibrate).
    Cr,
    /// Configuration register 1 (conversion mode, DMA).
    Cfgr1,
    /// Configuration register 2 (clock mode).
    Cfgr2,
    /// Sampling time register (shared by all channels).
    Smpr,
    /// Channel selection register.
    Chselr,
    /// Conversion data register.
    Dr,
    /// Common control register (internal channel switches).
    Ccr,
}

// ISR flags, also the IER bit positions
pub const ISR_ADRDY: u32 = 1 << 0;
pub const ISR_EOSMP: u32 = 1 << 1;
pub const ISR_EOC: u32 = 1 << 2;
pub const ISR_EOS: u32 = 1 << 3;
pub const ISR_OVR: u32 = 1 << 4;
pub const ISR_AWD: u32 = 1 << 7;

// CR bits
pub const CR_ADEN: u32 = 1 << 0;
pub const CR_ADDIS: u32 = 1 << 1;
pub const CR_ADSTART: u32 = 1 << 2;
pub const CR_ADSTP: u32 = 1 << 4;
pub const CR_ADCAL: u32 = 1 << 31;

// CFGR1 bits
pub const CFGR1_DMAEN: u32 = 1 << 0;
pub const CFGR1_DMACFG: u32 = 1 << 1;
pub const CFGR1_CONT: u32 = 1 << 13;

// CFGR2 bits
pub const CFGR2_CKMODE: u32 = 0b11 << 30;

// CCR internal channel switches
pub const CCR_VREFEN: u32 = 1 << 22;
pub const CCR_TSEN: u32 = 1 << 23;
pub const CCR_VBATEN: u32 = 1 << 24;

/// Channel numbers of the internal sources.
pub const CH_VSENSE: u8 = 16;
pub const CH_VREFINT: u8 = 17;
pub const CH_VBAT: u8 = 18;

/// Number of selectable channels (external pins plus internal sources).
pub const CHANNEL_COUNT: u8 = 19;

/// Widest value the 3-bit sampling time field accepts.
pub const SAMPLE_TIME_MAX: u8 = 7;

/// Conversion scheduling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcMode {
    /// One conversion per start request.
    Single,
    /// Back-to-back conversions until stopped.
    Continuous,
}

/// Conversion source selector.
///
/// External pins map directly onto channel numbers; the three internal
/// sources each sit behind an analog switch in the common control
/// register that must be closed before their channel is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// External analog input on a GPIO pin.
    Pin { port: Port, pin: u8 },
    /// Internal temperature sensor (Vsense). The sensor needs its
    /// documented settling time - pick a sampling time long enough for
    /// the target part; the core only enforces the field width.
    Temperature,
    /// Internal reference voltage (Vrefint).
    Reference,
    /// Battery voltage sense (Vbat).
    Battery,
}

/// Chip-specific backend for the ADC family.
pub trait AdcBackend {
    type Bank: RegisterBank<AdcReg>;

    /// Whether this instance physically exists on the compiled-for part.
    fn present(&self, id: AdcId) -> bool;

    /// Register bank of an instance. Only called for present instances.
    fn bank(&mut self, id: AdcId) -> &mut Self::Bank;

    /// Clock gate token for an instance.
    fn clock_gate(&self, id: AdcId) -> ClockToken;

    /// Interrupt vector of an instance.
    fn irq(&self, id: AdcId) -> IrqVector;

    /// Request startup of the asynchronous sample-clock oscillator.
    fn start_sample_clock(&mut self);

    /// Whether the asynchronous sample clock reports ready.
    fn sample_clock_ready(&self) -> bool;
}
