//! In-memory fakes of the hardware trait surface, for the unit tests.
//!
//! The register banks script the minimal hardware reactions the state
//! machines handshake with (write-1-to-clear status flags, enable bits
//! acknowledged by ready flags, data reads consuming the conversion
//! flag), each gated by a `hang_*` switch so the timeout path of every
//! bounded wait can be driven. The service fakes record their call
//! traffic for rollback assertions.

use core::cell::Cell;

use heapless::Vec;

use thyra_hal::adc::{
    AdcBackend, AdcId, AdcReg, ADC_COUNT, CR_ADCAL, CR_ADDIS, CR_ADEN, CR_ADSTART, CR_ADSTP,
    ISR_ADRDY, ISR_EOC,
};
use thyra_hal::clocks::{ClockGates, ClockToken, GateError};
use thyra_hal::gpio::{Drive, GpioCtl, PinError, Port, Pull, Speed};
use thyra_hal::irq::{IrqCtl, IrqVector};
use thyra_hal::platform::Platform;
use thyra_hal::regs::RegisterBank;
use thyra_hal::time::Monotonic;
use thyra_hal::usart::{UsartBackend, UsartId, UsartReg, ISR_RXNE, USART_COUNT};

#[cfg(feature = "dma")]
use thyra_hal::dma::{DmaError, DmaRequest, DmaService, TransferCallback};

/// Stepping clock: every read advances the count by `step` ticks, so a
/// wait that never sees its flag runs out of budget deterministically.
pub struct FakeClock {
    now: Cell<u32>,
    step: u32,
}

impl FakeClock {
    pub fn new(step: u32) -> Self {
        Self::starting_at(0, step)
    }

    pub fn starting_at(start: u32, step: u32) -> Self {
        Self {
            now: Cell::new(start),
            step,
        }
    }
}

impl Monotonic for FakeClock {
    fn now(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step));
        now
    }
}

/// Recorded gate traffic, refused calls included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOp {
    Enable(ClockToken),
    Disable(ClockToken),
    DisablePort(Port),
}

#[derive(Default)]
pub struct FakeGates {
    pub ops: Vec<GateOp, 16>,
    pub fail_enable: bool,
    pub fail_disable: bool,
    pub fail_disable_port: bool,
}

impl FakeGates {
    pub fn enables(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, GateOp::Enable(_)))
            .count()
    }
}

impl ClockGates for FakeGates {
    fn enable(&mut self, token: ClockToken) -> Result<(), GateError> {
        let _ = self.ops.push(GateOp::Enable(token));
        if self.fail_enable {
            return Err(GateError);
        }
        Ok(())
    }

    fn disable(&mut self, token: ClockToken) -> Result<(), GateError> {
        let _ = self.ops.push(GateOp::Disable(token));
        if self.fail_disable {
            return Err(GateError);
        }
        Ok(())
    }

    fn disable_port(&mut self, port: Port) -> Result<(), GateError> {
        let _ = self.ops.push(GateOp::DisablePort(port));
        if self.fail_disable_port {
            return Err(GateError);
        }
        Ok(())
    }
}

/// Recorded pin traffic. Successful claims only; `fail_at` refuses the
/// nth fallible call (0-based) without recording it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioOp {
    Af { port: Port, pin: u8, af: u8 },
    Output { port: Port, pin: u8 },
    Analog { port: Port, pin: u8 },
}

#[derive(Default)]
pub struct FakeGpio {
    pub ops: Vec<GpioOp, 16>,
    pub fail_at: Option<usize>,
    calls: usize,
}

impl FakeGpio {
    fn fallible_call(&mut self) -> Result<(), PinError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_at == Some(call) {
            return Err(PinError);
        }
        Ok(())
    }
}

impl GpioCtl for FakeGpio {
    fn set_alternate_function(&mut self, port: Port, pin: u8, af: u8) -> Result<(), PinError> {
        self.fallible_call()?;
        let _ = self.ops.push(GpioOp::Af { port, pin, af });
        Ok(())
    }

    fn set_output_parameters(
        &mut self,
        port: Port,
        pin: u8,
        _pull: Pull,
        _drive: Drive,
        _speed: Speed,
    ) -> Result<(), PinError> {
        self.fallible_call()?;
        let _ = self.ops.push(GpioOp::Output { port, pin });
        Ok(())
    }

    fn set_analog(&mut self, port: Port, pin: u8) {
        let _ = self.ops.push(GpioOp::Analog { port, pin });
    }
}

/// Recorded interrupt-controller traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqOp {
    Enable(IrqVector),
    Disable(IrqVector),
    Priority(IrqVector, u8),
}

#[derive(Default)]
pub struct FakeIrqs {
    pub ops: Vec<IrqOp, 16>,
}

impl IrqCtl for FakeIrqs {
    fn enable(&mut self, vector: IrqVector) {
        let _ = self.ops.push(IrqOp::Enable(vector));
    }

    fn disable(&mut self, vector: IrqVector) {
        let _ = self.ops.push(IrqOp::Disable(vector));
    }

    fn set_priority(&mut self, vector: IrqVector, priority: u8) {
        let _ = self.ops.push(IrqOp::Priority(vector, priority));
    }
}

/// Service bundle with a 1-tick-per-read clock.
pub struct FakePlatform {
    pub gates: FakeGates,
    pub gpio: FakeGpio,
    pub clock: FakeClock,
    pub irqs: FakeIrqs,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            gates: FakeGates::default(),
            gpio: FakeGpio::default(),
            clock: FakeClock::new(1),
            irqs: FakeIrqs::default(),
        }
    }
}

impl Platform for FakePlatform {
    type Gates = FakeGates;
    type Gpio = FakeGpio;
    type Clock = FakeClock;
    type Irqs = FakeIrqs;

    fn gates(&mut self) -> &mut FakeGates {
        &mut self.gates
    }

    fn gpio(&mut self) -> &mut FakeGpio {
        &mut self.gpio
    }

    fn clock(&self) -> &FakeClock {
        &self.clock
    }

    fn irqs(&mut self) -> &mut FakeIrqs {
        &mut self.irqs
    }
}

/// USART register bank. Reading the data register consumes the
/// receive-not-empty flag, as the silicon does.
#[derive(Default)]
pub struct FakeUsartBank {
    pub cr1: u32,
    pub brr: u32,
    isr: Cell<u32>,
    pub rdr: u32,
    pub sent: Vec<u32, 16>,
}

impl FakeUsartBank {
    /// Latch an incoming byte and raise receive-not-empty.
    pub fn receive(&mut self, byte: u8) {
        self.rdr = byte as u32;
        self.isr.set(self.isr.get() | ISR_RXNE);
    }

    pub fn isr(&self) -> u32 {
        self.isr.get()
    }
}

impl RegisterBank<UsartReg> for FakeUsartBank {
    fn read(&self, reg: UsartReg) -> u32 {
        match reg {
            UsartReg::Cr1 => self.cr1,
            UsartReg::Brr => self.brr,
            UsartReg::Isr => self.isr.get(),
            UsartReg::Rdr => {
                self.isr.set(self.isr.get() & !ISR_RXNE);
                self.rdr
            }
            UsartReg::Tdr => 0,
        }
    }

    fn write(&mut self, reg: UsartReg, value: u32) {
        match reg {
            UsartReg::Cr1 => self.cr1 = value,
            UsartReg::Brr => self.brr = value,
            // Status is hardware-owned, data-in is read-only.
            UsartReg::Isr | UsartReg::Rdr => {}
            UsartReg::Tdr => {
                let _ = self.sent.push(value);
            }
        }
    }
}

/// USART backend with every instance present and a 48 MHz reference.
pub struct FakeUsart {
    pub banks: [FakeUsartBank; USART_COUNT],
    pub present: [bool; USART_COUNT],
    pub clock_hz: u32,
}

impl FakeUsart {
    pub fn new() -> Self {
        Self {
            banks: core::array::from_fn(|_| FakeUsartBank::default()),
            present: [true; USART_COUNT],
            clock_hz: 48_000_000,
        }
    }
}

impl UsartBackend for FakeUsart {
    type Bank = FakeUsartBank;

    fn present(&self, id: UsartId) -> bool {
        self.present[id.index()]
    }

    fn bank(&mut self, id: UsartId) -> &mut FakeUsartBank {
        &mut self.banks[id.index()]
    }

    fn clock_gate(&self, id: UsartId) -> ClockToken {
        ClockToken(0x40 + id.index() as u16)
    }

    fn irq(&self, id: UsartId) -> IrqVector {
        IrqVector(27 + id.index() as u16)
    }

    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }
}

/// ADC register bank scripting the converter's handshakes:
///
/// - status writes are write-1-to-clear
/// - a data-register read consumes the end-of-conversion flag
/// - rising control bits are acknowledged immediately unless the
///   matching `hang_*` switch holds them, which starves the bounded
///   wait into its timeout
#[derive(Default)]
pub struct FakeAdcBank {
    isr: Cell<u32>,
    pub ier: u32,
    pub cr: u32,
    pub cfgr1: u32,
    pub cfgr2: u32,
    pub smpr: u32,
    pub chselr: u32,
    pub ccr: u32,
    pub dr: u32,
    /// Result latched by the next conversion.
    pub sample: u32,
    /// Completed self-measurements.
    pub calibrations: u32,
    pub hang_calibration: bool,
    pub hang_disable: bool,
    pub hang_ready: bool,
    pub hang_conversion: bool,
    pub hang_stop: bool,
}

impl FakeAdcBank {
    /// Raise status flags, as hardware events would.
    pub fn raise(&self, flags: u32) {
        self.isr.set(self.isr.get() | flags);
    }

    pub fn isr(&self) -> u32 {
        self.isr.get()
    }
}

impl RegisterBank<AdcReg> for FakeAdcBank {
    fn read(&self, reg: AdcReg) -> u32 {
        match reg {
            AdcReg::Isr => self.isr.get(),
            AdcReg::Ier => self.ier,
            AdcReg::Cr => self.cr,
            AdcReg::Cfgr1 => self.cfgr1,
            AdcReg::Cfgr2 => self.cfgr2,
            AdcReg::Smpr => self.smpr,
            AdcReg::Chselr => self.chselr,
            AdcReg::Ccr => self.ccr,
            AdcReg::Dr => {
                self.isr.set(self.isr.get() & !ISR_EOC);
                self.dr
            }
        }
    }

    fn write(&mut self, reg: AdcReg, value: u32) {
        match reg {
            AdcReg::Isr => self.isr.set(self.isr.get() & !value),
            AdcReg::Ier => self.ier = value,
            AdcReg::Cr => {
                let rising = value & !self.cr;
                self.cr = value;
                if rising & CR_ADCAL != 0 && !self.hang_calibration {
                    self.cr &= !CR_ADCAL;
                    self.calibrations += 1;
                }
                if rising & CR_ADDIS != 0 && !self.hang_disable {
                    self.cr &= !(CR_ADDIS | CR_ADEN);
                }
                if rising & CR_ADEN != 0 && !self.hang_ready {
                    self.isr.set(self.isr.get() | ISR_ADRDY);
                }
                if rising & CR_ADSTART != 0 && !self.hang_conversion {
                    self.dr = self.sample;
                    self.isr.set(self.isr.get() | ISR_EOC);
                }
                if rising & CR_ADSTP != 0 && !self.hang_stop {
                    self.cr &= !(CR_ADSTP | CR_ADSTART);
                }
            }
            AdcReg::Cfgr1 => self.cfgr1 = value,
            AdcReg::Cfgr2 => self.cfgr2 = value,
            AdcReg::Smpr => self.smpr = value,
            AdcReg::Chselr => self.chselr = value,
            AdcReg::Ccr => self.ccr = value,
            AdcReg::Dr => {}
        }
    }
}

/// ADC backend with every instance present and a well-behaved sample
/// clock oscillator (unless told to hang).
pub struct FakeAdc {
    pub banks: [FakeAdcBank; ADC_COUNT],
    pub present: [bool; ADC_COUNT],
    pub sample_clock_started: bool,
    pub sample_clock_hangs: bool,
}

impl FakeAdc {
    pub fn new() -> Self {
        Self {
            banks: core::array::from_fn(|_| FakeAdcBank::default()),
            present: [true; ADC_COUNT],
            sample_clock_started: false,
            sample_clock_hangs: false,
        }
    }
}

impl AdcBackend for FakeAdc {
    type Bank = FakeAdcBank;

    fn present(&self, id: AdcId) -> bool {
        self.present[id.index()]
    }

    fn bank(&mut self, id: AdcId) -> &mut FakeAdcBank {
        &mut self.banks[id.index()]
    }

    fn clock_gate(&self, id: AdcId) -> ClockToken {
        ClockToken(0x20 + id.index() as u16)
    }

    fn irq(&self, _id: AdcId) -> IrqVector {
        IrqVector(12)
    }

    fn start_sample_clock(&mut self) {
        self.sample_clock_started = true;
    }

    fn sample_clock_ready(&self) -> bool {
        self.sample_clock_started && !self.sample_clock_hangs
    }
}

/// DMA controller recording its programming.
#[cfg(feature = "dma")]
#[derive(Default)]
pub struct FakeDma {
    pub configured: Option<DmaRequest>,
    pub buffer_len: usize,
    pub started: Vec<u8, 4>,
    pub aborted: Vec<u8, 4>,
    pub fail_configure: bool,
}

#[cfg(feature = "dma")]
impl DmaService for FakeDma {
    fn configure_from_peripheral(
        &mut self,
        request: DmaRequest,
        buffer: &'static mut [u16],
        _done: TransferCallback,
    ) -> Result<(), DmaError> {
        if self.fail_configure {
            return Err(DmaError);
        }
        self.configured = Some(request);
        self.buffer_len = buffer.len();
        Ok(())
    }

    fn start(&mut self, channel: u8) {
        let _ = self.started.push(channel);
    }

    fn abort(&mut self, channel: u8) {
        let _ = self.aborted.push(channel);
    }
}
