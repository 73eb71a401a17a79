//! USART device table and state machine
//!
//! One [`UsartBus`] owns the table of per-instance records for the whole
//! UART-like family. Each record moves between `Inactive` and `Active`:
//! [`UsartBus::start`] claims pins and the clock gate, programs the baud
//! divisor and unmasks the receive interrupt; [`UsartBus::stop`] tears it
//! all down again. Received bytes are forwarded one at a time from
//! interrupt context through [`UsartBus::dispatch`] - there is no queue,
//! so a slow callback lets the next byte overrun at the hardware level.

use thyra_hal::clocks::ClockGates;
use thyra_hal::gpio::{Drive, GpioCtl, Port, Pull, Speed, AF_MAX, PIN_MAX};
use thyra_hal::irq::IrqCtl;
use thyra_hal::platform::Platform;
use thyra_hal::regs::RegisterBank;
use thyra_hal::usart::{
    UsartBackend, UsartId, UsartReg, BRR_FRACTION_MASK, BRR_MANTISSA_POS, BRR_MAX, CR1_RE,
    CR1_RXNEIE, CR1_TE, CR1_UE, ISR_RXNE, USART_COUNT,
};

use crate::error::Error;

/// Receive callback, invoked from interrupt context with each byte.
/// Must not block.
pub type RxCallback = fn(u8);

/// Fixed priority of the receive vector. Not configurable.
pub const USART_IRQ_PRIORITY: u8 = 1;

/// One pin claim: port, pin number and alternate-function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSpec {
    pub port: Port,
    pub pin: u8,
    pub af: u8,
}

/// Per-instance device record. Value-initialized when the bus is built;
/// lives as long as the bus.
#[derive(Debug, Clone, Copy)]
pub struct UsartDevice {
    present: bool,
    active: bool,
    pins: Option<(PinSpec, PinSpec)>,
    baudrate: u32,
    callback: Option<RxCallback>,
}

impl UsartDevice {
    const INIT: Self = Self {
        present: false,
        active: false,
        pins: None,
        baudrate: 0,
        callback: None,
    };

    /// Whether the instance exists on the compiled-for part.
    pub fn present(&self) -> bool {
        self.present
    }

    /// Whether the peripheral is claimed and enabled.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Configured baud rate, 0 until started.
    pub fn baudrate(&self) -> u32 {
        self.baudrate
    }
}

/// Pack the mantissa/fraction divisor for the baud-rate register.
///
/// The divider is the reference clock divided by the target baud rate;
/// its low 4 bits select sixteenths, the rest is the integer mantissa.
/// Dividers below the x16 oversampling floor or wider than the 16-bit
/// register are unachievable and rejected rather than truncated.
pub fn baud_divisor(clock_hz: u32, baudrate: u32) -> Option<u32> {
    if baudrate == 0 {
        return None;
    }
    let divider = clock_hz / baudrate;
    if !(16..=BRR_MAX).contains(&divider) {
        return None;
    }
    let mantissa = divider / 16;
    let fraction = divider % 16;
    Some((mantissa << BRR_MANTISSA_POS) | (fraction & BRR_FRACTION_MASK))
}

/// Device table and guarded operations for the USART family.
///
/// The bus is an explicitly owned registry: construct one per family and
/// hand it to whoever configures serial ports. Freedom from races with
/// interrupt delivery comes from ordering - a device's vector is only
/// unmasked by [`UsartBus::start`], after its table entry is complete.
pub struct UsartBus<B, P> {
    backend: B,
    platform: P,
    devices: [UsartDevice; USART_COUNT],
}

impl<B, P> UsartBus<B, P>
where
    B: UsartBackend,
    P: Platform,
{
    /// Build the device table, populating presence from the backend's
    /// capability query.
    pub fn new(backend: B, platform: P) -> Self {
        let mut devices = [UsartDevice::INIT; USART_COUNT];
        for id in UsartId::ALL {
            devices[id.index()].present = backend.present(id);
        }
        Self {
            backend,
            platform,
            devices,
        }
    }

    /// Inspect an instance's record.
    pub fn device(&self, id: UsartId) -> &UsartDevice {
        &self.devices[id.index()]
    }

    /// Claim pins and clock, program the baud divisor, enable
    /// transmit/receive and unmask the receive interrupt.
    ///
    /// Idempotent while active: a second call succeeds without touching
    /// the live configuration or re-issuing any claim. On a failed claim
    /// the port gates taken so far are handed back (best effort) before
    /// reporting the error.
    pub fn start(
        &mut self,
        id: UsartId,
        tx: PinSpec,
        rx: PinSpec,
        baudrate: u32,
        callback: RxCallback,
    ) -> Result<(), Error> {
        if tx.pin > PIN_MAX || rx.pin > PIN_MAX {
            return Err(Error::PinOutOfRange);
        }
        if tx.af > AF_MAX || rx.af > AF_MAX {
            return Err(Error::AfOutOfRange);
        }
        let brr = baud_divisor(self.backend.clock_hz(), baudrate).ok_or(Error::InvalidBaudRate)?;

        let record = &self.devices[id.index()];
        if !record.present {
            return Err(Error::Unsupported);
        }
        if record.active {
            return Ok(());
        }

        // Claim TX, then RX, as high-speed push-pull AF pins.
        if self
            .platform
            .gpio()
            .set_alternate_function(tx.port, tx.pin, tx.af)
            .is_err()
        {
            let _ = self.platform.gates().disable_port(tx.port);
            return Err(Error::Gpio);
        }
        if self
            .platform
            .gpio()
            .set_output_parameters(tx.port, tx.pin, Pull::Up, Drive::PushPull, Speed::High)
            .is_err()
        {
            let _ = self.platform.gates().disable_port(tx.port);
            return Err(Error::Gpio);
        }
        if self
            .platform
            .gpio()
            .set_alternate_function(rx.port, rx.pin, rx.af)
            .is_err()
        {
            let _ = self.platform.gates().disable_port(tx.port);
            let _ = self.platform.gates().disable_port(rx.port);
            return Err(Error::Gpio);
        }
        if self
            .platform
            .gpio()
            .set_output_parameters(rx.port, rx.pin, Pull::Up, Drive::PushPull, Speed::High)
            .is_err()
        {
            let _ = self.platform.gates().disable_port(tx.port);
            let _ = self.platform.gates().disable_port(rx.port);
            return Err(Error::Gpio);
        }

        let gate = self.backend.clock_gate(id);
        if self.platform.gates().enable(gate).is_err() {
            let _ = self.platform.gates().disable_port(tx.port);
            let _ = self.platform.gates().disable_port(rx.port);
            return Err(Error::Gate);
        }

        let bank = self.backend.bank(id);
        bank.write(UsartReg::Brr, brr);
        bank.modify(UsartReg::Cr1, 0, CR1_RE | CR1_TE | CR1_UE | CR1_RXNEIE);

        let record = &mut self.devices[id.index()];
        record.active = true;
        record.pins = Some((tx, rx));
        record.baudrate = baudrate;
        record.callback = Some(callback);

        // Unmask the vector last, once the table entry is complete.
        let vector = self.backend.irq(id);
        let irqs = self.platform.irqs();
        irqs.set_priority(vector, USART_IRQ_PRIORITY);
        irqs.enable(vector);

        Ok(())
    }

    /// Write one byte into the transmit-data register.
    ///
    /// Fire and forget: the transmit holding register absorbs
    /// back-to-back writes, pacing against overrun is the caller's
    /// responsibility.
    pub fn send(&mut self, id: UsartId, byte: u8) -> Result<(), Error> {
        let record = &self.devices[id.index()];
        if !record.present {
            return Err(Error::Unsupported);
        }
        if !record.active {
            return Err(Error::NotActive);
        }
        self.backend.bank(id).write(UsartReg::Tdr, byte as u32);
        Ok(())
    }

    /// Mask the receive interrupt, disable the peripheral and release the
    /// clock and port gates.
    ///
    /// The record is retired before the gates are handed back: a refused
    /// release reports [`Error::Gate`] with the peripheral already
    /// stopped, and the caller should treat it as dead.
    pub fn stop(&mut self, id: UsartId) -> Result<(), Error> {
        let record = &self.devices[id.index()];
        if !record.present {
            return Err(Error::Unsupported);
        }
        if !record.active {
            return Err(Error::NotActive);
        }
        let (tx_port, rx_port) = match record.pins {
            Some((tx, rx)) => (tx.port, rx.port),
            None => return Err(Error::NotActive),
        };

        // Quiesce the receiver before masking the vector.
        let vector = self.backend.irq(id);
        self.backend.bank(id).modify(UsartReg::Cr1, CR1_RXNEIE, 0);
        self.platform.irqs().disable(vector);
        self.backend
            .bank(id)
            .modify(UsartReg::Cr1, CR1_RE | CR1_TE | CR1_UE | CR1_RXNEIE, 0);

        let record = &mut self.devices[id.index()];
        record.active = false;
        record.callback = None;

        let gate = self.backend.clock_gate(id);
        self.platform.gates().disable(gate).map_err(|_| Error::Gate)?;
        self.platform
            .gates()
            .disable_port(tx_port)
            .map_err(|_| Error::Gate)?;
        self.platform
            .gates()
            .disable_port(rx_port)
            .map_err(|_| Error::Gate)?;

        Ok(())
    }

    /// Receive-interrupt entry point.
    ///
    /// If receive-not-empty is up, reads the byte (which clears the flag
    /// in hardware), forwards it to the stored callback and returns it so
    /// chained vector handlers can fall through.
    pub fn dispatch(&mut self, id: UsartId) -> Option<u8> {
        if !self.devices[id.index()].present {
            return None;
        }
        let bank = self.backend.bank(id);
        if bank.read(UsartReg::Isr) & ISR_RXNE == 0 {
            return None;
        }
        let byte = (bank.read(UsartReg::Rdr) & 0xFF) as u8;
        if let Some(callback) = self.devices[id.index()].callback {
            callback(byte);
        }
        Some(byte)
    }
}
