//! ADC device table and state machine
//!
//! One [`AdcBus`] owns the table of per-instance records for the
//! analog-to-digital converters. A record walks `Uncalibrated →
//! Calibrated → Active(Idle) → Active(Sampling)` and back; every register
//! operation checks the flags it needs before touching hardware, and
//! every hardware handshake is a bounded poll against the injected tick
//! source. A single vector per instance fans out to six event callbacks
//! through [`AdcBus::dispatch`], strictly one event per invocation.

use thyra_hal::adc::{
    AdcBackend, AdcChannel, AdcId, AdcMode, AdcReg, ADC_COUNT, CCR_TSEN, CCR_VBATEN, CCR_VREFEN,
    CFGR1_CONT, CFGR1_DMAEN, CFGR2_CKMODE, CHANNEL_COUNT, CH_VBAT, CH_VREFINT, CH_VSENSE, CR_ADCAL,
    CR_ADDIS, CR_ADEN, CR_ADSTART, CR_ADSTP, ISR_ADRDY, ISR_AWD, ISR_EOC, ISR_EOS, ISR_EOSMP,
    ISR_OVR, SAMPLE_TIME_MAX,
};
use thyra_hal::clocks::ClockGates;
use thyra_hal::gpio::GpioCtl;
use thyra_hal::irq::IrqCtl;
use thyra_hal::platform::Platform;
use thyra_hal::regs::RegisterBank;

#[cfg(feature = "dma")]
use thyra_hal::adc::CFGR1_DMACFG;
#[cfg(feature = "dma")]
use thyra_hal::dma::{DmaPriority, DmaRequest, DmaService, TransferCallback};

use crate::error::{Error, Wait};
use crate::poll;

/// Event callback, invoked from interrupt context. Must not block.
pub type EventCallback = fn();

/// Fixed priority of the converter vector. Not configurable.
pub const ADC_IRQ_PRIORITY: u8 = 0;

/// DMA controller channel wired to the conversion data register.
#[cfg(feature = "dma")]
pub const ADC_DMA_CHANNEL: u8 = 1;

/// All interrupt-enable bits of the register.
const IER_SOURCES: u32 = ISR_AWD | ISR_OVR | ISR_EOS | ISR_EOC | ISR_EOSMP | ISR_ADRDY;

/// The converter's interrupt sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcEvent {
    /// Analog watchdog threshold crossed.
    Watchdog,
    /// Conversion data overwritten before being read.
    Overrun,
    /// Last conversion of the configured sequence finished.
    EndOfSequence,
    /// One conversion finished.
    EndOfConversion,
    /// Sample-and-hold phase finished.
    EndOfSampling,
    /// Converter ready after enable.
    Ready,
}

impl AdcEvent {
    /// Dispatch order: highest urgency first. One invocation of
    /// [`AdcBus::dispatch`] serves exactly one event from this list.
    pub const PRIORITY: [AdcEvent; 6] = [
        AdcEvent::Watchdog,
        AdcEvent::Overrun,
        AdcEvent::EndOfSequence,
        AdcEvent::EndOfConversion,
        AdcEvent::EndOfSampling,
        AdcEvent::Ready,
    ];

    /// Status flag of this event. The interrupt-enable bit shares the
    /// position.
    pub fn flag(self) -> u32 {
        match self {
            AdcEvent::Watchdog => ISR_AWD,
            AdcEvent::Overrun => ISR_OVR,
            AdcEvent::EndOfSequence => ISR_EOS,
            AdcEvent::EndOfConversion => ISR_EOC,
            AdcEvent::EndOfSampling => ISR_EOSMP,
            AdcEvent::Ready => ISR_ADRDY,
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small set of [`AdcEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcEventSet(u8);

impl AdcEventSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b0011_1111)
    }

    pub const fn with(self, event: AdcEvent) -> Self {
        Self(self.0 | event.bit())
    }

    pub fn contains(self, event: AdcEvent) -> bool {
        self.0 & event.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Per-source callbacks invoked from interrupt context.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdcCallbacks {
    pub watchdog: Option<EventCallback>,
    pub overrun: Option<EventCallback>,
    pub end_of_sequence: Option<EventCallback>,
    pub end_of_conversion: Option<EventCallback>,
    pub end_of_sampling: Option<EventCallback>,
    pub ready: Option<EventCallback>,
}

impl AdcCallbacks {
    fn get(&self, event: AdcEvent) -> Option<EventCallback> {
        match event {
            AdcEvent::Watchdog => self.watchdog,
            AdcEvent::Overrun => self.overrun,
            AdcEvent::EndOfSequence => self.end_of_sequence,
            AdcEvent::EndOfConversion => self.end_of_conversion,
            AdcEvent::EndOfSampling => self.end_of_sampling,
            AdcEvent::Ready => self.ready,
        }
    }

    fn clear(&mut self, event: AdcEvent) {
        match event {
            AdcEvent::Watchdog => self.watchdog = None,
            AdcEvent::Overrun => self.overrun = None,
            AdcEvent::EndOfSequence => self.end_of_sequence = None,
            AdcEvent::EndOfConversion => self.end_of_conversion = None,
            AdcEvent::EndOfSampling => self.end_of_sampling = None,
            AdcEvent::Ready => self.ready = None,
        }
    }

    /// Set of events that have a callback bound.
    pub fn armed(&self) -> AdcEventSet {
        let mut set = AdcEventSet::empty();
        for event in AdcEvent::PRIORITY {
            if self.get(event).is_some() {
                set = set.with(event);
            }
        }
        set
    }
}

/// Per-instance device record. Value-initialized when the bus is built;
/// lives as long as the bus.
#[derive(Debug, Clone, Copy)]
pub struct AdcDevice {
    present: bool,
    active: bool,
    calibrated: bool,
    sampling: bool,
    callbacks: AdcCallbacks,
}

impl AdcDevice {
    const INIT: Self = Self {
        present: false,
        active: false,
        calibrated: false,
        sampling: false,
        callbacks: AdcCallbacks {
            watchdog: None,
            overrun: None,
            end_of_sequence: None,
            end_of_conversion: None,
            end_of_sampling: None,
            ready: None,
        },
    };

    /// Whether the instance exists on the compiled-for part.
    pub fn present(&self) -> bool {
        self.present
    }

    /// Whether the converter clock is claimed and the instance set up.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Whether the one-time self-calibration has completed.
    pub fn calibrated(&self) -> bool {
        self.calibrated
    }

    /// Whether a conversion is in flight.
    pub fn sampling(&self) -> bool {
        self.sampling
    }
}

/// Device table and guarded operations for the ADC family.
///
/// An explicitly owned registry, one per family; see [`crate::usart::UsartBus`]
/// for the vector-unmasking order that keeps construction race-free.
pub struct AdcBus<B, P> {
    backend: B,
    platform: P,
    devices: [AdcDevice; ADC_COUNT],
}

impl<B, P> AdcBus<B, P>
where
    B: AdcBackend,
    P: Platform,
{
    /// Build the device table, populating presence from the backend's
    /// capability query.
    pub fn new(backend: B, platform: P) -> Self {
        let mut devices = [AdcDevice::INIT; ADC_COUNT];
        for id in AdcId::ALL {
            devices[id.index()].present = backend.present(id);
        }
        Self {
            backend,
            platform,
            devices,
        }
    }

    /// Inspect an instance's record.
    pub fn device(&self, id: AdcId) -> &AdcDevice {
        &self.devices[id.index()]
    }

    fn ensure_present(&self, id: AdcId) -> Result<(), Error> {
        if self.devices[id.index()].present {
            Ok(())
        } else {
            Err(Error::Unsupported)
        }
    }

    /// Run the converter's one-time self-calibration.
    ///
    /// Disables the converter first if it is enabled (waiting for the
    /// acknowledgement), quiesces the DMA path, then starts the
    /// self-measurement and waits for hardware to clear the start bit.
    /// Either wait can time out; `calibrated` is only set on success.
    pub fn calibrate(&mut self, id: AdcId) -> Result<(), Error> {
        self.ensure_present(id)?;

        let backend = &mut self.backend;
        {
            let bank = backend.bank(id);
            if bank.read(AdcReg::Cr) & CR_ADEN != 0 {
                bank.modify(AdcReg::Cr, 0, CR_ADDIS);
            }
        }
        poll::wait_until(self.platform.clock(), Wait::Disable, || {
            backend.bank(id).read(AdcReg::Cr) & CR_ADEN == 0
        })?;

        let bank = backend.bank(id);
        bank.modify(AdcReg::Cfgr1, CFGR1_DMAEN, 0);
        // Hardware clears the bit once the self-measurement finishes.
        bank.modify(AdcReg::Cr, 0, CR_ADCAL);
        poll::wait_until(self.platform.clock(), Wait::Calibration, || {
            backend.bank(id).read(AdcReg::Cr) & CR_ADCAL == 0
        })?;

        self.devices[id.index()].calibrated = true;
        Ok(())
    }

    /// Basic converter setup: calibrate if needed, open the clock gate,
    /// select the asynchronous sample clock (waiting for its oscillator)
    /// and set the conversion mode.
    ///
    /// Idempotent while active. A calibration or oscillator failure
    /// propagates and leaves the record inactive.
    pub fn configure(&mut self, id: AdcId, mode: AdcMode) -> Result<(), Error> {
        self.ensure_present(id)?;
        if self.devices[id.index()].active {
            return Ok(());
        }
        if !self.devices[id.index()].calibrated {
            self.calibrate(id)?;
        }

        let gate = self.backend.clock_gate(id);
        self.platform.gates().enable(gate).map_err(|_| Error::Gate)?;

        let backend = &mut self.backend;
        backend.bank(id).modify(AdcReg::Cfgr2, CFGR2_CKMODE, 0);
        backend.start_sample_clock();
        poll::wait_until(self.platform.clock(), Wait::SampleClock, || {
            backend.sample_clock_ready()
        })?;

        let bank = backend.bank(id);
        match mode {
            AdcMode::Single => bank.modify(AdcReg::Cfgr1, CFGR1_CONT, 0),
            AdcMode::Continuous => bank.modify(AdcReg::Cfgr1, 0, CFGR1_CONT),
        }

        self.devices[id.index()].active = true;
        Ok(())
    }

    /// Select a conversion source and the shared sampling time.
    ///
    /// External pins are switched to analog mode before their channel bit
    /// is set; internal sources close their analog switch in the common
    /// control register first. Refused while a conversion is in flight.
    /// All argument checks happen before any hardware mutation.
    pub fn channel(&mut self, id: AdcId, channel: AdcChannel, sample_time: u8) -> Result<(), Error> {
        self.ensure_present(id)?;
        if self.devices[id.index()].sampling {
            return Err(Error::Sampling);
        }
        if sample_time > SAMPLE_TIME_MAX {
            return Err(Error::SampleTimeOutOfRange);
        }
        if let AdcChannel::Pin { pin, .. } = channel {
            if pin >= CHANNEL_COUNT {
                return Err(Error::ChannelOutOfRange);
            }
        }

        match channel {
            AdcChannel::Pin { port, pin } => {
                self.platform.gpio().set_analog(port, pin);
                self.backend
                    .bank(id)
                    .modify(AdcReg::Chselr, 0, 1 << pin);
            }
            AdcChannel::Temperature => {
                let bank = self.backend.bank(id);
                bank.modify(AdcReg::Ccr, 0, CCR_TSEN);
                bank.modify(AdcReg::Chselr, 0, 1 << CH_VSENSE);
            }
            AdcChannel::Reference => {
                let bank = self.backend.bank(id);
                bank.modify(AdcReg::Ccr, 0, CCR_VREFEN);
                bank.modify(AdcReg::Chselr, 0, 1 << CH_VREFINT);
            }
            AdcChannel::Battery => {
                let bank = self.backend.bank(id);
                bank.modify(AdcReg::Ccr, 0, CCR_VBATEN);
                bank.modify(AdcReg::Chselr, 0, 1 << CH_VBAT);
            }
        }

        // One sampling time shared by every channel on this family.
        self.backend.bank(id).write(AdcReg::Smpr, sample_time as u32);
        Ok(())
    }

    /// Arm the interrupt-enable bit for every supplied callback, store
    /// the callback set and unmask the converter vector.
    ///
    /// Refused while a conversion is in flight.
    pub fn enable_interrupts(&mut self, id: AdcId, callbacks: AdcCallbacks) -> Result<(), Error> {
        self.ensure_present(id)?;
        if self.devices[id.index()].sampling {
            return Err(Error::Sampling);
        }

        let armed = callbacks.armed();
        let mut enable = 0;
        for event in AdcEvent::PRIORITY {
            if armed.contains(event) {
                enable |= event.flag();
            }
        }
        self.backend.bank(id).modify(AdcReg::Ier, 0, enable);
        self.devices[id.index()].callbacks = callbacks;

        let vector = self.backend.irq(id);
        let irqs = self.platform.irqs();
        irqs.enable(vector);
        irqs.set_priority(vector, ADC_IRQ_PRIORITY);
        Ok(())
    }

    /// Disarm a subset of interrupt sources and drop their callbacks.
    /// Masks the converter vector once no source remains armed.
    ///
    /// Refused while a conversion is in flight.
    pub fn disable_interrupts(&mut self, id: AdcId, events: AdcEventSet) -> Result<(), Error> {
        self.ensure_present(id)?;
        if self.devices[id.index()].sampling {
            return Err(Error::Sampling);
        }

        let mut clear = 0;
        for event in AdcEvent::PRIORITY {
            if events.contains(event) {
                clear |= event.flag();
                self.devices[id.index()].callbacks.clear(event);
            }
        }
        let bank = self.backend.bank(id);
        bank.modify(AdcReg::Ier, clear, 0);
        let still_armed = bank.read(AdcReg::Ier) & IER_SOURCES;

        if still_armed == 0 {
            let vector = self.backend.irq(id);
            self.platform.irqs().disable(vector);
        }
        Ok(())
    }

    /// Enable the converter and wait for its ready flag.
    ///
    /// A stale ready flag is cleared first so the wait observes a fresh
    /// edge. Requires a configured, calibrated instance.
    pub fn start(&mut self, id: AdcId) -> Result<(), Error> {
        self.ensure_present(id)?;
        let record = &self.devices[id.index()];
        if !record.active {
            return Err(Error::NotActive);
        }
        if !record.calibrated {
            return Err(Error::NotCalibrated);
        }

        let backend = &mut self.backend;
        {
            let bank = backend.bank(id);
            if bank.read(AdcReg::Isr) & ISR_ADRDY != 0 {
                bank.write(AdcReg::Isr, ISR_ADRDY);
            }
            bank.modify(AdcReg::Cr, 0, CR_ADEN);
        }
        poll::wait_until(self.platform.clock(), Wait::Ready, || {
            backend.bank(id).read(AdcReg::Isr) & ISR_ADRDY != 0
        })
    }

    /// Kick off a conversion cycle. Non-blocking: the result is collected
    /// by [`AdcBus::value`] or signalled through the event callbacks.
    /// One cycle may be outstanding per instance.
    pub fn start_sampling(&mut self, id: AdcId) -> Result<(), Error> {
        self.ensure_present(id)?;
        if !self.devices[id.index()].active {
            return Err(Error::NotActive);
        }

        self.backend.bank(id).modify(AdcReg::Cr, 0, CR_ADSTART);
        self.devices[id.index()].sampling = true;
        Ok(())
    }

    /// Wait for the outstanding conversion and read its raw value.
    ///
    /// On timeout the record deliberately keeps `sampling` set: the
    /// conversion was started and never observed finishing, so the cycle
    /// stays claimed and the caller decides whether to stop the
    /// converter or keep waiting.
    pub fn value(&mut self, id: AdcId) -> Result<u16, Error> {
        self.ensure_present(id)?;
        let record = &self.devices[id.index()];
        if !record.active {
            return Err(Error::NotActive);
        }
        if !record.sampling {
            return Err(Error::NotSampling);
        }

        let backend = &mut self.backend;
        poll::wait_until(self.platform.clock(), Wait::Conversion, || {
            backend.bank(id).read(AdcReg::Isr) & ISR_EOC != 0
        })?;
        let raw = (backend.bank(id).read(AdcReg::Dr) & 0xFFFF) as u16;

        self.devices[id.index()].sampling = false;
        Ok(raw)
    }

    /// Stop conversions and disable the converter, then release its
    /// clock gate and retire the record.
    ///
    /// Each of the two handshakes is a bounded wait; a timeout returns
    /// with the record still active and the hardware possibly
    /// half-stopped - that state is reported, not masked.
    pub fn stop(&mut self, id: AdcId) -> Result<(), Error> {
        self.ensure_present(id)?;
        let record = &self.devices[id.index()];
        if !record.active {
            return Err(Error::NotActive);
        }
        if !record.calibrated {
            return Err(Error::NotCalibrated);
        }

        let backend = &mut self.backend;
        backend.bank(id).modify(AdcReg::Cr, 0, CR_ADSTP);
        poll::wait_until(self.platform.clock(), Wait::StopConversion, || {
            backend.bank(id).read(AdcReg::Cr) & CR_ADSTP == 0
        })?;
        backend.bank(id).modify(AdcReg::Cr, 0, CR_ADDIS);
        poll::wait_until(self.platform.clock(), Wait::Disable, || {
            backend.bank(id).read(AdcReg::Cr) & CR_ADEN == 0
        })?;

        let record = &mut self.devices[id.index()];
        record.sampling = false;
        record.active = false;

        let gate = self.backend.clock_gate(id);
        self.platform.gates().disable(gate).map_err(|_| Error::Gate)?;
        Ok(())
    }

    /// Route the conversion data register into a caller-supplied buffer
    /// through the DMA controller, circularly, invoking `done` per pass.
    #[cfg(feature = "dma")]
    pub fn configure_dma<D: DmaService>(
        &mut self,
        id: AdcId,
        dma: &mut D,
        buffer: &'static mut [u16],
        done: TransferCallback,
    ) -> Result<(), Error> {
        self.ensure_present(id)?;
        let record = &self.devices[id.index()];
        if !record.active {
            return Err(Error::NotActive);
        }
        if !record.calibrated {
            return Err(Error::NotCalibrated);
        }

        self.backend
            .bank(id)
            .modify(AdcReg::Cfgr1, 0, CFGR1_DMAEN | CFGR1_DMACFG);
        let request = DmaRequest {
            channel: ADC_DMA_CHANNEL,
            count: buffer.len() as u16,
            circular: true,
            priority: DmaPriority::Medium,
        };
        dma.configure_from_peripheral(request, buffer, done)
            .map_err(|_| Error::Dma)?;
        dma.start(ADC_DMA_CHANNEL);
        Ok(())
    }

    /// Detach the converter from the DMA controller and abort the
    /// in-flight transfer.
    #[cfg(feature = "dma")]
    pub fn stop_dma<D: DmaService>(&mut self, id: AdcId, dma: &mut D) -> Result<(), Error> {
        self.ensure_present(id)?;
        if !self.devices[id.index()].active {
            return Err(Error::NotActive);
        }

        self.backend.bank(id).modify(AdcReg::Cfgr1, CFGR1_DMAEN, 0);
        dma.abort(ADC_DMA_CHANNEL);
        Ok(())
    }

    /// Converter-interrupt entry point.
    ///
    /// Walks the status flags in [`AdcEvent::PRIORITY`] order and serves
    /// the first one found: invoke its callback (if bound) and clear that
    /// flag alone. Two flags pending at once therefore take two vector
    /// entries - the flags are deliberately not drained in one call. The
    /// end-of-conversion flag is re-checked after the callback, since a
    /// data-register read inside it already clears the flag in hardware.
    pub fn dispatch(&mut self, id: AdcId) -> Option<AdcEvent> {
        if !self.devices[id.index()].present {
            return None;
        }
        let status = self.backend.bank(id).read(AdcReg::Isr);
        for event in AdcEvent::PRIORITY {
            let flag = event.flag();
            if status & flag == 0 {
                continue;
            }
            if let Some(callback) = self.devices[id.index()].callbacks.get(event) {
                callback();
            }
            let bank = self.backend.bank(id);
            if event == AdcEvent::EndOfConversion {
                if bank.read(AdcReg::Isr) & flag != 0 {
                    bank.write(AdcReg::Isr, flag);
                }
            } else {
                bank.write(AdcReg::Isr, flag);
            }
            return Some(event);
        }
        None
    }
}
