//! Clock and port gate service
//!
//! Peripherals are dead until their bus clock gate is opened, and claimed
//! pins hold their port gate open. The encoding of a [`ClockToken`] is
//! backend-defined; the core only resolves tokens through a family backend
//! and hands them back here.

use crate::gpio::Port;

/// Opaque handle for one peripheral clock gate. Obtained from a family
/// backend ([`crate::usart::UsartBackend::clock_gate`] and friends); the
/// bit layout is owned by the chip backend that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockToken(pub u16);

/// Raised when a gate request is refused (clock domain not running,
/// peripheral absent, reference still held).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GateError;

/// Clock gating service consumed around start/stop-class operations.
pub trait ClockGates {
    /// Open a peripheral clock gate.
    fn enable(&mut self, token: ClockToken) -> Result<(), GateError>;

    /// Close a peripheral clock gate.
    fn disable(&mut self, token: ClockToken) -> Result<(), GateError>;

    /// Release a GPIO port gate claimed during pin setup.
    fn disable_port(&mut self, port: Port) -> Result<(), GateError>;
}
