//! GPIO pin configuration service
//!
//! Thyra claims pins on behalf of peripherals - a USART needs its TX/RX
//! pins in alternate-function mode, an ADC needs its input pin in analog
//! mode. The service hides the port register layout; the core only names
//! the port, pin and desired mode.

/// GPIO port identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Port {
    /// Port index for table addressing.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Highest pin number in a port (16 pins per port).
pub const PIN_MAX: u8 = 15;

/// Highest alternate-function selector (AF0-AF7).
pub const AF_MAX: u8 = 7;

/// Pull resistor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Output driver topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    PushPull,
    OpenDrain,
}

/// Output slew rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    Low,
    Medium,
    High,
}

/// Raised when a pin claim is refused (pin out of range, port clock
/// unavailable, pin already owned by a conflicting function).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinError;

/// Pin configuration service consumed by the peripheral state machines.
pub trait GpioCtl {
    /// Route a pin to an internal peripheral signal via its alternate
    /// function selector.
    fn set_alternate_function(&mut self, port: Port, pin: u8, af: u8) -> Result<(), PinError>;

    /// Configure pull, drive topology and slew rate of a claimed pin.
    fn set_output_parameters(
        &mut self,
        port: Port,
        pin: u8,
        pull: Pull,
        drive: Drive,
        speed: Speed,
    ) -> Result<(), PinError>;

    /// Disconnect a pin from its digital logic and hand it to the analog
    /// domain.
    fn set_analog(&mut self, port: Port, pin: u8);
}
