//! Operation failure taxonomy
//!
//! Every bus operation returns `Result<_, Error>`. The variants are fine
//! enough for a caller to tell a bad argument from a wrong state, a
//! hardware timeout or a refused dependency - and to decide per class
//! whether to retry, reconfigure or declare the peripheral dead. Halting
//! is always the caller's choice, never taken in here.

/// Failure of a peripheral bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A pin number is outside the package's 0-15 range.
    PinOutOfRange,
    /// An alternate-function selector is outside 0-7.
    AfOutOfRange,
    /// The requested baud rate has no achievable divisor at the current
    /// reference clock (divider below the oversampling floor or wider
    /// than the 16-bit register).
    InvalidBaudRate,
    /// An ADC channel selector exceeds the family's channel count.
    ChannelOutOfRange,
    /// A sampling-time value does not fit the register field.
    SampleTimeOutOfRange,
    /// The instance does not physically exist on the compiled-for part.
    Unsupported,
    /// The operation needs the peripheral started first.
    NotActive,
    /// The operation needs a completed calibration.
    NotCalibrated,
    /// A conversion is in flight; reconfiguration is refused.
    Sampling,
    /// No conversion is in flight to read.
    NotSampling,
    /// A bounded register poll expired before the flag changed.
    Timeout(Wait),
    /// The clock gate service refused an enable or release.
    Gate,
    /// The GPIO service refused a pin claim.
    Gpio,
    /// The DMA controller refused the transfer setup.
    Dma,
}

/// The bounded-wait sites, for timeout attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wait {
    /// Converter-disable acknowledgement.
    Disable,
    /// Calibration completion.
    Calibration,
    /// Asynchronous sample-clock oscillator ready.
    SampleClock,
    /// Converter ready after enable.
    Ready,
    /// End of conversion.
    Conversion,
    /// Stop-conversion acknowledgement.
    StopConversion,
}

/// Coarse failure class, one per category of the error design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorClass {
    /// Bad argument, rejected before any hardware mutation.
    Parameter,
    /// Wrong state-machine state, rejected without side effects.
    State,
    /// A hardware flag never appeared within the poll budget. May leave
    /// the record partially transitioned; see the operation's notes.
    Timeout,
    /// An external service (gates, GPIO, DMA) reported failure.
    Dependency,
}

impl Error {
    /// Classify this failure for retry-vs-halt policy decisions.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::PinOutOfRange
            | Error::AfOutOfRange
            | Error::InvalidBaudRate
            | Error::ChannelOutOfRange
            | Error::SampleTimeOutOfRange
            | Error::Unsupported => ErrorClass::Parameter,
            Error::NotActive | Error::NotCalibrated | Error::Sampling | Error::NotSampling => {
                ErrorClass::State
            }
            Error::Timeout(_) => ErrorClass::Timeout,
            Error::Gate | Error::Gpio | Error::Dma => ErrorClass::Dependency,
        }
    }
}
