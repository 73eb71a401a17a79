//! DMA controller service
//!
//! Only the narrow contract the ADC's buffered-transfer mode needs:
//! a circular peripheral-to-memory transfer into a caller-supplied buffer
//! with a completion callback. The controller itself (channel arbitration,
//! address programming) is a chip concern.

/// Transfer urgency relative to other channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaPriority {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Parameters of one peripheral-to-memory transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaRequest {
    /// Controller channel to program.
    pub channel: u8,
    /// Number of elements per buffer pass.
    pub count: u16,
    /// Wrap to the start of the buffer when full.
    pub circular: bool,
    pub priority: DmaPriority,
}

/// Raised when the controller refuses a transfer setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaError;

/// Invoked from interrupt context when a buffer pass completes.
pub type TransferCallback = fn();

/// DMA controller operations consumed by the ADC buffered-transfer mode.
pub trait DmaService {
    /// Program and arm a channel to drain a peripheral data register into
    /// `buffer`. The buffer must outlive the transfer, hence `'static`.
    fn configure_from_peripheral(
        &mut self,
        request: DmaRequest,
        buffer: &'static mut [u16],
        done: TransferCallback,
    ) -> Result<(), DmaError>;

    /// Start a configured channel.
    fn start(&mut self, channel: u8);

    /// Abort an in-flight transfer and disarm the channel.
    fn abort(&mut self, channel: u8);
}
