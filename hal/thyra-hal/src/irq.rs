//! Interrupt controller service
//!
//! The core unmasks a peripheral's vector only after its device-table
//! entry is fully configured, and masks it again on stop. Vector numbers
//! are resolved by the family backends; this trait is the narrow window
//! onto the controller itself.

/// Interrupt vector number as used by the interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqVector(pub u16);

/// Interrupt controller operations consumed by the core.
pub trait IrqCtl {
    /// Unmask a vector.
    fn enable(&mut self, vector: IrqVector);

    /// Mask a vector.
    fn disable(&mut self, vector: IrqVector);

    /// Assign a vector's preemption priority (0 is highest).
    fn set_priority(&mut self, vector: IrqVector, priority: u8);
}
