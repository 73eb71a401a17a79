//! Thyra Hardware Abstraction Layer
//!
//! This crate defines the trait contracts between the board-agnostic
//! peripheral state machines in `thyra-core` and chip-specific backends
//! (STM32F0, and similar register-compatible families). The same bus and
//! dispatch logic runs against real silicon or against in-memory fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application firmware                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  thyra-core (device tables, state       │
//! │  machines, interrupt dispatch)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  thyra-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ thyra-hal-    │       │ test fakes    │
//! │   stm32f0     │       │ (in-memory)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`regs::RegisterBank`] - named-register read/write/modify
//! - [`clocks::ClockGates`] - peripheral clock and port gate claims
//! - [`gpio::GpioCtl`] - pin mode, alternate function and drive setup
//! - [`time::Monotonic`] - tick source for bounded register polls
//! - [`irq::IrqCtl`] - interrupt controller masking and priorities
//! - [`platform::Platform`] - bundle of the four services above
//! - [`usart::UsartBackend`], [`adc::AdcBackend`] - per-family backend
//!   capability sets (instance presence, register banks, gate tokens,
//!   interrupt vectors)

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod clocks;
#[cfg(feature = "dma")]
pub mod dma;
pub mod gpio;
pub mod irq;
pub mod platform;
pub mod regs;
pub mod time;
pub mod usart;

// Re-export key traits at crate root for convenience
pub use clocks::{ClockGates, ClockToken, GateError};
pub use gpio::{GpioCtl, PinError, Port};
pub use irq::{IrqCtl, IrqVector};
pub use platform::Platform;
pub use regs::RegisterBank;
pub use time::Monotonic;
