//! Board-agnostic peripheral state management
//!
//! This crate contains the device tables, state machines and interrupt
//! dispatch that do not depend on specific hardware:
//!
//! - One bus object per peripheral family ([`usart::UsartBus`],
//!   [`adc::AdcBus`]) owning a fixed table of per-instance records
//! - Guarded register operations that only execute in the right state
//!   (active/inactive, calibrated/uncalibrated, sampling/idle)
//! - Bounded register polling against an injected tick source
//! - Interrupt-context callback dispatch routed through the table
//!
//! Hardware enters through the trait contracts of `thyra-hal`; the same
//! logic runs against real register blocks or in-memory fakes.

// no_std in firmware; host tests keep std for the test tooling.
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod adc;
pub mod error;
mod poll;
pub mod usart;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{Error, ErrorClass, Wait};
