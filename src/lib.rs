//! Revend node firmware library.
//!
//! Exposes the session logic, wire protocol and adapters for integration
//! testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod protocol;

pub mod adapters;
pub mod drivers;
pub mod sensors;
