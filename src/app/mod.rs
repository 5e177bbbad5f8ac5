//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the Revend node: the
//! session controller and the cooperative control loop that drives it.
//! All interaction with hardware and the broker happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod control_loop;
pub mod controller;
pub mod events;
pub mod ports;
