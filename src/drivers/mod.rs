//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod cancel_button;
pub mod gate;
pub mod hw_init;
pub mod indicator;
pub mod pn532;
