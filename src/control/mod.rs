//! Time-driven control primitives: deadline timers and gate actuation.

pub mod actuation;
pub mod timer;
