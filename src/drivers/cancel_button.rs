//! Polled cancel-button edge detector.
//!
//! ## Hardware
//!
//! Momentary switch on [`CANCEL_BUTTON_GPIO`](crate::pins::CANCEL_BUTTON_GPIO),
//! active HIGH. The control loop samples the raw level every iteration and
//! feeds it to [`CancelButton::update`], which reports the rising edge
//! (low on the previous sample, high on this one). There is no debounce:
//! a press seen on a single sample cancels.
//!
//! ```text
//!  RELEASED ──[high]──▶ PRESSED (edge)
//!     ▲                    │
//!     └───────[low]────────┘
//! ```

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_CANCEL_LEVEL: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_cancel_level(pressed: bool) {
    SIM_CANCEL_LEVEL.store(pressed, Ordering::Relaxed);
}

/// Raw level of the cancel input, `true` while pressed.
#[cfg(target_os = "espidf")]
pub fn read_level() -> bool {
    crate::drivers::hw_init::gpio_read(crate::pins::CANCEL_BUTTON_GPIO)
}

#[cfg(not(target_os = "espidf"))]
pub fn read_level() -> bool {
    SIM_CANCEL_LEVEL.load(Ordering::Relaxed)
}

#[derive(Debug, Default)]
pub struct CancelButton {
    was_pressed: bool,
}

impl CancelButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw sample. Returns `true` on a rising edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edge_without_press() {
        let mut btn = CancelButton::new();
        assert!(!btn.update(false));
        assert!(!btn.update(false));
    }

    #[test]
    fn edge_once_per_press() {
        let mut btn = CancelButton::new();
        assert!(btn.update(true));
        assert!(!btn.update(true));
        assert!(!btn.update(true));
        assert!(!btn.update(false));
        assert!(btn.update(true));
    }

    #[test]
    fn single_sample_press_is_an_edge() {
        let mut btn = CancelButton::new();
        assert!(btn.update(true));
        assert!(!btn.update(false));
        assert!(btn.update(true));
    }

    #[test]
    fn sim_level_is_read_back() {
        sim_set_cancel_level(true);
        assert!(read_level());
        sim_set_cancel_level(false);
        assert!(!read_level());
    }
}
