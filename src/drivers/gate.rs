//! Gate servo driver (hobby servo on LEDC).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty for the requested angle via hw_init.
//! On host/test: tracks the commanded angle in-memory only.

use crate::pins;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// LEDC duty for `angle` degrees (clamped to 0..=180) at the servo's
/// frame rate and resolution.
pub const fn angle_to_duty(angle: u8) -> u32 {
    let angle = if angle > 180 { 180 } else { angle as u32 };
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    let pulse_us = pins::SERVO_MIN_PULSE_US + span * angle / 180;
    let period_us = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
    let max_duty = (1u32 << pins::SERVO_PWM_RESOLUTION_BITS) - 1;
    pulse_us * max_duty / period_us
}

pub struct GateServo {
    open_angle: u8,
    closed_angle: u8,
    angle: u8,
}

impl GateServo {
    pub fn new(open_angle: u8, closed_angle: u8) -> Self {
        Self {
            open_angle,
            closed_angle,
            angle: closed_angle,
        }
    }

    pub fn open(&mut self) {
        self.write_angle(self.open_angle);
    }

    pub fn close(&mut self) {
        self.write_angle(self.closed_angle);
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    pub fn is_open(&self) -> bool {
        self.angle == self.open_angle
    }

    fn write_angle(&mut self, angle: u8) {
        self.angle = angle;
        self.set_duty_hw(angle_to_duty(angle));
    }

    #[cfg(target_os = "espidf")]
    fn set_duty_hw(&self, duty: u32) {
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, duty);
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_duty_hw(&self, duty: u32) {
        log::trace!("servo(sim): duty={}", duty);
    }
}
