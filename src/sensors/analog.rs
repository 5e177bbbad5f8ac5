//! Raw analog sensors at the chute: IR reflective sensor and inductive
//! metal sensor.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection. The defaults
//! model an empty chute.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_IR_ADC: AtomicU16 = AtomicU16::new(4095);
static SIM_METAL_ADC: AtomicU16 = AtomicU16::new(4095);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ir_adc(raw: u16) {
    SIM_IR_ADC.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_metal_adc(raw: u16) {
    SIM_METAL_ADC.store(raw, Ordering::Relaxed);
}

/// Which sensor an [`AnalogSensor`] is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Ir,
    Metal,
}

/// One ADC-backed sensor. Keeps the last raw value for diagnostics.
pub struct AnalogSensor {
    kind: SensorKind,
    channel: u32,
    last_raw: u16,
}

impl AnalogSensor {
    pub fn new(kind: SensorKind, channel: u32) -> Self {
        Self {
            kind,
            channel,
            last_raw: 0,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn read(&mut self) -> u16 {
        self.last_raw = self.read_adc();
        self.last_raw
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        match self.kind {
            SensorKind::Ir => SIM_IR_ADC.load(Ordering::Relaxed),
            SensorKind::Metal => SIM_METAL_ADC.load(Ordering::Relaxed),
        }
    }
}
