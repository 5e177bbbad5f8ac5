//! Sensor subsystem: the chute sensors and the debounced classifier.
//!
//! [`ChuteSensors`] owns both sensors and produces a [`SensorReading`] per
//! debounce tick; [`classifier::SensorClassifier`] turns the stream of
//! readings into committed Accept/Reject verdicts.

pub mod analog;
pub mod classifier;

use analog::{AnalogSensor, SensorKind};
use classifier::SensorReading;

use crate::pins;

/// Aggregates the IR and metal sensors.
pub struct ChuteSensors {
    ir: AnalogSensor,
    metal: AnalogSensor,
}

impl ChuteSensors {
    pub fn new(ir: AnalogSensor, metal: AnalogSensor) -> Self {
        Self { ir, metal }
    }

    /// Sensors on their board-default ADC channels.
    pub fn on_board() -> Self {
        Self::new(
            AnalogSensor::new(SensorKind::Ir, pins::ADC1_CH_IR),
            AnalogSensor::new(SensorKind::Metal, pins::ADC1_CH_METAL),
        )
    }

    pub fn read_ir(&mut self) -> u16 {
        self.ir.read()
    }

    pub fn read_metal(&mut self) -> u16 {
        self.metal.read()
    }

    /// Read both sensors back to back.
    pub fn read(&mut self) -> SensorReading {
        SensorReading {
            ir: self.ir.read(),
            metal: self.metal.read(),
        }
    }
}
