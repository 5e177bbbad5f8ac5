//! Indicator lamp bank behind a 74HC595 shift register.
//!
//! Output bit 0 drives the Reject lamp, bit 1 Accept, bit 2 Idle. The
//! driver is generic over `embedded-hal` output pins so it runs unchanged
//! against board GPIO or recording pins in tests.

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::app::ports::IndicatorChannel;
use crate::error::ActuatorError;

pub const fn channel_bit(channel: IndicatorChannel) -> u8 {
    match channel {
        IndicatorChannel::Reject => 0,
        IndicatorChannel::Accept => 1,
        IndicatorChannel::Idle => 2,
    }
}

pub struct ShiftRegisterBank<D, L, C> {
    data: D,
    latch: L,
    clock: C,
    outputs: u8,
}

impl<D, L, C> ShiftRegisterBank<D, L, C>
where
    D: OutputPin,
    L: OutputPin,
    C: OutputPin,
{
    pub fn new(data: D, latch: L, clock: C) -> Self {
        Self {
            data,
            latch,
            clock,
            outputs: 0,
        }
    }

    /// Current latched output byte.
    pub fn outputs(&self) -> u8 {
        self.outputs
    }

    /// Light exactly one channel.
    pub fn show_only(&mut self, channel: IndicatorChannel) -> Result<(), ActuatorError> {
        self.write(1 << channel_bit(channel))
    }

    pub fn clear(&mut self) -> Result<(), ActuatorError> {
        self.write(0)
    }

    /// Shift `byte` out MSB first and latch it.
    pub fn write(&mut self, byte: u8) -> Result<(), ActuatorError> {
        self.latch.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        for bit in (0..8).rev() {
            let high = byte & (1 << bit) != 0;
            self.data
                .set_state(high.into())
                .map_err(|_| ActuatorError::GpioWriteFailed)?;
            self.clock.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
            self.clock.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        }
        self.latch.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.outputs = byte;
        Ok(())
    }
}

// ── Board pin ─────────────────────────────────────────────────

/// A push-pull GPIO configured by hw_init.
pub struct BoardPin(pub i32);

impl ErrorType for BoardPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for BoardPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl BoardPin {
    #[cfg(target_os = "espidf")]
    fn drive(&self, high: bool) {
        crate::drivers::hw_init::gpio_write(self.0, high);
    }

    #[cfg(not(target_os = "espidf"))]
    fn drive(&self, _high: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared trace of (pin, level) writes.
    type Trace = Rc<RefCell<Vec<(char, bool)>>>;

    struct TracePin(char, Trace);

    impl ErrorType for TracePin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for TracePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.1.borrow_mut().push((self.0, false));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.1.borrow_mut().push((self.0, true));
            Ok(())
        }
    }

    fn bank() -> (ShiftRegisterBank<TracePin, TracePin, TracePin>, Trace) {
        let trace: Trace = Rc::default();
        let bank = ShiftRegisterBank::new(
            TracePin('d', trace.clone()),
            TracePin('l', trace.clone()),
            TracePin('c', trace.clone()),
        );
        (bank, trace)
    }

    /// Data levels sampled on each clock rising edge.
    fn shifted_bits(trace: &[(char, bool)]) -> Vec<bool> {
        let mut data = false;
        let mut bits = Vec::new();
        for &(pin, level) in trace {
            match (pin, level) {
                ('d', l) => data = l,
                ('c', true) => bits.push(data),
                _ => {}
            }
        }
        bits
    }

    #[test]
    fn accept_lights_bit_one() {
        let (mut bank, trace) = bank();
        bank.show_only(IndicatorChannel::Accept).unwrap();
        assert_eq!(bank.outputs(), 0b0000_0010);
        let bits = shifted_bits(&trace.borrow());
        assert_eq!(bits.len(), 8);
        // MSB first: Q1 is the seventh bit shifted.
        assert_eq!(bits, [false, false, false, false, false, false, true, false]);
        assert_eq!(trace.borrow().last(), Some(&('l', true)));
    }

    #[test]
    fn show_only_replaces_previous_channel() {
        let (mut bank, _) = bank();
        bank.show_only(IndicatorChannel::Reject).unwrap();
        bank.show_only(IndicatorChannel::Idle).unwrap();
        assert_eq!(bank.outputs(), 0b0000_0100);
        bank.clear().unwrap();
        assert_eq!(bank.outputs(), 0);
    }
}
