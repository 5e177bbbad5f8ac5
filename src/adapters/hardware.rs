//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the chute sensors, the gate servo, the indicator bank, the panel
//! and the NFC reader, exposing them through the device ports. This is
//! the only module in the system that touches actual hardware. On
//! non-espidf targets, the underlying drivers use cfg-gated simulation
//! stubs.

use log::warn;

use crate::adapters::console::ConsolePanel;
use crate::app::ports::{
    AudioCue, AudioPort, CancelInputPort, DisplayPort, GatePort, IndicatorChannel, IndicatorPort,
    SensorPort, TagReaderPort,
};
use crate::drivers::cancel_button;
use crate::drivers::gate::GateServo;
use crate::drivers::indicator::{BoardPin, ShiftRegisterBank};
use crate::drivers::pn532::Pn532Reader;
use crate::pins;
use crate::sensors::ChuteSensors;

pub type IndicatorBank = ShiftRegisterBank<BoardPin, BoardPin, BoardPin>;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    chute: ChuteSensors,
    gate: GateServo,
    indicators: IndicatorBank,
    panel: ConsolePanel,
    nfc: Pn532Reader,
}

impl HardwareAdapter {
    pub fn new(
        chute: ChuteSensors,
        gate: GateServo,
        indicators: IndicatorBank,
        panel: ConsolePanel,
        nfc: Pn532Reader,
    ) -> Self {
        Self {
            chute,
            gate,
            indicators,
            panel,
            nfc,
        }
    }

    /// Indicator bank on the board-default shift-register pins.
    pub fn board_indicators() -> IndicatorBank {
        ShiftRegisterBank::new(
            BoardPin(pins::SR_DATA_GPIO),
            BoardPin(pins::SR_LATCH_GPIO),
            BoardPin(pins::SR_CLOCK_GPIO),
        )
    }

    pub fn gate(&self) -> &GateServo {
        &self.gate
    }

    pub fn indicator_outputs(&self) -> u8 {
        self.indicators.outputs()
    }
}

// ── Sensor ports ──────────────────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_ir(&mut self) -> u16 {
        self.chute.read_ir()
    }

    fn read_metal(&mut self) -> u16 {
        self.chute.read_metal()
    }
}

impl TagReaderPort for HardwareAdapter {
    fn poll_tag(&mut self) -> Option<String> {
        self.nfc.poll()
    }
}

impl CancelInputPort for HardwareAdapter {
    fn is_cancel_pressed(&mut self) -> bool {
        cancel_button::read_level()
    }
}

// ── Actuator ports ────────────────────────────────────────────

impl GatePort for HardwareAdapter {
    fn open_gate(&mut self) {
        self.gate.open();
    }

    fn close_gate(&mut self) {
        self.gate.close();
    }
}

impl IndicatorPort for HardwareAdapter {
    fn set_indicator(&mut self, channel: IndicatorChannel) {
        if let Err(e) = self.indicators.show_only(channel) {
            warn!("Indicator {:?}: {}", channel, e);
        }
    }

    fn clear_indicators(&mut self) {
        if let Err(e) = self.indicators.clear() {
            warn!("Indicator clear: {}", e);
        }
    }
}

// ── Panel ports ───────────────────────────────────────────────

impl DisplayPort for HardwareAdapter {
    fn show_text(&mut self, text: &str) {
        self.panel.show_text(text);
    }

    fn show_qr_code(&mut self, url: &str) {
        self.panel.show_qr_code(url);
    }

    fn show_loading_animation(&mut self) {
        self.panel.show_loading_animation();
    }
}

impl AudioPort for HardwareAdapter {
    fn play_cue(&mut self, cue: AudioCue) {
        self.panel.play_cue(cue);
    }
}
