//! Log-backed panel adapter.
//!
//! Implements [`DisplayPort`] and [`AudioPort`] by writing what the panel
//! would show or play to the serial log. The node runs headless this way;
//! a TFT or audio-module adapter would implement the same traits.

use log::{debug, info};

use crate::app::ports::{AudioCue, AudioPort, DisplayPort};

/// Dots in the loading animation.
const LOADING_DOTS: u8 = 10;

pub struct ConsolePanel {
    volume: u8,
    loading_dot: u8,
    last_text: String,
}

impl ConsolePanel {
    pub fn new(volume: u8) -> Self {
        Self {
            volume,
            loading_dot: 0,
            last_text: String::new(),
        }
    }

    /// Most recent text or QR payload put on the panel.
    pub fn last_text(&self) -> &str {
        &self.last_text
    }

    fn set_text(&mut self, text: &str) {
        self.last_text.clear();
        self.last_text.push_str(text);
        self.loading_dot = 0;
    }
}

impl DisplayPort for ConsolePanel {
    fn show_text(&mut self, text: &str) {
        self.set_text(text);
        info!("PANEL | {}", text);
    }

    fn show_qr_code(&mut self, url: &str) {
        self.set_text(url);
        info!("PANEL | QR {}", url);
    }

    fn show_loading_animation(&mut self) {
        let dot = self.loading_dot;
        self.loading_dot = (dot + 1) % LOADING_DOTS;
        debug!("PANEL | loading {}/{}", dot + 1, LOADING_DOTS);
    }
}

impl AudioPort for ConsolePanel {
    fn play_cue(&mut self, cue: AudioCue) {
        info!("AUDIO | {:?} (vol {})", cue, self.volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_last_text() {
        let mut p = ConsolePanel::new(8);
        p.show_text("Revend");
        p.show_qr_code("https://reg/1");
        assert_eq!(p.last_text(), "https://reg/1");
    }

    #[test]
    fn loading_wraps_around() {
        let mut p = ConsolePanel::new(8);
        for _ in 0..LOADING_DOTS + 3 {
            p.show_loading_animation();
        }
        assert_eq!(p.loading_dot, 3);
    }
}
