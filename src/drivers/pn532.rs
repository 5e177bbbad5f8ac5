//! PN532 NFC reader over HSU (high-speed UART).
//!
//! ## Frames
//!
//! ```text
//!  host → PN532:  00 00 FF LEN LCS D4 CMD ARGS… DCS 00
//!  PN532 → host:  00 00 FF 00 FF 00                      (ACK)
//!                 00 00 FF LEN LCS D5 CMD+1 DATA… DCS 00 (response)
//! ```
//!
//! `LCS` makes `LEN + LCS == 0` and `DCS` makes the sum of TFI, command
//! and data bytes zero, both mod 256.
//!
//! ## Polling
//!
//! [`Pn532`] is a pure state machine: it hands out the next command frame
//! and consumes whatever bytes the UART produced, so nothing ever blocks
//! the control loop. It first runs the init sequence (SAM normal mode,
//! single passive-activation retry) and then issues `InListPassiveTarget`
//! back-to-back. A command that gets no answer within
//! [`RESPONSE_TIMEOUT_POLLS`] polls is re-issued.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`Pn532Reader`] moves frames over the NFC UART via hw_init.
//! On host/test: [`Pn532Reader`] reports the tag injected with
//! [`sim_present_tag`].

use heapless::Vec;
use log::{info, warn};

/// Host → PN532 frame identifier.
const TFI_HOST: u8 = 0xD4;
/// PN532 → host frame identifier.
const TFI_PN532: u8 = 0xD5;

pub const CMD_SAM_CONFIGURATION: u8 = 0x14;
pub const CMD_RF_CONFIGURATION: u8 = 0x32;
pub const CMD_IN_LIST_PASSIVE_TARGET: u8 = 0x4A;

/// Normal mode, 1 s virtual-card timeout, IRQ enabled.
const SAM_CONFIGURATION: [u8; 4] = [CMD_SAM_CONFIGURATION, 0x01, 0x14, 0x01];
/// Max retries: ATR 0xFF, PSL 0x01, passive activation 0x01. One activation
/// attempt makes `InListPassiveTarget` return promptly when no card is near.
const RF_RETRIES: [u8; 5] = [CMD_RF_CONFIGURATION, 0x05, 0xFF, 0x01, 0x01];
/// One target, 106 kbps type A.
const IN_LIST_PASSIVE_TARGET: [u8; 3] = [CMD_IN_LIST_PASSIVE_TARGET, 0x01, 0x00];

const INIT_SEQUENCE: [&[u8]; 2] = [&SAM_CONFIGURATION, &RF_RETRIES];

/// HSU wake-up preamble.
pub const WAKEUP: [u8; 5] = [0x55, 0x55, 0x00, 0x00, 0x00];

pub const FRAME_CAPACITY: usize = 32;
const RX_CAPACITY: usize = 128;

/// Polls without an answer before a command is re-issued.
pub const RESPONSE_TIMEOUT_POLLS: u16 = 50;

// ── Frame codec ───────────────────────────────────────────────

/// Wrap a command in an information frame. `None` if `cmd` is too long.
pub fn build_frame(cmd: &[u8]) -> Option<Vec<u8, FRAME_CAPACITY>> {
    let len = u8::try_from(cmd.len() + 1).ok()?;
    let sum = cmd.iter().fold(TFI_HOST, |acc, b| acc.wrapping_add(*b));

    let mut frame = Vec::new();
    frame.extend_from_slice(&[0x00, 0x00, 0xFF, len, len.wrapping_neg(), TFI_HOST]).ok()?;
    frame.extend_from_slice(cmd).ok()?;
    frame.extend_from_slice(&[sum.wrapping_neg(), 0x00]).ok()?;
    Some(frame)
}

/// Result of scanning the front of the receive buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameParse<'a> {
    /// Need more bytes.
    Incomplete,
    /// Drop this many leading bytes (noise, bad checksum, error frame).
    Skip(usize),
    /// An ACK frame of this many bytes.
    Ack(usize),
    /// A response; `payload` starts at the response code.
    Response { payload: &'a [u8], consumed: usize },
}

/// Parse one frame at the start of `buf`, resynchronising on the `00 FF`
/// start code.
pub fn parse_frame(buf: &[u8]) -> FrameParse<'_> {
    let Some(start) = buf.windows(2).position(|w| w == [0x00, 0xFF]) else {
        // Keep a trailing 0x00, it may be the first half of a start code.
        return match buf.last() {
            Some(0x00) if buf.len() == 1 => FrameParse::Incomplete,
            Some(0x00) => FrameParse::Skip(buf.len() - 1),
            Some(_) => FrameParse::Skip(buf.len()),
            None => FrameParse::Incomplete,
        };
    };
    if start > 0 {
        return FrameParse::Skip(start);
    }
    if buf.len() < 4 {
        return FrameParse::Incomplete;
    }

    let (len, lcs) = (buf[2], buf[3]);
    if len == 0x00 && lcs == 0xFF {
        return if buf.len() >= 5 {
            FrameParse::Ack(5)
        } else {
            FrameParse::Incomplete
        };
    }
    if len.wrapping_add(lcs) != 0 || len < 2 {
        return FrameParse::Skip(2);
    }

    let len = usize::from(len);
    let total = len + 6;
    if buf.len() < total {
        return FrameParse::Incomplete;
    }
    let data = &buf[4..4 + len];
    let dcs = buf[4 + len];
    let sum = data.iter().fold(dcs, |acc, b| acc.wrapping_add(*b));
    if sum != 0 || data[0] != TFI_PN532 {
        return FrameParse::Skip(total);
    }
    FrameParse::Response {
        payload: &data[1..],
        consumed: total,
    }
}

/// UID of the first target in an `InListPassiveTarget` response.
pub fn parse_target_uid(payload: &[u8]) -> Option<&[u8]> {
    match payload {
        [code, count, _tg, _sens_hi, _sens_lo, _sel, uid_len, rest @ ..]
            if *code == CMD_IN_LIST_PASSIVE_TARGET + 1 && *count > 0 =>
        {
            rest.get(..usize::from(*uid_len))
        }
        _ => None,
    }
}

/// Render a tag UID as dot-separated decimal bytes.
pub fn format_identity(uid: &[u8]) -> String {
    let mut out = String::with_capacity(uid.len() * 4);
    for (i, byte) in uid.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&byte.to_string());
    }
    out
}

// ── Protocol state machine ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Configure(usize),
    Scan,
}

pub struct Pn532 {
    stage: Stage,
    /// Response code we are waiting for.
    awaiting: Option<u8>,
    silent_polls: u16,
    rx: Vec<u8, RX_CAPACITY>,
}

impl Pn532 {
    pub fn new() -> Self {
        Self {
            stage: Stage::Configure(0),
            awaiting: None,
            silent_polls: 0,
            rx: Vec::new(),
        }
    }

    /// The init sequence has completed and scans are running.
    pub fn is_ready(&self) -> bool {
        self.stage == Stage::Scan
    }

    /// Next frame to transmit, if the reader is not waiting on an answer.
    pub fn next_command(&mut self) -> Option<Vec<u8, FRAME_CAPACITY>> {
        if self.awaiting.is_some() {
            self.silent_polls += 1;
            if self.silent_polls < RESPONSE_TIMEOUT_POLLS {
                return None;
            }
            warn!("PN532: no response, re-issuing command");
            self.rx.clear();
        }

        let cmd: &[u8] = match self.stage {
            Stage::Configure(i) => INIT_SEQUENCE[i],
            Stage::Scan => &IN_LIST_PASSIVE_TARGET,
        };
        self.awaiting = Some(cmd[0] + 1);
        self.silent_polls = 0;
        build_frame(cmd)
    }

    /// Consume received bytes. Returns the identity of a tag in the field.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<String> {
        if self.rx.extend_from_slice(bytes).is_err() {
            warn!("PN532: receive buffer overflow, resyncing");
            self.rx.clear();
            return None;
        }

        let mut identity = None;
        loop {
            let (consumed, response) = match parse_frame(&self.rx) {
                FrameParse::Incomplete => break,
                FrameParse::Skip(n) | FrameParse::Ack(n) => (n, None),
                FrameParse::Response { payload, consumed } => {
                    let code = payload.first().copied();
                    let uid = parse_target_uid(payload).map(format_identity);
                    (consumed, Some((code, uid)))
                }
            };
            self.drain(consumed);

            if let Some((code, uid)) = response {
                if code.is_some() && code == self.awaiting {
                    self.awaiting = None;
                    self.advance();
                    if uid.is_some() {
                        identity = uid;
                    }
                }
            }
        }
        identity
    }

    fn advance(&mut self) {
        if let Stage::Configure(i) = self.stage {
            self.stage = if i + 1 < INIT_SEQUENCE.len() {
                Stage::Configure(i + 1)
            } else {
                info!("PN532: configured, scanning");
                Stage::Scan
            };
        }
    }

    fn drain(&mut self, n: usize) {
        let n = n.min(self.rx.len());
        self.rx.rotate_left(n);
        self.rx.truncate(self.rx.len() - n);
    }
}

impl Default for Pn532 {
    fn default() -> Self {
        Self::new()
    }
}

// ── Reader (hardware binding) ─────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_TAG: std::sync::Mutex<Option<std::vec::Vec<u8>>> = std::sync::Mutex::new(None);

/// Place a tag with `uid` in the simulated field, or remove it with `None`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_present_tag(uid: Option<&[u8]>) {
    if let Ok(mut slot) = SIM_TAG.lock() {
        *slot = uid.map(<[u8]>::to_vec);
    }
}

pub struct Pn532Reader {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    protocol: Pn532,
}

impl Pn532Reader {
    pub fn new() -> Self {
        Self {
            protocol: Pn532::new(),
        }
    }

    /// Wake the chip from power-down. Call once after UART init.
    #[cfg(target_os = "espidf")]
    pub fn begin(&mut self) {
        crate::drivers::hw_init::uart_write(&WAKEUP);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn begin(&mut self) {
        info!("PN532(sim): ready");
    }

    #[cfg(target_os = "espidf")]
    pub fn poll(&mut self) -> Option<String> {
        use crate::drivers::hw_init;

        if let Some(frame) = self.protocol.next_command() {
            hw_init::uart_write(&frame);
        }
        let mut buf = [0u8; 64];
        let n = hw_init::uart_read(&mut buf);
        if n == 0 {
            return None;
        }
        self.protocol.feed(&buf[..n])
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn poll(&mut self) -> Option<String> {
        let slot = SIM_TAG.lock().ok()?;
        slot.as_deref().map(format_identity)
    }
}

impl Default for Pn532Reader {
    fn default() -> Self {
        Self::new()
    }
}
