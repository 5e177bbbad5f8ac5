//! Revend firmware main entry point.
//!
//! Hexagonal architecture driven by a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter       LogEventSink   NvsAdapter   Esp32Time   │
//! │  (Sensor+Gate+Panel+   (EventSink)    (Config)     (Clock)     │
//! │   Indicator+Tag+Cancel)                                        │
//! │  MqttTransport ── MessagingGateway (trigger / action JSON)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           SessionController (pure logic)               │    │
//! │  │  Session FSM · Debounced classifier · Gate dwell       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ControlLoop: action → cancel → tag/tick → gate → welcome      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use revend::adapters::console::ConsolePanel;
use revend::adapters::device_id;
use revend::adapters::hardware::HardwareAdapter;
use revend::adapters::log_sink::LogEventSink;
use revend::adapters::mqtt::MqttTransport;
use revend::adapters::nvs::NvsAdapter;
use revend::adapters::time::Esp32TimeAdapter;
use revend::adapters::wifi;
use revend::app::control_loop::ControlLoop;
use revend::app::ports::ConfigPort;
use revend::config::RevendConfig;
use revend::drivers::gate::GateServo;
use revend::drivers::hw_init;
use revend::drivers::pn532::Pn532Reader;
use revend::error::Error;
use revend::sensors::ChuteSensors;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Revend v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {} - halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Config from NVS (or defaults) ──────────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config unavailable ({}), using defaults", e);
            RevendConfig::default()
        }
    };

    // ── 4. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take().ok();
    let _wifi = wifi::connect_station(peripherals.modem, sysloop, nvs_partition, &config)
        .map_err(Error::from)?;

    let mac = device_id::read_mac();
    let client_id = device_id::client_id(&mac);
    let transport = MqttTransport::connect(&config.broker_url, &client_id, &config.action_topic())
        .map_err(Error::from)?;

    // ── 5. Devices ────────────────────────────────────────────
    let mut nfc = Pn532Reader::new();
    nfc.begin();
    let hw = HardwareAdapter::new(
        ChuteSensors::on_board(),
        GateServo::new(config.gate_open_angle, config.gate_closed_angle),
        HardwareAdapter::board_indicators(),
        ConsolePanel::new(config.audio_volume),
        nfc,
    );

    // ── 6. Control loop ───────────────────────────────────────
    let mut control = ControlLoop::new(
        &config,
        hw,
        transport,
        LogEventSink::new(),
        Esp32TimeAdapter::new(),
    );
    control.start();
    info!("System ready. Entering control loop.");

    let interval = std::time::Duration::from_millis(u64::from(control.interval_ms()));
    loop {
        control.iterate();
        std::thread::sleep(interval);
    }
}
