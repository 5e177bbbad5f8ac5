//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                      | Connects to              |
//! |-------------|---------------------------------|--------------------------|
//! | `hardware`  | SensorPort, GatePort,           | ADC, LEDC servo, 74HC595 |
//! |             | IndicatorPort, TagReaderPort,   | PN532 UART, cancel GPIO  |
//! |             | CancelInputPort                 |                          |
//! | `console`   | DisplayPort, AudioPort          | Serial log output        |
//! | `log_sink`  | EventSink                       | Serial log output        |
//! | `mqtt`      | Transport                       | ESP-IDF MQTT client      |
//! | `nvs`       | ConfigPort                      | NVS / in-memory store    |
//! | `time`      | ClockPort                       | ESP32 system timer       |
//! | `wifi`      | (bring-up only)                 | ESP-IDF WiFi STA         |
//! | `device_id` | (MQTT client id)                | eFuse base MAC           |

pub mod console;
pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
