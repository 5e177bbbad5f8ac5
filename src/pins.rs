//! GPIO / peripheral pin assignments for the Revend main board (ESP32-WROOM).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1, input-only pins)
// ---------------------------------------------------------------------------

/// IR reflective sensor at the chute. Lower reading = object present.
pub const IR_SENSOR_GPIO: i32 = 36;
/// Inductive metal sensor. Lower reading = metallic object.
pub const METAL_SENSOR_GPIO: i32 = 39;

/// ADC1 channel behind GPIO36 (SENSOR_VP).
pub const ADC1_CH_IR: u32 = 0;
/// ADC1 channel behind GPIO39 (SENSOR_VN).
pub const ADC1_CH_METAL: u32 = 3;

// ---------------------------------------------------------------------------
// User input
// ---------------------------------------------------------------------------

/// Cancel push-button, active HIGH with external pull-down.
pub const CANCEL_BUTTON_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// Gate servo
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the gate servo.
pub const SERVO_GPIO: i32 = 13;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC resolution for the servo channel (14-bit → 16384 counts per 20 ms).
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Pulse width at 0°.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2_500;

// ---------------------------------------------------------------------------
// Indicator bank (74HC595 shift register)
// ---------------------------------------------------------------------------

pub const SR_DATA_GPIO: i32 = 25;
pub const SR_LATCH_GPIO: i32 = 33;
pub const SR_CLOCK_GPIO: i32 = 32;

// ---------------------------------------------------------------------------
// PN532 NFC reader (HSU on UART1)
// ---------------------------------------------------------------------------

pub const NFC_UART_PORT: i32 = 1;
pub const NFC_UART_RX_GPIO: i32 = 16;
pub const NFC_UART_TX_GPIO: i32 = 17;
pub const NFC_UART_BAUD: u32 = 115_200;
