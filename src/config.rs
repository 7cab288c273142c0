//! Node configuration.
//!
//! Everything here is fixed at build time. [`Config::default`] picks values up
//! from `FIELDLINK_*` environment variables seen by the compiler and falls back
//! to the factory values of the soil node otherwise:
//!
//! | Variable                  | Default          |
//! |---------------------------|------------------|
//! | `FIELDLINK_APN`           | `internet`       |
//! | `FIELDLINK_APN_USER`      | (empty)          |
//! | `FIELDLINK_APN_PASSWORD`  | (empty)          |
//! | `FIELDLINK_SERVER_HOST`   | `192.168.0.152`  |
//! | `FIELDLINK_SERVER_PORT`   | `8008`           |
//! | `FIELDLINK_DEVICE_ID`     | `ESP32-001`      |
//! | `FIELDLINK_DEVICE_NAME`   | `Soil Sensor 1`  |
//! | `FIELDLINK_LOCATION`      | `Garden A`       |
//!
//! Nothing is persisted; a reboot starts from these values again.

use core::time::Duration;

/// What the node does with its modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capability {
    /// Sample and display only. The modem is probed at start-up for
    /// diagnostics and never used for data.
    Local,
    /// Register with the collector and submit readings.
    #[default]
    Connected,
}

/// Access point settings for the packet-data bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Apn<'a> {
    /// Access point name.
    pub name: &'a str,
    /// User name, empty when the carrier needs none.
    pub user: &'a str,
    /// Password, only sent together with a user name.
    pub password: &'a str,
}

/// Host and TCP port of the remote collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    /// Host name or address literal.
    pub host: &'a str,
    /// TCP port.
    pub port: u16,
}

/// Who this node is, as announced during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity<'a> {
    /// Unique identifier, also the seed of the fallback token.
    pub device_id: &'a str,
    /// Human readable name.
    pub name: &'a str,
    /// Sensor kind reported to the collector.
    pub device_type: &'a str,
    /// Free-form location.
    pub location: &'a str,
}

/// Read windows and settle delays for each modem step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// `AT`, `ATE0`, `AT+CSQ`, `AT+CIPMODE`, `AT+CIPMUX`.
    pub command: Duration,
    /// `AT+CPIN?`, `AT+CREG?`.
    pub status_query: Duration,
    /// `AT+CIPSHUT`.
    pub shutdown: Duration,
    /// `AT+CSTT`.
    pub set_apn: Duration,
    /// `AT+CIICR`.
    pub bring_up: Duration,
    /// `AT+CIFSR`.
    pub local_address: Duration,
    /// `AT+CIPSTART` until `CONNECT OK`.
    pub connect: Duration,
    /// `AT+CIPSEND` until the `>` prompt.
    pub send_prompt: Duration,
    /// Payload written until the peer closes.
    pub response: Duration,
    /// `AT+CIPCLOSE`.
    pub close: Duration,
    /// Pause between opening the serial line and the first `AT`.
    pub settle_after_boot: Duration,
    /// Pause after `AT+CIPSHUT`.
    pub settle_after_shutdown: Duration,
    /// Pause after `AT+CSTT`.
    pub settle_after_apn: Duration,
    /// Pause after `AT+CIICR`.
    pub settle_after_bring_up: Duration,
    /// Pause after the pre-connect `AT+CIPCLOSE`.
    pub settle_after_close: Duration,
    /// Pause between `CONNECT OK` and `AT+CIPSEND`.
    pub settle_after_connect: Duration,
}

impl Timing {
    /// Windows used by the SIM800 firmware this crate was tuned against.
    pub const fn sim800() -> Self {
        Self {
            command: Duration::from_millis(1000),
            status_query: Duration::from_millis(2000),
            shutdown: Duration::from_millis(2000),
            set_apn: Duration::from_millis(2000),
            bring_up: Duration::from_millis(5000),
            local_address: Duration::from_millis(2000),
            connect: Duration::from_millis(10_000),
            send_prompt: Duration::from_millis(5000),
            response: Duration::from_millis(10_000),
            close: Duration::from_millis(1000),
            settle_after_boot: Duration::from_millis(3000),
            settle_after_shutdown: Duration::from_millis(1000),
            settle_after_apn: Duration::from_millis(1000),
            settle_after_bring_up: Duration::from_millis(3000),
            settle_after_close: Duration::from_millis(500),
            settle_after_connect: Duration::from_millis(1000),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::sim800()
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<'a> {
    /// Bearer settings.
    pub apn: Apn<'a>,
    /// Collector address.
    pub server: Endpoint<'a>,
    /// Path of the registration endpoint.
    pub register_path: &'a str,
    /// Path of the submission endpoint.
    pub submit_path: &'a str,
    /// This node's identity.
    pub identity: DeviceIdentity<'a>,
    /// Whether the uplink is used at all.
    pub capability: Capability,
    /// Time between submission attempts.
    pub send_interval: Duration,
    /// `AT+CREG?` polls before giving up on the network at start-up.
    pub network_attempts: u8,
    /// Pause between those polls.
    pub network_retry_interval: Duration,
    /// Per-step windows.
    pub timing: Timing,
}

impl Config<'static> {
    /// Build-time configuration, see the module docs.
    pub const fn from_build_env() -> Self {
        Self {
            apn: Apn {
                name: env_or(option_env!("FIELDLINK_APN"), "internet"),
                user: env_or(option_env!("FIELDLINK_APN_USER"), ""),
                password: env_or(option_env!("FIELDLINK_APN_PASSWORD"), ""),
            },
            server: Endpoint {
                host: env_or(option_env!("FIELDLINK_SERVER_HOST"), "192.168.0.152"),
                port: port_or(option_env!("FIELDLINK_SERVER_PORT"), 8008),
            },
            register_path: "/api/register/",
            submit_path: "/api/submit/",
            identity: DeviceIdentity {
                device_id: env_or(option_env!("FIELDLINK_DEVICE_ID"), "ESP32-001"),
                name: env_or(option_env!("FIELDLINK_DEVICE_NAME"), "Soil Sensor 1"),
                device_type: "multi",
                location: env_or(option_env!("FIELDLINK_LOCATION"), "Garden A"),
            },
            capability: Capability::Connected,
            send_interval: Duration::from_secs(30),
            network_attempts: 30,
            network_retry_interval: Duration::from_secs(1),
            timing: Timing::sim800(),
        }
    }
}

impl Default for Config<'static> {
    fn default() -> Self {
        Self::from_build_env()
    }
}

const fn env_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => default,
    }
}

/// Decimal port from the build environment; anything unparsable keeps the default.
const fn port_or(value: Option<&'static str>, default: u16) -> u16 {
    let bytes = match value {
        Some(v) => v.as_bytes(),
        None => return default,
    };
    if bytes.is_empty() {
        return default;
    }
    let mut port: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if !digit.is_ascii_digit() {
            return default;
        }
        port = port * 10 + (digit - b'0') as u32;
        if port > u16::MAX as u32 {
            return default;
        }
        i += 1;
    }
    port as u16
}
