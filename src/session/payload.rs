//! JSON documents exchanged with the collector.

use crate::config::DeviceIdentity;
use crate::modem::response::SignalQuality;
use crate::network::error::Error;
use crate::telemetry::TelemetrySample;
use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Largest JSON document the node sends.
pub const PAYLOAD_CAPACITY: usize = 512;

/// Placeholder until the node measures its supply.
pub const BATTERY_LEVEL: f32 = 100.0;

/// Body of `POST /api/register/`.
#[derive(Debug, Serialize)]
pub struct RegistrationRequest<'a> {
    pub device_id: &'a str,
    pub device_name: &'a str,
    pub device_type: &'a str,
    pub location: &'a str,
}

impl<'a> From<&DeviceIdentity<'a>> for RegistrationRequest<'a> {
    fn from(identity: &DeviceIdentity<'a>) -> Self {
        Self {
            device_id: identity.device_id,
            device_name: identity.name,
            device_type: identity.device_type,
            location: identity.location,
        }
    }
}

/// Fields of the registration reply the node cares about. Everything else the
/// collector sends (`success`, `created`, ...) is skipped.
#[derive(Debug, Deserialize)]
pub struct RegistrationReply<'a> {
    #[serde(borrow, default)]
    pub api_key: Option<&'a str>,
}

/// Body of `POST /api/submit/`.
#[derive(Debug, Serialize)]
pub struct Submission<'a> {
    pub device_id: &'a str,
    pub api_key: &'a str,
    pub temperature: f32,
    pub humidity: f32,
    pub soil_moisture: u8,
    pub soil_raw: u16,
    pub battery_level: f32,
    pub signal_strength: i16,
}

impl<'a> Submission<'a> {
    pub fn new(
        device_id: &'a str,
        api_key: &'a str,
        sample: &TelemetrySample,
        signal: SignalQuality,
    ) -> Self {
        Self {
            device_id,
            api_key,
            temperature: sample.temperature(),
            humidity: sample.humidity(),
            soil_moisture: sample.soil_moisture(),
            soil_raw: sample.soil_raw(),
            battery_level: BATTERY_LEVEL,
            signal_strength: signal.value(),
        }
    }
}

/// Serialize `value` into a fixed buffer.
pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8, PAYLOAD_CAPACITY>, Error> {
    serde_json_core::to_vec(value).map_err(|_| Error::BufferOverflow)
}

/// The token in a registration reply body, if it decodes and carries one.
pub fn api_key(body: &str) -> Option<&str> {
    match serde_json_core::from_str::<RegistrationReply<'_>>(body) {
        Ok((reply, _)) => reply.api_key.filter(|key| !key.is_empty()),
        Err(_) => None,
    }
}
