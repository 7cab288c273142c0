//! Decoders for AT information responses.
//!
//! SIM800 answers queries with information lines of the form
//! `+NAME: field,field,...` followed by a final `OK` or `ERROR`. The line is
//! located wherever it starts in the captured text and then decoded with
//! `serde_at` into a typed reply, so an echoed command or a `NOT READY` never
//! reads as a hit.

use atat::atat_derive::AtatResp;
use atat::serde_at;
use core::fmt;
use core::net::Ipv4Addr;
use core::str::FromStr;
use heapless::String;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::Deserialize;

/// The `prefix` information line, from the prefix up to the end of its line.
///
/// `prefix` includes the colon, e.g. `"+CSQ:"`. Text in front of the prefix
/// on the same line, such as a stray byte left from an earlier reply, is
/// skipped.
pub fn info_line<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let start = text.find(prefix)?;
    let line = &text[start..];
    let end = line.find(['\r', '\n']).unwrap_or(line.len());
    Some(&line[..end])
}

/// Decode the `prefix` information line of `text` into `T`.
pub fn decode<T: DeserializeOwned>(text: &str, prefix: &str) -> Option<T> {
    serde_at::from_str(info_line(text, prefix)?).ok()
}

/// Whether the response carries a final error result code.
pub fn is_error(text: &str) -> bool {
    text.lines().map(str::trim).any(|line| {
        line == "ERROR" || line.starts_with("+CME ERROR") || line.starts_with("+CMS ERROR")
    })
}

/// SIM lock state reported by `+CPIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinCode {
    /// Unlocked.
    Ready,
    /// No usable SIM.
    NotReady,
    /// Waiting for the PIN.
    SimPin,
    /// Waiting for the PUK.
    SimPuk,
    /// Any other lock.
    Other,
}

impl From<&[u8]> for PinCode {
    fn from(code: &[u8]) -> Self {
        match code {
            b"READY" => Self::Ready,
            b"NOT READY" => Self::NotReady,
            b"SIM PIN" => Self::SimPin,
            b"SIM PUK" => Self::SimPuk,
            _ => Self::Other,
        }
    }
}

impl<'de> Deserialize<'de> for PinCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CodeVisitor;

        impl Visitor<'_> for CodeVisitor {
            type Value = PinCode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("SIM lock state")
            }

            fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<PinCode, E> {
                Ok(PinCode::from(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<PinCode, E> {
                self.visit_bytes(value.as_bytes())
            }
        }

        deserializer.deserialize_identifier(CodeVisitor)
    }
}

/// `+CPIN: <code>`
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct PinStatus {
    /// Lock state.
    pub code: PinCode,
}

/// `+CREG: <n>,<stat>[,<lac>,<ci>]`, or `+CREG: <stat>` when unsolicited.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct RegistrationReport {
    /// Result code mode, or the state itself in the unsolicited form.
    pub n: u8,
    /// Registration state.
    pub stat: Option<u8>,
    /// Location area code.
    pub lac: Option<String<8>>,
    /// Cell id.
    pub ci: Option<String<8>>,
}

impl RegistrationReport {
    /// The registration state, whichever form the line had.
    pub fn status(&self) -> RegistrationStatus {
        RegistrationStatus::from(self.stat.unwrap_or(self.n))
    }
}

/// `+CSQ: <rssi>,<ber>`
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct SignalReport {
    /// Received signal strength indicator.
    pub rssi: u8,
    /// Channel bit error rate.
    pub ber: u8,
}

/// Whether `AT+CPIN?` reported the SIM as unlocked and ready.
pub fn sim_ready(text: &str) -> bool {
    decode::<PinStatus>(text, "+CPIN:")
        .is_some_and(|status| status.code == PinCode::Ready)
}

/// Cellular network registration state as reported by `+CREG`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationStatus {
    /// No status line, or a value outside the 3GPP range.
    #[default]
    Unknown,
    /// Not registered and not searching.
    NotRegistering,
    /// Registered on the home network.
    Home,
    /// Not registered, searching for an operator.
    Searching,
    /// Registration denied.
    Denied,
    /// Registered while roaming.
    Roaming,
}

impl RegistrationStatus {
    /// Whether the modem can route traffic, at home or roaming.
    pub fn registered(self) -> bool {
        matches!(self, Self::Home | Self::Roaming)
    }
}

impl From<u8> for RegistrationStatus {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::NotRegistering,
            1 => Self::Home,
            2 => Self::Searching,
            3 => Self::Denied,
            5 => Self::Roaming,
            _ => Self::Unknown,
        }
    }
}

/// Decode a `+CREG` line.
pub fn registration_status(text: &str) -> RegistrationStatus {
    decode::<RegistrationReport>(text, "+CREG:")
        .map(|report| report.status())
        .unwrap_or_default()
}

/// Received signal strength indicator from `+CSQ`.
///
/// Holds the raw `<rssi>` value (0..=31, or 99 for "not detectable") or
/// [`SignalQuality::UNKNOWN`] when the modem gave no usable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalQuality(pub i16);

impl SignalQuality {
    /// Sentinel for "no reading".
    pub const UNKNOWN: Self = Self(-99);

    /// The raw indicator value.
    pub fn value(self) -> i16 {
        self.0
    }

    /// Whether a reading was obtained at all.
    pub fn is_known(self) -> bool {
        self != Self::UNKNOWN
    }

    /// Signal strength in dBm for the 0..=31 range of the indicator.
    pub fn dbm(self) -> Option<i16> {
        match self.0 {
            0..=31 => Some(-113 + 2 * self.0),
            _ => None,
        }
    }
}

impl Default for SignalQuality {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Decode the `<rssi>` field of a `+CSQ: <rssi>,<ber>` line.
pub fn signal_quality(text: &str) -> SignalQuality {
    decode::<SignalReport>(text, "+CSQ:")
        .map(|report| SignalQuality(i16::from(report.rssi)))
        .unwrap_or(SignalQuality::UNKNOWN)
}

/// The first line of the response that is a dotted-quad IPv4 address.
///
/// `AT+CIFSR` answers with the bare address and no final result code.
pub fn local_address(text: &str) -> Option<Ipv4Addr> {
    text.lines()
        .map(str::trim)
        .find_map(|line| Ipv4Addr::from_str(line).ok())
}
