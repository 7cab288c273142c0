//! Common error types for modem and network operations

use core::fmt;

/// A common error type for modem and network operations.
///
/// Every layer of the stack reports failure through this enum. It is `Copy`
/// and carries no borrowed data so it can travel up from the serial poll loop
/// to the session without lifetimes getting in the way.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An error occurred during a write to the serial channel.
    WriteError,
    /// An error occurred during a read from the serial channel.
    ReadError,
    /// The awaited token did not show up within its window.
    Timeout,
    /// The modem answered with an explicit `ERROR`.
    ModemError,
    /// A fixed-size buffer was too small for the data.
    BufferOverflow,
    /// The SIM card did not report `READY`.
    SimNotReady,
    /// The modem never registered on the cellular network.
    NetworkUnavailable,
    /// The packet-data bearer did not come up with a usable address.
    BearerUnavailable,
    /// The TCP socket could not be opened.
    ConnectFailed,
    /// The modem never showed the `>` prompt for payload data.
    PromptMissing,
    /// The peer answered with a status other than 200.
    HttpStatus(u16),
    /// A protocol-specific error occurred.
    ProtocolError,
    /// An operation that requires a registration token was attempted without one.
    NotRegistered,
    /// The node runs without a cellular uplink.
    Disabled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WriteError => f.write_str("serial write failed"),
            Error::ReadError => f.write_str("serial read failed"),
            Error::Timeout => f.write_str("timed out waiting for modem"),
            Error::ModemError => f.write_str("modem reported ERROR"),
            Error::BufferOverflow => f.write_str("buffer too small"),
            Error::SimNotReady => f.write_str("SIM not ready"),
            Error::NetworkUnavailable => f.write_str("not registered on cellular network"),
            Error::BearerUnavailable => f.write_str("packet bearer unavailable"),
            Error::ConnectFailed => f.write_str("TCP connect failed"),
            Error::PromptMissing => f.write_str("no send prompt from modem"),
            Error::HttpStatus(code) => write!(f, "HTTP status {}", code),
            Error::ProtocolError => f.write_str("protocol error"),
            Error::NotRegistered => f.write_str("device not registered"),
            Error::Disabled => f.write_str("uplink disabled"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ModemError => defmt::write!(f, "ModemError"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            Error::SimNotReady => defmt::write!(f, "SimNotReady"),
            Error::NetworkUnavailable => defmt::write!(f, "NetworkUnavailable"),
            Error::BearerUnavailable => defmt::write!(f, "BearerUnavailable"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::PromptMissing => defmt::write!(f, "PromptMissing"),
            Error::HttpStatus(code) => defmt::write!(f, "HttpStatus({})", code),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::NotRegistered => defmt::write!(f, "NotRegistered"),
            Error::Disabled => defmt::write!(f, "Disabled"),
        }
    }
}
