//! Status reporting to the local display.
//!
//! The protocol core never draws anything. It hands a [`Status`] to whatever
//! [`StatusDisplay`] the node was built with and moves on; rendering is the
//! collaborator's business. [`Status`] implements `Display` with the short
//! texts a 16x2 character panel can show.

use crate::modem::response::SignalQuality;
use core::fmt;

/// Something worth telling the person standing next to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Modem start-up sequence running.
    InitializingModem,
    /// `AT+CPIN?` in progress.
    CheckingSim,
    /// SIM missing or locked.
    SimError,
    /// Waiting for cellular registration.
    WaitingForNetwork {
        /// Polls left before giving up.
        attempts_left: u8,
    },
    /// Cellular registration never happened.
    NetworkFailed,
    /// Latest signal reading.
    Signal(SignalQuality),
    /// Modem answered and is registered.
    ModemReady,
    /// Bearer setup running.
    ConnectingBearer,
    /// Bearer is up.
    BearerUp,
    /// Bearer setup failed.
    BearerFailed,
    /// Registration request in flight.
    Registering,
    /// Token obtained.
    Registered,
    /// Registration failed.
    RegistrationFailed,
    /// Submission in flight.
    Sending,
    /// Submission accepted.
    SentOk,
    /// Submission rejected or lost.
    SendFailed,
    /// Seconds until the next submission.
    NextSendIn(u32),
    /// Running without an uplink.
    LocalOnly,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InitializingModem => f.write_str("Init SIM800L..."),
            Status::CheckingSim => f.write_str("Checking SIM..."),
            Status::SimError => f.write_str("SIM Error!"),
            Status::WaitingForNetwork { attempts_left } => {
                write!(f, "Wait Network... {}", attempts_left)
            }
            Status::NetworkFailed => f.write_str("Network Failed!"),
            Status::Signal(quality) => write!(f, "Signal: {}", quality.value()),
            Status::ModemReady => f.write_str("SIM800L Ready!"),
            Status::ConnectingBearer => f.write_str("Connect GPRS..."),
            Status::BearerUp => f.write_str("GPRS Connected!"),
            Status::BearerFailed => f.write_str("GPRS Failed!"),
            Status::Registering => f.write_str("Registering..."),
            Status::Registered => f.write_str("Registered OK!"),
            Status::RegistrationFailed => f.write_str("Reg Failed!"),
            Status::Sending => f.write_str("Sending..."),
            Status::SentOk => f.write_str("Sent OK!"),
            Status::SendFailed => f.write_str("Send Failed!"),
            Status::NextSendIn(secs) => write!(f, "Next: {}s", secs),
            Status::LocalOnly => f.write_str("Ready!"),
        }
    }
}

/// Consumer of status updates.
pub trait StatusDisplay {
    /// Show `status`. Must not block on the modem.
    fn show(&mut self, status: Status);
}

/// No display attached.
impl StatusDisplay for () {
    fn show(&mut self, _status: Status) {}
}

impl<T: StatusDisplay + ?Sized> StatusDisplay for &mut T {
    fn show(&mut self, status: Status) {
        (**self).show(status)
    }
}
