//! Packet-data bearer lifecycle.
//!
//! The bearer is the modem's GPRS context. Every bring-up starts with a
//! teardown, so whatever state the modem was left in by a previous cycle, the
//! same command sequence runs and ends in a known state.

use super::at::AtEngine;
use super::command;
use super::response;
use crate::config::Apn;
use crate::network::error::Error;
use crate::network::{Read, Write};
use crate::time::Clock;
use core::net::Ipv4Addr;

/// Where the bearer stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BearerState {
    /// Not active. Initial state after every boot.
    #[default]
    Down,
    /// Setup sequence in progress.
    BringingUp,
    /// Active with the address the network assigned.
    Up(Ipv4Addr),
    /// The last setup did not produce an address.
    Failed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for BearerState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            BearerState::Down => defmt::write!(f, "Down"),
            BearerState::BringingUp => defmt::write!(f, "BringingUp"),
            BearerState::Up(addr) => {
                let [a, b, c, d] = addr.octets();
                defmt::write!(f, "Up({}.{}.{}.{})", a, b, c, d)
            }
            BearerState::Failed => defmt::write!(f, "Failed"),
        }
    }
}

/// Brings the bearer up and down through the AT engine.
#[derive(Debug, Default)]
pub struct Bearer {
    state: BearerState,
}

impl Bearer {
    /// A bearer in the `Down` state.
    pub const fn new() -> Self {
        Self {
            state: BearerState::Down,
        }
    }

    /// Current state.
    pub fn state(&self) -> BearerState {
        self.state
    }

    /// Local address while `Up`.
    pub fn address(&self) -> Option<Ipv4Addr> {
        match self.state {
            BearerState::Up(addr) => Some(addr),
            _ => None,
        }
    }

    /// Tear down, then run the full setup sequence.
    ///
    /// Succeeds only when `AT+CIFSR` answers with a well-formed IPv4 address.
    /// Any other answer, `ERROR` included, leaves the bearer `Failed`.
    pub fn bring_up<S, C>(
        &mut self,
        at: &mut AtEngine<S, C>,
        apn: &Apn<'_>,
    ) -> Result<Ipv4Addr, Error>
    where
        S: Read + Write,
        C: Clock,
    {
        info!("bringing bearer up on APN {}", apn.name);
        self.state = BearerState::BringingUp;
        match Self::setup(at, apn) {
            Ok(addr) => {
                let [a, b, c, d] = addr.octets();
                info!("bearer up, local address {}.{}.{}.{}", a, b, c, d);
                self.state = BearerState::Up(addr);
                Ok(addr)
            }
            Err(e) => {
                warn!("bearer setup failed: {:?}", e);
                self.state = BearerState::Failed;
                Err(e)
            }
        }
    }

    /// Deactivate the bearer. Tearing down an inactive bearer is not an error.
    pub fn tear_down<S, C>(&mut self, at: &mut AtEngine<S, C>) -> Result<(), Error>
    where
        S: Read + Write,
        C: Clock,
    {
        let shut = command::shut(at.timing());
        at.execute(&shut)?;
        self.state = BearerState::Down;
        Ok(())
    }

    fn setup<S, C>(at: &mut AtEngine<S, C>, apn: &Apn<'_>) -> Result<Ipv4Addr, Error>
    where
        S: Read + Write,
        C: Clock,
    {
        let timing = *at.timing();

        // Outcome ignored: an already inactive context answers ERROR.
        at.execute(&command::shut(&timing))?;
        at.delay(timing.settle_after_shutdown);

        at.execute(&command::normal_transfer_mode(&timing))?;
        at.execute(&command::single_connection(&timing))?;

        at.execute(&command::set_apn(apn, &timing)?)?;
        at.delay(timing.settle_after_apn);

        at.execute(&command::bring_up_wireless(&timing))?;
        at.delay(timing.settle_after_bring_up);

        let reply = at.execute(&command::local_address(&timing))?;
        response::local_address(reply.as_str()).ok_or(Error::BearerUnavailable)
    }
}
