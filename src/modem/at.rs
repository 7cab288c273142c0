//! AT command engine.
//!
//! Sends one command at a time over the [`LineTransport`] and hands back the
//! verbatim reply. Missing tokens are not errors at this level: the reply is
//! data for the caller to inspect, and only a serial fault fails a call.

use super::command;
use super::response::{self, RegistrationStatus, SignalQuality};
use super::transport::{LineTransport, ModemResponse};
use crate::config::Timing;
use crate::network::error::Error;
use crate::network::{Read, Write};
use crate::time::Clock;
use core::fmt::{self, Write as _};
use core::time::Duration;
use heapless::String;

/// Longest command line accepted, without the CR LF terminator.
pub const COMMAND_CAPACITY: usize = 128;

/// Final result code that always ends a read early.
const ERROR_TOKEN: &str = "ERROR";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Fixed(&'static str),
    Formatted(String<COMMAND_CAPACITY>),
}

/// One outbound AT directive.
///
/// Without an expected token the engine reads for the whole window. With one,
/// the read ends as soon as that token, `ERROR` or the optional failure token
/// arrives; [`ModemResponse::matched`] is then true only for the expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    line: Line,
    timeout: Duration,
    expect: Option<&'static str>,
    fail: Option<&'static str>,
}

impl Command {
    /// A command with a constant line.
    pub const fn fixed(line: &'static str, timeout: Duration) -> Self {
        Self {
            line: Line::Fixed(line),
            timeout,
            expect: None,
            fail: None,
        }
    }

    /// A command whose line is built from format arguments.
    pub fn formatted(args: fmt::Arguments<'_>, timeout: Duration) -> Result<Self, Error> {
        let mut line = String::new();
        line.write_fmt(args).map_err(|_| Error::BufferOverflow)?;
        Ok(Self {
            line: Line::Formatted(line),
            timeout,
            expect: None,
            fail: None,
        })
    }

    /// Stop reading once `token` arrives and report it as matched.
    pub fn expecting(mut self, token: &'static str) -> Self {
        self.expect = Some(token);
        self
    }

    /// Stop reading once `token` arrives, reported as not matched.
    pub fn failing_on(mut self, token: &'static str) -> Self {
        self.fail = Some(token);
        self
    }

    /// The command line as sent, without terminator.
    pub fn line(&self) -> &str {
        match &self.line {
            Line::Fixed(line) => *line,
            Line::Formatted(line) => line.as_str(),
        }
    }

    /// Read window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Token that marks success, if any.
    pub fn expected(&self) -> Option<&'static str> {
        self.expect
    }
}

/// Issues AT commands and decodes the modem state queries.
#[derive(Debug)]
pub struct AtEngine<S, C> {
    transport: LineTransport<S, C>,
    timing: Timing,
}

impl<S, C> AtEngine<S, C>
where
    S: Read + Write,
    C: Clock,
{
    /// Build an engine over a serial channel with the given windows.
    pub fn new(serial: S, clock: C, timing: Timing) -> Self {
        Self {
            transport: LineTransport::new(serial, clock),
            timing,
        }
    }

    /// Write the command line and read its reply.
    ///
    /// The command and the trimmed reply are traced as a pair.
    pub fn execute(&mut self, command: &Command) -> Result<ModemResponse, Error> {
        self.transport.send_line(command.line())?;
        let response = match command.expect {
            Some(token) => {
                let mut response = match command.fail {
                    Some(fail) => self
                        .transport
                        .poll_until_any(&[token, ERROR_TOKEN, fail], command.timeout)?,
                    None => self
                        .transport
                        .poll_until_any(&[token, ERROR_TOKEN], command.timeout)?,
                };
                response.retain_match(0);
                response
            }
            None => self.transport.collect(command.timeout)?,
        };
        debug!("CMD: {} RSP: {}", command.line(), response.as_str().trim());
        Ok(response)
    }

    /// `AT` answered with `OK`.
    pub fn probe(&mut self) -> Result<bool, Error> {
        let command = command::attention(&self.timing);
        Ok(self.execute(&command)?.matched())
    }

    /// Turn command echo off. The outcome is not checked.
    pub fn echo_off(&mut self) -> Result<(), Error> {
        let command = command::echo_off(&self.timing);
        self.execute(&command).map(|_| ())
    }

    /// Whether the SIM reports `READY`.
    pub fn sim_ready(&mut self) -> Result<bool, Error> {
        let command = command::sim_status(&self.timing);
        let reply = self.execute(&command)?;
        Ok(response::sim_ready(reply.as_str()))
    }

    /// Current cellular network registration.
    pub fn registration(&mut self) -> Result<RegistrationStatus, Error> {
        let command = command::network_registration(&self.timing);
        let reply = self.execute(&command)?;
        Ok(response::registration_status(reply.as_str()))
    }

    /// Current signal quality, [`SignalQuality::UNKNOWN`] when unreadable.
    pub fn signal_quality(&mut self) -> Result<SignalQuality, Error> {
        let command = command::signal_quality(&self.timing);
        let reply = self.execute(&command)?;
        Ok(response::signal_quality(reply.as_str()))
    }

    /// Windows in use.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Block on the engine's clock.
    pub fn delay(&mut self, duration: Duration) {
        self.transport.delay(duration);
    }

    /// Current reading of the engine's clock.
    pub fn now(&mut self) -> Duration {
        self.transport.now()
    }

    /// The underlying transport, for raw payload writes.
    pub fn transport_mut(&mut self) -> &mut LineTransport<S, C> {
        &mut self.transport
    }

    /// Give back the serial channel and clock.
    pub fn release(self) -> (S, C) {
        self.transport.release()
    }
}
