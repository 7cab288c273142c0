//! Main-loop cadence.
//!
//! [`Node`] decides when a sample is worth sending. The caller reads its
//! sensors every pass and hands the sample to [`Node::tick`]; once per
//! `send_interval` the node submits it, re-registering first if the session
//! holds no token. In between it only reports the countdown.

use crate::config::Capability;
use crate::display::{Status, StatusDisplay};
use crate::network::error::Error;
use crate::network::{Read, Write};
use crate::session::Session;
use crate::telemetry::TelemetrySample;
use crate::time::Clock;
use core::time::Duration;

/// What a call to [`Node::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Local-only node, nothing to send.
    Idle,
    /// Not due yet.
    Waiting {
        /// Time left until the next attempt.
        remaining: Duration,
    },
    /// The sample was accepted.
    Sent,
    /// The attempt failed; the next one comes a full interval later.
    Failed(Error),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Tick {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Tick::Idle => defmt::write!(f, "Idle"),
            Tick::Waiting { remaining } => {
                defmt::write!(f, "Waiting({=u64}ms)", remaining.as_millis() as u64)
            }
            Tick::Sent => defmt::write!(f, "Sent"),
            Tick::Failed(e) => defmt::write!(f, "Failed({})", e),
        }
    }
}

/// Drives a [`Session`] at the configured interval.
#[derive(Debug)]
pub struct Node<'a, S, C, D> {
    session: Session<'a, S, C, D>,
    last_attempt: Duration,
}

impl<'a, S, C, D> Node<'a, S, C, D>
where
    S: Read + Write,
    C: Clock,
    D: StatusDisplay,
{
    /// Wrap a session that has not been started yet.
    pub fn new(session: Session<'a, S, C, D>) -> Self {
        Self {
            session,
            last_attempt: Duration::ZERO,
        }
    }

    /// Start the modem and, for a connected node, register.
    ///
    /// Failures are logged and left to [`tick`](Self::tick) to recover from.
    /// The first submission is due one interval after this returns.
    pub fn start(&mut self) -> Result<(), Error> {
        let started = self.session.start().map(|_| ());
        if started.is_ok() && self.session.config().capability == Capability::Connected {
            if let Err(e) = self.session.register() {
                warn!("start-up registration failed: {:?}", e);
            }
        }
        self.last_attempt = self.session.now();
        started
    }

    /// One pass of the main loop.
    pub fn tick(&mut self, sample: &TelemetrySample) -> Tick {
        if self.session.config().capability == Capability::Local {
            return Tick::Idle;
        }

        let interval = self.session.config().send_interval;
        let elapsed = self.session.now().saturating_sub(self.last_attempt);
        if elapsed < interval {
            let remaining = interval - elapsed;
            self.session
                .display_mut()
                .show(Status::NextSendIn(remaining.as_secs() as u32));
            return Tick::Waiting { remaining };
        }

        let outcome = self.attempt(sample);
        self.last_attempt = self.session.now();
        match outcome {
            Ok(()) => {
                info!("sample sent");
                Tick::Sent
            }
            Err(e) => {
                warn!("sample not sent: {:?}", e);
                Tick::Failed(e)
            }
        }
    }

    fn attempt(&mut self, sample: &TelemetrySample) -> Result<(), Error> {
        if !self.session.is_registered() {
            self.session.register()?;
        }
        self.session.submit(sample)
    }

    /// The session being driven.
    pub fn session(&self) -> &Session<'a, S, C, D> {
        &self.session
    }

    /// Mutable access to the session.
    pub fn session_mut(&mut self) -> &mut Session<'a, S, C, D> {
        &mut self.session
    }

    /// Give back the session.
    pub fn into_session(self) -> Session<'a, S, C, D> {
        self.session
    }
}
