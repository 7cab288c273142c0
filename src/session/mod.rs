//! # Registration and submission
//!
//! A [`Session`] owns everything one modem link needs: the AT engine (and
//! through it the serial channel and clock), the bearer, the configuration,
//! the display, and the authorization token. Because it is the only owner and
//! every operation takes `&mut self`, at most one request is ever in flight.
//!
//! ## States
//!
//! * `Unregistered`: fresh session, no token.
//! * `Registering`: a registration exchange is running.
//! * `Registered`: a token is held; submissions are allowed.
//! * `RegistrationFailed`: the last registration exchange did not complete.
//!
//! A failed registration is not retried here. Calling
//! [`register`](Session::register) again starts over; the [`Node`] driver
//! does that on its next due cycle.
//!
//! [`Node`]: crate::node::Node

mod payload;

pub use payload::BATTERY_LEVEL;

use crate::config::{Capability, Config};
use crate::display::{Status, StatusDisplay};
use crate::modem::at::AtEngine;
use crate::modem::bearer::Bearer;
use crate::modem::response::{self, SignalQuality};
use crate::network::application::http::{Client, Exchange};
use crate::network::error::Error;
use crate::network::{Read, Write};
use crate::telemetry::TelemetrySample;
use crate::time::Clock;
use heapless::String;
use payload::{RegistrationRequest, Submission};

/// Longest token kept.
pub const TOKEN_CAPACITY: usize = 128;

const FALLBACK_PREFIX: &str = "temp_api_key_";

/// Credential sent with every submission. Lives in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(String<TOKEN_CAPACITY>);

impl AuthToken {
    /// Wrap a token issued by the collector.
    pub fn new(token: &str) -> Result<Self, Error> {
        String::try_from(token)
            .map(Self)
            .map_err(|_| Error::BufferOverflow)
    }

    /// Token derived from the device identifier, used when registration
    /// succeeded but the reply carried no usable key.
    pub fn fallback(device_id: &str) -> Self {
        let mut token = String::new();
        // Truncates silently at capacity; the prefix always fits.
        let _ = token.push_str(FALLBACK_PREFIX);
        for c in device_id.chars() {
            if token.push(c).is_err() {
                break;
            }
        }
        Self(token)
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AuthToken {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AuthToken({=str})", self.0.as_str())
    }
}

/// Where the session stands with the collector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No token yet.
    #[default]
    Unregistered,
    /// Registration exchange running.
    Registering,
    /// Token held.
    Registered(AuthToken),
    /// The last registration exchange failed.
    RegistrationFailed,
}

/// Modem link plus the registration state built on top of it.
#[derive(Debug)]
pub struct Session<'a, S, C, D> {
    modem: AtEngine<S, C>,
    bearer: Bearer,
    config: Config<'a>,
    display: D,
    state: State,
}

impl<'a, S, C, D> Session<'a, S, C, D>
where
    S: Read + Write,
    C: Clock,
    D: StatusDisplay,
{
    /// Create an unregistered session over a serial channel.
    pub fn new(serial: S, clock: C, config: Config<'a>, display: D) -> Self {
        Self {
            modem: AtEngine::new(serial, clock, config.timing),
            bearer: Bearer::new(),
            config,
            display,
            state: State::Unregistered,
        }
    }

    /// Bring the modem to a known state and wait for the cellular network.
    ///
    /// With [`Capability::Connected`]: `AT`, `ATE0`, SIM check, up to
    /// `network_attempts` registration polls, then a signal reading. With
    /// [`Capability::Local`] the modem is only probed (`AT`, `AT+CSQ`,
    /// `AT+CREG?`) for the log, and start-up succeeds whatever it answers.
    pub fn start(&mut self) -> Result<SignalQuality, Error> {
        match self.config.capability {
            Capability::Local => Ok(self.probe()),
            Capability::Connected => self.init_modem(),
        }
    }

    fn probe(&mut self) -> SignalQuality {
        let timing = *self.modem.timing();
        self.modem.delay(timing.settle_after_boot);
        let alive = self.modem.probe().unwrap_or(false);
        let signal = self.modem.signal_quality().unwrap_or_default();
        let network = self.modem.registration().unwrap_or_default();
        info!("modem probe: alive {}, signal {}, network {:?}", alive, signal.value(), network);
        self.display.show(Status::LocalOnly);
        signal
    }

    fn init_modem(&mut self) -> Result<SignalQuality, Error> {
        let timing = *self.modem.timing();
        self.display.show(Status::InitializingModem);
        self.modem.delay(timing.settle_after_boot);

        if !self.modem.probe()? {
            warn!("modem did not answer AT");
        }
        self.modem.echo_off()?;

        self.display.show(Status::CheckingSim);
        if !self.modem.sim_ready()? {
            error!("SIM not ready");
            self.display.show(Status::SimError);
            return Err(Error::SimNotReady);
        }

        let attempts = self.config.network_attempts;
        let mut registered = false;
        for attempt in 1..=attempts {
            let status = self.modem.registration()?;
            if status.registered() {
                info!("network registration: {:?}", status);
                registered = true;
                break;
            }
            self.modem.delay(self.config.network_retry_interval);
            self.display.show(Status::WaitingForNetwork {
                attempts_left: attempts - attempt,
            });
        }
        if !registered {
            error!("no network after {} polls", attempts);
            self.display.show(Status::NetworkFailed);
            return Err(Error::NetworkUnavailable);
        }

        let signal = self.modem.signal_quality()?;
        self.display.show(Status::Signal(signal));
        self.display.show(Status::ModemReady);
        Ok(signal)
    }

    /// Trade the device identity for a token.
    ///
    /// Fails with [`Error::Disabled`] without any I/O when the node runs
    /// local-only. Once the collector answered 200 the session ends up
    /// `Registered`, with the issued key or, failing that, the fallback token.
    pub fn register(&mut self) -> Result<&AuthToken, Error> {
        if self.config.capability == Capability::Local {
            return Err(Error::Disabled);
        }
        self.state = State::Registering;
        self.display.show(Status::Registering);
        info!("registering {}", self.config.identity.device_id);

        match self.try_register() {
            Ok(token) => {
                info!("registered, token {}", token.as_str());
                self.display.show(Status::Registered);
                self.state = State::Registered(token);
            }
            Err(e) => {
                warn!("registration failed: {:?}", e);
                self.display.show(Status::RegistrationFailed);
                self.state = State::RegistrationFailed;
                return Err(e);
            }
        }
        self.token().ok_or(Error::NotRegistered)
    }

    fn try_register(&mut self) -> Result<AuthToken, Error> {
        self.connect_bearer()?;

        let identity = self.config.identity;
        let body = payload::to_json(&RegistrationRequest::from(&identity))?;
        let exchange = self.post(self.config.register_path, &body)?;

        let issued = exchange
            .response()
            .and_then(|response| payload::api_key(response.body))
            .and_then(|key| AuthToken::new(key).ok());
        Ok(match issued {
            Some(token) => token,
            None => {
                warn!("no api_key in registration reply, using fallback");
                AuthToken::fallback(identity.device_id)
            }
        })
    }

    /// Send one sample.
    ///
    /// Without a token this fails with [`Error::NotRegistered`] before
    /// touching the modem. Otherwise the bearer is rebuilt, the signal is
    /// read, and the reading is posted; anything but a 200 is an error.
    pub fn submit(&mut self, sample: &TelemetrySample) -> Result<(), Error> {
        let State::Registered(token) = &self.state else {
            return Err(Error::NotRegistered);
        };
        let token = token.clone();
        self.display.show(Status::Sending);

        let result = self.try_submit(&token, sample);
        match result {
            Ok(()) => self.display.show(Status::SentOk),
            Err(e) => {
                warn!("submission failed: {:?}", e);
                self.display.show(Status::SendFailed);
            }
        }
        result
    }

    fn try_submit(&mut self, token: &AuthToken, sample: &TelemetrySample) -> Result<(), Error> {
        self.connect_bearer()?;
        let signal = self.modem.signal_quality()?;

        let document = Submission::new(
            self.config.identity.device_id,
            token.as_str(),
            sample,
            signal,
        );
        let body = payload::to_json(&document)?;
        self.post(self.config.submit_path, &body)?;
        Ok(())
    }

    fn connect_bearer(&mut self) -> Result<(), Error> {
        self.display.show(Status::ConnectingBearer);
        match self.bearer.bring_up(&mut self.modem, &self.config.apn) {
            Ok(_) => {
                self.display.show(Status::BearerUp);
                Ok(())
            }
            Err(e) => {
                self.display.show(Status::BearerFailed);
                Err(e)
            }
        }
    }

    /// Post and require a 200.
    ///
    /// Without any status line the failure is put down to the modem, the
    /// response window, or a garbled reply, in that order.
    fn post(&mut self, path: &str, body: &[u8]) -> Result<Exchange, Error> {
        let mut client = Client::new(&mut self.modem, self.config.server);
        let exchange = client.post(path, body)?;
        if exchange.is_success() {
            Ok(exchange)
        } else {
            let code = exchange.status_code();
            warn!("{} answered {:?}", path, code);
            Err(match code {
                Some(code) => Error::HttpStatus(code),
                None if response::is_error(exchange.raw().as_str()) => Error::ModemError,
                None if !exchange.peer_closed() => Error::Timeout,
                None => Error::ProtocolError,
            })
        }
    }

    /// Current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The token, while registered.
    pub fn token(&self) -> Option<&AuthToken> {
        match &self.state {
            State::Registered(token) => Some(token),
            _ => None,
        }
    }

    /// Whether a token is held.
    pub fn is_registered(&self) -> bool {
        self.token().is_some()
    }

    /// The bearer as last left.
    pub fn bearer(&self) -> &Bearer {
        &self.bearer
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config<'a> {
        &self.config
    }

    /// The display collaborator.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// The AT engine, for diagnostics.
    pub fn modem_mut(&mut self) -> &mut AtEngine<S, C> {
        &mut self.modem
    }

    /// Current reading of the session's clock.
    pub fn now(&mut self) -> core::time::Duration {
        self.modem.now()
    }

    /// Take the session apart, returning serial channel, clock and display.
    pub fn release(self) -> (S, C, D) {
        let (serial, clock) = self.modem.release();
        (serial, clock, self.display)
    }
}
