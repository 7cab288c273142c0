//! # fieldlink - cellular uplink for field telemetry nodes
//!
//! A `no_std` stack that turns the byte-oriented, half-duplex AT command link
//! of a SIM800-class modem into "send JSON, get JSON", plus the registration
//! handshake that trades a device identity for the token used on every
//! telemetry submission.
//!
//! ## Layers
//!
//! - **[`modem::transport`]**: raw serial exchange with wait-for-token polling
//! - **[`modem::at`]**: one AT command at a time, replies decoded by
//!   [`modem::response`]
//! - **[`modem::bearer`]**: GPRS context bring-up and teardown
//! - **[`network::application::http`]**: HTTP/1.1 POST over the modem socket
//! - **[`session`]**: registration and submission state machine
//! - **[`node`]**: send-interval cadence on top of a session
//!
//! Sensor readings enter through [`telemetry`], progress leaves through
//! [`display`]. Everything blocks cooperatively on an injected
//! [`time::Clock`] and a serial channel implementing [`network::Read`] and
//! [`network::Write`], which keeps the whole stack testable without hardware.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldlink::config::Config;
//! use fieldlink::node::Node;
//! use fieldlink::session::Session;
//! use fieldlink::telemetry::TelemetrySample;
//! # use core::time::Duration;
//! # struct Uart;
//! # impl fieldlink::network::Read for Uart {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl fieldlink::network::Write for Uart {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Ticks(Duration);
//! # impl fieldlink::time::Clock for Ticks {
//! #     fn now(&mut self) -> Duration { self.0 += Duration::from_millis(1); self.0 }
//! #     fn delay(&mut self, d: Duration) { self.0 += d; }
//! # }
//! # let (uart, clock) = (Uart, Ticks(Duration::ZERO));
//!
//! let session = Session::new(uart, clock, Config::default(), ());
//! let mut node = Node::new(session);
//! let _ = node.start();
//!
//! loop {
//!     let sample = TelemetrySample::new(21.5, 48.0, 2900);
//!     let _ = node.tick(&sample);
//! #   break;
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: host adapters in [`host`] and `std::error::Error` for the error type
//! - `defmt`: log through `defmt`, with `Format` impls on the public enums
//! - `log`: log through the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Serial I/O traits, the error type and the application protocols.
pub mod network;

/// Time source for all timeouts and delays.
pub mod time;

/// SIM800 command layers, from raw bytes up to the packet bearer.
pub mod modem;

/// Build-time configuration.
pub mod config;

/// Status updates for the local display.
pub mod display;

/// Sensor readings and their normalization.
pub mod telemetry;

/// Device registration and telemetry submission.
pub mod session;

/// Main-loop cadence.
pub mod node;

/// Host-side clock and serial adapters.
#[cfg(feature = "std")]
pub mod host;
