//! HTTP/1.1 over the modem's TCP socket.
//!
//! A deliberately small client: one request per socket, `Connection: close`,
//! and the response is whatever arrives before the peer hangs up. The request
//! is composed in a fixed-size buffer so its exact length can be announced to
//! `AT+CIPSEND` before a single payload byte is written.
//!
//! ```rust,no_run
//! use fieldlink::network::application::http::{Client, Request};
//! # use fieldlink::config::{Endpoint, Timing};
//! # use fieldlink::modem::at::AtEngine;
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
//! let mut modem = AtEngine::new(Uart, Ticks(Duration::ZERO), Timing::sim800());
//! let endpoint = Endpoint { host: "192.168.0.152", port: 8008 };
//! let mut client = Client::new(&mut modem, endpoint);
//!
//! let request = Request::post_json("/api/submit/", br#"{"device_id":"ESP32-001"}"#);
//! if let Ok(exchange) = client.request(&request) {
//!     let _ok = exchange.is_success();
//! }
//! ```

/// Request encoder, response reader and the socket client.
pub mod client;

pub use client::{Client, Exchange, Header, Method, Request, Response};
