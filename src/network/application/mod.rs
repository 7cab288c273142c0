//! # Application Layer Protocols
//!
//! Protocols carried over the modem's single TCP socket. Only HTTP is needed
//! to reach the collector; each client borrows the
//! [`AtEngine`](crate::modem::at::AtEngine) for the length of one exchange.

/// HTTP client implementation.
///
/// Provides a minimal HTTP/1.1 client that posts JSON through `AT+CIPSEND`
/// and reads the reply until the peer closes.
pub mod http;
