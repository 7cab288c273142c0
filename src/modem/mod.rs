//! # SIM800 modem access
//!
//! Layered bottom-up:
//!
//! * [`transport`]: bytes in, bytes out, wait for a token with a timeout.
//! * [`at`] and [`command`]: one AT command per call, reply returned verbatim.
//! * [`response`]: tokenizers for the information lines in those replies.
//! * [`bearer`]: the packet-data context the TCP socket runs over.
//!
//! Each layer holds the one below by value or by `&mut`, so the single serial
//! link is never shared.

#![deny(unsafe_code)]

pub mod at;
pub mod bearer;
pub mod command;
pub mod response;
pub mod transport;
