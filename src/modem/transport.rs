//! Line transport: raw byte exchange with the modem.
//!
//! [`LineTransport`] owns the serial channel and the clock. It writes exactly
//! the bytes it is given and reads back into a fresh [`ModemResponse`] until a
//! token shows up or the window closes. There is no queue: a caller holds
//! `&mut LineTransport` for the whole exchange, so only one request can be in
//! flight.

use crate::network::error::Error;
use crate::network::{Read, Write};
use crate::time::{Clock, Deadline};
use core::time::Duration;
use heapless::Vec;

/// Bytes kept per response. Anything beyond is counted and dropped.
pub const RESPONSE_CAPACITY: usize = 2048;

const READ_CHUNK: usize = 64;
const TAIL_LEN: usize = 16;

/// Raw text accumulated during one read window.
///
/// The transport does not interpret it. Whether the awaited token was seen is
/// recorded in [`matched`](Self::matched); the text itself is returned either
/// way so callers can salvage partial data.
#[derive(Debug, Clone, Default)]
pub struct ModemResponse {
    bytes: Vec<u8, RESPONSE_CAPACITY>,
    tail: [u8; TAIL_LEN],
    tail_len: usize,
    dropped: usize,
    matched: Option<usize>,
}

impl ModemResponse {
    /// An empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already captured text, truncating to [`RESPONSE_CAPACITY`].
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut response = Self::new();
        response.push(data);
        response
    }

    /// Captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Captured text.
    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored.
        core::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Whether `needle` occurs in the captured text, or at the very end of the
    /// stream when earlier bytes overflowed the buffer.
    pub fn contains(&self, needle: &str) -> bool {
        let needle = needle.as_bytes();
        find(&self.bytes, needle).is_some()
            || (self.dropped > 0 && find(&self.tail[..self.tail_len], needle).is_some())
    }

    /// Whether the awaited token arrived before the window closed.
    pub fn matched(&self) -> bool {
        self.matched.is_some()
    }

    /// Index of the token that ended the wait, in the order they were given.
    pub fn matched_index(&self) -> Option<usize> {
        self.matched
    }

    /// Number of bytes that arrived after the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Whether nothing arrived.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Forget the match unless it was the token at `index`.
    pub(crate) fn retain_match(&mut self, index: usize) {
        if self.matched != Some(index) {
            self.matched = None;
        }
    }

    fn push(&mut self, data: &[u8]) {
        for &byte in data {
            // Line noise. AT replies and the collector's JSON are ASCII.
            if byte == 0x00 || !byte.is_ascii() {
                continue;
            }
            if self.bytes.push(byte).is_err() {
                self.dropped += 1;
            }
            if self.tail_len < TAIL_LEN {
                self.tail[self.tail_len] = byte;
                self.tail_len += 1;
            } else {
                self.tail.copy_within(1.., 0);
                self.tail[TAIL_LEN - 1] = byte;
            }
        }
    }
}

/// Blocking, cooperative byte exchange with the modem.
#[derive(Debug)]
pub struct LineTransport<S, C> {
    serial: S,
    clock: C,
}

impl<S, C> LineTransport<S, C>
where
    S: Read + Write,
    C: Clock,
{
    /// Wrap a serial channel and the clock used for its timeouts.
    pub fn new(serial: S, clock: C) -> Self {
        Self { serial, clock }
    }

    /// Write `bytes` verbatim and flush.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.serial.write_all(bytes)?;
        self.serial.flush().map_err(|_| Error::WriteError)
    }

    /// Write one command line terminated by CR LF, flushed as a single unit.
    pub fn send_line(&mut self, line: &str) -> Result<(), Error> {
        self.serial.write_all(line.as_bytes())?;
        self.serial.write_all(b"\r\n")?;
        self.serial.flush().map_err(|_| Error::WriteError)
    }

    /// Accumulate input until `needle` appears or `timeout` elapses.
    pub fn poll_until(&mut self, needle: &str, timeout: Duration) -> Result<ModemResponse, Error> {
        self.poll_until_any(&[needle], timeout)
    }

    /// Accumulate input until any of `needles` appears or `timeout` elapses.
    ///
    /// The returned response records which needle ended the wait. On timeout
    /// it carries whatever arrived and [`ModemResponse::matched`] is false.
    pub fn poll_until_any(
        &mut self,
        needles: &[&str],
        timeout: Duration,
    ) -> Result<ModemResponse, Error> {
        let deadline = Deadline::after(&mut self.clock, timeout);
        let mut response = ModemResponse::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let n = self
                .serial
                .read(&mut chunk)
                .map_err(|_| Error::ReadError)?;
            if n > 0 {
                response.push(&chunk[..n]);
                if let Some(index) = needles
                    .iter()
                    .position(|needle| !needle.is_empty() && response.contains(needle))
                {
                    response.matched = Some(index);
                    break;
                }
            }
            if deadline.expired(&mut self.clock) {
                break;
            }
        }

        if response.dropped > 0 {
            warn!("response overflowed, {} bytes dropped", response.dropped);
        }
        Ok(response)
    }

    /// Accumulate everything that arrives during `timeout`.
    pub fn collect(&mut self, timeout: Duration) -> Result<ModemResponse, Error> {
        self.poll_until_any(&[], timeout)
    }

    /// Block for `duration` on the transport's clock.
    pub fn delay(&mut self, duration: Duration) {
        self.clock.delay(duration);
    }

    /// Current reading of the transport's clock.
    pub fn now(&mut self) -> Duration {
        self.clock.now()
    }

    /// Mutable access to the clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Mutable access to the serial channel.
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Give back the serial channel and clock.
    pub fn release(self) -> (S, C) {
        (self.serial, self.clock)
    }
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
