//! Byte-level I/O abstractions and the HTTP layer that runs over the modem.
//!
//! The modem is reached through a plain serial channel. Anything that can move
//! bytes in and out implements [`Read`] and [`Write`]; the rest of the crate is
//! written against these two traits only, so a UART driver, a host-side TTY or
//! a scripted test double are interchangeable.
//!
//! Reads are expected to be non-blocking: returning `Ok(0)` means "nothing has
//! arrived yet", not end of stream. Waiting is the job of the poll loop in
//! [`crate::modem::transport`], which owns the clock.

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application layer protocols carried over the modem's socket.
pub mod application;

/// Re-exports of the I/O traits
pub mod prelude {
    pub use super::{Read, Write};
}

/// Byte source side of a serial channel.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read whatever is available into `buf`, returning `Ok(0)` when idle.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte sink side of a serial channel.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the channel
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write the whole of `buf`, retrying short writes.
    ///
    /// A write that makes no progress is reported as
    /// [`error::Error::WriteError`] rather than spinning forever.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), error::Error> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(error::Error::WriteError),
                Ok(n) => buf = &buf[n..],
                Err(_) => return Err(error::Error::WriteError),
            }
        }
        Ok(())
    }
}
