//! Debug output.
//!
//! Status lines go to any [ufmt::uWrite] sink, each prefixed with its level.
//! Write errors are ignored: the sink is write-only telemetry and nothing may
//! depend on it being present.

use core::convert::Infallible;
use ufmt::uWrite;

/// Write an info message to a debug sink, expanding its arguments.
#[macro_export]
macro_rules! info {
    ($log:expr, $($arg:tt)*) => {{
        let _ = ufmt::uwrite!(&mut *$log, "INFO: ");
        let _ = ufmt::uwriteln!(&mut *$log, $($arg)*);
    }};
}

/// Write a warning message to a debug sink, expanding its arguments.
#[macro_export]
macro_rules! warn {
    ($log:expr, $($arg:tt)*) => {{
        let _ = ufmt::uwrite!(&mut *$log, "WARN: ");
        let _ = ufmt::uwriteln!(&mut *$log, $($arg)*);
    }};
}

/// Write an error message to a debug sink, expanding its arguments.
#[macro_export]
macro_rules! error {
    ($log:expr, $($arg:tt)*) => {{
        let _ = ufmt::uwrite!(&mut *$log, "ERROR: ");
        let _ = ufmt::uwriteln!(&mut *$log, $($arg)*);
    }};
}

/// Sink that discards everything written to it.
pub struct NullLog;

impl uWrite for NullLog {
    type Error = Infallible;

    fn write_str(&mut self, _s: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
pub use test::TestLog;
