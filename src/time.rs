use ufmt::{uDisplay, uWrite, Formatter};
use ufmt_macros::uDebug;

/// Underlying type representing a number of milliseconds.
type MilliSecondsRepr = u32;

/// Time in milliseconds.
///
/// Used both for instants (as read from a [Clock]) and for durations. Instants
/// wrap around after roughly 49 days, so differences between instants must be
/// taken with [MilliSeconds::elapsed_since], which is wrap-aware.
#[derive(Debug, uDebug, PartialEq, PartialOrd, Eq, Ord, Copy, Clone)]
pub struct MilliSeconds(MilliSecondsRepr);
impl MilliSeconds {
    /// Creates a new `MilliSeconds`.
    pub const fn new(value: MilliSecondsRepr) -> Self {
        Self(value)
    }

    /// Zero milliseconds.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the value as a `u32`.
    pub fn get_value(&self) -> MilliSecondsRepr {
        self.0
    }

    /// Returns the time elapsed from `earlier` to `self`.
    ///
    /// Both values are treated as instants of a wrapping counter, so the
    /// result is correct across a single wrap of the counter.
    pub fn elapsed_since(&self, earlier: MilliSeconds) -> MilliSeconds {
        MilliSeconds(self.0.wrapping_sub(earlier.0))
    }

    /// Adds a duration, saturating instead of overflowing.
    pub fn saturating_add(&self, rhs: MilliSeconds) -> MilliSeconds {
        MilliSeconds(self.0.saturating_add(rhs.0))
    }
}

impl uDisplay for MilliSeconds {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        self.0.fmt(f)?;
        f.write_str("ms")
    }
}

/// Abstraction for a free-running millisecond clock.
///
/// Nothing here relies on interrupts: implementations are free to derive the
/// time by polling a hardware counter, which is why `now` takes `&mut self`.
pub trait Clock {
    /// Returns the current instant.
    fn now(&mut self) -> MilliSeconds;
}

/// Spin until `duration` has elapsed on `clock`, calling `tick` on every
/// iteration.
///
/// `tick` receives the current instant. This is how blocking delays keep the
/// input monitor serviced.
pub fn wait<C, F>(clock: &mut C, duration: MilliSeconds, mut tick: F)
where
    C: Clock,
    F: FnMut(MilliSeconds),
{
    let start = clock.now();
    loop {
        let now = clock.now();
        tick(now);
        if now.elapsed_since(start) >= duration {
            break;
        }
    }
}

#[cfg(test)]
pub use test::TestClock;
