use crate::MilliSeconds;

/// Tunable behaviour of the feeder.
///
/// Board-level settings (baud rates, pins) are not here; they belong to the
/// firmware. The reshuffle policy belongs to the [crate::Scheduler].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// How long the operator input must be stable before a change counts.
    pub debounce: MilliSeconds,
    /// Bytes sent to wake the controller before every program.
    ///
    /// An empty sequence skips the wake-up write.
    pub wake_sequence: &'static [u8],
    /// Delay after the wake sequence, before stale input is drained.
    pub wake_settle: MilliSeconds,
    /// Upper bound on the wait for each acknowledgment.
    ///
    /// `None` waits forever: a controller that stops answering then stalls the
    /// whole feeder.
    pub ack_timeout: Option<MilliSeconds>,
    /// Back-off between storage initialization attempts at startup.
    pub storage_retry: MilliSeconds,
    /// Name prefix that marks the initialization program.
    pub init_prefix: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce: MilliSeconds::new(200),
            wake_sequence: b"\r\n\r\n",
            wake_settle: MilliSeconds::new(2_000),
            ack_timeout: None,
            storage_retry: MilliSeconds::new(500),
            init_prefix: "home.",
        }
    }
}
