use crate::MilliSeconds;

/// Abstraction for the operator's digital input.
///
/// A switch just has a state; either pressed or released. Any electrical
/// inversion (eg. a pulled-up pin that reads low when pressed) is the job of
/// the implementation.
pub trait Switch {
    fn read_switch_state(&self) -> SwitchState;
}

/// State of the operator switch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SwitchState {
    /// The input is being driven; continuous run, or a momentary press.
    Pressed,
    /// The input is idle (pulled high on the board).
    Released,
}

/// Debounced view of a [Switch].
///
/// `poll` must be called frequently: on every control-loop iteration and on
/// every iteration of any blocking wait. It never blocks itself.
///
/// The debounce is two-way. A change of raw state is accepted only once it has
/// been continuously present for at least the threshold; a single sample that
/// agrees with the latched state throws away the accumulated time. Pulses
/// shorter than the threshold in either direction are rejected.
pub struct InputMonitor<S> {
    switch: S,
    threshold: MilliSeconds,
    /// Raw state at the previous sample.
    raw: SwitchState,
    /// Debounced state.
    latched: SwitchState,
    /// How long the raw state has continuously differed from `latched`.
    pending: MilliSeconds,
    last_sample: Option<MilliSeconds>,
    trigger: bool,
}
impl<S: Switch> InputMonitor<S> {
    /// Default debounce threshold.
    pub const DEFAULT_THRESHOLD: MilliSeconds = MilliSeconds::new(200);

    /// Creates a new `InputMonitor`.
    ///
    /// The monitor starts out latched as [SwitchState::Released], so a switch
    /// that is already held at power-up is reported as a press once it has
    /// been stable for the threshold.
    ///
    /// # Parameters
    ///
    /// - `switch`: The raw input.
    /// - `threshold`: How long a change must be stable before it is accepted.
    pub fn new(switch: S, threshold: MilliSeconds) -> Self {
        Self {
            switch,
            threshold,
            raw: SwitchState::Released,
            latched: SwitchState::Released,
            pending: MilliSeconds::zero(),
            last_sample: None,
            trigger: false,
        }
    }

    /// Samples the switch and updates the debounced state.
    ///
    /// # Parameters
    ///
    /// - `now`: Current instant, used to measure the time since the previous
    ///   sample.
    pub fn poll(&mut self, now: MilliSeconds) {
        let sample = self.switch.read_switch_state();
        let elapsed = match self.last_sample {
            None => MilliSeconds::zero(),
            Some(last) => now.elapsed_since(last),
        };
        self.last_sample = Some(now);

        if sample == self.latched {
            self.pending = MilliSeconds::zero();
        } else {
            // Only time during which the new state was already present counts.
            if self.raw == sample {
                self.pending = self.pending.saturating_add(elapsed);
            }
            if self.pending >= self.threshold {
                self.commit(sample);
            }
        }
        self.raw = sample;
    }

    /// Returns `true` once per debounced press, then `false` until the next
    /// one.
    pub fn consume_trigger(&mut self) -> bool {
        let trigger = self.trigger;
        self.trigger = false;
        trigger
    }

    /// Returns `true` while the debounced state is pressed (continuous run).
    pub fn is_pressed(&self) -> bool {
        self.latched == SwitchState::Pressed
    }

    /// Returns the debounce threshold.
    pub fn threshold(&self) -> MilliSeconds {
        self.threshold
    }

    fn commit(&mut self, state: SwitchState) {
        let previous = self.latched;
        self.latched = state;
        self.pending = MilliSeconds::zero();
        if previous == SwitchState::Released && state == SwitchState::Pressed {
            self.trigger = true;
        }
    }
}

#[cfg(test)]
pub use test::TestSwitch;
