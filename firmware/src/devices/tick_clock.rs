use arduino_hal::pac::TC1;
use patternfeed::MilliSeconds;

/// Millisecond clock on the free-running 16-bit Timer/Counter 1.
///
/// No interrupt is used: elapsed ticks are folded in whenever the clock is
/// read. At 16MHz with the /1024 prescaler the counter wraps every ~4.2s, so
/// `now` must be called more often than that. Every wait in the feeder polls
/// it continuously.
pub struct TickClock {
    timer: TC1,
    /// Counter value at the previous reading.
    last_count: u16,
    /// Microseconds not yet folded into `millis`.
    micros: u32,
    millis: u32,
}
impl TickClock {
    /// Duration of one timer tick (16MHz / 1024).
    const MICROS_PER_TICK: u32 = 64;

    /// Starts the timer and creates a new `TickClock`, reading zero.
    pub fn new(timer: TC1) -> Self {
        // Normal mode, counting up from 0 to 0xFFFF.
        timer.tccr1a.reset();
        timer.tccr1b.write(|w| w.cs1().prescale_1024());
        let last_count = timer.tcnt1.read().bits();
        Self {
            timer,
            last_count,
            micros: 0,
            millis: 0,
        }
    }
}

impl patternfeed::Clock for TickClock {
    fn now(&mut self) -> MilliSeconds {
        let count = self.timer.tcnt1.read().bits();
        let ticks = u32::from(count.wrapping_sub(self.last_count));
        self.last_count = count;

        self.micros += ticks * Self::MICROS_PER_TICK;
        self.millis = self.millis.wrapping_add(self.micros / 1000);
        self.micros %= 1000;
        MilliSeconds::new(self.millis)
    }
}
