use ufmt::uWrite;
use ufmt_macros::uDebug;

use crate::link::{self, ControllerLink, Wait};
use crate::storage::{self, Session, Storage};
use crate::time::{self, Clock};
use crate::{Board, Config, InputMonitor, Response, Switch};

/// Size of the buffer holding one program line.
///
/// Longer lines are still sent intact, in several writes.
pub const LINE_CAPACITY: usize = 96;

/// Size of the buffer holding one controller response.
pub const RESPONSE_CAPACITY: usize = 64;

/// How a call to [StreamingEngine::stream] ended.
#[derive(Debug, uDebug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Every line was sent and acknowledged.
    Completed,
    /// The operator asked to stop.
    Aborted,
    /// The program could not be opened; nothing was sent.
    OpenFailed,
    /// The controller did not acknowledge a line in time.
    LinkTimeout,
    /// The program stopped reading part way; the line being read was not
    /// sent.
    ReadFailed,
}

/// Streams programs to the motion controller, one acknowledged line at a
/// time.
pub struct StreamingEngine {
    config: Config,
    line: heapless::Vec<u8, LINE_CAPACITY>,
    response: heapless::Vec<u8, RESPONSE_CAPACITY>,
    lines_sent: u32,
}
impl StreamingEngine {
    /// Creates a new `StreamingEngine`.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            line: heapless::Vec::new(),
            response: heapless::Vec::new(),
            lines_sent: 0,
        }
    }

    /// Sends the program `name` to the controller.
    ///
    /// The handshake never has more than one line outstanding: line N+1 is
    /// only sent once a response line for line N has arrived. The input
    /// monitor is polled before every line and on every iteration of every
    /// wait; a debounced press seen at the top of a line stops the program.
    ///
    /// Steps:
    ///
    /// 1. Wake the controller, let it settle, then drain anything it sent so
    ///    no stale acknowledgment is mistaken for a fresh one.
    /// 2. Open the program. If that fails, return [Outcome::OpenFailed].
    /// 3. Until the program is exhausted, an abort is seen, a read fails, or
    ///    the link times out: send a line, then wait for its acknowledgment.
    /// 4. Close the program, whatever the outcome.
    pub fn stream<S, L, C, W, I>(
        &mut self,
        name: &str,
        board: &mut Board<S, L, C, W>,
        monitor: &mut InputMonitor<I>,
    ) -> Outcome
    where
        S: Storage,
        L: ControllerLink,
        C: Clock,
        W: uWrite,
        I: Switch,
    {
        let Board {
            storage,
            link,
            clock,
            log,
        } = board;
        self.lines_sent = 0;

        self.wake(link, clock, monitor, log);

        let mut session = match Session::open(storage, name) {
            Ok(session) => session,
            Err(err) => {
                error!(log, "Cannot open {}: {:?}", name, err);
                return Outcome::OpenFailed;
            }
        };
        info!(log, "Streaming {}", name);

        let outcome = loop {
            if !session.has_more() {
                break Outcome::Completed;
            }
            monitor.poll(clock.now());
            if monitor.consume_trigger() {
                break Outcome::Aborted;
            }

            match self.send_line(&mut session, link) {
                Ok(0) => break Outcome::Completed,
                Ok(_) => self.lines_sent += 1,
                Err(err) => {
                    error!(
                        log,
                        "{} line {}: cannot read: {:?}",
                        name,
                        self.lines_sent + 1,
                        err
                    );
                    break Outcome::ReadFailed;
                }
            }

            match self.await_response(link, clock, monitor) {
                Ok(Response::Ok) | Ok(Response::Other) => {}
                Ok(response) => warn!(
                    log,
                    "{} line {}: controller said {:?}",
                    name,
                    self.lines_sent,
                    response
                ),
                Err(link::Error::BufferOverflow) => warn!(
                    log,
                    "{} line {}: response too long", name, self.lines_sent
                ),
                Err(link::Error::TimedOut) => break Outcome::LinkTimeout,
            }
        };
        drop(session);

        match outcome {
            Outcome::Completed => info!(
                log,
                "Completed {} ({} lines)", name, self.lines_sent
            ),
            Outcome::Aborted => info!(
                log,
                "Aborted {} after {} lines", name, self.lines_sent
            ),
            _ => error!(
                log,
                "{} stopped after {} lines: {:?}",
                name,
                self.lines_sent,
                outcome
            ),
        }
        outcome
    }

    /// Returns the number of lines sent by the most recent `stream`.
    pub fn lines_sent(&self) -> u32 {
        self.lines_sent
    }

    /// Wakes the controller and discards whatever it had already sent.
    fn wake<L, C, W, I>(
        &mut self,
        link: &mut L,
        clock: &mut C,
        monitor: &mut InputMonitor<I>,
        log: &mut W,
    ) where
        L: ControllerLink,
        C: Clock,
        W: uWrite,
        I: Switch,
    {
        if !self.config.wake_sequence.is_empty() {
            link.write(self.config.wake_sequence);
        }
        time::wait(clock, self.config.wake_settle, |now| monitor.poll(now));
        let stale = link.drain();
        if stale > 0 {
            info!(log, "Drained {} stale bytes", stale);
        }
    }

    /// Reads the next line of the program and writes it to the link.
    ///
    /// A line ends after its `\n`, or at the end of the data. A final line
    /// with no terminator is sent with one appended, so the controller still
    /// answers it.
    ///
    /// A read error drops the line read so far. Only the chunks of an
    /// over-long line that were already flushed can have left.
    ///
    /// # Returns
    ///
    /// The number of bytes read from the program.
    fn send_line<S, L>(
        &mut self,
        session: &mut Session<S>,
        link: &mut L,
    ) -> Result<usize, storage::Error>
    where
        S: Storage,
        L: ControllerLink,
    {
        self.line.clear();
        let mut count = 0;
        let mut terminated = false;
        while let Some(c) = session.read_byte()? {
            count += 1;
            if let Err(c) = self.line.push(c) {
                link.write(&self.line);
                self.line.clear();
                let _ = self.line.push(c);
            }
            if c == b'\n' {
                terminated = true;
                break;
            }
        }

        if count > 0 && !terminated && self.line.push(b'\n').is_err() {
            link.write(&self.line);
            self.line.clear();
            let _ = self.line.push(b'\n');
        }
        if !self.line.is_empty() {
            link.write(&self.line);
        }
        Ok(count)
    }

    /// Blocks until the controller sends a response line, polling the input
    /// monitor while waiting.
    fn await_response<L, C, I>(
        &mut self,
        link: &mut L,
        clock: &mut C,
        monitor: &mut InputMonitor<I>,
    ) -> Result<Response, link::Error>
    where
        L: ControllerLink,
        C: Clock,
        I: Switch,
    {
        let timeout = self.config.ack_timeout;
        let start = clock.now();
        link::readln(link, &mut self.response, || {
            let now = clock.now();
            monitor.poll(now);
            match timeout {
                Some(limit) if now.elapsed_since(start) >= limit => {
                    Wait::GiveUp
                }
                _ => Wait::Continue,
            }
        })?;
        Ok(Response::classify(&self.response))
    }
}
