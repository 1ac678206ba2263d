use rand::RngCore;
use ufmt::uWrite;
use ufmt_macros::uDebug;

use crate::time::{self, Clock};
use crate::{
    Board, Catalog, Config, ControllerLink, InputMonitor, Outcome, Scheduler,
    Storage, StreamingEngine, Switch,
};

/// Phase of the [ControlLoop].
#[derive(Debug, uDebug, Clone, Copy, PartialEq)]
pub enum State {
    /// Waiting for storage, building the catalog, running the init program.
    Initializing,
    /// Waiting for the operator.
    Idle,
    /// A pattern is being sent.
    Streaming,
}

/// Top-level orchestration of the feeder.
///
/// After startup, a debounced press sends the next pattern (single step) and
/// holding the input sends one pattern after another (continuous run). Both
/// take patterns from the scheduler, so the cursor advances whatever the
/// outcome.
///
/// A press that aborts a pattern does not count as holding the input: after
/// an abort, continuous run only resumes once the input has been released
/// and pressed again.
///
/// # Type Parameters
///
/// - `S`, `L`, `C`, `W`: the [Board].
/// - `I`: operator switch.
/// - `R`: random number generator for the scheduler.
/// - `N`: maximum number of patterns.
pub struct ControlLoop<S, L, C, W, I, R, const N: usize> {
    board: Board<S, L, C, W>,
    monitor: InputMonitor<I>,
    catalog: Catalog<N>,
    scheduler: Scheduler<R, N>,
    engine: StreamingEngine,
    config: Config,
    state: State,
    /// Set by an abort; cleared once the input reads released.
    await_release: bool,
}
impl<S, L, C, W, I, R, const N: usize> ControlLoop<S, L, C, W, I, R, N>
where
    S: Storage,
    L: ControllerLink,
    C: Clock,
    W: uWrite,
    I: Switch,
    R: RngCore,
{
    /// Creates a new `ControlLoop`, in [State::Initializing].
    pub fn new(
        board: Board<S, L, C, W>,
        monitor: InputMonitor<I>,
        scheduler: Scheduler<R, N>,
        config: Config,
    ) -> Self {
        Self {
            board,
            monitor,
            catalog: Catalog::new(),
            scheduler,
            engine: StreamingEngine::new(config),
            config,
            state: State::Initializing,
            await_release: false,
        }
    }

    /// Initializes then serves the operator forever.
    pub fn run(&mut self) -> ! {
        self.initialize();
        loop {
            self.step();
        }
    }

    /// Brings the feeder up.
    ///
    /// Blocks until storage is ready, then builds the catalog and the
    /// visitation order, and sends the initialization program once if there
    /// is one. Nothing here is fatal; problems are logged and the loop ends
    /// up [State::Idle] regardless.
    pub fn initialize(&mut self) {
        self.state = State::Initializing;
        self.wait_for_storage();

        self.catalog = Catalog::new();
        match self.catalog.discover(
            &mut self.board.storage,
            self.config.init_prefix,
            &mut self.board.log,
        ) {
            Ok(count) => info!(&mut self.board.log, "{} patterns", count),
            Err(err) => {
                error!(&mut self.board.log, "Cannot list programs: {:?}", err)
            }
        }

        if let Err(err) = self.scheduler.shuffle(self.catalog.len()) {
            error!(&mut self.board.log, "Cannot shuffle patterns: {:?}", err);
        }

        if let Some(name) = self.catalog.initialization_entry() {
            let outcome =
                self.engine.stream(name, &mut self.board, &mut self.monitor);
            self.await_release = outcome == Outcome::Aborted;
        }

        self.state = State::Idle;
    }

    /// Runs one iteration of the idle loop.
    ///
    /// The trigger is consumed on every call, so a press seen while nothing
    /// was running cannot stop the next pattern as soon as it starts. A held
    /// input is ignored after an abort until it has been released.
    ///
    /// # Returns
    ///
    /// - `Some(outcome)`: a pattern was started, and this is how it ended.
    /// - `None`: nothing was started.
    pub fn step(&mut self) -> Option<Outcome> {
        self.monitor.poll(self.board.clock.now());
        let triggered = self.monitor.consume_trigger();
        if self.await_release && !self.monitor.is_pressed() {
            self.await_release = false;
        }
        let held = self.monitor.is_pressed() && !self.await_release;
        if !triggered && !held {
            return None;
        }

        self.state = State::Streaming;
        let outcome = self.stream_next();
        self.await_release = outcome == Some(Outcome::Aborted);
        self.state = State::Idle;
        outcome
    }

    /// Sends the pattern at the scheduler's cursor.
    fn stream_next(&mut self) -> Option<Outcome> {
        let Some(index) = self.scheduler.next() else {
            warn!(&mut self.board.log, "No patterns");
            return None;
        };
        let Some(name) = self.catalog.get(index) else {
            error!(&mut self.board.log, "No pattern at index {}", index);
            return None;
        };
        info!(
            &mut self.board.log,
            "Pattern {} of {}: {}",
            index + 1,
            self.catalog.len(),
            name
        );
        Some(self.engine.stream(name, &mut self.board, &mut self.monitor))
    }

    /// Blocks until the storage reports ready, retrying with a fixed back-off.
    fn wait_for_storage(&mut self) {
        let Self {
            board,
            monitor,
            config,
            ..
        } = self;
        while !board.storage.is_ready() {
            error!(
                &mut board.log,
                "Storage unavailable; retrying in {}", config.storage_retry
            );
            time::wait(&mut board.clock, config.storage_retry, |now| {
                monitor.poll(now)
            });
        }
    }

    /// Returns the current phase.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the catalog built by [ControlLoop::initialize].
    pub fn catalog(&self) -> &Catalog<N> {
        &self.catalog
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &Scheduler<R, N> {
        &self.scheduler
    }

    /// Returns the input monitor.
    pub fn monitor(&self) -> &InputMonitor<I> {
        &self.monitor
    }

    /// Returns the board.
    pub fn board(&self) -> &Board<S, L, C, W> {
        &self.board
    }
}
