use rand::seq::SliceRandom;
use rand::RngCore;
use ufmt_macros::uDebug;

/// What the scheduler does when the cursor wraps.
#[derive(Debug, uDebug, Clone, Copy, PartialEq)]
pub enum ReshufflePolicy {
    /// Replay the same permutation every cycle.
    FixedCycle,
    /// Draw a fresh permutation at the start of every cycle.
    ReshuffleEachCycle,
}

/// Random, non-repeating visitation order over the catalog.
///
/// `order` maps a sequence position to a catalog index. Every index in
/// `0..len` appears exactly once, so one full cycle of [Scheduler::next]
/// visits every program once.
///
/// # Type Parameters
///
/// - `R`: random number generator, seeded once at startup.
/// - `N`: maximum number of programs.
pub struct Scheduler<R, const N: usize> {
    rng: R,
    policy: ReshufflePolicy,
    order: heapless::Vec<usize, N>,
    cursor: usize,
}
impl<R: RngCore, const N: usize> Scheduler<R, N> {
    /// Creates a new scheduler with an empty order.
    pub fn new(rng: R, policy: ReshufflePolicy) -> Self {
        Self {
            rng,
            policy,
            order: heapless::Vec::new(),
            cursor: 0,
        }
    }

    /// Builds a fresh permutation of `0..size` and rewinds the cursor.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the new order is a verified permutation.
    /// - `Err(Error::TooLarge)`: `size` exceeds the capacity `N`; the order is
    ///   left empty.
    /// - `Err(Error::NotPermutation)`: verification failed; the order is left
    ///   empty.
    pub fn shuffle(&mut self, size: usize) -> Result<(), Error> {
        self.order.clear();
        self.cursor = 0;
        if size > N {
            return Err(Error::TooLarge);
        }
        for index in 0..size {
            // Cannot fail: size <= N.
            let _ = self.order.push(index);
        }
        self.order.shuffle(&mut self.rng);

        if !is_permutation::<N>(&self.order) {
            self.order.clear();
            return Err(Error::NotPermutation);
        }
        Ok(())
    }

    /// Returns the catalog index at the cursor, then advances the cursor.
    ///
    /// # Returns
    ///
    /// - `Some(index)`: the next program to run.
    /// - `None`: there are no programs.
    pub fn next(&mut self) -> Option<usize> {
        let index = *self.order.get(self.cursor)?;
        self.cursor += 1;
        if self.cursor >= self.order.len() {
            self.cursor = 0;
            if self.policy == ReshufflePolicy::ReshuffleEachCycle {
                self.order.shuffle(&mut self.rng);
            }
        }
        Some(index)
    }

    /// Returns the number of programs in the order.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if there is nothing to schedule.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the cursor position within the current cycle.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the current visitation order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Returns the reshuffle policy.
    pub fn policy(&self) -> ReshufflePolicy {
        self.policy
    }
}

/// Checks that `order` contains each of `0..order.len()` exactly once.
fn is_permutation<const N: usize>(order: &[usize]) -> bool {
    let mut seen = [false; N];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if index < order.len() && !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Possible errors when shuffling.
#[derive(Debug, uDebug, Clone, Copy, PartialEq)]
pub enum Error {
    /// More programs than the scheduler can hold.
    TooLarge,
    /// The shuffle did not produce a permutation.
    NotPermutation,
}
