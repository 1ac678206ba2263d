use core::convert::Infallible;
use ufmt_macros::uDebug;

/// Abstraction for the serial link to the motion controller.
pub trait ControllerLink {
    /// Writes bytes to the controller, blocking until they are queued.
    fn write(&mut self, bytes: &[u8]);

    /// Reads the next received byte, if one is available.
    fn read(&mut self) -> nb::Result<u8, Infallible>;

    /// Discards every byte currently buffered from the controller.
    ///
    /// # Returns
    ///
    /// The number of bytes discarded.
    fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Ok(_) = self.read() {
            count += 1;
        }
        count
    }
}

/// Decision taken by the caller while [readln] waits for a byte.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wait {
    /// Keep waiting.
    Continue,
    /// Stop waiting; `readln` returns [Error::TimedOut].
    GiveUp,
}

/// Read a line from the controller link.
///
/// Bytes are accumulated into `buffer` up to and including the terminating
/// `\n`. Whenever no byte is available `wait` is called, so the caller can
/// service other work (and decide to give up) while this blocks.
///
/// If the line does not fit in `buffer`, the rest of it is still consumed so
/// the link stays in step, and [Error::BufferOverflow] is returned once the
/// newline arrives. `buffer` then holds the start of the line.
pub fn readln<L, F, const N: usize>(
    link: &mut L,
    buffer: &mut heapless::Vec<u8, N>,
    mut wait: F,
) -> Result<(), Error>
where
    L: ControllerLink + ?Sized,
    F: FnMut() -> Wait,
{
    buffer.clear();
    let mut overflowed = false;
    loop {
        let c = match link.read() {
            Ok(c) => c,
            Err(nb::Error::WouldBlock) => match wait() {
                Wait::Continue => continue,
                Wait::GiveUp => return Err(Error::TimedOut),
            },
            Err(nb::Error::Other(never)) => match never {},
        };
        if buffer.push(c).is_err() {
            overflowed = true;
        }
        if c == b'\n' {
            break;
        }
    }

    if overflowed {
        Err(Error::BufferOverflow)
    } else {
        Ok(())
    }
}

/// Errors that might occur when reading.
#[derive(Debug, uDebug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The line did not fit in the buffer.
    BufferOverflow,
    /// The caller stopped waiting before a full line arrived.
    TimedOut,
}

#[cfg(test)]
pub use test::TestLink;

#[cfg(test)]
pub mod test {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    type WriteHook = Box<dyn FnMut(usize) + Send>;

    struct LinkState {
        writes: Vec<Vec<u8>>,
        rx: VecDeque<u8>,
        /// Response queued for every write that ends in a newline.
        response: Option<Vec<u8>>,
        /// Number of `WouldBlock`s before a queued response is released.
        response_delay: usize,
        /// Responses not yet released, with their remaining delay.
        pending: VecDeque<(usize, Vec<u8>)>,
        on_write: Option<WriteHook>,
    }

    /// Controller link to use for testing purposes.
    ///
    /// Records every write, and plays the controller: each write ending in a
    /// newline queues a response, optionally after a number of empty reads.
    /// Clones share the same state.
    #[derive(Clone)]
    pub struct TestLink {
        state: Arc<Mutex<LinkState>>,
    }
    impl TestLink {
        /// A link to a controller that answers `ok` to every line at once.
        pub fn new() -> Self {
            Self::with_response(Some(b"ok\r\n"))
        }

        /// A link to a controller that never answers.
        pub fn silent() -> Self {
            Self::with_response(None)
        }

        fn with_response(response: Option<&[u8]>) -> Self {
            Self {
                state: Arc::new(Mutex::new(LinkState {
                    writes: Vec::new(),
                    rx: VecDeque::new(),
                    response: response.map(|r| r.to_vec()),
                    response_delay: 0,
                    pending: VecDeque::new(),
                    on_write: None,
                })),
            }
        }

        /// Changes the response sent to every line.
        pub fn respond_with(self, response: &[u8]) -> Self {
            self.state.lock().unwrap().response = Some(response.to_vec());
            self
        }

        /// Holds back each response for `reads` empty reads.
        pub fn respond_after(self, reads: usize) -> Self {
            self.state.lock().unwrap().response_delay = reads;
            self
        }

        /// Calls `hook` with the running write count after every write.
        pub fn on_write(self, hook: impl FnMut(usize) + Send + 'static) -> Self {
            self.state.lock().unwrap().on_write = Some(Box::new(hook));
            self
        }

        /// Places bytes in the receive buffer, as if sent earlier.
        pub fn preload(&self, bytes: &[u8]) {
            self.state.lock().unwrap().rx.extend(bytes.iter().copied());
        }

        /// Returns every write so far.
        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.state.lock().unwrap().writes.clone()
        }

        /// Returns the number of bytes waiting to be read.
        pub fn buffered(&self) -> usize {
            self.state.lock().unwrap().rx.len()
        }
    }
    impl ControllerLink for TestLink {
        fn write(&mut self, bytes: &[u8]) {
            let mut state = self.state.lock().unwrap();
            state.writes.push(bytes.to_vec());
            if bytes.last() == Some(&b'\n') {
                if let Some(response) = state.response.clone() {
                    let delay = state.response_delay;
                    state.pending.push_back((delay, response));
                }
            }
            let count = state.writes.len();
            if let Some(hook) = state.on_write.as_mut() {
                hook(count);
            }
        }

        fn read(&mut self) -> nb::Result<u8, Infallible> {
            let mut state = self.state.lock().unwrap();
            if let Some(c) = state.rx.pop_front() {
                return Ok(c);
            }
            match state.pending.front_mut() {
                None => return Err(nb::Error::WouldBlock),
                Some((delay, _)) if *delay > 0 => {
                    *delay -= 1;
                    return Err(nb::Error::WouldBlock);
                }
                Some(_) => {}
            }
            if let Some((_, response)) = state.pending.pop_front() {
                state.rx.extend(response);
            }
            state.rx.pop_front().ok_or(nb::Error::WouldBlock)
        }
    }

    #[test]
    fn test_readln_includes_newline() {
        let mut link = TestLink::new();
        link.preload(b"ok\r\nrest");
        let mut buffer: heapless::Vec<u8, 16> = heapless::Vec::new();
        assert_eq!(Ok(()), readln(&mut link, &mut buffer, || Wait::Continue));
        assert_eq!(b"ok\r\n", buffer.as_slice());
        assert_eq!(4, link.buffered());
    }

    #[test]
    fn test_readln_waits() {
        let mut link = TestLink::new().respond_after(3);
        link.write(b"G0\n");
        let mut waits = 0;
        let mut buffer: heapless::Vec<u8, 16> = heapless::Vec::new();
        let result = readln(&mut link, &mut buffer, || {
            waits += 1;
            Wait::Continue
        });
        assert_eq!(Ok(()), result);
        assert_eq!(3, waits);
        assert_eq!(b"ok\r\n", buffer.as_slice());
    }

    #[test]
    fn test_readln_gives_up() {
        let mut link = TestLink::silent();
        let mut waits = 0;
        let mut buffer: heapless::Vec<u8, 16> = heapless::Vec::new();
        let result = readln(&mut link, &mut buffer, || {
            waits += 1;
            if waits < 10 {
                Wait::Continue
            } else {
                Wait::GiveUp
            }
        });
        assert_eq!(Err(Error::TimedOut), result);
        assert_eq!(10, waits);
    }

    #[test]
    fn test_readln_overflow_consumes_line() {
        let mut link = TestLink::new();
        link.preload(b"a long response\nok\n");
        let mut buffer: heapless::Vec<u8, 4> = heapless::Vec::new();
        assert_eq!(
            Err(Error::BufferOverflow),
            readln(&mut link, &mut buffer, || Wait::Continue)
        );
        assert_eq!(b"a lo", buffer.as_slice());
        assert_eq!(Ok(()), readln(&mut link, &mut buffer, || Wait::Continue));
        assert_eq!(b"ok\n", buffer.as_slice());
    }

    #[test]
    fn test_drain() {
        let mut link = TestLink::new();
        link.preload(b"stale\r\nok\r\n");
        assert_eq!(11, link.drain());
        assert_eq!(0, link.buffered());
        assert_eq!(0, link.drain());
    }
}
