use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds on a monotonic timeline
pub type Millis = u64;

/// Source of monotonic time for the game loop
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Production clock backed by `Instant`, counting from construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Manually advanced clock for tests and replays.
///
/// Clones share the same timeline, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: Millis) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Elapsed milliseconds between two readings, clamped at zero
pub fn elapsed_ms(start: Millis, end: Millis) -> u64 {
    end.saturating_sub(start)
}
