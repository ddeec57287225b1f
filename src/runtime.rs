use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ReflexEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait ReflexEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<ReflexEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => Some(ReflexEvent::Key(key)),
                Ok(CtEvent::Mouse(mouse)) => Some(ReflexEvent::Mouse(mouse)),
                Ok(CtEvent::Resize(w, h)) => Some(ReflexEvent::Resize(w, h)),
                Ok(_) => None,
                Err(_) => break,
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflexEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<ReflexEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<ReflexEvent>) -> Self {
        Self { rx }
    }
}

impl ReflexEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ReflexEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: ReflexEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: ReflexEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> ReflexEvent {
        self.step_within(None)
    }

    /// Like [`Runner::step`], but wakes no later than `deadline` so a pending
    /// game timer fires on time
    pub fn step_within(&self, deadline: Option<Duration>) -> ReflexEvent {
        let wait = match deadline {
            Some(d) => d.min(self.ticker.interval()),
            None => self.ticker.interval(),
        };
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                ReflexEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Instant;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            ReflexEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(ReflexEvent::Resize(80, 24)).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            ReflexEvent::Resize(80, 24) => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn deadline_shortens_the_wait() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_secs(5)));

        let started = Instant::now();
        let ev = runner.step_within(Some(Duration::from_millis(5)));
        assert!(matches!(ev, ReflexEvent::Tick));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
