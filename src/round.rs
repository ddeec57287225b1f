//! Round state machine.
//!
//! ```text
//! Countdown(3) -> Countdown(2) -> Countdown(1) -> Waiting -> Active
//!                                                   ^          |
//!                                                   +-- hit ---+--> SessionComplete
//! ```
//!
//! The machine holds no clock and spawns nothing: the owner passes `now`
//! with every event and supplies the [`TimerQueue`] that timers are
//! scheduled on. Pending timers are held as [`TimerGuard`]s, so dropping
//! the machine cancels them.

use crate::aggregate::SessionAggregator;
use crate::clock::{elapsed_ms, Millis};
use crate::difficulty::DifficultyTier;
use crate::generator::{TargetGenerator, TargetGeometry, Viewport};
use crate::session::{SessionConfig, SessionResult, SessionState};
use crate::timer::{TimerGuard, TimerKind, TimerQueue};

pub const COUNTDOWN_START: u8 = 3;
pub const COUNTDOWN_TICK_MS: Millis = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Countdown(u8),
    Waiting,
    Active {
        target: TargetGeometry,
        started_at: Millis,
    },
    SessionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Hit { reaction_ms: u64 },
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Timer(TimerKind),
    /// Click at a point in logical units
    Click { x: f64, y: f64 },
}

/// What an event did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Nothing changed
    Ignored,
    /// Click tallied as a miss; phase and timers untouched
    Missed,
    Countdown(u8),
    RoundStarted(usize),
    TargetShown(TargetGeometry),
    Hit { round: usize, reaction_ms: u64 },
    Completed(SessionResult),
}

#[derive(Debug)]
pub struct RoundMachine {
    difficulty: DifficultyTier,
    viewport: Viewport,
    generator: TargetGenerator,
    phase: Phase,
    round_index: usize,
    aggregator: SessionAggregator,
    pending: Option<TimerGuard>,
    result: Option<SessionResult>,
}

impl RoundMachine {
    pub fn new(config: &SessionConfig, viewport: Viewport) -> Self {
        let generator = match config.seed {
            Some(seed) => TargetGenerator::seeded(seed),
            None => TargetGenerator::new(),
        };
        Self::with_generator(config, viewport, generator)
    }

    pub fn with_generator(
        config: &SessionConfig,
        viewport: Viewport,
        generator: TargetGenerator,
    ) -> Self {
        Self {
            difficulty: config.difficulty,
            viewport,
            generator,
            phase: Phase::Countdown(COUNTDOWN_START),
            round_index: 0,
            aggregator: SessionAggregator::new(config.total_rounds),
            pending: None,
            result: None,
        }
    }

    /// Arm the first countdown tick
    pub fn start(&mut self, now: Millis, timers: &mut TimerQueue) {
        if self.pending.is_none() && self.phase == Phase::Countdown(COUNTDOWN_START) {
            self.pending = Some(timers.schedule(now, COUNTDOWN_TICK_MS, TimerKind::CountdownTick));
        }
    }

    pub fn handle(&mut self, event: GameEvent, now: Millis, timers: &mut TimerQueue) -> Step {
        match (self.phase, event) {
            (Phase::Countdown(n), GameEvent::Timer(TimerKind::CountdownTick)) => {
                self.on_countdown_tick(n, now, timers)
            }
            (Phase::Waiting, GameEvent::Timer(TimerKind::TargetDue)) => self.activate(now),
            (Phase::Waiting, GameEvent::Click { .. }) => {
                self.aggregator.record(RoundOutcome::Miss);
                Step::Missed
            }
            (Phase::Active { target, started_at }, GameEvent::Click { x, y }) => {
                if target.contains(x, y) {
                    self.on_hit(elapsed_ms(started_at, now), now, timers)
                } else {
                    self.aggregator.record(RoundOutcome::Miss);
                    Step::Missed
                }
            }
            _ => Step::Ignored,
        }
    }

    fn on_countdown_tick(&mut self, n: u8, now: Millis, timers: &mut TimerQueue) -> Step {
        let remaining = n.saturating_sub(1);
        if remaining == 0 {
            self.begin_round(now, timers);
            Step::RoundStarted(self.round_index)
        } else {
            self.phase = Phase::Countdown(remaining);
            self.pending = Some(timers.schedule(now, COUNTDOWN_TICK_MS, TimerKind::CountdownTick));
            Step::Countdown(remaining)
        }
    }

    fn begin_round(&mut self, now: Millis, timers: &mut TimerQueue) {
        self.phase = Phase::Waiting;
        let delay = self.generator.next_delay().as_millis() as Millis;
        self.pending = Some(timers.schedule(now, delay, TimerKind::TargetDue));
    }

    fn activate(&mut self, now: Millis) -> Step {
        self.pending = None;
        let target = self
            .generator
            .next_position(self.difficulty, self.viewport);
        self.phase = Phase::Active {
            target,
            started_at: now,
        };
        Step::TargetShown(target)
    }

    fn on_hit(&mut self, reaction_ms: u64, now: Millis, timers: &mut TimerQueue) -> Step {
        self.aggregator.record(RoundOutcome::Hit { reaction_ms });
        let round = self.round_index;

        if self.aggregator.is_complete() {
            self.phase = Phase::SessionComplete;
            self.pending = None;
            return match self.aggregator.finalize(self.difficulty) {
                Some(result) => {
                    self.result = Some(result.clone());
                    Step::Completed(result)
                }
                None => Step::Ignored,
            };
        }

        self.round_index += 1;
        self.begin_round(now, timers);
        Step::Hit { round, reaction_ms }
    }

    /// Affects placements drawn from now on; a visible target keeps its spot
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> DifficultyTier {
        self.difficulty
    }

    pub fn round_index(&self) -> usize {
        self.round_index
    }

    /// 1-based round number for display
    pub fn display_round(&self) -> usize {
        self.round_index + 1
    }

    pub fn total_rounds(&self) -> usize {
        self.aggregator.total_rounds()
    }

    pub fn hits(&self) -> &[u64] {
        self.aggregator.hits()
    }

    pub fn total_clicks(&self) -> u32 {
        self.aggregator.total_clicks()
    }

    pub fn target(&self) -> Option<TargetGeometry> {
        match self.phase {
            Phase::Active { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::SessionComplete
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.generator.seed()
    }

    pub fn pending_deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(TimerGuard::deadline_ms)
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState {
            round_index: self.round_index,
            hits: self.aggregator.hits().to_vec(),
            total_clicks: self.aggregator.total_clicks(),
            phase: self.phase,
        }
    }
}
