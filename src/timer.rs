//! One-shot timers for the single-threaded game loop.
//!
//! Scheduling returns a [`TimerGuard`] to the caller. The queue only keeps a
//! weak reference to it, so once the guard is dropped (the owning session
//! went away, or the phase moved on) the timer can never fire.

use std::rc::{Rc, Weak};

use crate::clock::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    CountdownTick,
    TargetDue,
}

/// Owning handle of a scheduled timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerGuard {
    _token: Rc<()>,
    kind: TimerKind,
    deadline: Millis,
}

impl TimerGuard {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn deadline_ms(&self) -> Millis {
        self.deadline
    }

    pub fn cancel(self) {}
}

#[derive(Debug)]
struct Pending {
    deadline: Millis,
    seq: u64,
    kind: TimerKind,
    token: Weak<()>,
}

impl Pending {
    fn is_live(&self) -> bool {
        self.token.strong_count() > 0
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Millis, after_ms: Millis, kind: TimerKind) -> TimerGuard {
        let token = Rc::new(());
        let deadline = now.saturating_add(after_ms);
        self.pending.push(Pending {
            deadline,
            seq: self.next_seq,
            kind,
            token: Rc::downgrade(&token),
        });
        self.next_seq += 1;
        TimerGuard {
            _token: token,
            kind,
            deadline,
        }
    }

    /// Earliest deadline among timers whose guards are still alive
    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending
            .iter()
            .filter(|p| p.is_live())
            .map(|p| p.deadline)
            .min()
    }

    /// Remove and return every live timer due at `now`, in deadline order.
    /// Cancelled timers are discarded along the way.
    pub fn fire_due(&mut self, now: Millis) -> Vec<TimerKind> {
        self.pending.retain(Pending::is_live);

        let mut due: Vec<Pending> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].deadline <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.deadline, p.seq));
        due.into_iter().map(|p| p.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.iter().filter(|p| p.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
