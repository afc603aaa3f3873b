//! Virtual-time repeating timers
//!
//! Timers never read the wall clock. The owner calls [`Scheduler::pop_due`]
//! with the current time and gets every expiry back in time order, so tests
//! can jump a minute ahead in one call.

/// Which periodic job fired. Declaration order breaks ties at equal times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    Clock,
    Spawn,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    origin: f64,
    period: f64,
    fired: u64,
}

impl Timer {
    /// Computed from the fire count so long sessions don't accumulate drift
    fn next_due(&self) -> f64 {
        self.origin + (self.fired + 1) as f64 * self.period
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer whose first expiry is one period after
    /// `now`. Restarting an active kind resets it.
    pub fn schedule_repeating(&mut self, kind: TimerKind, now: f64, period: f64) {
        self.cancel(kind);
        self.timers.push(Timer {
            kind,
            origin: now,
            period,
            fired: 0,
        });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers.retain(|t| t.kind != kind);
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Earliest pending expiry
    pub fn next_due(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(Timer::next_due)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Take the earliest expiry at or before `now` and re-arm its timer.
    /// Returns the kind and the scheduled fire time.
    pub fn pop_due(&mut self, now: f64) -> Option<(TimerKind, f64)> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due() <= now)
            .min_by(|a, b| {
                a.next_due()
                    .total_cmp(&b.next_due())
                    .then(a.kind.cmp(&b.kind))
            })?;
        let due = timer.next_due();
        timer.fired += 1;
        Some((timer.kind, due))
    }
}
