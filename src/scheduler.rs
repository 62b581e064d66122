use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer<E> {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    event: E,
}

/// Cooperative timer queue on a virtual clock.
///
/// The owner moves the clock forward with [`Scheduler::advance`] and then
/// drains events one at a time with [`Scheduler::pop_due`], so no two
/// callbacks ever overlap. Timers set while draining are measured from the
/// current clock, never from the moment they would have fired.
pub struct Scheduler<E> {
    now: Duration,
    timers: Vec<Timer<E>>,
    next_id: u64,
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            timers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward. Going backwards is ignored.
    pub fn advance(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    pub fn set_timeout(&mut self, delay: Duration, event: E) -> TimerId {
        self.insert(delay, None, event)
    }

    pub fn set_interval(&mut self, period: Duration, event: E) -> TimerId {
        self.insert(period, Some(period), event)
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            period,
            event,
        });
        id
    }

    /// Cancels a timer. Unknown or already fired ids are a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Removes and returns the earliest timer that is due at the current
    /// clock. Repeating timers are re-armed past `now`, so a stalled loop
    /// sees one tick instead of a backlog.
    pub fn pop_due(&mut self) -> Option<E> {
        let now = self.now;
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id.0))
            .map(|(idx, _)| idx)?;

        match self.timers[idx].period {
            Some(period) if !period.is_zero() => {
                let timer = &mut self.timers[idx];
                while timer.due <= now {
                    timer.due += period;
                }
                Some(timer.event.clone())
            }
            _ => Some(self.timers.remove(idx).event),
        }
    }
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
