//! Deterministic timer queue.
//!
//! Timers run on a virtual clock that only moves when the site is told
//! time has passed. Due timers fire in deadline order; ties fire in the
//! order they were set.
use std::time::Duration;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deferred work owned by the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    AdvanceCarousel,
    EndThemeTransition,
    RestoreButtonLabel { button: NodeId, label: String },
    FinishNavigation { url: String },
    ResetImagePan { image: NodeId },
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    task: TimerTask,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the page loaded.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        self.push(delay, None, task)
    }

    pub fn set_interval(&mut self, period: Duration, task: TimerTask) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.push(period, Some(period), task)
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            period,
            task,
        });
        id
    }

    /// Cancel a pending timer; returns whether it was pending.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Take the earliest timer due at or before `until`, moving the clock
    /// to its deadline. Intervals are re-armed for their next period.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerTask> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(index, _)| index)?;

        let due = self.timers[index].due;
        self.now = self.now.max(due);
        match self.timers[index].period {
            Some(period) => {
                let timer = &mut self.timers[index];
                timer.due += period;
                Some(timer.task.clone())
            }
            None => Some(self.timers.remove(index).task),
        }
    }

    /// Move the clock to `until` once every due timer has been taken.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
