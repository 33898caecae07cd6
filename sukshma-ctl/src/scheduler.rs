//! Cooperative timed tasks for the main tick loop.
//!
//! Stream loops and delayed UI hides run on the tick thread instead of their
//! own threads. A task is an event value scheduled for a point in time on an
//! injected [`Clock`], either once or periodically. Each tick the owner asks
//! for the events that are [`due`](Scheduler::due) and handles them.
//!
//! Cancelling a [`TaskHandle`] only sets a flag; the task is dropped the next
//! time it would have fired, and never fires after the flag is set.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Smallest period accepted for repeating tasks
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Time source, as an offset from an arbitrary epoch
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Manually advanced clock for tests; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.micros.fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.micros.store(to.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Cancelled, or a one-shot that has already fired
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

struct Task<E> {
    due: Duration,
    period: Option<Duration>,
    event: E,
    cancelled: Arc<AtomicBool>,
    seq: u64,
}

pub struct Scheduler<E> {
    tasks: Vec<Task<E>>,
    next_seq: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Duration, period: Option<Duration>, event: E) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.tasks.push(Task {
            due,
            period,
            event,
            cancelled: Arc::clone(&cancelled),
            seq: self.next_seq,
        });
        self.next_seq += 1;
        TaskHandle { cancelled }
    }

    /// Fire `event` once, `delay` after `now`
    pub fn after(&mut self, now: Duration, delay: Duration, event: E) -> TaskHandle {
        self.push(now + delay, None, event)
    }

    /// Fire `event` at `now` and then every `period`
    pub fn every(&mut self, now: Duration, period: Duration, event: E) -> TaskHandle {
        self.push(now, Some(period.max(MIN_PERIOD)), event)
    }

    /// Events due at `now`, in firing order.
    ///
    /// A repeating task fires at most once per call; missed periods are skipped.
    pub fn due(&mut self, now: Duration) -> Vec<E> {
        let mut ready = Vec::new();
        self.tasks.retain_mut(|task| {
            if task.due > now {
                return true;
            }
            if task.cancelled.load(Ordering::Relaxed) {
                return false;
            }
            ready.push((task.due, task.seq, task.event.clone()));
            match task.period {
                Some(period) => {
                    while task.due <= now {
                        task.due += period;
                    }
                    true
                }
                None => {
                    task.cancelled.store(true, Ordering::Relaxed);
                    false
                }
            }
        });
        ready.sort_by_key(|(due, seq, _)| (*due, *seq));
        ready.into_iter().map(|(_, _, event)| event).collect()
    }

    /// Tasks still scheduled and not cancelled
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::Relaxed))
            .count()
    }

    /// Cancel and drop everything
    pub fn clear(&mut self) {
        for task in self.tasks.drain(..) {
            task.cancelled.store(true, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_one_shot() {
        let mut s = Scheduler::new();
        s.after(ms(0), ms(100), "hide");
        assert!(s.due(ms(99)).is_empty());
        assert_eq!(s.due(ms(100)), vec!["hide"]);
        assert!(s.due(ms(500)).is_empty());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_periodic_fires_immediately() {
        let mut s = Scheduler::new();
        s.every(ms(1000), ms(100), 1);
        assert_eq!(s.due(ms(1000)), vec![1]);
        assert!(s.due(ms(1050)).is_empty());
        assert_eq!(s.due(ms(1100)), vec![1]);
        assert_eq!(s.due(ms(1200)), vec![1]);
    }

    #[test]
    fn test_periodic_skips_missed_periods() {
        let mut s = Scheduler::new();
        s.every(ms(0), ms(100), 'x');
        assert_eq!(s.due(ms(0)).len(), 1);
        assert_eq!(s.due(ms(450)).len(), 1);
        assert!(s.due(ms(499)).is_empty());
        assert_eq!(s.due(ms(500)).len(), 1);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut s = Scheduler::new();
        let h = s.every(ms(0), ms(100), "stream");
        assert_eq!(s.due(ms(0)), vec!["stream"]);
        h.cancel();
        assert!(h.is_cancelled());
        assert_eq!(s.pending(), 0);
        assert!(s.due(ms(100)).is_empty());
        assert!(s.due(ms(1000)).is_empty());
    }

    #[test]
    fn test_fired_one_shot_handle_is_spent() {
        let mut s = Scheduler::new();
        let h = s.after(ms(0), ms(10), "hide");
        assert!(!h.is_cancelled());
        assert_eq!(s.due(ms(10)), vec!["hide"]);
        assert!(h.is_cancelled());
    }

    #[test]
    fn test_order_by_due_then_insertion() {
        let mut s = Scheduler::new();
        s.after(ms(0), ms(20), "b");
        s.after(ms(0), ms(10), "a");
        s.after(ms(0), ms(20), "c");
        assert_eq!(s.due(ms(30)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear_cancels_handles() {
        let mut s = Scheduler::new();
        let h = s.after(ms(0), ms(10), ());
        s.clear();
        assert!(h.is_cancelled());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(ms(250));
        assert_eq!(view.now(), ms(250));
        view.set(ms(10));
        assert_eq!(clock.now(), ms(10));
    }
}
