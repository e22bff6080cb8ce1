//! Virtual-clock timer queue
//!
//! Timers are plain values scheduled against a clock that only moves when the
//! owner advances it. The host event loop drives the clock from real time;
//! tests drive it by hand, which makes every debounce and delay deterministic.

use crate::cancel::CancellationToken;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub type TimerId = u64;

/// Handle to a scheduled timer, used to cancel it.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: TimerId,
    due: Duration,
    token: CancellationToken,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Virtual time at which the timer fires.
    pub fn due(&self) -> Duration {
        self.due
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct ScheduledTimer<E> {
    id: TimerId,
    due: Duration,
    event: E,
    token: CancellationToken,
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq)]
pub struct Expired<E> {
    pub id: TimerId,
    pub due: Duration,
    pub event: E,
}

/// Cancellable timers ordered by due time, FIFO among equal deadlines.
///
/// # Example
///
/// ```
/// use pdf_highlighter_scheduler::TimerQueue;
/// use std::time::Duration;
///
/// let mut timers = TimerQueue::new();
/// let show = timers.schedule(Duration::from_millis(200), "show");
/// timers.schedule(Duration::from_millis(150), "hide");
///
/// timers.cancel(&show);
/// assert_eq!(timers.drain_due(Duration::from_millis(500)), vec!["hide"]);
/// ```
#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_id: TimerId,
    timers: Vec<ScheduledTimer<E>>,
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;

        let due = self.now + delay;
        let token = CancellationToken::new();
        self.timers.push(ScheduledTimer {
            id,
            due,
            event,
            token: token.clone(),
        });
        log::trace!("timer {id} scheduled for {due:?}");

        TimerHandle { id, due, token }
    }

    /// Cancel a timer. Returns `true` if it was still pending.
    pub fn cancel(&mut self, handle: &TimerHandle) -> bool {
        handle.token.cancel();

        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != handle.id);
        let removed = self.timers.len() != before;
        if removed {
            log::trace!("timer {} cancelled", handle.id);
        }
        removed
    }

    /// Cancel every pending timer. Returns how many were pending.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        for timer in self.timers.drain(..) {
            timer.token.cancel();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its
    /// deadline.
    ///
    /// Callers loop on this so that timers scheduled while handling one event
    /// are still fired in deadline order within the same advance.
    pub fn pop_due(&mut self, until: Duration) -> Option<Expired<E>> {
        loop {
            let index = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.due <= until)
                .min_by_key(|(_, timer)| (timer.due, timer.id))
                .map(|(index, _)| index)?;

            let timer = self.timers.remove(index);
            if timer.token.is_cancelled() {
                continue;
            }

            self.now = self.now.max(timer.due);
            return Some(Expired {
                id: timer.id,
                due: timer.due,
                event: timer.event,
            });
        }
    }

    /// Move the clock forward to `until` once all due timers were handled.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Fire everything due up to `until` and return the events in order.
    pub fn drain_due(&mut self, until: Duration) -> Vec<E> {
        let mut fired = Vec::new();
        while let Some(expired) = self.pop_due(until) {
            fired.push(expired.event);
        }
        self.settle(until);
        fired
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// At most one live timer per key.
///
/// Scheduling a key that already has a pending timer cancels the old one, which
/// is exactly the debounce/supersede behaviour interaction timers need.
#[derive(Debug)]
pub struct KeyedTimers<K> {
    queue: TimerQueue<K>,
    live: HashMap<K, TimerHandle>,
}

impl<K> KeyedTimers<K>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            queue: TimerQueue::new(),
            live: HashMap::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.queue.now()
    }

    /// Schedule `key`, superseding any pending timer for the same key.
    pub fn schedule(&mut self, key: K, delay: Duration) -> TimerHandle {
        if let Some(previous) = self.live.remove(&key) {
            self.queue.cancel(&previous);
            log::trace!("{key:?} timer superseded");
        }

        let handle = self.queue.schedule(delay, key);
        self.live.insert(key, handle.clone());
        handle
    }

    /// Cancel the pending timer for `key`. Returns `true` if there was one.
    pub fn cancel(&mut self, key: K) -> bool {
        match self.live.remove(&key) {
            Some(handle) => self.queue.cancel(&handle),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        self.live.clear();
        self.queue.cancel_all()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.live.contains_key(&key)
    }

    pub fn deadline(&self, key: K) -> Option<Duration> {
        self.live.get(&key).map(TimerHandle::due)
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    pub fn pop_due(&mut self, until: Duration) -> Option<K> {
        let expired = self.queue.pop_due(until)?;
        self.live.remove(&expired.event);
        Some(expired.event)
    }

    pub fn settle(&mut self, until: Duration) {
        self.queue.settle(until);
    }
}

impl<K> Default for KeyedTimers<K>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Real-time source for driving a queue from a host event loop.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(300), 'c');
        timers.schedule(ms(100), 'a');
        timers.schedule(ms(200), 'b');

        assert_eq!(timers.drain_due(ms(250)), vec!['a', 'b']);
        assert_eq!(timers.now(), ms(250));
        assert_eq!(timers.drain_due(ms(300)), vec!['c']);
        assert!(timers.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_fifo() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(0), 1);
        timers.schedule(ms(0), 2);
        timers.schedule(ms(0), 3);

        assert_eq!(timers.drain_due(ms(0)), vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule(ms(50), "x");

        assert!(timers.cancel(&handle));
        assert!(handle.is_cancelled());
        assert!(!timers.cancel(&handle));
        assert!(timers.drain_due(ms(1000)).is_empty());
    }

    #[test]
    fn delays_are_relative_to_virtual_now() {
        let mut timers = TimerQueue::new();
        timers.settle(ms(500));

        let handle = timers.schedule(ms(100), ());
        assert_eq!(handle.due(), ms(600));
        assert!(timers.drain_due(ms(599)).is_empty());
        assert_eq!(timers.drain_due(ms(600)).len(), 1);
    }

    #[test]
    fn pop_due_moves_clock_to_each_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(100), "first");

        let expired = timers.pop_due(ms(1000)).expect("timer should be due");
        assert_eq!(expired.event, "first");
        assert_eq!(timers.now(), ms(100));

        timers.schedule(ms(100), "chained");
        let chained = timers.pop_due(ms(1000)).expect("chained timer should be due");
        assert_eq!(chained.due, ms(200));
    }

    #[test]
    fn cancel_all_reports_pending_count() {
        let mut timers = TimerQueue::new();
        let a = timers.schedule(ms(10), 'a');
        timers.schedule(ms(20), 'b');

        assert_eq!(timers.cancel_all(), 2);
        assert!(a.is_cancelled());
        assert_eq!(timers.next_deadline(), None);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Show,
        Hide,
    }

    #[test]
    fn keyed_timers_supersede_same_key() {
        let mut timers = KeyedTimers::new();
        timers.schedule(Kind::Show, ms(200));
        timers.settle(ms(100));
        timers.schedule(Kind::Show, ms(200));
        timers.schedule(Kind::Hide, ms(150));

        assert_eq!(timers.pending(), 2);
        assert_eq!(timers.deadline(Kind::Show), Some(ms(300)));
        assert_eq!(timers.pop_due(ms(1000)), Some(Kind::Hide));
        assert_eq!(timers.pop_due(ms(1000)), Some(Kind::Show));
        assert_eq!(timers.pop_due(ms(1000)), None);
        assert!(!timers.is_pending(Kind::Show));
    }

    #[test]
    fn keyed_cancel_clears_pending_state() {
        let mut timers = KeyedTimers::new();
        timers.schedule(Kind::Hide, ms(150));

        assert!(timers.cancel(Kind::Hide));
        assert!(!timers.cancel(Kind::Hide));
        assert_eq!(timers.pop_due(ms(1000)), None);
    }

    proptest! {
        #[test]
        fn drained_events_are_sorted_by_deadline(delays in proptest::collection::vec(0u64..1000, 0..50)) {
            let mut timers = TimerQueue::new();
            for delay in &delays {
                timers.schedule(ms(*delay), *delay);
            }

            let fired = timers.drain_due(ms(1000));
            prop_assert_eq!(fired.len(), delays.len());
            prop_assert!(fired.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }
}
