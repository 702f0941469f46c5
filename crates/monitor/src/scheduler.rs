//! Keyed one-shot timers delivered back into the monitor loop.
//!
//! Each key holds at most one pending timer. Scheduling a key again aborts the
//! previous timer, and a sequence number rejects any firing that raced the
//! abort, so the last schedule always wins.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Next foreground poll.
    Poll,
    /// Deferred detection pass.
    Detection,
    /// Debounced reconcile.
    Reconcile,
    /// End of the masked transition.
    Transition,
}

/// Message sent when a timer elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub key: TimerKey,
    seq: u64,
}

struct Pending {
    seq: u64,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    tx: mpsc::UnboundedSender<TimerFired>,
    pending: HashMap<TimerKey, Pending>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            pending: HashMap::new(),
            next_seq: 0,
        };
        (scheduler, rx)
    }

    /// Fire `key` after `delay`, replacing any pending timer for it.
    pub fn schedule(&mut self, key: TimerKey, delay: Duration) {
        self.cancel(key);
        self.next_seq += 1;
        let seq = self.next_seq;
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the loop has exited.
            let _ = tx.send(TimerFired { key, seq });
        });
        self.pending.insert(key, Pending { seq, handle });
    }

    pub fn cancel(&mut self, key: TimerKey) {
        if let Some(pending) = self.pending.remove(&key) {
            pending.handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.handle.abort();
        }
    }

    pub fn is_scheduled(&self, key: TimerKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// Claim a fired timer. Returns false for firings superseded by a later
    /// schedule or a cancel.
    pub fn accept(&mut self, fired: TimerFired) -> bool {
        match self.pending.get(&fired.key) {
            Some(pending) if pending.seq == fired.seq => {
                self.pending.remove(&fired.key);
                true
            }
            _ => false,
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (mut scheduler, mut rx) = Scheduler::new();
        scheduler.schedule(TimerKey::Reconcile, Duration::from_millis(300));

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        let fired = rx.try_recv().unwrap();
        assert_eq!(fired.key, TimerKey::Reconcile);
        assert!(scheduler.accept(fired));
        assert!(!scheduler.is_scheduled(TimerKey::Reconcile));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_is_last_write_wins() {
        let (mut scheduler, mut rx) = Scheduler::new();
        scheduler.schedule(TimerKey::Reconcile, Duration::from_millis(300));
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.schedule(TimerKey::Reconcile, Duration::from_millis(300));

        // The first timer would have fired at 300ms.
        tokio::time::sleep(Duration::from_millis(260)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(50)).await;
        let fired = rx.try_recv().unwrap();
        assert!(scheduler.accept(fired));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_firing_is_rejected() {
        let (mut scheduler, mut rx) = Scheduler::new();
        scheduler.schedule(TimerKey::Detection, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(20)).await;
        let stale = rx.try_recv().unwrap();

        // Rescheduled before the loop got to the first firing.
        scheduler.schedule(TimerKey::Detection, Duration::from_millis(10));
        assert!(!scheduler.accept(stale));
        assert!(scheduler.is_scheduled(TimerKey::Detection));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let (mut scheduler, mut rx) = Scheduler::new();
        scheduler.schedule(TimerKey::Poll, Duration::from_millis(10));
        scheduler.schedule(TimerKey::Transition, Duration::from_millis(10));
        scheduler.cancel_all();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert!(!scheduler.is_scheduled(TimerKey::Poll));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let (mut scheduler, mut rx) = Scheduler::new();
        scheduler.schedule(TimerKey::Poll, Duration::from_millis(10));
        scheduler.schedule(TimerKey::Reconcile, Duration::from_millis(20));
        scheduler.cancel(TimerKey::Poll);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let fired = rx.try_recv().unwrap();
        assert_eq!(fired.key, TimerKey::Reconcile);
        assert!(rx.try_recv().is_err());
    }
}
