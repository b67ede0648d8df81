//! Latest-frame-wins mailbox for live feeds.
//!
//! A producer (camera loop) publishes frames; one consumer (detection worker)
//! takes them. The slot holds at most one pending frame: publishing while a
//! frame is pending replaces it and counts the replaced frame as dropped, so
//! at most one detection is ever queued per stream.
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct Slot<T> {
    pending: Option<T>,
    closed: bool,
    published: u64,
    dropped: u64,
}

#[derive(Debug)]
pub struct LatestFrame<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Counters of a [`LatestFrame`] slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounters {
    pub published: u64,
    pub dropped: u64,
}

impl<T> Default for LatestFrame<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestFrame<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                pending: None,
                closed: false,
                published: 0,
                dropped: 0,
            }),
            ready: Condvar::new(),
        }
    }

    // Slot updates are single assignments; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `frame`, replacing any pending one. Returns `false` once closed.
    pub fn publish(&self, frame: T) -> bool {
        let mut slot = self.lock();
        if slot.closed {
            return false;
        }
        if slot.pending.replace(frame).is_some() {
            slot.dropped += 1;
        }
        slot.published += 1;
        drop(slot);
        self.ready.notify_one();
        true
    }

    /// Take the pending frame without blocking.
    pub fn try_take(&self) -> Option<T> {
        self.lock().pending.take()
    }

    /// Wait up to `timeout` for a frame. Returns `None` on timeout, or once
    /// the slot is closed and drained.
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let slot = self.lock();
        let (mut slot, _) = self
            .ready
            .wait_timeout_while(slot, timeout, |s| s.pending.is_none() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        slot.pending.take()
    }

    /// Block until a frame is available. Returns `None` once the slot is
    /// closed and drained.
    pub fn take(&self) -> Option<T> {
        let slot = self.lock();
        let mut slot = self
            .ready
            .wait_while(slot, |s| s.pending.is_none() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        slot.pending.take()
    }

    /// Reject further frames and wake a waiting consumer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn counters(&self) -> FrameCounters {
        let slot = self.lock();
        FrameCounters {
            published: slot.published,
            dropped: slot.dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn newer_frame_replaces_pending_one() {
        let slot = LatestFrame::new();
        assert!(slot.publish(1));
        assert!(slot.publish(2));
        assert!(slot.publish(3));
        assert_eq!(slot.try_take(), Some(3));
        assert_eq!(slot.try_take(), None);
        assert_eq!(
            slot.counters(),
            FrameCounters {
                published: 3,
                dropped: 2
            }
        );
    }

    #[test]
    fn close_wakes_waiting_consumer() {
        let slot = Arc::new(LatestFrame::<u32>::new());
        let consumer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.take())
        };
        slot.close();
        assert_eq!(consumer.join().expect("consumer thread"), None);
        assert!(!slot.publish(7));
    }

    #[test]
    fn timed_take_returns_published_frame() {
        let slot = Arc::new(LatestFrame::new());
        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.publish("frame"))
        };
        assert!(producer.join().expect("producer thread"));
        assert_eq!(slot.take_timeout(Duration::from_millis(50)), Some("frame"));
        assert_eq!(slot.take_timeout(Duration::from_millis(5)), None);
    }
}
