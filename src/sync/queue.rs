//! Inbound message queue shared by the receiver thread and the game task.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::message::SyncMessage;

/// Why the queue stopped producing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueState {
    Open,
    /// The peer hung up or a read failed.
    Disconnected,
    /// Shut down locally.
    Closed,
}

#[derive(Debug)]
struct Inner {
    messages: VecDeque<SyncMessage>,
    state: QueueState,
}

/// FIFO guarded by a mutex, with a condvar signalled on every push and on
/// shutdown.
#[derive(Debug)]
pub struct InboundQueue {
    inner: Mutex<Inner>,
    ready: Condvar,
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                messages: VecDeque::new(),
                state: QueueState::Open,
            }),
            ready: Condvar::new(),
        }
    }
}

impl InboundQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still holds a consistent queue: every critical section
    // is a single push, drain or flag write.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, message: SyncMessage) {
        self.lock().messages.push_back(message);
        self.ready.notify_all();
    }

    /// Take every queued message without blocking.
    pub fn drain(&self) -> Vec<SyncMessage> {
        self.lock().messages.drain(..).collect()
    }

    /// Pop the oldest message, waiting up to `timeout` for one to arrive.
    ///
    /// Returns early with `None` once the queue stops producing.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<SyncMessage> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();
        loop {
            if let Some(message) = inner.messages.pop_front() {
                return Some(message);
            }
            if inner.state != QueueState::Open {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            inner = match self.ready.wait_timeout(inner, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Mark the queue as finished and wake every waiter. The first reason
    /// recorded wins.
    pub fn finish(&self, state: QueueState) {
        let mut inner = self.lock();
        if inner.state == QueueState::Open {
            inner.state = state;
        }
        drop(inner);
        self.ready.notify_all();
    }

    #[must_use]
    pub fn state(&self) -> QueueState {
        self.lock().state
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
