//! The pending chunk request queue monitor.

use cb_schemas::coordinates::AbsChunkPos;

use crate::prelude::*;

/// The request queue shared between producers and the generator worker.
///
/// Coordinates are unique while queued and dequeue in insertion order. The monitor carries two
/// conditions: `item_added` wakes the worker blocked on an empty queue, `item_removed` wakes
/// callers waiting for the queue to drain.
pub(crate) struct GenQueue {
    state: Mutex<QueueState>,
    item_added: Condvar,
    item_removed: Condvar,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<AbsChunkPos>,
    members: HashSet<AbsChunkPos>,
    stopping: bool,
}

impl GenQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            item_added: Condvar::new(),
            item_removed: Condvar::new(),
        }
    }

    /// Appends a request unless the coordinate is already pending. Requests submitted after
    /// shutdown are ignored. Never blocks on work.
    pub fn enqueue(&self, pos: AbsChunkPos) {
        let mut state = self.state.lock().unwrap();
        if state.stopping || !state.members.insert(pos) {
            return;
        }
        state.pending.push_back(pos);
        self.item_added.notify_one();
    }

    /// Removes and returns the oldest request, blocking while the queue is empty.
    /// Returns `None` once shutdown is signaled and no request is available.
    pub fn dequeue_blocking(&self) -> Option<AbsChunkPos> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(pos) = state.pending.pop_front() {
                state.members.remove(&pos);
                return Some(pos);
            }
            if state.stopping {
                return None;
            }
            state = self.item_added.wait(state).unwrap();
        }
    }

    /// The number of pending requests. May be stale by the time the caller acts on it.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    /// Blocks until the queue is empty. Returns immediately once shutdown is signaled.
    pub fn wait_until_empty(&self) {
        let mut state = self.state.lock().unwrap();
        while !state.pending.is_empty() && !state.stopping {
            state = self.item_removed.wait(state).unwrap();
        }
    }

    /// Called by the worker after fully processing a dequeued request.
    pub fn mark_removed(&self) {
        // The lock orders the notification against waiters re-checking emptiness.
        let _state = self.state.lock().unwrap();
        self.item_removed.notify_all();
    }

    /// Signals shutdown: discards pending requests and releases every blocked caller.
    pub fn signal_stop(&self) {
        let mut state = self.state.lock().unwrap();
        state.stopping = true;
        state.pending.clear();
        state.members.clear();
        self.item_added.notify_all();
        self.item_removed.notify_all();
    }
}
