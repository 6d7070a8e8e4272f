use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Order in which queued work is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Oldest task first (breadth-first exploration).
    Fifo,
    /// Newest task first (depth-first exploration).
    Lifo,
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    in_flight: usize,
}

/// Mutex-guarded multi-producer multi-consumer work queue handing out batches.
///
/// Every non-empty batch taken with [`pop_batch`](Self::pop_batch) counts as
/// in flight until the taker calls [`complete`](Self::complete), which also
/// enqueues whatever follow-up work the batch produced. Both happen under the
/// same lock, so [`is_idle`](Self::is_idle) never reports an empty queue while
/// a worker is still holding work that could refill it.
#[derive(Debug)]
pub struct WorkQueue<T> {
    inner: Arc<Mutex<State<T>>>,
    discipline: Discipline,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            discipline: self.discipline,
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new(discipline: Discipline) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                items: VecDeque::new(),
                in_flight: 0,
            })),
            discipline,
        }
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn push_all<I: IntoIterator<Item = T>>(&self, items: I) {
        let mut state = self.inner.lock();
        state.items.extend(items);
    }

    /// Take up to `max` items. Returns `None` when nothing is queued.
    pub fn pop_batch(&self, max: usize) -> Option<Vec<T>> {
        let mut state = self.inner.lock();
        if state.items.is_empty() || max == 0 {
            return None;
        }

        let take = max.min(state.items.len());
        let batch: Vec<T> = match self.discipline {
            Discipline::Fifo => state.items.drain(..take).collect(),
            Discipline::Lifo => {
                let start = state.items.len() - take;
                state.items.drain(start..).rev().collect()
            }
        };
        state.in_flight += 1;
        Some(batch)
    }

    /// Finish a batch obtained from `pop_batch`, queueing its follow-up work.
    pub fn complete<I: IntoIterator<Item = T>>(&self, follow_up: I) {
        let mut state = self.inner.lock();
        state.items.extend(follow_up);
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// No queued items and no batch in flight.
    pub fn is_idle(&self) -> bool {
        let state = self.inner.lock();
        state.items.is_empty() && state.in_flight == 0
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }
}
