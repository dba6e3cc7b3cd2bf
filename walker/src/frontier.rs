//! Shared work queue of the solver pool, with a termination broadcast.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// FIFO queue shared by a fixed number of workers. It closes either when
/// someone calls [`Frontier::close`] or when every worker is waiting on an
/// empty queue, since then no more work can ever show up.
pub struct Frontier<T> {
    inner: Mutex<FrontierState<T>>,
    available: Condvar,
    // mirrors `FrontierState::closed` so workers can poll without locking
    closed: AtomicBool,
    workers: usize,
}

struct FrontierState<T> {
    queue: VecDeque<T>,
    idle: usize,
    closed: bool,
    exhausted: bool,
}

impl<T> Frontier<T> {
    /// Create an empty frontier for `workers` consumers
    pub fn new(workers: usize) -> Self {
        Self {
            inner: Mutex::new(FrontierState {
                queue: VecDeque::new(),
                idle: 0,
                closed: false,
                exhausted: false,
            }),
            available: Condvar::new(),
            closed: AtomicBool::new(false),
            workers,
        }
    }

    /// Create a frontier that already holds some tasks
    pub fn with_tasks(workers: usize, tasks: impl IntoIterator<Item = T>) -> Self {
        let frontier = Self::new(workers);
        frontier.lock().queue.extend(tasks);
        frontier
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a task; returns the task back if the frontier is closed.
    pub fn push(&self, task: T) -> Result<(), T> {
        let mut guard = self.lock();
        if guard.closed {
            return Err(task);
        }
        guard.queue.push_back(task);
        self.available.notify_one();
        Ok(())
    }

    /// Block until a task is available. Returns `None` once the frontier is
    /// closed, or when this call was the last worker going idle.
    pub fn pop(&self) -> Option<T> {
        let mut guard = self.lock();
        loop {
            if guard.closed {
                return None;
            }
            if let Some(task) = guard.queue.pop_front() {
                return Some(task);
            }

            guard.idle += 1;
            if guard.idle >= self.workers {
                guard.exhausted = true;
                Self::shut(&mut guard, &self.closed);
                self.available.notify_all();
                return None;
            }

            // Wait releases the lock and re-acquires it before returning.
            guard = self
                .available
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
            guard.idle -= 1;
        }
    }

    fn shut(state: &mut FrontierState<T>, flag: &AtomicBool) {
        state.closed = true;
        flag.store(true, Ordering::Release);
    }

    /// Close the frontier and wake every blocked worker
    pub fn close(&self) {
        let mut guard = self.lock();
        Self::shut(&mut guard, &self.closed);
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Whether the frontier shut down because all workers ran out of work
    pub fn is_exhausted(&self) -> bool {
        self.lock().exhausted
    }

    /// Remove everything still queued
    pub fn drain(&self) -> Vec<T> {
        self.lock().queue.drain(..).collect()
    }
}
