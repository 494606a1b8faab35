//! Timer-based debouncing
//!
//! Scheduling goes through a [`TimerBackend`] so the same debounce logic runs
//! on `window.setTimeout` in the browser and on [`ManualTimers`] natively.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use chart_interact_shared::InteractionResult;

/// Handle returned by a timer backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub i32);

/// One-shot timeout scheduling
pub trait TimerBackend {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> InteractionResult<TimerId>;

    /// Cancel a pending timeout. Unknown or already fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

/// Collapses bursts of triggers into one action after a quiet period.
///
/// Every [`trigger`](Debouncer::trigger) cancels the pending timeout and
/// schedules a new one; only the last trigger of a burst runs the action.
pub struct Debouncer {
    timers: Rc<dyn TimerBackend>,
    delay_ms: u32,
    action: Rc<dyn Fn()>,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl Debouncer {
    pub fn new(timers: Rc<dyn TimerBackend>, delay_ms: u32, action: impl Fn() + 'static) -> Self {
        Self {
            timers,
            delay_ms,
            action: Rc::new(action),
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn trigger(&self) {
        self.cancel();

        let action = Rc::clone(&self.action);
        let pending = Rc::clone(&self.pending);
        let scheduled = self.timers.set_timeout(
            self.delay_ms,
            Box::new(move || {
                pending.set(None);
                action();
            }),
        );

        match scheduled {
            Ok(id) => self.pending.set(Some(id)),
            Err(e) => log::error!("Failed to schedule debounced action: {e}"),
        }
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.timers.clear_timeout(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ScheduledTimer {
    due_ms: u64,
    callback: Box<dyn FnOnce()>,
}

/// Deterministic timer backend driven by [`advance`](ManualTimers::advance).
///
/// Used by native hosts and tests in place of the browser event loop.
#[derive(Default)]
pub struct ManualTimers {
    now_ms: Cell<u64>,
    next_id: Cell<i32>,
    queue: RefCell<BTreeMap<TimerId, ScheduledTimer>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move the clock forward, firing every timeout that comes due in
    /// deadline order (ties in scheduling order). Timeouts scheduled by a
    /// firing callback run in the same call if they fall inside the window.
    pub fn advance(&self, ms: u64) {
        let deadline = self.now_ms.get() + ms;

        loop {
            let next = {
                let queue = self.queue.borrow();
                queue
                    .iter()
                    .filter(|(_, timer)| timer.due_ms <= deadline)
                    .min_by_key(|(id, timer)| (timer.due_ms, **id))
                    .map(|(id, _)| *id)
            };

            let Some(id) = next else { break };
            let Some(timer) = self.queue.borrow_mut().remove(&id) else {
                break;
            };
            self.now_ms.set(timer.due_ms);
            (timer.callback)();
        }

        self.now_ms.set(deadline);
    }
}

impl TimerBackend for ManualTimers {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> InteractionResult<TimerId> {
        let id = TimerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.queue.borrow_mut().insert(
            id,
            ScheduledTimer {
                due_ms: self.now_ms.get() + u64::from(delay_ms),
                callback,
            },
        );
        Ok(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.queue.borrow_mut().remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn test_burst_collapses_to_one_call() {
        let timers = Rc::new(ManualTimers::new());
        let (count, action) = counter();
        let debouncer = Debouncer::new(timers.clone(), 250, action);

        debouncer.trigger();
        timers.advance(100);
        debouncer.trigger();
        timers.advance(100);
        debouncer.trigger();
        timers.advance(249);
        assert_eq!(count.get(), 0);
        assert!(debouncer.is_pending());

        timers.advance(1);
        assert_eq!(count.get(), 1);
        assert!(!debouncer.is_pending());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_separate_bursts_fire_separately() {
        let timers = Rc::new(ManualTimers::new());
        let (count, action) = counter();
        let debouncer = Debouncer::new(timers.clone(), 100, action);

        debouncer.trigger();
        timers.advance(150);
        debouncer.trigger();
        timers.advance(150);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_cancel_and_drop() {
        let timers = Rc::new(ManualTimers::new());
        let (count, action) = counter();
        let debouncer = Debouncer::new(timers.clone(), 100, action);

        debouncer.trigger();
        debouncer.cancel();
        timers.advance(500);
        assert_eq!(count.get(), 0);

        debouncer.trigger();
        drop(debouncer);
        timers.advance(500);
        assert_eq!(count.get(), 0);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_manual_timers_order() {
        let timers = ManualTimers::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(30, "late"), (10, "early"), (10, "early-second")] {
            let fired = Rc::clone(&fired);
            timers
                .set_timeout(delay, Box::new(move || fired.borrow_mut().push(tag)))
                .unwrap();
        }
        timers.advance(30);
        assert_eq!(*fired.borrow(), vec!["early", "early-second", "late"]);
        assert_eq!(timers.now_ms(), 30);
    }
}
