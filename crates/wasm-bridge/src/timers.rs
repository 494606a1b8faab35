//! `window.setTimeout` as a timer backend

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chart_interact_core::{TimerBackend, TimerId};
use chart_interact_shared::{InteractionError, InteractionResult};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Owns the closure behind every scheduled timeout so a cancelled one is
/// freed with its captured action instead of leaking.
pub struct WindowTimers {
    window: Window,
    scheduled: RefCell<HashMap<i32, Closure<dyn FnMut()>>>,
    /// Handles whose callback already ran; their closures are dropped on
    /// the next call, outside of their own invocation
    fired: Rc<RefCell<Vec<i32>>>,
    /// Handle whose callback is on the stack right now
    running: Rc<Cell<Option<i32>>>,
}

impl WindowTimers {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            scheduled: RefCell::new(HashMap::new()),
            fired: Rc::new(RefCell::new(Vec::new())),
            running: Rc::new(Cell::new(None)),
        }
    }

    /// Timeouts holding a closure: pending ones plus any that fired since
    /// the last call
    pub fn scheduled_count(&self) -> usize {
        self.prune_fired();
        self.scheduled.borrow().len()
    }

    fn prune_fired(&self) {
        let fired: Vec<i32> = self.fired.borrow_mut().drain(..).collect();
        if fired.is_empty() {
            return;
        }
        let mut scheduled = self.scheduled.borrow_mut();
        for handle in fired {
            scheduled.remove(&handle);
        }
    }
}

impl TimerBackend for WindowTimers {
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> InteractionResult<TimerId> {
        self.prune_fired();

        let handle_slot = Rc::new(Cell::new(None::<i32>));
        let mut callback = Some(callback);
        let closure = {
            let handle_slot = Rc::clone(&handle_slot);
            let fired = Rc::downgrade(&self.fired);
            let running = Rc::downgrade(&self.running);
            Closure::<dyn FnMut()>::new(move || {
                let handle = handle_slot.get();
                if let Some(running) = running.upgrade() {
                    running.set(handle);
                }
                if let Some(callback) = callback.take() {
                    callback();
                }
                if let Some(running) = running.upgrade() {
                    running.set(None);
                }
                if let (Some(fired), Some(handle)) = (fired.upgrade(), handle) {
                    fired.borrow_mut().push(handle);
                }
            })
        };

        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), delay)
            .map_err(|e| InteractionError::Timer {
                message: format!("{e:?}"),
            })?;

        handle_slot.set(Some(handle));
        self.scheduled.borrow_mut().insert(handle, closure);
        Ok(TimerId(handle))
    }

    fn clear_timeout(&self, id: TimerId) {
        self.window.clear_timeout_with_handle(id.0);
        // A running callback is released once it returns
        if self.running.get() != Some(id.0) {
            self.scheduled.borrow_mut().remove(&id.0);
        }
        self.prune_fired();
    }
}

impl Drop for WindowTimers {
    fn drop(&mut self) {
        // The closures go with us; the browser must not call them afterwards
        for handle in self.scheduled.get_mut().keys() {
            self.window.clear_timeout_with_handle(*handle);
        }
    }
}
