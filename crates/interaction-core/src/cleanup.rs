//! LIFO teardown hooks for the active chart

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use chart_interact_shared::{InteractionError, InteractionResult};

pub type CleanupCallback = Box<dyn FnOnce() -> InteractionResult<()>>;

/// Outcome of draining the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub invoked: usize,
    pub failed: usize,
}

/// Stack of teardown callbacks.
///
/// [`run_all`](CleanupRegistry::run_all) always leaves the stack empty: each
/// callback runs exactly once, newest first, and a failing callback never
/// stops the ones registered before it.
#[derive(Default)]
pub struct CleanupRegistry {
    callbacks: RefCell<Vec<CleanupCallback>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, callback: F)
    where
        F: FnOnce() -> InteractionResult<()> + 'static,
    {
        self.callbacks.borrow_mut().push(Box::new(callback));
    }

    pub fn run_all(&self) -> CleanupReport {
        let mut report = CleanupReport::default();

        // Pop one at a time: callbacks may register further cleanup
        loop {
            let Some(callback) = self.callbacks.borrow_mut().pop() else {
                break;
            };

            report.invoked += 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(callback)).unwrap_or_else(|payload| {
                Err(InteractionError::cleanup(panic_message(payload.as_ref())))
            });

            if let Err(e) = outcome {
                report.failed += 1;
                log::error!("Error in cleanup callback: {e}");
            }
        }

        if report.invoked > 0 {
            log::debug!(
                "Ran {} cleanup callbacks ({} failed)",
                report.invoked,
                report.failed
            );
        }
        report
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "callback panicked".to_string()
    }
}
