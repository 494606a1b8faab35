//! Debounced redraw on container resize
//!
//! A redraw only fires when the container has a positive box that differs
//! from the last one drawn at, so zero-size layout churn (a container
//! briefly detached) and repeated notifications at the same size are
//! ignored.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chart_interact_shared::{BoxSize, InteractionResult};

use crate::cleanup::CleanupRegistry;
use crate::debounce::{Debouncer, TimerBackend};
use crate::host::{ChartContainer, ResizeSubscription};

struct ResizeSession {
    id: u64,
    subscription: Box<dyn ResizeSubscription>,
    // Held so pending redraws die with the session
    _debouncer: Rc<Debouncer>,
    baseline: Rc<Cell<Option<BoxSize>>>,
}

impl ResizeSession {
    fn disconnect(mut self) {
        self.subscription.disconnect();
    }
}

type Sessions = Rc<RefCell<HashMap<String, ResizeSession>>>;

pub struct ResizeCoordinator {
    timers: Rc<dyn TimerBackend>,
    cleanup: Rc<CleanupRegistry>,
    debounce_ms: u32,
    sessions: Sessions,
    next_id: Cell<u64>,
}

impl ResizeCoordinator {
    pub fn new(timers: Rc<dyn TimerBackend>, cleanup: Rc<CleanupRegistry>, debounce_ms: u32) -> Self {
        Self {
            timers,
            cleanup,
            debounce_ms,
            sessions: Rc::new(RefCell::new(HashMap::new())),
            next_id: Cell::new(0),
        }
    }

    /// Keep `container` redrawn at its current size.
    ///
    /// Drains the cleanup registry first (tearing down the previous chart's
    /// observation), replaces any observer still attached to the same
    /// container, and takes the current box as the baseline.
    pub fn attach<C: ChartContainer>(
        &self,
        container: C,
        on_redraw: impl FnMut() + 'static,
    ) -> InteractionResult<()> {
        self.cleanup.run_all();

        let key = container.container_key();
        if self.detach(&key) {
            log::debug!("Replaced resize observer on '{key}'");
        }

        let container = Rc::new(container);
        let initial = container.box_size();
        let baseline = Rc::new(Cell::new(initial.is_positive().then_some(initial)));

        let action = {
            let container = Rc::clone(&container);
            let baseline = Rc::clone(&baseline);
            let on_redraw = RefCell::new(on_redraw);
            move || {
                let size = container.box_size();
                if !size.is_positive() || baseline.get() == Some(size) {
                    return;
                }
                baseline.set(Some(size));
                log::debug!(
                    "Container '{}' resized to {}x{}, redrawing",
                    container.container_key(),
                    size.width,
                    size.height
                );
                match on_redraw.try_borrow_mut() {
                    Ok(mut redraw) => (*redraw)(),
                    Err(_) => log::warn!("Redraw requested while a redraw is running, skipped"),
                }
            }
        };
        let debouncer = Rc::new(Debouncer::new(Rc::clone(&self.timers), self.debounce_ms, action));

        let weak = Rc::downgrade(&debouncer);
        let subscription = container.observe_resize(Rc::new(move || {
            if let Some(debouncer) = weak.upgrade() {
                debouncer.trigger();
            }
        }))?;

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.sessions.borrow_mut().insert(
            key.clone(),
            ResizeSession {
                id,
                subscription,
                _debouncer: debouncer,
                baseline,
            },
        );

        let sessions = Rc::downgrade(&self.sessions);
        self.cleanup.register(move || {
            let Some(sessions) = sessions.upgrade() else {
                return Ok(());
            };
            let session = {
                let mut map = sessions.borrow_mut();
                match map.get(&key) {
                    Some(s) if s.id == id => map.remove(&key),
                    _ => None,
                }
            };
            if let Some(session) = session {
                session.disconnect();
            }
            Ok(())
        });

        Ok(())
    }

    /// Disconnect the observer on `container_key`; returns whether one existed
    pub fn detach(&self, container_key: &str) -> bool {
        let session = self.sessions.borrow_mut().remove(container_key);
        match session {
            Some(session) => {
                session.disconnect();
                true
            }
            None => false,
        }
    }

    /// Size the container was last drawn at
    pub fn observed_size(&self, container_key: &str) -> Option<BoxSize> {
        self.sessions
            .borrow()
            .get(container_key)
            .and_then(|s| s.baseline.get())
    }

    pub fn is_observing(&self, container_key: &str) -> bool {
        self.sessions.borrow().contains_key(container_key)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.borrow().len()
    }
}
