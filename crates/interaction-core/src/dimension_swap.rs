//! Re-render on the page-wide "dimension swap" signal
//!
//! At most one handler is live at a time: installing a new one always
//! removes the previous listener first, so a chart that re-registers on
//! every render never stacks up duplicate re-renders.

use std::cell::RefCell;
use std::rc::Rc;

use chart_interact_config::DomConfig;
use chart_interact_shared::InteractionResult;

use crate::debounce::{Debouncer, TimerBackend};
use crate::host::{DocumentHost, ListenerId};
use crate::tooltip::TooltipManager;

struct ActiveHandler {
    listener: ListenerId,
    debouncer: Rc<Debouncer>,
}

pub struct DimensionSwapCoordinator<H: DocumentHost> {
    document: Rc<H>,
    timers: Rc<dyn TimerBackend>,
    tooltips: Rc<TooltipManager>,
    dom: DomConfig,
    debounce_ms: u32,
    slot: RefCell<Option<ActiveHandler>>,
}

impl<H: DocumentHost> DimensionSwapCoordinator<H> {
    pub fn new(
        document: Rc<H>,
        timers: Rc<dyn TimerBackend>,
        tooltips: Rc<TooltipManager>,
        dom: DomConfig,
        debounce_ms: u32,
    ) -> Self {
        Self {
            document,
            timers,
            tooltips,
            dom,
            debounce_ms,
            slot: RefCell::new(None),
        }
    }

    /// Replace the live handler with one that re-renders the visualization
    /// container, `debounce_ms` after the last swap signal of a burst.
    pub fn set_handler(&self, on_render: impl Fn(H::Container) + 'static) -> InteractionResult<()> {
        if self.clear() {
            log::debug!("Removed previous dimension swap handler");
        }

        let action = {
            let document = Rc::clone(&self.document);
            let tooltips = Rc::clone(&self.tooltips);
            let selector = self.dom.container_selector.clone();
            move || {
                tooltips.cleanup_orphaned_tooltips(&*document);
                match document.find_container(&selector) {
                    Some(container) => on_render(container),
                    None => log::debug!("No container matches '{selector}', skipping re-render"),
                }
            }
        };
        let debouncer = Rc::new(Debouncer::new(Rc::clone(&self.timers), self.debounce_ms, action));

        let weak = Rc::downgrade(&debouncer);
        let listener = self.document.add_listener(
            &self.dom.dimension_swap_event,
            Rc::new(move || {
                if let Some(debouncer) = weak.upgrade() {
                    debouncer.trigger();
                }
            }),
        )?;

        *self.slot.borrow_mut() = Some(ActiveHandler { listener, debouncer });
        Ok(())
    }

    /// Remove the live handler and cancel a pending re-render. Returns
    /// whether a handler was attached.
    pub fn clear(&self) -> bool {
        let active = self.slot.borrow_mut().take();
        match active {
            Some(active) => {
                self.document.remove_listener(active.listener);
                active.debouncer.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.slot
            .borrow()
            .as_ref()
            .is_some_and(|active| active.debouncer.is_pending())
    }
}

impl<H: DocumentHost> Drop for DimensionSwapCoordinator<H> {
    fn drop(&mut self) {
        self.clear();
    }
}
