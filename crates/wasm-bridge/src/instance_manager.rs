//! Thread-local registry of interaction layers and hover bindings
//! JavaScript holds only ids; the Rust objects live here.
//!
//! Lookups hand out `Rc` clones so no registry borrow is held while a
//! callback runs into JavaScript (which may call straight back in).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chart_interact_core::{HoverSession, InteractionContext};
use chart_interact_shared::PointerPosition;
use uuid::Uuid;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, MouseEvent};

use crate::dom::{DomDocument, DomElement};

pub type PageContext = InteractionContext<DomDocument>;

/// Listener installed on one mark
pub struct MarkListener {
    pub target: Element,
    pub event: &'static str,
    pub callback: Closure<dyn FnMut(MouseEvent)>,
}

/// One chart's hover wiring: the session plus the DOM listeners feeding it
pub struct HoverBinding {
    pub session: HoverSession<DomElement, JsValue>,
    /// Marks by position in the caller's selection, `None` where the entry
    /// was not an element
    pub elements: Vec<Option<DomElement>>,
    pub data: Vec<JsValue>,
    pub listeners: RefCell<Vec<MarkListener>>,
    /// Event being handled, handed to the content callback
    pub current_event: Rc<RefCell<JsValue>>,
}

impl HoverBinding {
    pub fn pointer_move(&self, index: usize, event: MouseEvent) {
        let Some(Some(element)) = self.elements.get(index) else {
            return;
        };
        let position = PointerPosition::new(f64::from(event.page_x()), f64::from(event.page_y()));
        *self.current_event.borrow_mut() = event.into();

        let datum = self.data.get(index).cloned().unwrap_or(JsValue::UNDEFINED);
        self.session.pointer_move(element, &datum, position);
        *self.current_event.borrow_mut() = JsValue::UNDEFINED;
    }

    pub fn pointer_leave(&self, index: usize) {
        if let Some(Some(element)) = self.elements.get(index) {
            self.session.pointer_leave(element);
        }
    }

    /// Remove the DOM listeners and undo any highlight
    pub fn release(&self) {
        for listener in self.listeners.borrow_mut().drain(..) {
            if let Err(e) = listener
                .target
                .remove_event_listener_with_callback(listener.event, listener.callback.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove '{}' listener: {e:?}", listener.event);
            }
        }
        self.session.release();
    }
}

thread_local! {
    static LAYERS: RefCell<HashMap<Uuid, Rc<PageContext>>> = RefCell::new(HashMap::new());
    static HOVER_BINDINGS: RefCell<HashMap<Uuid, Rc<HoverBinding>>> = RefCell::new(HashMap::new());
    /// Element ids are unique across every binding on the page, so the
    /// tooltip's last highlighted id names one mark
    static NEXT_ELEMENT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Manages layer and binding lifetimes without global mutable state
pub struct InstanceManager;

impl InstanceManager {
    pub fn create_layer(context: PageContext) -> Uuid {
        let id = Uuid::new_v4();
        LAYERS.with(|layers| {
            layers.borrow_mut().insert(id, Rc::new(context));
        });
        id
    }

    pub fn layer(id: &Uuid) -> Option<Rc<PageContext>> {
        LAYERS.with(|layers| layers.borrow().get(id).cloned())
    }

    pub fn remove_layer(id: &Uuid) -> Option<Rc<PageContext>> {
        LAYERS.with(|layers| layers.borrow_mut().remove(id))
    }

    pub fn layer_count() -> usize {
        LAYERS.with(|layers| layers.borrow().len())
    }

    pub fn insert_binding(binding: HoverBinding) -> Uuid {
        let id = Uuid::new_v4();
        HOVER_BINDINGS.with(|bindings| {
            bindings.borrow_mut().insert(id, Rc::new(binding));
        });
        id
    }

    pub fn binding(id: &Uuid) -> Option<Rc<HoverBinding>> {
        HOVER_BINDINGS.with(|bindings| bindings.borrow().get(id).cloned())
    }

    /// Drop a binding after releasing it; returns whether it existed
    pub fn release_binding(id: &Uuid) -> bool {
        let removed = HOVER_BINDINGS.with(|bindings| bindings.borrow_mut().remove(id));
        match removed {
            Some(binding) => {
                binding.release();
                true
            }
            None => false,
        }
    }

    /// Reserve `count` consecutive element ids and return the first
    pub fn reserve_element_ids(count: u32) -> u64 {
        NEXT_ELEMENT_ID.with(|next| {
            let first = next.get();
            next.set(first + u64::from(count));
            first
        })
    }

    pub fn binding_count() -> usize {
        HOVER_BINDINGS.with(|bindings| bindings.borrow().len())
    }
}
