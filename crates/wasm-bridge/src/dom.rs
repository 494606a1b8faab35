//! `web-sys` implementations of the interaction host traits

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chart_interact_config::DomConfig;
use chart_interact_core::{
    ChartContainer, DocumentHost, HoverElement, ListenerId, ResizeSubscription, TooltipNode,
};
use chart_interact_shared::{BoxSize, ElementId, InteractionError, InteractionResult};
use uuid::Uuid;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, ResizeObserver};

/// Attribute giving unnamed containers a stable key
const KEY_ATTRIBUTE: &str = "data-interact-key";

const TOOLTIP_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("pointer-events", "none"),
    ("opacity", "0"),
    ("z-index", "1000"),
    ("background", "rgba(255, 255, 255, 0.96)"),
    ("border", "1px solid #ddd"),
    ("border-radius", "4px"),
    ("padding", "6px 8px"),
    ("box-shadow", "0 2px 6px rgba(0, 0, 0, 0.15)"),
    ("transition", "opacity 0.2s"),
];

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log::warn!("Failed to set {property}: {e:?}");
    }
}

/// The page's singleton tooltip `<div>`
pub struct DomTooltip {
    element: HtmlElement,
}

impl DomTooltip {
    /// Reuse the tooltip node if the page already has one, create it otherwise
    pub fn ensure(document: &Document, dom: &DomConfig) -> InteractionResult<Self> {
        if let Some(existing) = document.get_element_by_id(&dom.tooltip_id) {
            let element = existing
                .dyn_into::<HtmlElement>()
                .map_err(|_| InteractionError::dom("tooltip node is not an HTML element"))?;
            return Ok(Self { element });
        }

        let element = document
            .create_element("div")
            .map_err(|e| InteractionError::dom(format!("create tooltip: {e:?}")))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| InteractionError::dom("tooltip node is not an HTML element"))?;
        element.set_id(&dom.tooltip_id);
        element.set_class_name(&dom.tooltip_class);
        for (property, value) in TOOLTIP_STYLE {
            set_style(&element, property, value);
        }

        let body = document
            .body()
            .ok_or_else(|| InteractionError::NodeNotFound {
                selector: "body".to_string(),
            })?;
        body.append_child(&element)
            .map_err(|e| InteractionError::dom(format!("append tooltip: {e:?}")))?;

        log::debug!("Created tooltip #{}", dom.tooltip_id);
        Ok(Self { element })
    }
}

impl TooltipNode for DomTooltip {
    fn set_html(&self, html: &str) {
        self.element.set_inner_html(html);
    }

    fn set_position(&self, left: f64, top: f64) {
        set_style(&self.element, "left", &format!("{left}px"));
        set_style(&self.element, "top", &format!("{top}px"));
    }

    fn set_opacity(&self, opacity: f64) {
        set_style(&self.element, "opacity", &opacity.to_string());
    }
}

/// A chart container element
#[derive(Clone)]
pub struct DomContainer {
    element: HtmlElement,
}

impl DomContainer {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl ChartContainer for DomContainer {
    fn container_key(&self) -> String {
        let id = self.element.id();
        if !id.is_empty() {
            return id;
        }
        if let Some(key) = self.element.get_attribute(KEY_ATTRIBUTE) {
            return key;
        }

        let key = Uuid::new_v4().to_string();
        if let Err(e) = self.element.set_attribute(KEY_ATTRIBUTE, &key) {
            log::warn!("Failed to tag container: {e:?}");
        }
        key
    }

    fn box_size(&self) -> BoxSize {
        BoxSize::new(
            f64::from(self.element.client_width()),
            f64::from(self.element.client_height()),
        )
    }

    fn set_html(&self, html: &str) {
        self.element.set_inner_html(html);
    }

    fn observe_resize(&self, on_change: Rc<dyn Fn()>) -> InteractionResult<Box<dyn ResizeSubscription>> {
        let callback = Closure::<dyn FnMut()>::new(move || on_change());
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| InteractionError::dom(format!("ResizeObserver: {e:?}")))?;
        observer.observe(&self.element);

        Ok(Box::new(DomResizeSubscription {
            observer,
            _callback: callback,
        }))
    }
}

struct DomResizeSubscription {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut()>,
}

impl ResizeSubscription for DomResizeSubscription {
    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

impl Drop for DomResizeSubscription {
    fn drop(&mut self) {
        // The callback is freed with us; the observer must not outlive it
        self.observer.disconnect();
    }
}

/// A hoverable SVG/HTML mark
#[derive(Clone)]
pub struct DomElement {
    element: Element,
    id: ElementId,
}

impl DomElement {
    pub fn new(element: Element, id: ElementId) -> Self {
        Self { element, id }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl HoverElement for DomElement {
    fn element_id(&self) -> ElementId {
        self.id
    }

    fn fill(&self) -> Option<String> {
        self.element.get_attribute("fill")
    }

    fn set_fill(&self, fill: &str) {
        if let Err(e) = self.element.set_attribute("fill", fill) {
            log::warn!("Failed to set fill on {}: {e:?}", self.id);
        }
    }
}

struct DocumentListener {
    event: String,
    callback: Closure<dyn FnMut()>,
}

/// The page document
pub struct DomDocument {
    document: Document,
    listeners: RefCell<HashMap<ListenerId, DocumentListener>>,
    next_listener: Cell<u64>,
}

impl DomDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        }
    }

    fn tooltips(&self, tooltip_class: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(&format!(".{tooltip_class}")) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

impl DocumentHost for DomDocument {
    type Container = DomContainer;

    fn tooltip_count(&self, tooltip_class: &str) -> usize {
        self.tooltips(tooltip_class).len()
    }

    fn remove_tooltips_except(&self, tooltip_class: &str, keep_id: &str) -> usize {
        let mut removed = 0;
        for tooltip in self.tooltips(tooltip_class) {
            if tooltip.id() != keep_id {
                tooltip.remove();
                removed += 1;
            }
        }
        removed
    }

    fn find_container(&self, selector: &str) -> Option<DomContainer> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .map(DomContainer::new)
    }

    fn add_listener(&self, event: &str, handler: Rc<dyn Fn()>) -> InteractionResult<ListenerId> {
        let callback = Closure::<dyn FnMut()>::new(move || handler());
        self.document
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| InteractionError::Listener {
                event: event.to_string(),
                message: format!("{e:?}"),
            })?;

        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().insert(
            id,
            DocumentListener {
                event: event.to_string(),
                callback,
            },
        );
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let Some(listener) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        if let Err(e) = self
            .document
            .remove_event_listener_with_callback(&listener.event, listener.callback.as_ref().unchecked_ref())
        {
            log::warn!("Failed to remove '{}' listener: {e:?}", listener.event);
        }
    }
}
