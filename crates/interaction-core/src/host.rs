//! Host traits: the seams between the interaction core and the DOM
//!
//! The wasm bridge implements these over `web-sys`; tests implement them
//! with plain in-memory fakes.

use std::rc::Rc;

use chart_interact_shared::{BoxSize, ElementId, InteractionResult};

/// The singleton tooltip node
pub trait TooltipNode {
    fn set_html(&self, html: &str);
    fn set_position(&self, left: f64, top: f64);
    /// Fade in to `opacity`; zero hides the node
    fn set_opacity(&self, opacity: f64);
}

/// A hoverable chart mark (bar, cell, point)
pub trait HoverElement: Clone + 'static {
    fn element_id(&self) -> ElementId;
    /// Current `fill` attribute, if any
    fn fill(&self) -> Option<String>;
    fn set_fill(&self, fill: &str);
}

/// Live size observation of a container. Owners call
/// [`disconnect`](ResizeSubscription::disconnect) before dropping it.
pub trait ResizeSubscription {
    fn disconnect(&mut self);
}

/// An element a chart is mounted into
pub trait ChartContainer: 'static {
    /// Stable key identifying the container across attach calls
    fn container_key(&self) -> String;
    fn box_size(&self) -> BoxSize;
    fn set_html(&self, html: &str);
    /// Start observing size changes; `on_change` runs on every notification.
    fn observe_resize(&self, on_change: Rc<dyn Fn()>) -> InteractionResult<Box<dyn ResizeSubscription>>;
}

/// Handle for a document-level listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Document-wide queries and the global notification channel
pub trait DocumentHost: 'static {
    type Container: ChartContainer;

    /// Number of nodes carrying the tooltip class
    fn tooltip_count(&self, tooltip_class: &str) -> usize;

    /// Remove every tooltip-class node except the one with `keep_id`;
    /// returns how many were removed.
    fn remove_tooltips_except(&self, tooltip_class: &str, keep_id: &str) -> usize;

    fn find_container(&self, selector: &str) -> Option<Self::Container>;

    fn add_listener(&self, event: &str, handler: Rc<dyn Fn()>) -> InteractionResult<ListenerId>;

    fn remove_listener(&self, id: ListenerId);
}
