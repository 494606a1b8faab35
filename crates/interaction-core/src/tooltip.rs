//! Singleton tooltip and hover highlighting
//!
//! One tooltip node serves every chart on the page. [`TooltipManager`] owns
//! it; each chart's marks get a [`HoverSession`] that tracks which mark is
//! highlighted and the fill each mark had before any highlight.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chart_interact_config::{DomConfig, TooltipConfig};
use chart_interact_shared::{ElementId, HoverEvent, PointerPosition};
use serde::Serialize;

use crate::color::darken_fill;
use crate::host::{DocumentHost, HoverElement, TooltipNode};

/// Custom highlight; called with `None` to remove the highlight
pub type HighlightFn<E, D> = Rc<dyn Fn(&E, Option<&D>)>;

/// Produces tooltip HTML for a hovered mark; `None` or empty leaves the
/// tooltip untouched
pub type ContentFn<E, D> = Rc<dyn Fn(&D, &E, PointerPosition) -> Option<String>>;

/// Observable state of the singleton tooltip
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipState {
    pub visible: bool,
    pub left: f64,
    pub top: f64,
    pub last_highlighted: Option<ElementId>,
}

pub struct TooltipManager {
    node: Rc<dyn TooltipNode>,
    config: TooltipConfig,
    tooltip_id: String,
    tooltip_class: String,
    state: RefCell<TooltipState>,
}

impl TooltipManager {
    pub fn new(node: Rc<dyn TooltipNode>, config: TooltipConfig, dom: &DomConfig) -> Self {
        Self {
            node,
            config,
            tooltip_id: dom.tooltip_id.clone(),
            tooltip_class: dom.tooltip_class.clone(),
            state: RefCell::new(TooltipState::default()),
        }
    }

    /// Place the tooltip next to the pointer with `html` as content
    pub fn show(&self, event: PointerPosition, html: &str) {
        let left = event.page_x + self.config.offset_x;
        let top = event.page_y + self.config.offset_y;

        self.node.set_html(html);
        self.node.set_position(left, top);
        self.node.set_opacity(self.config.visible_opacity);

        let mut state = self.state.borrow_mut();
        state.visible = true;
        state.left = left;
        state.top = top;
    }

    pub fn hide(&self) {
        self.node.set_opacity(0.0);
        self.state.borrow_mut().visible = false;
    }

    pub fn state(&self) -> TooltipState {
        self.state.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    /// Remove tooltip nodes leaked by abandoned chart instances, keeping the
    /// singleton. Returns the number of nodes removed.
    pub fn cleanup_orphaned_tooltips<H: DocumentHost + ?Sized>(&self, document: &H) -> usize {
        cleanup_orphaned_tooltips(document, &self.tooltip_class, &self.tooltip_id)
    }

    /// Wire hover behavior for a selection of marks.
    ///
    /// Returns `None` (and logs) for an empty selection. Without a custom
    /// `highlight`, the hovered mark's fill is darkened and restored on leave.
    pub fn attach_hover_tooltip<E, D>(
        self: &Rc<Self>,
        selection: &[E],
        content: impl Fn(&D, &E, PointerPosition) -> Option<String> + 'static,
        highlight: Option<HighlightFn<E, D>>,
    ) -> Option<HoverSession<E, D>>
    where
        E: HoverElement,
        D: 'static,
    {
        if selection.is_empty() {
            log::warn!("attach_hover_tooltip: Empty or invalid selection");
            return None;
        }

        let session = HoverSession {
            manager: Rc::clone(self),
            content: Rc::new(content),
            highlight,
            darken: self.config.highlight_darken,
            original_fills: RefCell::new(HashMap::new()),
            last: RefCell::new(None),
        };
        session.capture(selection);
        log::debug!("Attached hover tooltip to {} elements", selection.len());
        Some(session)
    }

    fn set_last_highlighted(&self, id: Option<ElementId>) {
        self.state.borrow_mut().last_highlighted = id;
    }

    /// Hide the tooltip and forget the highlighted element
    pub fn detach(&self) {
        self.hide();
        self.set_last_highlighted(None);
    }
}

/// Remove every tooltip-class node but the singleton, when more than one exists
pub fn cleanup_orphaned_tooltips<H: DocumentHost + ?Sized>(
    document: &H,
    tooltip_class: &str,
    keep_id: &str,
) -> usize {
    if document.tooltip_count(tooltip_class) <= 1 {
        return 0;
    }
    let removed = document.remove_tooltips_except(tooltip_class, keep_id);
    if removed > 0 {
        log::debug!("Removed {removed} orphaned tooltips");
    }
    removed
}

/// Hover state for one chart's marks
pub struct HoverSession<E: HoverElement, D> {
    manager: Rc<TooltipManager>,
    content: ContentFn<E, D>,
    highlight: Option<HighlightFn<E, D>>,
    darken: f64,
    /// Fill of each mark when first seen; never overwritten
    original_fills: RefCell<HashMap<ElementId, String>>,
    last: RefCell<Option<E>>,
}

impl<E: HoverElement, D: 'static> HoverSession<E, D> {
    /// Record the current fill of marks not seen before
    pub fn capture(&self, elements: &[E]) {
        let mut fills = self.original_fills.borrow_mut();
        for element in elements {
            if let Some(fill) = element.fill().filter(|f| !f.is_empty()) {
                fills.entry(element.element_id()).or_insert(fill);
            }
        }
    }

    pub fn handle(&self, element: &E, datum: &D, event: HoverEvent) {
        match event {
            HoverEvent::Move { position } => self.pointer_move(element, datum, position),
            HoverEvent::Leave => self.pointer_leave(element),
        }
    }

    pub fn pointer_move(&self, element: &E, datum: &D, event: PointerPosition) {
        let previous = self.last.borrow_mut().take();
        if let Some(prev) = previous {
            if prev.element_id() != element.element_id() {
                self.apply_highlight(&prev, None);
            }
        }

        self.apply_highlight(element, Some(datum));
        *self.last.borrow_mut() = Some(element.clone());
        self.manager.set_last_highlighted(Some(element.element_id()));

        if let Some(html) = (self.content)(datum, element, event) {
            if !html.is_empty() {
                self.manager.show(event, &html);
            }
        }
    }

    pub fn pointer_leave(&self, element: &E) {
        self.apply_highlight(element, None);
        self.manager.hide();
        self.last.borrow_mut().take();
        self.manager.set_last_highlighted(None);
    }

    /// Currently highlighted mark, if any
    pub fn highlighted(&self) -> Option<ElementId> {
        self.last.borrow().as_ref().map(HoverElement::element_id)
    }

    pub fn original_fill(&self, id: ElementId) -> Option<String> {
        self.original_fills.borrow().get(&id).cloned()
    }

    /// Undo any highlight and hide the tooltip
    pub fn release(&self) {
        let previous = self.last.borrow_mut().take();
        if let Some(prev) = previous {
            self.apply_highlight(&prev, None);
            self.manager.detach();
        }
    }

    fn apply_highlight(&self, element: &E, datum: Option<&D>) {
        match &self.highlight {
            Some(custom) => custom(element, datum),
            None => self.default_highlight(element, datum.is_some()),
        }
    }

    fn default_highlight(&self, element: &E, on: bool) {
        let fills = self.original_fills.borrow();
        let Some(original) = fills.get(&element.element_id()) else {
            return;
        };

        if !on {
            element.set_fill(original);
            return;
        }

        match darken_fill(original, self.darken) {
            Some(darker) => element.set_fill(&darker),
            None => log::debug!("Fill '{original}' is not a color, skipping highlight"),
        }
    }
}
