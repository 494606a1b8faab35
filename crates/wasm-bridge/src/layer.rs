//! The `InteractionLayer` class exported to JavaScript

use std::cell::RefCell;
use std::rc::Rc;

use chart_interact_config::{ConfigValidator, InteractionConfig};
use chart_interact_core::{HighlightFn, InteractionContext, Margins};
use chart_interact_shared::{ElementId, InteractionError, PointerPosition};
use uuid::Uuid;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, MouseEvent};

use crate::dom::{DomContainer, DomDocument, DomElement, DomTooltip};
use crate::instance_manager::{HoverBinding, InstanceManager, MarkListener, PageContext};
use crate::timers::WindowTimers;
use crate::to_js;

fn parse_config(config: JsValue) -> Result<InteractionConfig, InteractionError> {
    if config.is_undefined() || config.is_null() {
        return Ok(InteractionConfig::default());
    }

    let config: InteractionConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| InteractionError::InvalidValue {
            field: "config".to_string(),
            message: e.to_string(),
        })?;
    ConfigValidator::validate(&config).map_err(|e| InteractionError::InvalidValue {
        field: "config".to_string(),
        message: e.to_string(),
    })?;
    Ok(config)
}

fn report_callback_error(what: &str, result: Result<JsValue, JsValue>) {
    if let Err(e) = result {
        log::error!("{what} callback failed: {e:?}");
    }
}

/// Page-level interaction state: tooltip, cleanup stack, resize observation
/// and the dimension swap handler.
#[wasm_bindgen]
pub struct InteractionLayer {
    instance_id: Uuid,
}

#[wasm_bindgen]
impl InteractionLayer {
    /// `config` is an optional `InteractionConfig`-shaped object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<InteractionLayer, JsValue> {
        let config = parse_config(config)?;

        let window = web_sys::window().ok_or_else(|| InteractionError::missing("window"))?;
        let document = window
            .document()
            .ok_or_else(|| InteractionError::missing("document"))?;
        let tooltip = DomTooltip::ensure(&document, &config.dom)?;

        let context = InteractionContext::new(
            config,
            Rc::new(DomDocument::new(document)),
            Rc::new(WindowTimers::new(window)),
            Rc::new(tooltip),
        );

        Ok(InteractionLayer {
            instance_id: InstanceManager::create_layer(context),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.instance_id.to_string()
    }

    /// Redraw `container` (debounced) whenever its size really changes.
    /// Tears down whatever the previous chart registered.
    #[wasm_bindgen(js_name = mountResize)]
    pub fn mount_resize(&self, container: Option<HtmlElement>, redraw: js_sys::Function) -> Result<(), JsValue> {
        let Some(element) = container else {
            log::error!("Container element is null or undefined");
            return Ok(());
        };

        self.context()?.mount(DomContainer::new(element), move || {
            report_callback_error("Redraw", redraw.call0(&JsValue::NULL));
        })?;
        Ok(())
    }

    /// Re-render the visualization container after a dimension swap;
    /// replaces any previously set handler.
    #[wasm_bindgen(js_name = setDimensionSwapHandler)]
    pub fn set_dimension_swap_handler(&self, render: js_sys::Function) -> Result<(), JsValue> {
        self.context()?
            .set_dimension_swap_handler(move |container: DomContainer| {
                let element = JsValue::from(container.element().clone());
                report_callback_error("Render", render.call1(&JsValue::NULL, &element));
            })?;
        Ok(())
    }

    #[wasm_bindgen(js_name = clearDimensionSwapHandler)]
    pub fn clear_dimension_swap_handler(&self) -> Result<bool, JsValue> {
        Ok(self.context()?.dimension_swap().clear())
    }

    /// Hover tooltip and highlight for `elements`, whose data are `data` by
    /// position. `content(datum, element, event)` returns tooltip HTML;
    /// `highlight(element, datum | null)` replaces the default darkening.
    ///
    /// Returns a binding id, or `undefined` for an empty selection. The
    /// binding is released by the next chart's cleanup or by
    /// `detachHoverTooltip`.
    #[wasm_bindgen(js_name = attachHoverTooltip)]
    pub fn attach_hover_tooltip(
        &self,
        elements: js_sys::Array,
        data: js_sys::Array,
        content: js_sys::Function,
        highlight: Option<js_sys::Function>,
    ) -> Result<Option<String>, JsValue> {
        let context = self.context()?;

        // Slots stay aligned with `data`; non-element entries leave a gap
        let first_id = InstanceManager::reserve_element_ids(elements.length());
        let slots: Vec<Option<DomElement>> = elements
            .iter()
            .enumerate()
            .map(|(i, node)| {
                node.dyn_into::<Element>()
                    .ok()
                    .map(|element| DomElement::new(element, ElementId(first_id + i as u64)))
            })
            .collect();
        let marks: Vec<DomElement> = slots.iter().flatten().cloned().collect();
        if marks.len() != slots.len() {
            log::warn!(
                "attachHoverTooltip: skipped {} non-element entries",
                slots.len() - marks.len()
            );
        }

        let current_event = Rc::new(RefCell::new(JsValue::UNDEFINED));
        let content_fn = {
            let current_event = Rc::clone(&current_event);
            move |datum: &JsValue, mark: &DomElement, position: PointerPosition| {
                let event = current_event.borrow().clone();
                let event = if event.is_undefined() {
                    to_js(&position).ok()?
                } else {
                    event
                };
                match content.call3(&JsValue::NULL, datum, mark.element(), &event) {
                    Ok(html) => html.as_string(),
                    Err(e) => {
                        log::error!("Tooltip content callback failed: {e:?}");
                        None
                    }
                }
            }
        };

        let highlight: Option<HighlightFn<DomElement, JsValue>> = highlight.map(|f| {
            Rc::new(move |mark: &DomElement, datum: Option<&JsValue>| {
                let datum = datum.cloned().unwrap_or(JsValue::NULL);
                report_callback_error("Highlight", f.call2(&JsValue::NULL, mark.element(), &datum));
            }) as HighlightFn<DomElement, JsValue>
        });

        let Some(session) = context.attach_hover_tooltip(&marks, content_fn, highlight) else {
            return Ok(None);
        };

        let binding_id = InstanceManager::insert_binding(HoverBinding {
            session,
            elements: slots.clone(),
            data: data.iter().collect(),
            listeners: RefCell::new(Vec::with_capacity(marks.len() * 2)),
            current_event,
        });

        let mut listeners = Vec::with_capacity(marks.len() * 2);
        let placed = slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|mark| (index, mark)));
        for (index, mark) in placed {
            let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                if let Some(binding) = InstanceManager::binding(&binding_id) {
                    binding.pointer_move(index, event);
                }
            });
            let on_out = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
                if let Some(binding) = InstanceManager::binding(&binding_id) {
                    binding.pointer_leave(index);
                }
            });

            for (event, callback) in [("mousemove", on_move), ("mouseout", on_out)] {
                let target = mark.element().clone();
                if let Err(e) = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
                    log::warn!("Failed to add '{event}' listener to mark {index}: {e:?}");
                    continue;
                }
                listeners.push(MarkListener {
                    target,
                    event,
                    callback,
                });
            }
        }
        if let Some(binding) = InstanceManager::binding(&binding_id) {
            binding.listeners.borrow_mut().extend(listeners);
        }

        context.register_cleanup(move || {
            InstanceManager::release_binding(&binding_id);
            Ok(())
        });

        Ok(Some(binding_id.to_string()))
    }

    /// Release a hover binding now instead of at the next cleanup
    #[wasm_bindgen(js_name = detachHoverTooltip)]
    pub fn detach_hover_tooltip(&self, binding_id: &str) -> bool {
        match Uuid::parse_str(binding_id) {
            Ok(id) => InstanceManager::release_binding(&id),
            Err(_) => {
                log::warn!("detachHoverTooltip: '{binding_id}' is not a binding id");
                false
            }
        }
    }

    /// Place the tooltip at the event's page coordinates
    #[wasm_bindgen(js_name = showTooltip)]
    pub fn show_tooltip(&self, page_x: f64, page_y: f64, html: &str) -> Result<(), JsValue> {
        self.context()?
            .tooltips()
            .show(PointerPosition::new(page_x, page_y), html);
        Ok(())
    }

    #[wasm_bindgen(js_name = hideTooltip)]
    pub fn hide_tooltip(&self) -> Result<(), JsValue> {
        self.context()?.tooltips().hide();
        Ok(())
    }

    #[wasm_bindgen(js_name = tooltipState)]
    pub fn tooltip_state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.context()?.tooltips().state())
    }

    /// Run `callback` when the current chart is replaced or torn down
    #[wasm_bindgen(js_name = registerCleanup)]
    pub fn register_cleanup(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.context()?.register_cleanup(move || {
            callback
                .call0(&JsValue::NULL)
                .map(|_| ())
                .map_err(InteractionError::from)
        });
        Ok(())
    }

    /// Run every registered cleanup, newest first; returns `{invoked, failed}`
    #[wasm_bindgen(js_name = runCleanup)]
    pub fn run_cleanup(&self) -> Result<JsValue, JsValue> {
        to_js(&self.context()?.run_cleanup())
    }

    #[wasm_bindgen(js_name = cleanupOrphanedTooltips)]
    pub fn cleanup_orphaned_tooltips(&self) -> Result<u32, JsValue> {
        Ok(self.context()?.cleanup_orphaned_tooltips() as u32)
    }

    /// Clear `container` for a render, or show the "no data" message.
    /// `false` means: do not render.
    #[wasm_bindgen(js_name = validateRenderingContext)]
    pub fn validate_rendering_context(
        &self,
        container: Option<HtmlElement>,
        dataset_len: u32,
    ) -> Result<bool, JsValue> {
        let container = container.map(DomContainer::new);
        Ok(self
            .context()?
            .validate_rendering_context(container.as_ref(), dataset_len as usize))
    }

    /// Shorten a label to the layer's configured `labelMaxLength`
    #[wasm_bindgen(js_name = truncateLabel)]
    pub fn truncate_label(&self, text: Option<String>) -> Result<Option<String>, JsValue> {
        let context = self.context()?;
        Ok(text.map(|t| context.truncate_label(&t)))
    }

    /// Margins and drawable size for `container`
    #[wasm_bindgen(js_name = chartLayout)]
    pub fn chart_layout(&self, container: HtmlElement, margins: JsValue) -> Result<JsValue, JsValue> {
        let margins: Option<Margins> = if margins.is_undefined() || margins.is_null() {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(margins)?)
        };
        to_js(&self.context()?.layout(&DomContainer::new(container), margins))
    }

    /// Drop everything the current chart registered
    pub fn teardown(&self) -> Result<JsValue, JsValue> {
        to_js(&self.context()?.teardown())
    }
}

impl InteractionLayer {
    fn context(&self) -> Result<Rc<PageContext>, JsValue> {
        InstanceManager::layer(&self.instance_id)
            .ok_or_else(|| JsValue::from_str("Interaction layer not found"))
    }
}

impl Drop for InteractionLayer {
    fn drop(&mut self) {
        if let Some(context) = InstanceManager::remove_layer(&self.instance_id) {
            context.teardown();
        }
    }
}
