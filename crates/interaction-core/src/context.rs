//! Per-page owner of the interaction coordinators

use std::rc::Rc;

use chart_interact_config::InteractionConfig;
use chart_interact_shared::{InteractionResult, PointerPosition};

use crate::cleanup::{CleanupRegistry, CleanupReport};
use crate::debounce::TimerBackend;
use crate::dimension_swap::DimensionSwapCoordinator;
use crate::format::truncate_label;
use crate::host::{ChartContainer, DocumentHost, HoverElement, TooltipNode};
use crate::layout::{validate_rendering_context, ChartLayout, Margins};
use crate::resize::ResizeCoordinator;
use crate::tooltip::{HighlightFn, HoverSession, TooltipManager};

/// Everything one page needs to keep its charts interactive: the singleton
/// tooltip, the cleanup stack, resize observation and the dimension swap
/// handler slot.
///
/// Charts are mounted one after another into the same context; mounting a
/// chart tears down whatever the previous one registered.
pub struct InteractionContext<H: DocumentHost> {
    config: InteractionConfig,
    document: Rc<H>,
    tooltips: Rc<TooltipManager>,
    cleanup: Rc<CleanupRegistry>,
    resize: ResizeCoordinator,
    dimension_swap: DimensionSwapCoordinator<H>,
}

impl<H: DocumentHost> InteractionContext<H> {
    pub fn new(
        config: InteractionConfig,
        document: Rc<H>,
        timers: Rc<dyn TimerBackend>,
        tooltip_node: Rc<dyn TooltipNode>,
    ) -> Self {
        let cleanup = Rc::new(CleanupRegistry::new());
        let tooltips = Rc::new(TooltipManager::new(
            tooltip_node,
            config.tooltip.clone(),
            &config.dom,
        ));
        let resize = ResizeCoordinator::new(
            Rc::clone(&timers),
            Rc::clone(&cleanup),
            config.timing.resize_debounce_ms,
        );
        let dimension_swap = DimensionSwapCoordinator::new(
            Rc::clone(&document),
            timers,
            Rc::clone(&tooltips),
            config.dom.clone(),
            config.timing.dimension_swap_debounce_ms,
        );

        log::info!(
            "Interaction context ready (resize {}ms, dimension swap {}ms)",
            config.timing.resize_debounce_ms,
            config.timing.dimension_swap_debounce_ms
        );

        Self {
            config,
            document,
            tooltips,
            cleanup,
            resize,
            dimension_swap,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn document(&self) -> &Rc<H> {
        &self.document
    }

    pub fn tooltips(&self) -> &Rc<TooltipManager> {
        &self.tooltips
    }

    pub fn cleanup(&self) -> &CleanupRegistry {
        &self.cleanup
    }

    pub fn resize(&self) -> &ResizeCoordinator {
        &self.resize
    }

    pub fn dimension_swap(&self) -> &DimensionSwapCoordinator<H> {
        &self.dimension_swap
    }

    /// Keep `container` redrawn on resize, replacing the previous chart
    pub fn mount<C: ChartContainer>(
        &self,
        container: C,
        on_redraw: impl FnMut() + 'static,
    ) -> InteractionResult<()> {
        self.resize.attach(container, on_redraw)
    }

    pub fn set_dimension_swap_handler(
        &self,
        on_render: impl Fn(H::Container) + 'static,
    ) -> InteractionResult<()> {
        self.dimension_swap.set_handler(on_render)
    }

    pub fn attach_hover_tooltip<E, D>(
        &self,
        selection: &[E],
        content: impl Fn(&D, &E, PointerPosition) -> Option<String> + 'static,
        highlight: Option<HighlightFn<E, D>>,
    ) -> Option<HoverSession<E, D>>
    where
        E: HoverElement,
        D: 'static,
    {
        self.tooltips.attach_hover_tooltip(selection, content, highlight)
    }

    pub fn register_cleanup<F>(&self, callback: F)
    where
        F: FnOnce() -> InteractionResult<()> + 'static,
    {
        self.cleanup.register(callback);
    }

    pub fn run_cleanup(&self) -> CleanupReport {
        self.cleanup.run_all()
    }

    pub fn cleanup_orphaned_tooltips(&self) -> usize {
        self.tooltips.cleanup_orphaned_tooltips(&*self.document)
    }

    /// Check the container and dataset before a render, using the
    /// configured "no data" message
    pub fn validate_rendering_context<C: ChartContainer + ?Sized>(
        &self,
        container: Option<&C>,
        dataset_len: usize,
    ) -> bool {
        validate_rendering_context(container, dataset_len, &self.config.format.no_data_message)
    }

    /// Shorten an axis or legend label to the configured length
    pub fn truncate_label(&self, text: &str) -> String {
        truncate_label(text, self.config.format.label_max_length)
    }

    pub fn layout<C: ChartContainer + ?Sized>(&self, container: &C, margin: Option<Margins>) -> ChartLayout {
        ChartLayout::from_container(container.box_size(), margin)
    }

    /// Drop everything the current chart registered: run cleanup, remove
    /// the dimension swap handler and hide the tooltip.
    pub fn teardown(&self) -> CleanupReport {
        let report = self.cleanup.run_all();
        self.dimension_swap.clear();
        self.tooltips.detach();
        log::debug!("Interaction context torn down");
        report
    }
}
