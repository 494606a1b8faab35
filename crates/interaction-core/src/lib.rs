//! Interaction core for the chart layer
//! Formatting, tooltip content, nearest-point search and the resize / hover /
//! dimension swap coordination shared by every chart renderer.
//!
//! Nothing here touches the DOM directly; the host traits in [`host`] are
//! implemented by the wasm bridge over `web-sys` and by in-memory fakes in
//! tests.

pub mod cleanup;
pub mod color;
pub mod context;
pub mod debounce;
pub mod dimension_swap;
pub mod format;
pub mod host;
pub mod layout;
pub mod nearest;
pub mod resize;
pub mod tooltip;
pub mod tooltip_content;

pub use cleanup::{CleanupCallback, CleanupRegistry, CleanupReport};
pub use color::{darken_fill, Rgb};
pub use context::InteractionContext;
pub use debounce::{Debouncer, ManualTimers, TimerBackend, TimerId};
pub use dimension_swap::DimensionSwapCoordinator;
pub use format::{
    format_by_metadata, format_compact, format_grouped, truncate_label, DisplayValue,
    ValueFormatter,
};
pub use host::{ChartContainer, DocumentHost, HoverElement, ListenerId, ResizeSubscription, TooltipNode};
pub use layout::{
    determine_time_grain, format_time_value, validate_rendering_context, ChartLayout, Margins,
    TimeGrain,
};
pub use nearest::{nearest_by_euclidean, nearest_by_time, LinearTimeScale, NearestPoint, TimeScale};
pub use resize::ResizeCoordinator;
pub use tooltip::{HighlightFn, HoverSession, TooltipManager, TooltipState};
pub use tooltip_content::{TooltipContent, TooltipContentBuilder};

pub use chart_interact_config::InteractionConfig;
pub use chart_interact_shared::{InteractionError, InteractionResult};
