//! Shared types for the chart interaction layer
//!
//! This crate contains the data model shared between the interaction core,
//! the configuration crate and the wasm bridge: field metadata, dataset
//! records, pointer/box geometry and the common error type.

pub mod data_point;
pub mod errors;
pub mod events;
pub mod metadata;

pub use data_point::{DataRecord, ScreenPoint, ScreenPosition, TimeKeyed};
pub use errors::{ErrorResponse, InteractionError, InteractionResult};
pub use events::{BoxSize, HoverEvent, PointerPosition};
pub use metadata::{DataType, FieldMetadata, FieldMetadataSet};

/// Identity of a hoverable mark.
///
/// The bridge hands these out from one page-wide counter, so an id names a
/// single mark across every chart on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element#{}", self.0)
    }
}
