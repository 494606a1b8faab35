//! Pointer and layout event types passed from the DOM into the interaction core

use serde::{Deserialize, Serialize};

/// Pointer coordinates relative to the document (`pageX`/`pageY`)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerPosition {
    pub page_x: f64,
    pub page_y: f64,
}

impl PointerPosition {
    pub fn new(page_x: f64, page_y: f64) -> Self {
        Self { page_x, page_y }
    }
}

/// Content box of a container, in CSS pixels
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions strictly positive. A detached or collapsed container
    /// reports zero in at least one of them.
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoverEvent {
    Move { position: PointerPosition },
    Leave,
}
