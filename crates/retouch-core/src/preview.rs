//! Declarative on-screen preview.
//!
//! The preview never touches pixels. It describes the current state as CSS
//! `filter` and `transform` values the host applies to the displayed image,
//! so slider moves cost nothing but a string. Pixels are only produced by
//! [`render`](crate::render) on crop or save.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::state::{EditState, FilterSpec, TransformSpec};

/// Filter chain and transform for the displayed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDirective {
    /// e.g. `brightness(100%) grayscale(0%) sepia(0%) saturate(100%) contrast(100%) hue-rotate(0deg)`
    pub filter: String,
    /// e.g. `rotate(90deg) scale(-1, 1)`
    pub transform: String,
}

impl StyleDirective {
    /// Inline style declaration for both properties.
    pub fn to_css(&self) -> String {
        format!("filter: {}; transform: {};", self.filter, self.transform)
    }
}

/// Describe `state` as style directives.
pub fn preview_style(state: &EditState) -> StyleDirective {
    StyleDirective {
        filter: filter_directive(&state.filters),
        transform: transform_directive(&state.transform),
    }
}

/// CSS filter chain, in chain order.
pub fn filter_directive(filters: &FilterSpec) -> String {
    let mut out = String::with_capacity(96);
    for (i, (kind, value)) in filters.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "{}({}{})",
            kind.css_function(),
            value,
            kind.unit().suffix()
        );
    }
    out
}

/// CSS transform: rotate first, then scale by the flip signs.
pub fn transform_directive(transform: &TransformSpec) -> String {
    format!(
        "rotate({}deg) scale({}, {})",
        transform.rotate,
        transform.horizontal.value(),
        transform.vertical.value()
    )
}
