// Geometry source for the tracker. The host widget measures; the tracker only reads.

use serde::{Deserialize, Serialize};

use crate::scroll::find_root_scroll_container;
use crate::types::*;

/// Reports where the tracked element currently sits on screen.
pub trait GeometryQuery {
    /// Visible rectangle and total bounds of the element.
    fn sample(&self) -> VisibilitySample;

    /// Scroll state of the outermost scrollable ancestor, if there is one.
    fn scroll_position(&self) -> Option<ScrollPosition>;
}

/// Geometry captured once and handed over as data (JS side, tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeometrySnapshot {
    pub sample: VisibilitySample,
    #[serde(default)]
    pub ad_top_on_screen: i32,
    /// Ancestor chain, innermost first.
    #[serde(default)]
    pub ancestors: Vec<ContainerNode>,
}

impl GeometrySnapshot {
    pub fn new(sample: VisibilitySample) -> Self {
        GeometrySnapshot {
            sample,
            ad_top_on_screen: 0,
            ancestors: Vec::new(),
        }
    }

    pub fn with_ancestors(mut self, ad_top_on_screen: i32, ancestors: Vec<ContainerNode>) -> Self {
        self.ad_top_on_screen = ad_top_on_screen;
        self.ancestors = ancestors;
        self
    }
}

impl GeometryQuery for GeometrySnapshot {
    fn sample(&self) -> VisibilitySample {
        self.sample
    }

    fn scroll_position(&self) -> Option<ScrollPosition> {
        find_root_scroll_container(&self.ancestors).map(|container| ScrollPosition {
            ad_top_on_screen: self.ad_top_on_screen,
            container_top_on_screen: container.top_on_screen,
            scroll_offset: container.scroll_offset,
        })
    }
}
