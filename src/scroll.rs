// Scroll depth: how far the user scrolled toward first revealing the ad.
// Point-in-time measurement, taken when the viewable impression is about to fire.

use crate::types::{ContainerNode, ScrollPosition};

/// Outermost scrollable container in an innermost-first ancestor chain.
pub fn find_root_scroll_container(ancestors: &[ContainerNode]) -> Option<&ContainerNode> {
    let mut root = None;
    for node in ancestors {
        if node.scrollable {
            root = Some(node);
        }
    }
    root
}

/// Normalized scroll progress in [0, 1].
///
/// An ad that was already at or above the container's top needed no scroll and
/// counts as fully scrolled to. Without a scrollable ancestor the ad can only have
/// been reached in place, so that also counts as 1.0.
pub fn scroll_depth(position: Option<ScrollPosition>) -> f32 {
    let Some(position) = position else {
        return 1.0;
    };

    let required = position.required_scroll();
    if required <= 0 {
        return 1.0;
    }

    let raw = position.scroll_offset as f64 / required as f64;
    raw.clamp(0.0, 1.0) as f32
}
