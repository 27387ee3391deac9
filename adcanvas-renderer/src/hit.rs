//! Pointer hit testing against a rendered frame.

use adcanvas_core::PointerTarget;

use crate::display::{DisplayItem, DisplayList};

/// Resolve what a pointer at canvas coordinates (`x`, `y`) lands on.
///
/// The topmost item wins: a resize handle (grown by `slop` on every side),
/// then layer content, then the empty canvas. Invisible layers never appear
/// in a display list and so are never hit. Returns `None` outside the canvas.
#[must_use]
pub fn hit_test(list: &DisplayList, x: f32, y: f32, slop: f32) -> Option<PointerTarget> {
    if !(0.0..=list.width).contains(&x) || !(0.0..=list.height).contains(&y) {
        return None;
    }
    for item in list.items.iter().rev() {
        match item {
            DisplayItem::ResizeHandle { id, rect } if rect.inflate(slop).contains(x, y) => {
                return Some(PointerTarget::ResizeHandle(id.clone()));
            }
            DisplayItem::Text { id, rect, rotation, .. }
            | DisplayItem::Button { id, rect, rotation, .. }
            | DisplayItem::Image { id, rect, rotation, .. }
                if rect.contains_rotated(x, y, *rotation) =>
            {
                return Some(PointerTarget::Layer(id.clone()));
            }
            _ => {}
        }
    }
    Some(PointerTarget::Canvas)
}
