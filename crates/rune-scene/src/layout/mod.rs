//! Layout behaviors: arrange an object's children inside its rectangle.
//!
//! Every frame a [`LayoutBehavior`] measures its content (for scrollable
//! parents), applies mouse-wheel scrolling, then positions each live child in
//! list order through its [`LayoutKind`]. After a child is positioned it goes
//! through [`LayoutBehavior::update_control`], which propagates inherited
//! visual state and the parent's clip rectangle.

pub mod free;
pub mod grid;
pub mod spread;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentHandle};
use crate::object::UpdateBehavior;
use crate::stage::{ObjectId, Stage};

pub use free::FreeLayout;
pub use grid::{CellSpacing, GridLayout};
pub use spread::{Orientation, SpreadLayout};

/// Width and height of a layout's content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// The arrangement strategy of a [`LayoutBehavior`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutKind {
    Free(FreeLayout),
    Grid(GridLayout),
    Spread(SpreadLayout),
}

impl Default for LayoutKind {
    fn default() -> Self {
        Self::Free(FreeLayout::default())
    }
}

#[derive(Debug, Default)]
pub struct LayoutBehavior {
    pub kind: LayoutKind,
    content_size: Size,
}

impl LayoutBehavior {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            content_size: Size::default(),
        }
    }

    pub fn free(layout: FreeLayout) -> Self {
        Self::new(LayoutKind::Free(layout))
    }

    pub fn grid(layout: GridLayout) -> Self {
        Self::new(LayoutKind::Grid(layout))
    }

    pub fn spread(layout: SpreadLayout) -> Self {
        Self::new(LayoutKind::Spread(layout))
    }

    /// Extent of the children as measured on the last update.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Re-measure the children as the sum of their margin boxes on each axis.
    /// Only scrollable parents track content size.
    pub fn update_content_size(&mut self, stage: &Stage, parent: ObjectId) {
        if !stage.get(parent).is_some_and(|object| object.scrollable) {
            return;
        }
        let mut size = Size::default();
        for child in live_children(stage, parent) {
            let Some(object) = stage.get(child) else {
                continue;
            };
            let (rect, margin) = (object.dst_rect, object.margin);
            size.width += rect.width + margin.left + margin.right;
            size.height += rect.height + margin.top + margin.bottom;
        }
        self.content_size = size;
    }

    /// Apply this frame's wheel delta and keep the offset inside the scrollable range.
    pub fn update_scroll(&mut self, stage: &mut Stage, parent: ObjectId) {
        let delta = stage.services.input.wheel_delta * stage.settings.scroll_speed;
        let content_height = self.content_size.height;
        let Some(object) = stage.get_mut(parent) else {
            return;
        };
        if !object.scrollable {
            return;
        }
        let scrollable_height = (content_height - object.dst_rect.height).max(0.0);
        object.scroll_offset_y = (object.scroll_offset_y + delta).clamp(0.0, scrollable_height);
    }

    /// Finish laying out one child.
    ///
    /// Copies zoom, color, tone, angle, anchor and enabled from the parent when
    /// the child inherits properties, re-runs the child's update when it is
    /// dirty or continuously updated, and hands down the parent's clip rect.
    pub fn update_control(stage: &mut Stage, parent: ObjectId, child: ObjectId) {
        let Some(source) = stage.get(parent) else {
            return;
        };
        let (zoom, color, tone, angle, anchor, enabled) =
            (source.zoom, source.color, source.tone, source.angle, source.anchor, source.enabled);
        let clip_rect = source.clip_rect;

        let Some(object) = stage.get_mut(child) else {
            return;
        };
        if object.inherit_properties {
            object.zoom = zoom;
            object.color = color;
            object.tone = tone;
            object.angle = angle;
            object.anchor = anchor;
            object.enabled = enabled;
        }
        let refresh = object.needs_update || object.update_behavior == UpdateBehavior::Continuous;
        object.needs_update = false;
        object.clip_rect = clip_rect;

        if refresh {
            stage.update_object(child);
        }
    }

    fn arrange(&self, stage: &mut Stage, parent: ObjectId) {
        let children = live_children(stage, parent);
        match &self.kind {
            LayoutKind::Free(layout) => layout.arrange(stage, parent, &children),
            LayoutKind::Grid(layout) => layout.arrange(stage, parent, &children),
            LayoutKind::Spread(layout) => layout.arrange(stage, parent, &children),
        }
    }
}

impl Component for LayoutBehavior {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn update(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        self.update_content_size(stage, handle.object);
        self.update_scroll(stage, handle.object);
        self.arrange(stage, handle.object);
    }
}

/// Children of the active domain that still exist, in list order.
pub(crate) fn live_children(stage: &Stage, parent: ObjectId) -> Vec<ObjectId> {
    stage
        .get(parent)
        .map(|object| {
            object
                .sub_objects
                .iter()
                .flatten()
                .copied()
                .filter(|child| stage.is_alive(*child))
                .collect()
        })
        .unwrap_or_default()
}

/// Store each child's position in the layout.
pub(crate) fn set_index(stage: &mut Stage, child: ObjectId, index: usize) {
    if let Some(object) = stage.get_mut(child) {
        object.index = index;
    }
}
