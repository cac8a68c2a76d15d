use serde::{Deserialize, Serialize};

use super::{set_index, LayoutBehavior};
use crate::object::Alignment;
use crate::stage::{ObjectId, Stage};

/// Children keep their own coordinates, except on axes where they request
/// center or end alignment inside the parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeLayout {
    /// Grow the parent to the extent of its unaligned children.
    #[serde(default)]
    pub size_to_fit: bool,
}

impl FreeLayout {
    pub fn size_to_fit() -> Self {
        Self { size_to_fit: true }
    }

    pub(super) fn arrange(&self, stage: &mut Stage, parent: ObjectId, children: &[ObjectId]) {
        if self.size_to_fit {
            self.fit_parent(stage, parent, children);
        }
        let Some(object) = stage.get(parent) else {
            return;
        };
        let (parent_rect, parent_zoom) = (object.dst_rect, object.zoom);

        for (index, &child) in children.iter().enumerate() {
            set_index(stage, child, index);
            if let Some(object) = stage.get_mut(child) {
                let (rect, zoom) = (object.dst_rect, object.zoom);
                if let Some(alignment) = object.alignment_x {
                    object.dst_rect.x = aligned(alignment, parent_rect.width * parent_zoom.x, rect.width * zoom.x, rect.x);
                }
                if let Some(alignment) = object.alignment_y {
                    object.dst_rect.y = aligned(alignment, parent_rect.height * parent_zoom.y, rect.height * zoom.y, rect.y);
                }
            }
            LayoutBehavior::update_control(stage, parent, child);
        }
    }

    fn fit_parent(&self, stage: &mut Stage, parent: ObjectId, children: &[ObjectId]) {
        let (mut width, mut height) = (0.0f32, 0.0f32);
        for object in children.iter().filter_map(|child| stage.get(*child)) {
            let rect = object.dst_rect;
            if object.alignment_x.is_none() {
                width = width.max(rect.x + rect.width);
            }
            if object.alignment_y.is_none() {
                height = height.max(rect.y + rect.height);
            }
        }
        if let Some(object) = stage.get_mut(parent) {
            object.dst_rect.width = width;
            object.dst_rect.height = height;
        }
    }
}

fn aligned(alignment: Alignment, outer: f32, inner: f32, current: f32) -> f32 {
    match alignment {
        Alignment::Start => current,
        Alignment::Center => (outer - inner) / 2.0,
        Alignment::End => outer - inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{GameObject, Rect, Vec2};

    #[test]
    fn test_alignment_accounts_for_zoom() {
        let mut stage = Stage::default();
        let parent = stage.spawn(GameObject::default().with_rect(Rect::new(0.0, 0.0, 200.0, 100.0)));
        let mut centered = GameObject::default().with_rect(Rect::new(7.0, 9.0, 50.0, 20.0));
        centered.alignment_x = Some(Alignment::Center);
        centered.alignment_y = Some(Alignment::End);
        centered.zoom = Vec2::new(2.0, 1.0);
        let child = stage.spawn(centered);
        stage.add_child(parent, child).unwrap();

        FreeLayout::default().arrange(&mut stage, parent, &[child]);
        let rect = stage.get(child).unwrap().dst_rect;
        assert_eq!((rect.x, rect.y), (50.0, 80.0));
    }

    #[test]
    fn test_size_to_fit_ignores_aligned_axes() {
        let mut stage = Stage::default();
        let parent = stage.spawn(GameObject::default());
        let a = stage.spawn(GameObject::default().with_rect(Rect::new(10.0, 10.0, 40.0, 40.0)));
        let mut wide = GameObject::default().with_rect(Rect::new(0.0, 0.0, 500.0, 30.0));
        wide.alignment_x = Some(Alignment::Center);
        let b = stage.spawn(wide);

        FreeLayout::size_to_fit().arrange(&mut stage, parent, &[a, b]);
        let rect = stage.get(parent).unwrap().dst_rect;
        assert_eq!((rect.width, rect.height), (50.0, 50.0));
        assert_eq!(stage.get(b).unwrap().index, 1);
    }
}
