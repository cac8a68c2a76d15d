use serde::{Deserialize, Serialize};

use super::{set_index, LayoutBehavior};
use crate::stage::{ObjectId, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Distributes children evenly along one axis.
///
/// Horizontally the free space is split into `count - 1` gaps, so the first
/// and last child touch the parent's edges. Vertically it is split into
/// `count` gaps, leaving one trailing gap below the last child.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadLayout {
    #[serde(default)]
    pub orientation: Orientation,
    /// Center children on the other axis.
    #[serde(default)]
    pub center: bool,
}

impl SpreadLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            center: false,
        }
    }

    pub fn centered(mut self) -> Self {
        self.center = true;
        self
    }

    pub(super) fn arrange(&self, stage: &mut Stage, parent: ObjectId, children: &[ObjectId]) {
        let Some(object) = stage.get(parent) else {
            return;
        };
        let bounds = object.dst_rect;
        let count = children.len();
        if count == 0 {
            return;
        }

        let horizontal = self.orientation == Orientation::Horizontal;
        let occupied: f32 = children
            .iter()
            .filter_map(|child| stage.get(*child))
            .map(|object| if horizontal { object.dst_rect.width } else { object.dst_rect.height })
            .sum();
        let spacing = if horizontal {
            if count > 1 {
                (bounds.width - occupied) / (count - 1) as f32
            } else {
                0.0
            }
        } else {
            (bounds.height - occupied) / count as f32
        };

        let mut cursor = 0.0;
        for (index, &child) in children.iter().enumerate() {
            set_index(stage, child, index);
            if let Some(object) = stage.get_mut(child) {
                let rect = &mut object.dst_rect;
                if horizontal {
                    rect.x = cursor;
                    cursor += rect.width + spacing;
                    if self.center {
                        rect.y = (bounds.height - rect.height) / 2.0;
                    }
                } else {
                    rect.y = cursor;
                    cursor += rect.height + spacing;
                    if self.center {
                        rect.x = (bounds.width - rect.width) / 2.0;
                    }
                }
            }
            LayoutBehavior::update_control(stage, parent, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{GameObject, Rect};

    fn spread(layout: SpreadLayout, sizes: &[(f32, f32)]) -> Vec<Rect> {
        let mut stage = Stage::default();
        let parent = stage.spawn(GameObject::default().with_rect(Rect::new(0.0, 0.0, 100.0, 60.0)));
        let children: Vec<ObjectId> = sizes
            .iter()
            .map(|&(width, height)| {
                let child = stage.spawn(GameObject::default().with_rect(Rect::new(0.0, 0.0, width, height)));
                stage.add_child(parent, child).unwrap();
                child
            })
            .collect();
        stage.add_component(parent, LayoutBehavior::spread(layout));
        stage.update_object(parent);
        children.iter().map(|id| stage.get(*id).unwrap().dst_rect).collect()
    }

    #[test]
    fn test_horizontal_spans_the_full_width() {
        let rects = spread(SpreadLayout::new(Orientation::Horizontal).centered(), &[(20.0, 10.0); 3]);
        let xs: Vec<f32> = rects.iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![0.0, 40.0, 80.0]);
        assert!(rects.iter().all(|r| r.y == 25.0));
    }

    #[test]
    fn test_vertical_divides_by_count() {
        let rects = spread(SpreadLayout::new(Orientation::Vertical), &[(10.0, 10.0); 2]);
        let ys: Vec<f32> = rects.iter().map(|r| r.y).collect();
        assert_eq!(ys, vec![0.0, 30.0]);
    }

    #[test]
    fn test_single_horizontal_child_has_no_spacing() {
        let rects = spread(SpreadLayout::new(Orientation::Horizontal), &[(30.0, 10.0)]);
        assert_eq!(rects[0].x, 0.0);
        assert!(rects[0].x.is_finite());
    }
}
