use serde::{Deserialize, Serialize};

use super::{set_index, LayoutBehavior};
use crate::stage::{ObjectId, Stage};

/// Space around every grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellSpacing {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Lays children out row by row in a `rows x columns` grid.
///
/// Only the window `[offset, offset + rows * columns)` of the child list is
/// placed, so paging through a long list is a matter of moving `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub rows: usize,
    pub columns: usize,
    #[serde(default)]
    pub cell_spacing: CellSpacing,
    #[serde(default)]
    pub offset: usize,
    /// Clip children to the parent's rectangle.
    #[serde(default)]
    pub clip: bool,
}

impl GridLayout {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cell_spacing: CellSpacing::default(),
            offset: 0,
            clip: false,
        }
    }

    pub fn with_spacing(mut self, spacing: CellSpacing) -> Self {
        self.cell_spacing = spacing;
        self
    }

    pub(super) fn arrange(&self, stage: &mut Stage, parent: ObjectId, children: &[ObjectId]) {
        if self.rows == 0 || self.columns == 0 {
            return;
        }
        if self.clip
            && let Some(object) = stage.get_mut(parent)
        {
            object.clip_rect = Some(object.dst_rect);
        }

        let spacing = self.cell_spacing;
        let (mut row, mut column) = (0, 0);
        let window = children.iter().enumerate().skip(self.offset).take(self.rows * self.columns);
        for (index, &child) in window {
            set_index(stage, child, index);
            if let Some(object) = stage.get_mut(child) {
                let rect = &mut object.dst_rect;
                rect.x = column as f32 * (rect.width + spacing.left + spacing.right) + spacing.left;
                rect.y = row as f32 * (rect.height + spacing.top + spacing.bottom) + spacing.top;
            }
            LayoutBehavior::update_control(stage, parent, child);

            column += 1;
            if column >= self.columns {
                column = 0;
                row += 1;
                if row >= self.rows {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{GameObject, Rect};

    fn grid_stage(count: usize, layout: GridLayout) -> (Stage, ObjectId, Vec<ObjectId>) {
        let mut stage = Stage::default();
        let parent = stage.spawn(GameObject::default().with_rect(Rect::new(0.0, 0.0, 300.0, 100.0)));
        let children: Vec<ObjectId> = (0..count)
            .map(|_| {
                let child = stage.spawn(GameObject::default().with_rect(Rect::new(-1.0, -1.0, 40.0, 25.0)));
                stage.add_child(parent, child).unwrap();
                child
            })
            .collect();
        stage.add_component(parent, LayoutBehavior::grid(layout));
        (stage, parent, children)
    }

    #[test]
    fn test_two_by_three_grid_positions() {
        let (mut stage, parent, children) = grid_stage(6, GridLayout::new(2, 3));
        stage.update_object(parent);
        for (k, child) in children.iter().enumerate() {
            let rect = stage.get(*child).unwrap().dst_rect;
            assert_eq!((rect.x, rect.y), ((k % 3) as f32 * 40.0, (k / 3) as f32 * 25.0), "child {k}");
            assert_eq!(stage.get(*child).unwrap().index, k);
        }
    }

    #[test]
    fn test_spacing_and_window() {
        let spacing = CellSpacing {
            left: 2.0,
            top: 1.0,
            right: 3.0,
            bottom: 4.0,
        };
        let mut layout = GridLayout::new(1, 2).with_spacing(spacing);
        layout.offset = 1;
        layout.clip = true;
        let (mut stage, parent, children) = grid_stage(4, layout);
        stage.update_object(parent);

        let rect = |id: ObjectId| stage.get(id).unwrap().dst_rect;
        assert_eq!((rect(children[0]).x, rect(children[0]).y), (-1.0, -1.0));
        assert_eq!((rect(children[1]).x, rect(children[1]).y), (2.0, 1.0));
        assert_eq!((rect(children[2]).x, rect(children[2]).y), (47.0, 1.0));
        assert_eq!((rect(children[3]).x, rect(children[3]).y), (-1.0, -1.0));
        assert_eq!(stage.get(children[2]).unwrap().clip_rect, Some(Rect::new(0.0, 0.0, 300.0, 100.0)));
    }
}
