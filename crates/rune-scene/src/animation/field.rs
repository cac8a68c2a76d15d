use std::rc::Rc;

use tracing::warn;

use super::easing::{Easing, EasingFunction};
use crate::binding::{resolve_field_path, FieldPath};
use crate::error::Result;
use crate::stage::{ObjectId, Stage};
use crate::value::Value;

#[derive(Debug, Clone)]
struct Track {
    path: Rc<FieldPath>,
    target: f64,
    easing: Easing,
}

/// Eases one or more numeric properties addressed by field paths.
///
/// Move, zoom and opacity animations are field animations over
/// `dstRect.x`/`dstRect.y`, `zoom.x`/`zoom.y` and `opacity`.
#[derive(Debug, Clone)]
pub struct FieldAnimation {
    tracks: Vec<Track>,
}

impl FieldAnimation {
    /// Compile each `(path, target)` pair through the stage's path cache.
    pub fn new<'a>(stage: &mut Stage, fields: impl IntoIterator<Item = (&'a str, f64)>) -> Result<Self> {
        let tracks = fields
            .into_iter()
            .map(|(path, target)| {
                Ok(Track {
                    path: resolve_field_path(stage, path)?,
                    target,
                    easing: Easing::default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { tracks })
    }

    fn write(stage: &mut Stage, object: ObjectId, track: &Track, value: f64) {
        if let Err(error) = track.path.set(stage, object, Value::Number(value)) {
            warn!(?error, %object, path = %track.path, "field animation cannot write");
        }
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) {
        for track in &mut self.tracks {
            let current = match track.path.get(stage, object) {
                Ok(value) => value.as_f64().unwrap_or(0.0),
                Err(error) => {
                    warn!(?error, %object, path = %track.path, "field animation cannot read");
                    0.0
                }
            };
            track.easing = Easing::new(function);
            track.easing.start_value(current, track.target, duration);
        }
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        for track in &mut self.tracks {
            track.easing.stop();
            Self::write(stage, object, track, track.target);
        }
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        let mut running = false;
        let mut advanced = false;
        for track in &mut self.tracks {
            if !track.easing.is_running {
                continue;
            }
            track.easing.update_value();
            Self::write(stage, object, track, track.easing.value);
            advanced = true;
            running |= track.easing.is_running;
        }
        advanced && !running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationRequest};
    use crate::object::GameObject;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_moves_several_fields_together() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        let animation = FieldAnimation::new(&mut stage, [("dstRect.x", 100.0), ("dstRect.y", -50.0)]).unwrap();
        AnimationRequest::new(Animation::Field(animation), 4).start(&mut stage, id);

        stage.update_object(id);
        let rect = stage.get(id).unwrap().dst_rect;
        assert!(approx(rect.x, 25.0) && approx(rect.y, -12.5));
        for _ in 0..3 {
            stage.update_object(id);
        }
        let rect = stage.get(id).unwrap().dst_rect;
        assert_eq!((rect.x, rect.y), (100.0, -50.0));
        assert_eq!(stage.get(id).unwrap().component_count(), 0);
    }

    #[test]
    fn test_free_form_fields_animate_from_null_as_zero() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        let animation = FieldAnimation::new(&mut stage, [("glow", 10.0)]).unwrap();
        AnimationRequest::new(Animation::Field(animation), 2).start(&mut stage, id);
        stage.update_object(id);
        assert_eq!(stage.get(id).unwrap().fields["glow"], Value::Number(5.0));
    }

    #[test]
    fn test_malformed_path_is_rejected_up_front() {
        let mut stage = Stage::default();
        assert!(FieldAnimation::new(&mut stage, [("dstRect.", 1.0)]).is_err());
    }
}
