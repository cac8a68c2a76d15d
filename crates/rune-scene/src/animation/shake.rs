use super::easing::{Easing, EasingFunction};
use crate::stage::{ObjectId, Stage};

/// Shakes `object.offset` back and forth between `+range` and `-range`.
///
/// Each swing is one easing segment of `speed` frames; a new segment starts in
/// the opposite direction whenever the previous one ends. The whole shake
/// lasts `duration` frames and leaves the offset at zero.
#[derive(Debug, Clone)]
pub struct ShakeAnimation {
    range_x: f64,
    range_y: f64,
    speed: u32,
    remaining: u32,
    direction: f64,
    function: EasingFunction,
    easing_x: Easing,
    easing_y: Easing,
}

impl ShakeAnimation {
    pub fn new(range_x: f64, range_y: f64, speed: u32) -> Self {
        Self {
            range_x,
            range_y,
            speed: speed.max(1),
            remaining: 0,
            direction: 1.0,
            function: EasingFunction::Linear,
            easing_x: Easing::default(),
            easing_y: Easing::default(),
        }
    }

    fn swing(&mut self, from_x: f64, from_y: f64) {
        self.easing_x = Easing::new(self.function);
        self.easing_x.start_value(from_x, self.range_x * self.direction, self.speed);
        self.easing_y = Easing::new(self.function);
        self.easing_y.start_value(from_y, self.range_y * self.direction, self.speed);
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) {
        let Some(object) = stage.get(object) else {
            return;
        };
        let (x, y) = (object.offset.x as f64, object.offset.y as f64);
        self.function = function;
        self.remaining = duration;
        self.direction = 1.0;
        self.swing(x, y);
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        self.remaining = 0;
        self.easing_x.stop();
        self.easing_y.stop();
        if let Some(object) = stage.get_mut(object) {
            object.offset.x = 0.0;
            object.offset.y = 0.0;
        }
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.easing_x.update_value();
        self.easing_y.update_value();
        let (x, y) = (self.easing_x.value, self.easing_y.value);
        if let Some(object) = stage.get_mut(object) {
            object.offset.x = x as f32;
            object.offset.y = y as f32;
        }
        if !self.easing_x.is_running {
            self.direction = -self.direction;
            self.swing(x, y);
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            self.finish(stage, object);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::{Animation, AnimationRequest};
    use crate::object::GameObject;

    #[test]
    fn test_shake_bounces_then_rests_at_zero() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        let done = Rc::new(Cell::new(0));
        let probe = done.clone();
        AnimationRequest::new(Animation::Shake(ShakeAnimation::new(8.0, 0.0, 2)), 7)
            .on_complete(move |_, _| probe.set(probe.get() + 1))
            .start(&mut stage, id);

        let mut seen = Vec::new();
        for _ in 0..6 {
            stage.update_object(id);
            seen.push(stage.get(id).unwrap().offset.x);
        }
        assert_eq!(seen, vec![4.0, 8.0, 0.0, -8.0, 0.0, 8.0]);
        assert_eq!(done.get(), 0);

        stage.update_object(id);
        assert_eq!(stage.get(id).unwrap().offset.x, 0.0);
        assert_eq!(done.get(), 1);
        assert_eq!(stage.get(id).unwrap().component_count(), 0);
    }
}
