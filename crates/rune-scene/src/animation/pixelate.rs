use super::easing::{Easing, EasingFunction};
use crate::stage::{ObjectId, Stage};

/// Eases the pixelation block size. A 1x1 target switches the effect off.
#[derive(Debug, Clone)]
pub struct PixelateAnimation {
    width: f64,
    height: f64,
    easing_width: Easing,
    easing_height: Easing,
}

impl PixelateAnimation {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            easing_width: Easing::default(),
            easing_height: Easing::default(),
        }
    }

    fn clears_effect(&self) -> bool {
        self.width <= 1.0 && self.height <= 1.0
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) {
        let Some(object) = stage.get_mut(object) else {
            return;
        };
        let effect = &mut object.effects.pixelate;
        let (width, height) = if effect.enabled {
            (effect.width as f64, effect.height as f64)
        } else {
            (1.0, 1.0)
        };
        effect.enabled = true;
        self.easing_width = Easing::new(function);
        self.easing_width.start_value(width, self.width, duration);
        self.easing_height = Easing::new(function);
        self.easing_height.start_value(height, self.height, duration);
    }

    fn apply(&self, stage: &mut Stage, object: ObjectId, width: f64, height: f64, finished: bool) {
        if let Some(object) = stage.get_mut(object) {
            let effect = &mut object.effects.pixelate;
            effect.width = width as f32;
            effect.height = height as f32;
            if finished && self.clears_effect() {
                effect.enabled = false;
            }
        }
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        self.easing_width.stop();
        self.easing_height.stop();
        self.apply(stage, object, self.width, self.height, true);
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        if !self.easing_width.is_running {
            return false;
        }
        self.easing_width.update_value();
        self.easing_height.update_value();
        let finished = !self.easing_width.is_running;
        self.apply(stage, object, self.easing_width.value, self.easing_height.value, finished);
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationRequest};
    use crate::object::GameObject;

    #[test]
    fn test_pixelate_in_and_back_out() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        AnimationRequest::new(Animation::Pixelate(PixelateAnimation::new(9.0, 5.0)), 2).start(&mut stage, id);
        stage.update_object(id);
        let effect = stage.get(id).unwrap().effects.pixelate;
        assert!(effect.enabled);
        assert_eq!((effect.width, effect.height), (5.0, 3.0));
        stage.update_object(id);

        AnimationRequest::new(Animation::Pixelate(PixelateAnimation::new(1.0, 1.0)), 0).start(&mut stage, id);
        let effect = stage.get(id).unwrap().effects.pixelate;
        assert!(!effect.enabled);
        assert_eq!((effect.width, effect.height), (1.0, 1.0));
    }
}
