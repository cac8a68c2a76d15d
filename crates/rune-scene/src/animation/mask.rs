use super::easing::{Easing, EasingFunction};
use crate::stage::{ObjectId, Stage};

/// Mask threshold at which the object is fully revealed.
pub const MASK_REVEALED: f64 = 255.0;

/// Moves `object.mask.value` toward a threshold.
///
/// The mask is enabled while the animation runs. Revealing disables it again
/// once the object is fully shown.
#[derive(Debug, Clone)]
pub struct MaskAnimation {
    target: f64,
    vague: Option<f64>,
    disable_on_finish: bool,
    easing: Easing,
}

impl MaskAnimation {
    /// Reveal the object: threshold climbs to [`MASK_REVEALED`].
    pub fn mask_in(vague: Option<f64>) -> Self {
        Self {
            target: MASK_REVEALED,
            vague,
            disable_on_finish: true,
            easing: Easing::default(),
        }
    }

    /// Hide the object: threshold falls to 0 and the mask stays on.
    pub fn mask_out(vague: Option<f64>) -> Self {
        Self {
            target: 0.0,
            vague,
            disable_on_finish: false,
            easing: Easing::default(),
        }
    }

    /// Move the threshold to an arbitrary value.
    pub fn mask_to(value: f64, vague: Option<f64>) -> Self {
        Self {
            target: value.clamp(0.0, MASK_REVEALED),
            vague,
            disable_on_finish: false,
            easing: Easing::default(),
        }
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) -> bool {
        let Some(object) = stage.get_mut(object) else {
            return false;
        };
        let mask = &mut object.mask;
        let current = if mask.enabled {
            mask.value as f64
        } else if self.disable_on_finish {
            0.0
        } else {
            MASK_REVEALED
        };
        mask.enabled = true;
        mask.value = current as f32;
        if let Some(vague) = self.vague {
            mask.vague = vague as f32;
        }
        self.easing = Easing::new(function);
        self.easing.start_value(current, self.target, duration);
        current == self.target
    }

    fn apply(&self, stage: &mut Stage, object: ObjectId, value: f64, finished: bool) {
        if let Some(object) = stage.get_mut(object) {
            object.mask.value = value as f32;
            if finished && self.disable_on_finish {
                object.mask.enabled = false;
            }
        }
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        self.easing.stop();
        self.apply(stage, object, self.target, true);
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        if !self.easing.is_running {
            return false;
        }
        self.easing.update_value();
        let finished = !self.easing.is_running;
        self.apply(stage, object, self.easing.value, finished);
        finished
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
    fn test_mask_in_reveals_and_disables() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        AnimationRequest::new(Animation::Mask(MaskAnimation::mask_in(Some(16.0))), 4).start(&mut stage, id);
        assert!(stage.get(id).unwrap().mask.enabled);
        assert_eq!(stage.get(id).unwrap().mask.vague, 16.0);

        stage.update_object(id);
        stage.update_object(id);
        assert_eq!(stage.get(id).unwrap().mask.value, 127.5);
        stage.update_object(id);
        stage.update_object(id);
        let mask = &stage.get(id).unwrap().mask;
        assert_eq!(mask.value, 255.0);
        assert!(!mask.enabled);
    }

    #[test]
    fn test_mask_out_when_already_hidden_reports_twice() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        {
            let mask = &mut stage.get_mut(id).unwrap().mask;
            mask.enabled = true;
            mask.value = 0.0;
        }
        let count = Rc::new(Cell::new(0));
        let probe = count.clone();
        AnimationRequest::new(Animation::Mask(MaskAnimation::mask_out(None)), 0)
            .on_complete(move |_, _| probe.set(probe.get() + 1))
            .start(&mut stage, id);
        assert_eq!(count.get(), 2);
        assert!(stage.get(id).unwrap().mask.enabled);
    }
}
