use super::easing::{Easing, EasingFunction};
use crate::stage::{ObjectId, Stage};

/// Eases the wobble effect's power and speed. Zero power switches it off.
#[derive(Debug, Clone)]
pub struct WobbleAnimation {
    power: f64,
    speed: f64,
    easing_power: Easing,
    easing_speed: Easing,
}

impl WobbleAnimation {
    pub fn new(power: f64, speed: f64) -> Self {
        Self {
            power,
            speed,
            easing_power: Easing::default(),
            easing_speed: Easing::default(),
        }
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) {
        let Some(object) = stage.get_mut(object) else {
            return;
        };
        let effect = &mut object.effects.wobble;
        let (power, speed) = if effect.enabled {
            (effect.power as f64, effect.speed as f64)
        } else {
            (0.0, 0.0)
        };
        effect.enabled = true;
        self.easing_power = Easing::new(function);
        self.easing_power.start_value(power, self.power, duration);
        self.easing_speed = Easing::new(function);
        self.easing_speed.start_value(speed, self.speed, duration);
    }

    fn apply(&self, stage: &mut Stage, object: ObjectId, power: f64, speed: f64, finished: bool) {
        if let Some(object) = stage.get_mut(object) {
            let effect = &mut object.effects.wobble;
            effect.power = power as f32;
            effect.speed = speed as f32;
            effect.phase += effect.speed;
            if finished && self.power == 0.0 {
                effect.enabled = false;
            }
        }
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        self.easing_power.stop();
        self.easing_speed.stop();
        self.apply(stage, object, self.power, self.speed, true);
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        if !self.easing_power.is_running {
            return false;
        }
        self.easing_power.update_value();
        self.easing_speed.update_value();
        let finished = !self.easing_power.is_running;
        self.apply(stage, object, self.easing_power.value, self.easing_speed.value, finished);
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationRequest};
    use crate::object::GameObject;

    #[test]
    fn test_wobble_ramps_up_then_switches_off() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        AnimationRequest::new(Animation::Wobble(WobbleAnimation::new(4.0, 2.0)), 4).start(&mut stage, id);
        for _ in 0..4 {
            stage.update_object(id);
        }
        let effect = stage.get(id).unwrap().effects.wobble;
        assert!(effect.enabled);
        assert_eq!((effect.power, effect.speed), (4.0, 2.0));

        AnimationRequest::new(Animation::Wobble(WobbleAnimation::new(0.0, 0.0)), 0).start(&mut stage, id);
        assert!(!stage.get(id).unwrap().effects.wobble.enabled);
    }
}
