use super::easing::{Easing, EasingFunction};
use crate::stage::{ObjectId, Stage};

#[derive(Debug, Clone, Copy, PartialEq)]
enum RotateMode {
    /// Ease `angle` to a fixed value.
    To(f64),
    /// Turn by `speed` degrees per frame, for a number of frames or forever.
    Spin { speed: f64, frames: Option<u32> },
}

/// Animates `object.angle`.
#[derive(Debug, Clone)]
pub struct RotateAnimation {
    mode: RotateMode,
    base: f64,
    remaining: Option<u32>,
    easing: Easing,
}

impl RotateAnimation {
    pub fn to(angle: f64) -> Self {
        Self::with_mode(RotateMode::To(angle))
    }

    /// Spin by `speed` degrees per frame. `frames: None` spins until removed.
    pub fn spin(speed: f64, frames: Option<u32>) -> Self {
        Self::with_mode(RotateMode::Spin { speed, frames })
    }

    fn with_mode(mode: RotateMode) -> Self {
        Self {
            mode,
            base: 0.0,
            remaining: None,
            easing: Easing::default(),
        }
    }

    pub fn is_endless(&self) -> bool {
        matches!(self.mode, RotateMode::Spin { frames: None, .. })
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) {
        let Some(object) = stage.get(object) else {
            return;
        };
        let current = object.angle as f64;
        match self.mode {
            RotateMode::To(angle) => {
                self.easing = Easing::new(function);
                self.easing.start_value(current, angle, duration);
            }
            RotateMode::Spin { speed, frames } => {
                self.base = current;
                self.remaining = frames.map(|frames| frames.max(1));
                // One endless linear turn per full revolution.
                let period = if speed == 0.0 {
                    1
                } else {
                    (360.0 / speed.abs()).round().max(1.0) as u32
                };
                let turn = if speed == 0.0 { 0.0 } else { 360.0 * speed.signum() };
                self.easing = Easing::new(EasingFunction::Linear);
                self.easing.start_endless(0.0, turn, period);
            }
        }
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        self.easing.stop();
        if let RotateMode::To(angle) = self.mode
            && let Some(object) = stage.get_mut(object)
        {
            object.angle = angle as f32;
        }
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        if !self.easing.is_running {
            return false;
        }
        self.easing.update_value();
        let angle = match self.mode {
            RotateMode::To(_) => self.easing.value,
            RotateMode::Spin { .. } => (self.base + self.easing.value).rem_euclid(360.0),
        };
        if let Some(object) = stage.get_mut(object) {
            object.angle = angle as f32;
        }

        match (&self.mode, &mut self.remaining) {
            (RotateMode::To(_), _) => !self.easing.is_running,
            (RotateMode::Spin { .. }, Some(remaining)) => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    self.easing.stop();
                    true
                } else {
                    false
                }
            }
            (RotateMode::Spin { .. }, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationRequest};
    use crate::object::GameObject;

    #[test]
    fn test_rotate_to_reaches_angle() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        AnimationRequest::new(Animation::Rotate(RotateAnimation::to(90.0)), 3).start(&mut stage, id);
        for _ in 0..3 {
            stage.update_object(id);
        }
        assert_eq!(stage.get(id).unwrap().angle, 90.0);
        assert_eq!(stage.get(id).unwrap().component_count(), 0);
    }

    #[test]
    fn test_endless_spin_wraps_and_survives_skip() {
        let mut stage = Stage::default();
        stage.settings.skip_animations = true;
        let id = stage.spawn(GameObject::default());
        stage.get_mut(id).unwrap().angle = 350.0;
        AnimationRequest::new(Animation::Rotate(RotateAnimation::spin(20.0, None)), 0).start(&mut stage, id);

        stage.update_object(id);
        assert!((stage.get(id).unwrap().angle - 10.0).abs() < 1e-3);
        for _ in 0..40 {
            stage.update_object(id);
        }
        assert_eq!(stage.get(id).unwrap().component_count(), 1);
    }

    #[test]
    fn test_finite_spin_stops_after_frames() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        AnimationRequest::new(Animation::Rotate(RotateAnimation::spin(-10.0, Some(3))), 3).start(&mut stage, id);
        for _ in 0..3 {
            stage.update_object(id);
        }
        assert!((stage.get(id).unwrap().angle - 330.0).abs() < 1e-3);
        assert_eq!(stage.get(id).unwrap().component_count(), 0);
    }
}
