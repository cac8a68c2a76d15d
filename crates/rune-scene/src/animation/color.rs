//! Color and tone blends.
//!
//! Both run a single easing from 255 down to 0 and use its value as the
//! weight of the source: `floor((source * a + target * (255 - a)) / 255)`.

use super::easing::{Easing, EasingFunction};
use crate::object::{Color, Tone};
use crate::stage::{ObjectId, Stage};

fn blend(source: f64, target: f64, weight: f64) -> f64 {
    ((source * weight + target * (255.0 - weight)) / 255.0).floor()
}

fn weight(easing: &Easing) -> f64 {
    easing.value.clamp(0.0, 255.0)
}

fn start_weight(easing: &mut Easing, function: EasingFunction, duration: u32) {
    *easing = Easing::new(function);
    easing.start_value(255.0, 0.0, duration);
}

/// Blends `object.color` toward a target color.
#[derive(Debug, Clone)]
pub struct ColorAnimation {
    pub target: Color,
    source: Color,
    easing: Easing,
}

impl ColorAnimation {
    pub fn new(target: Color) -> Self {
        Self {
            target,
            source: target,
            easing: Easing::default(),
        }
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) -> bool {
        let Some(object) = stage.get(object) else {
            return false;
        };
        self.source = object.color;
        start_weight(&mut self.easing, function, duration);
        self.source == self.target
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        self.easing.stop();
        if let Some(object) = stage.get_mut(object) {
            object.color = self.target;
        }
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        if !self.easing.is_running {
            return false;
        }
        self.easing.update_value();
        let a = weight(&self.easing);
        let (source, target) = (self.source, self.target);
        let channel = |s: u8, t: u8| blend(s as f64, t as f64, a).clamp(0.0, 255.0) as u8;
        if let Some(object) = stage.get_mut(object) {
            object.color = Color {
                red: channel(source.red, target.red),
                green: channel(source.green, target.green),
                blue: channel(source.blue, target.blue),
                alpha: channel(source.alpha, target.alpha),
            };
        }
        !self.easing.is_running
    }
}

/// Blends `object.tone` toward a target tone.
#[derive(Debug, Clone)]
pub struct TintAnimation {
    pub target: Tone,
    source: Tone,
    easing: Easing,
}

impl TintAnimation {
    pub fn new(target: Tone) -> Self {
        Self {
            target,
            source: target,
            easing: Easing::default(),
        }
    }

    pub(super) fn begin(&mut self, stage: &mut Stage, object: ObjectId, duration: u32, function: EasingFunction) -> bool {
        let Some(object) = stage.get(object) else {
            return false;
        };
        self.source = object.tone;
        start_weight(&mut self.easing, function, duration);
        self.source == self.target
    }

    pub(super) fn finish(&mut self, stage: &mut Stage, object: ObjectId) {
        self.easing.stop();
        if let Some(object) = stage.get_mut(object) {
            object.tone = self.target;
        }
    }

    pub(super) fn advance(&mut self, stage: &mut Stage, object: ObjectId) -> bool {
        if !self.easing.is_running {
            return false;
        }
        self.easing.update_value();
        let a = weight(&self.easing);
        let (source, target) = (self.source, self.target);
        let channel = |s: i16, t: i16| blend(s as f64, t as f64, a) as i16;
        if let Some(object) = stage.get_mut(object) {
            object.tone = Tone {
                red: channel(source.red, target.red),
                green: channel(source.green, target.green),
                blue: channel(source.blue, target.blue),
                grey: channel(source.grey, target.grey),
            };
        }
        !self.easing.is_running
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::{Animation, AnimationRequest};
    use crate::component::ComponentHandle;
    use crate::object::GameObject;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(&mut Stage, ComponentHandle) + 'static) {
        let count = Rc::new(Cell::new(0));
        let probe = count.clone();
        (count, move |_: &mut Stage, _: ComponentHandle| probe.set(probe.get() + 1))
    }

    #[test]
    fn test_color_blend_starts_at_source_and_ends_at_target() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        stage.get_mut(id).unwrap().color = Color::rgba(200, 0, 100, 255);
        let (count, callback) = counter();

        let target = Color::rgba(0, 255, 100, 0);
        AnimationRequest::new(Animation::Color(ColorAnimation::new(target)), 10)
            .on_complete(callback)
            .start(&mut stage, id)
            .unwrap();
        assert_eq!(stage.get(id).unwrap().color, Color::rgba(200, 0, 100, 255));

        let mut previous_red = 200;
        for tick in 1..=10 {
            stage.update_object(id);
            let color = stage.get(id).unwrap().color;
            assert!(color.red <= previous_red, "red rose at tick {tick}");
            previous_red = color.red;
            assert_eq!(count.get(), u32::from(tick == 10));
        }
        assert_eq!(stage.get(id).unwrap().color, target);
        assert_eq!(stage.get(id).unwrap().component_count(), 0);

        stage.update_object(id);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_zero_duration_applies_target_and_fires_once() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        let (count, callback) = counter();

        let tone = Tone::new(-40, 20, 0, 128);
        AnimationRequest::new(Animation::Tint(TintAnimation::new(tone)), 0)
            .on_complete(callback)
            .start(&mut stage, id);
        assert_eq!(stage.get(id).unwrap().tone, tone);
        assert_eq!(count.get(), 1);
        assert_eq!(stage.get(id).unwrap().component_count(), 0);
    }

    #[test]
    fn test_already_at_target_reports_completion_twice() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        let (count, callback) = counter();

        AnimationRequest::new(Animation::Color(ColorAnimation::new(Color::WHITE)), 0)
            .on_complete(callback)
            .start(&mut stage, id);
        assert_eq!(count.get(), 2);

        let (count, callback) = counter();
        AnimationRequest::new(Animation::Color(ColorAnimation::new(Color::WHITE)), 4)
            .on_complete(callback)
            .start(&mut stage, id);
        assert_eq!(count.get(), 1);
        for _ in 0..4 {
            stage.update_object(id);
        }
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_tint_blend_truncates_toward_negative() {
        let mut stage = Stage::default();
        let id = stage.spawn(GameObject::default());
        AnimationRequest::new(Animation::Tint(TintAnimation::new(Tone::new(-255, 0, 0, 0))), 2)
            .start(&mut stage, id);
        stage.update_object(id);
        // a = 127.5: floor((0 * 127.5 + -255 * 127.5) / 255) = floor(-127.5)
        assert_eq!(stage.get(id).unwrap().tone.red, -128);
        stage.update_object(id);
        assert_eq!(stage.get(id).unwrap().tone.red, -255);
    }

    #[test]
    fn test_skip_animations_finishes_immediately() {
        let mut stage = Stage::default();
        stage.settings.skip_animations = true;
        let id = stage.spawn(GameObject::default());
        AnimationRequest::new(Animation::Color(ColorAnimation::new(Color::BLACK)), 30).start(&mut stage, id);
        assert_eq!(stage.get(id).unwrap().color, Color::BLACK);
        assert_eq!(stage.get(id).unwrap().component_count(), 0);
    }
}
