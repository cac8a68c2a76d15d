//! Per-object animation entry point.
//!
//! The [`Animator`] is attached lazily the first time something animates an
//! object. It remembers which animation components it started so callers can
//! ask whether the object is still animating or stop everything at once.

use tracing::warn;

use super::color::{ColorAnimation, TintAnimation};
use super::component::{Animation, AnimationCallback, AnimationRequest};
use super::descriptor::AnimationStep;
use super::easing::EasingFunction;
use super::field::FieldAnimation;
use super::mask::MaskAnimation;
use super::pixelate::PixelateAnimation;
use super::rotate::RotateAnimation;
use super::shake::ShakeAnimation;
use super::wobble::WobbleAnimation;
use crate::component::{Component, ComponentHandle};
use crate::object::{Color, Tone};
use crate::stage::{ObjectId, Stage};

#[derive(Debug, Default)]
pub struct Animator {
    running: Vec<ComponentHandle>,
}

impl Component for Animator {
    fn name(&self) -> &'static str {
        "animator"
    }

    fn update(&mut self, stage: &mut Stage, _handle: ComponentHandle) {
        self.running.retain(|handle| stage.has_component(*handle));
    }

    fn dispose(&mut self, _stage: &mut Stage, _handle: ComponentHandle) {
        self.running.clear();
    }
}

impl Animator {
    /// Attach an animator to `id` unless it already has one.
    pub fn ensure(stage: &mut Stage, id: ObjectId) -> bool {
        stage.component::<Animator>(id).is_some() || stage.add_component(id, Animator::default()).is_some()
    }

    pub fn is_animating(stage: &Stage, id: ObjectId) -> bool {
        stage
            .component::<Animator>(id)
            .is_some_and(|animator| animator.running.iter().any(|handle| stage.has_component(*handle)))
    }

    /// Remove every animation started through this object's animator.
    pub fn stop_all(stage: &mut Stage, id: ObjectId) {
        let handles = stage
            .component_mut::<Animator>(id)
            .map(|animator| std::mem::take(&mut animator.running))
            .unwrap_or_default();
        for handle in handles {
            stage.remove_component(handle);
        }
    }

    /// Start `request` on `id` and track it while it runs.
    pub fn start(stage: &mut Stage, id: ObjectId, request: AnimationRequest) -> Option<ComponentHandle> {
        if !Self::ensure(stage, id) {
            return None;
        }
        let handle = request.start(stage, id)?;
        if stage.has_component(handle)
            && let Some(animator) = stage.component_mut::<Animator>(id)
        {
            animator.running.push(handle);
        }
        Some(handle)
    }

    fn run(
        stage: &mut Stage,
        id: ObjectId,
        animation: Animation,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        let request = AnimationRequest::new(animation, duration)
            .easing(easing)
            .with_callback(callback);
        Self::start(stage, id, request)
    }

    pub fn color_to(
        stage: &mut Stage,
        id: ObjectId,
        color: Color,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::run(stage, id, Animation::Color(ColorAnimation::new(color)), duration, easing, callback)
    }

    pub fn tint_to(
        stage: &mut Stage,
        id: ObjectId,
        tone: Tone,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::run(stage, id, Animation::Tint(TintAnimation::new(tone)), duration, easing, callback)
    }

    pub fn rotate_to(
        stage: &mut Stage,
        id: ObjectId,
        angle: f64,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::run(stage, id, Animation::Rotate(RotateAnimation::to(angle)), duration, easing, callback)
    }

    /// Spin by `speed` degrees per frame for `duration` frames, or forever when `duration` is 0.
    pub fn spin(stage: &mut Stage, id: ObjectId, speed: f64, duration: u32) -> Option<ComponentHandle> {
        let frames = (duration > 0).then_some(duration);
        Self::run(
            stage,
            id,
            Animation::Rotate(RotateAnimation::spin(speed, frames)),
            duration,
            EasingFunction::Linear,
            None,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn shake(
        stage: &mut Stage,
        id: ObjectId,
        range_x: f64,
        range_y: f64,
        speed: u32,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        let shake = ShakeAnimation::new(range_x, range_y, speed);
        Self::run(stage, id, Animation::Shake(shake), duration, easing, callback)
    }

    pub fn mask_in(
        stage: &mut Stage,
        id: ObjectId,
        vague: Option<f64>,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::run(stage, id, Animation::Mask(MaskAnimation::mask_in(vague)), duration, easing, callback)
    }

    pub fn mask_out(
        stage: &mut Stage,
        id: ObjectId,
        vague: Option<f64>,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::run(stage, id, Animation::Mask(MaskAnimation::mask_out(vague)), duration, easing, callback)
    }

    pub fn pixelate_to(
        stage: &mut Stage,
        id: ObjectId,
        width: f64,
        height: f64,
        duration: u32,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        let pixelate = PixelateAnimation::new(width, height);
        Self::run(stage, id, Animation::Pixelate(pixelate), duration, EasingFunction::Linear, callback)
    }

    pub fn wobble_to(
        stage: &mut Stage,
        id: ObjectId,
        power: f64,
        speed: f64,
        duration: u32,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        let wobble = WobbleAnimation::new(power, speed);
        Self::run(stage, id, Animation::Wobble(wobble), duration, EasingFunction::Linear, callback)
    }

    /// Ease any numeric properties addressed by field paths.
    pub fn field_to(
        stage: &mut Stage,
        id: ObjectId,
        fields: &[(&str, f64)],
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        let animation = match FieldAnimation::new(stage, fields.iter().copied()) {
            Ok(animation) => animation,
            Err(error) => {
                warn!(?error, object = %id, "cannot start field animation");
                return None;
            }
        };
        Self::run(stage, id, Animation::Field(animation), duration, easing, callback)
    }

    pub fn move_to(
        stage: &mut Stage,
        id: ObjectId,
        x: f64,
        y: f64,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::field_to(stage, id, &[("dstRect.x", x), ("dstRect.y", y)], duration, easing, callback)
    }

    pub fn zoom_to(
        stage: &mut Stage,
        id: ObjectId,
        x: f64,
        y: f64,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::field_to(stage, id, &[("zoom.x", x), ("zoom.y", y)], duration, easing, callback)
    }

    pub fn opacity_to(
        stage: &mut Stage,
        id: ObjectId,
        opacity: f64,
        duration: u32,
        easing: EasingFunction,
        callback: Option<AnimationCallback>,
    ) -> Option<ComponentHandle> {
        Self::field_to(stage, id, &[("opacity", opacity)], duration, easing, callback)
    }

    /// Start the animation a flow step describes on `target`.
    ///
    /// Parameters are evaluated relative to `owner`, the object whose flow
    /// the step belongs to. Missing parameters keep the target's current value.
    pub fn start_step(stage: &mut Stage, owner: ObjectId, target: ObjectId, step: &AnimationStep) -> Option<ComponentHandle> {
        let kind = step.kind.as_deref()?;
        let current = stage.get(target)?;
        let (color, tone, rect, zoom, opacity) = (current.color, current.tone, current.dst_rect, current.zoom, current.opacity);
        let number = |stage: &mut Stage, key: &str, default: f64| step.number(stage, owner, key).unwrap_or(default);
        let channel = |value: f64| value.clamp(0.0, 255.0) as u8;
        let tone_channel = |value: f64| value.clamp(-255.0, 255.0) as i16;

        let animation = match kind {
            "color" => Animation::Color(ColorAnimation::new(Color {
                red: channel(number(stage, "red", color.red as f64)),
                green: channel(number(stage, "green", color.green as f64)),
                blue: channel(number(stage, "blue", color.blue as f64)),
                alpha: channel(number(stage, "alpha", color.alpha as f64)),
            })),
            "tint" => Animation::Tint(TintAnimation::new(Tone {
                red: tone_channel(number(stage, "red", tone.red as f64)),
                green: tone_channel(number(stage, "green", tone.green as f64)),
                blue: tone_channel(number(stage, "blue", tone.blue as f64)),
                grey: tone_channel(number(stage, "grey", tone.grey as f64)).max(0),
            })),
            "rotate" => Animation::Rotate(RotateAnimation::to(number(stage, "angle", 0.0))),
            "spin" => {
                let frames = (step.duration > 0).then_some(step.duration);
                Animation::Rotate(RotateAnimation::spin(number(stage, "speed", 1.0), frames))
            }
            "shake" => Animation::Shake(ShakeAnimation::new(
                number(stage, "rangeX", 0.0),
                number(stage, "rangeY", 0.0),
                number(stage, "speed", 4.0).max(1.0) as u32,
            )),
            "maskIn" => Animation::Mask(MaskAnimation::mask_in(step.number(stage, owner, "vague"))),
            "maskOut" => Animation::Mask(MaskAnimation::mask_out(step.number(stage, owner, "vague"))),
            "pixelate" => Animation::Pixelate(PixelateAnimation::new(
                number(stage, "width", 1.0),
                number(stage, "height", 1.0),
            )),
            "wobble" => Animation::Wobble(WobbleAnimation::new(number(stage, "power", 0.0), number(stage, "speed", 0.0))),
            "move" | "zoom" | "opacity" | "field" => {
                let fields: Vec<(String, f64)> = match kind {
                    "move" => vec![
                        ("dstRect.x".into(), number(stage, "x", rect.x as f64)),
                        ("dstRect.y".into(), number(stage, "y", rect.y as f64)),
                    ],
                    "zoom" => vec![
                        ("zoom.x".into(), number(stage, "x", zoom.x as f64)),
                        ("zoom.y".into(), number(stage, "y", zoom.y as f64)),
                    ],
                    "opacity" => vec![("opacity".into(), number(stage, "value", opacity as f64))],
                    _ => {
                        let Some(field) = step.field.clone() else {
                            warn!(object = %owner, "field animation step without a field");
                            return None;
                        };
                        vec![(field, number(stage, "value", 0.0))]
                    }
                };
                let paths = fields.iter().map(|(path, value)| (path.as_str(), *value));
                match FieldAnimation::new(stage, paths) {
                    Ok(animation) => Animation::Field(animation),
                    Err(error) => {
                        warn!(?error, object = %owner, "cannot start field animation");
                        return None;
                    }
                }
            }
            other => {
                warn!(kind = other, object = %owner, "unknown animation type");
                return None;
            }
        };

        let request = AnimationRequest::new(animation, step.duration).easing(step.easing_function());
        Self::start(stage, target, request)
    }
}
