//! The component that drives one running animation.

use tracing::trace;

use super::color::{ColorAnimation, TintAnimation};
use super::easing::EasingFunction;
use super::field::FieldAnimation;
use super::mask::MaskAnimation;
use super::pixelate::PixelateAnimation;
use super::rotate::RotateAnimation;
use super::shake::ShakeAnimation;
use super::wobble::WobbleAnimation;
use crate::component::{Component, ComponentHandle};
use crate::stage::{ObjectId, Stage};

/// Completion callback, invoked with the finished animation's handle.
pub type AnimationCallback = Box<dyn FnMut(&mut Stage, ComponentHandle)>;

/// Every animation kind the engine knows.
#[derive(Debug, Clone)]
pub enum Animation {
    Color(ColorAnimation),
    Tint(TintAnimation),
    Rotate(RotateAnimation),
    Shake(ShakeAnimation),
    Mask(MaskAnimation),
    Pixelate(PixelateAnimation),
    Wobble(WobbleAnimation),
    Field(FieldAnimation),
}

impl Animation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Tint(_) => "tint",
            Self::Rotate(_) => "rotate",
            Self::Shake(_) => "shake",
            Self::Mask(_) => "mask",
            Self::Pixelate(_) => "pixelate",
            Self::Wobble(_) => "wobble",
            Self::Field(_) => "field",
        }
    }

    /// Endless animations only stop when removed.
    pub fn is_endless(&self) -> bool {
        matches!(self, Self::Rotate(rotate) if rotate.is_endless())
    }

    /// Arm the easings from the target's current state.
    ///
    /// Returns true when the target already shows the end state.
    fn begin(&mut self, stage: &mut Stage, target: ObjectId, duration: u32, easing: EasingFunction) -> bool {
        match self {
            Self::Color(animation) => animation.begin(stage, target, duration, easing),
            Self::Tint(animation) => animation.begin(stage, target, duration, easing),
            Self::Rotate(animation) => {
                animation.begin(stage, target, duration, easing);
                false
            }
            Self::Shake(animation) => {
                animation.begin(stage, target, duration, easing);
                false
            }
            Self::Mask(animation) => animation.begin(stage, target, duration, easing),
            Self::Pixelate(animation) => {
                animation.begin(stage, target, duration, easing);
                false
            }
            Self::Wobble(animation) => {
                animation.begin(stage, target, duration, easing);
                false
            }
            Self::Field(animation) => {
                animation.begin(stage, target, duration, easing);
                false
            }
        }
    }

    /// Jump straight to the end state.
    fn finish(&mut self, stage: &mut Stage, target: ObjectId) {
        match self {
            Self::Color(animation) => animation.finish(stage, target),
            Self::Tint(animation) => animation.finish(stage, target),
            Self::Rotate(animation) => animation.finish(stage, target),
            Self::Shake(animation) => animation.finish(stage, target),
            Self::Mask(animation) => animation.finish(stage, target),
            Self::Pixelate(animation) => animation.finish(stage, target),
            Self::Wobble(animation) => animation.finish(stage, target),
            Self::Field(animation) => animation.finish(stage, target),
        }
    }

    /// Advance one frame. Returns true on the frame the animation completes.
    fn advance(&mut self, stage: &mut Stage, target: ObjectId) -> bool {
        match self {
            Self::Color(animation) => animation.advance(stage, target),
            Self::Tint(animation) => animation.advance(stage, target),
            Self::Rotate(animation) => animation.advance(stage, target),
            Self::Shake(animation) => animation.advance(stage, target),
            Self::Mask(animation) => animation.advance(stage, target),
            Self::Pixelate(animation) => animation.advance(stage, target),
            Self::Wobble(animation) => animation.advance(stage, target),
            Self::Field(animation) => animation.advance(stage, target),
        }
    }
}

/// Parameters for starting an animation on an object.
pub struct AnimationRequest {
    pub animation: Animation,
    pub duration: u32,
    pub easing: EasingFunction,
    pub callback: Option<AnimationCallback>,
}

impl AnimationRequest {
    pub fn new(animation: Animation, duration: u32) -> Self {
        Self {
            animation,
            duration,
            easing: EasingFunction::Linear,
            callback: None,
        }
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut(&mut Stage, ComponentHandle) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn with_callback(mut self, callback: Option<AnimationCallback>) -> Self {
        self.callback = callback;
        self
    }

    /// Attach the animation to `target` and start it.
    ///
    /// With a zero duration, or while the stage skips animations, the end state
    /// is applied and the callback fired before this returns; the component is
    /// removed again right away.
    pub fn start(self, stage: &mut Stage, target: ObjectId) -> Option<ComponentHandle> {
        let component = AnimationComponent {
            animation: self.animation,
            callback: self.callback,
            running: false,
        };
        let handle = stage.add_component(target, component)?;
        let (duration, easing) = (self.duration, self.easing);
        stage.with_handle::<AnimationComponent, _>(handle, |component, stage| {
            component.begin(stage, handle, duration, easing);
        });
        Some(handle)
    }
}

/// Runs one [`Animation`] until it completes, then removes itself.
pub struct AnimationComponent {
    animation: Animation,
    callback: Option<AnimationCallback>,
    running: bool,
}

impl std::fmt::Debug for AnimationComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationComponent")
            .field("animation", &self.animation)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl AnimationComponent {
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn begin(&mut self, stage: &mut Stage, handle: ComponentHandle, duration: u32, easing: EasingFunction) {
        let settled = self.animation.begin(stage, handle.object, duration, easing);
        // Already at the target: report completion now. The branch below still
        // runs and may report it a second time.
        if settled {
            self.complete(stage, handle);
        }

        let endless = self.animation.is_endless();
        if !endless && (duration == 0 || stage.settings.skip_animations) {
            self.animation.finish(stage, handle.object);
            self.complete(stage, handle);
            stage.remove_component(handle);
        } else {
            self.running = true;
            trace!(kind = self.animation.kind(), object = %handle.object, duration, "animation started");
        }
    }

    fn complete(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        if let Some(callback) = self.callback.as_mut() {
            callback(stage, handle);
        }
    }
}

impl Component for AnimationComponent {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn update(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        if !self.running {
            return;
        }
        if self.animation.advance(stage, handle.object) {
            self.running = false;
            trace!(kind = self.animation.kind(), object = %handle.object, "animation finished");
            self.complete(stage, handle);
            stage.remove_component(handle);
        }
    }
}
