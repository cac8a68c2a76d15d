//! Frame-stepped animations for game objects.
//!
//! # Architecture
//!
//! ```text
//! AnimationHandler          (interprets GameObject::animations flows)
//!   └── Animator            (per-object entry point, tracks running handles)
//!         └── AnimationComponent   (one per running animation)
//!               └── Animation      (color, tint, rotate, shake, mask,
//!                                   pixelate, wobble, field)
//!                     └── Easing   (value generator stepped once per frame)
//! ```
//!
//! Every animation is a component on its target. It advances once per
//! update of the target, fires its completion callback once, and removes
//! itself. With `skip_animations` set, non-endless animations complete on
//! the frame they start.

pub mod animator;
pub mod color;
pub mod component;
pub mod descriptor;
pub mod easing;
pub mod field;
pub mod handler;
pub mod mask;
pub mod pixelate;
pub mod rotate;
pub mod shake;
pub mod wobble;

pub use animator::Animator;
pub use color::{ColorAnimation, TintAnimation};
pub use component::{Animation, AnimationCallback, AnimationComponent, AnimationRequest};
pub use descriptor::{AnimationDescriptor, AnimationStep, Wait};
pub use easing::{EaseMode, Easing, EasingFunction, PennerCurve, StepPosition};
pub use field::FieldAnimation;
pub use handler::{AnimationHandler, CheckObject};
pub use mask::{MaskAnimation, MASK_REVEALED};
pub use pixelate::PixelateAnimation;
pub use rotate::RotateAnimation;
pub use shake::ShakeAnimation;
pub use wobble::WobbleAnimation;
