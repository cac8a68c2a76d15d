//! Easing functions and the frame-stepped [`Easing`] value generator.
//!
//! Curves come in two families:
//! - CSS timing functions: `Linear`, `Ease`, `EaseIn`, `EaseOut`, `EaseInOut`,
//!   `CubicBezier` and `Steps`
//! - Penner curves (`sine`, `quad`, `cubic`, `quart`, `quint`, `expo`, `circ`,
//!   `back`, `elastic`, `bounce`) in `in`, `out` and `in_out` modes
//!
//! # Usage
//!
//! ```
//! use rune_scene::animation::easing::{Easing, EasingFunction};
//!
//! let mut easing = Easing::new(EasingFunction::from_name("quad_out").unwrap());
//! easing.start_value(0.0, 100.0, 10);
//! while easing.is_running {
//!     easing.update_value();
//! }
//! assert_eq!(easing.value, 100.0);
//! ```

use serde::{Deserialize, Serialize};

/// Position for stepped animations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Jump at the start of each interval (CSS `jump-start` / `start`).
    Start,
    /// Jump at the end of each interval (CSS `jump-end` / `end`).
    End,
    /// Jump at both start and end (CSS `jump-both`).
    Both,
    /// No jump at start or end (CSS `jump-none`).
    None,
}

impl Default for StepPosition {
    fn default() -> Self {
        Self::End
    }
}

/// Shape of a Penner easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PennerCurve {
    Sine,
    Quad,
    Cubic,
    Quart,
    Quint,
    Expo,
    Circ,
    Back,
    Elastic,
    Bounce,
}

/// Which end of a Penner curve is eased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EaseMode {
    In,
    Out,
    InOut,
}

/// Easing function for animation timing.
///
/// Easing functions map a linear progress value (0.0 to 1.0) to an eased
/// output value, controlling the rate of change over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,

    /// CSS `ease` - Slow start, fast middle, slow end.
    /// Equivalent to `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in` - Slow start, accelerating.
    /// Equivalent to `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out` - Fast start, decelerating.
    /// Equivalent to `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out` - Slow start and end, fast middle.
    /// Equivalent to `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Custom cubic bezier curve.
    /// Parameters: (x1, y1, x2, y2) - control points.
    /// x values must be in [0, 1], y values can be any float.
    CubicBezier {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },

    /// Stepped animation with discrete jumps.
    /// `steps` is the number of intervals (must be >= 1).
    Steps {
        count: u32,
        position: StepPosition,
    },

    /// One of the classic Penner curves.
    Penner { curve: PennerCurve, mode: EaseMode },
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::Linear
    }
}

impl EasingFunction {
    /// Evaluate the easing function at the given progress.
    ///
    /// # Arguments
    /// * `t` - Progress value from 0.0 to 1.0
    ///
    /// # Returns
    /// Eased progress value (may be outside 0.0-1.0 for some bezier curves)
    pub fn evaluate(&self, t: f32) -> f32 {
        // Clamp input to valid range
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
            Self::Steps { count, position } => stepped(*count, *position, t),
            Self::Penner { curve, mode } => penner(*curve, *mode, t),
        }
    }

    /// Parse a descriptor easing name such as `"ease_in"`, `"quad_in_out"` or `"bounce_out"`.
    ///
    /// Names are case-insensitive and accept `-` or `_` as separators. A bare
    /// Penner curve name (`"quad"`) means its `in_out` form.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        let css = match name.as_str() {
            "linear" => Some(Self::Linear),
            "ease" => Some(Self::Ease),
            "ease_in" => Some(Self::EaseIn),
            "ease_out" => Some(Self::EaseOut),
            "ease_in_out" => Some(Self::EaseInOut),
            _ => None,
        };
        if css.is_some() {
            return css;
        }

        let (curve, mode) = match name.split_once('_') {
            Some((curve, "in")) => (curve, EaseMode::In),
            Some((curve, "out")) => (curve, EaseMode::Out),
            Some((curve, "in_out")) => (curve, EaseMode::InOut),
            Some(_) => return None,
            None => (name.as_str(), EaseMode::InOut),
        };
        let curve = match curve {
            "sine" => PennerCurve::Sine,
            "quad" => PennerCurve::Quad,
            "cubic" => PennerCurve::Cubic,
            "quart" => PennerCurve::Quart,
            "quint" => PennerCurve::Quint,
            "expo" => PennerCurve::Expo,
            "circ" => PennerCurve::Circ,
            "back" => PennerCurve::Back,
            "elastic" => PennerCurve::Elastic,
            "bounce" => PennerCurve::Bounce,
            _ => return None,
        };
        Some(Self::Penner { curve, mode })
    }

    /// Create a custom cubic bezier easing function.
    ///
    /// # Arguments
    /// * `x1`, `y1` - First control point
    /// * `x2`, `y2` - Second control point
    ///
    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// Create a stepped easing function.
    ///
    /// # Arguments
    /// * `steps` - Number of steps (must be >= 1)
    /// * `position` - When the jump occurs
    ///
    /// # Panics
    /// Panics if steps is 0.
    pub fn steps(steps: u32, position: StepPosition) -> Self {
        assert!(steps >= 1, "Steps must be at least 1");
        Self::Steps {
            count: steps,
            position,
        }
    }
}

/// Evaluate a cubic bezier curve at time t.
///
/// This implementation uses Newton-Raphson iteration to find the t parameter
/// on the bezier curve corresponding to the input progress, then evaluates
/// the y coordinate at that point.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    // Handle edge cases
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    // Find the t parameter that gives us the desired x value
    let t = solve_bezier_x(x1, x2, progress);

    // Evaluate the y coordinate at t
    bezier_y(y1, y2, t)
}

/// Solve for t in the bezier x equation using Newton-Raphson iteration.
fn solve_bezier_x(x1: f32, x2: f32, target_x: f32) -> f32 {
    // Initial guess
    let mut t = target_x;

    // Newton-Raphson iteration
    for _ in 0..8 {
        let x = bezier_x(x1, x2, t) - target_x;
        if x.abs() < 1e-6 {
            break;
        }

        let dx = bezier_x_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }

        t -= x / dx;
        t = t.clamp(0.0, 1.0);
    }

    t
}

/// Calculate x coordinate on the bezier curve at parameter t.
/// Bezier formula: x(t) = 3(1-t)²t·x1 + 3(1-t)t²·x2 + t³
#[inline]
fn bezier_x(x1: f32, x2: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    3.0 * mt2 * t * x1 + 3.0 * mt * t2 * x2 + t3
}

/// Calculate y coordinate on the bezier curve at parameter t.
#[inline]
fn bezier_y(y1: f32, y2: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    3.0 * mt2 * t * y1 + 3.0 * mt * t2 * y2 + t3
}

/// Calculate derivative of x with respect to t.
/// dx/dt = 3(1-t)²·x1 + 6(1-t)t·(x2-x1) + 3t²·(1-x2)
#[inline]
fn bezier_x_derivative(x1: f32, x2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}

/// Evaluate stepped easing function.
fn stepped(steps: u32, position: StepPosition, t: f32) -> f32 {
    if steps == 0 {
        return t;
    }

    let steps_f = steps as f32;

    match position {
        StepPosition::Start => {
            // Jump at the start of each interval
            (t * steps_f).ceil() / steps_f
        }
        StepPosition::End => {
            // Jump at the end of each interval
            (t * steps_f).floor() / steps_f
        }
        StepPosition::Both => {
            // Add 1 to steps, jumps at both ends
            let total_steps = steps_f + 1.0;
            ((t * total_steps).floor() / steps_f).min(1.0)
        }
        StepPosition::None => {
            // Subtract 1 from effective steps, no jumps at ends
            if steps == 1 {
                // Special case: with 1 step and jump-none, we stay at 0.5
                0.5
            } else {
                let effective_steps = steps_f - 1.0;
                ((t * steps_f).floor() / effective_steps).min(1.0)
            }
        }
    }
}

fn penner(curve: PennerCurve, mode: EaseMode, t: f32) -> f32 {
    match mode {
        EaseMode::In => penner_in(curve, t),
        EaseMode::Out => 1.0 - penner_in(curve, 1.0 - t),
        EaseMode::InOut => {
            if t < 0.5 {
                penner_in(curve, t * 2.0) / 2.0
            } else {
                1.0 - penner_in(curve, (1.0 - t) * 2.0) / 2.0
            }
        }
    }
}

/// The `in` form of each curve; `out` and `in_out` are derived by reflection.
fn penner_in(curve: PennerCurve, t: f32) -> f32 {
    use std::f32::consts::{FRAC_PI_2, PI};

    match curve {
        PennerCurve::Sine => 1.0 - (t * FRAC_PI_2).cos(),
        PennerCurve::Quad => t * t,
        PennerCurve::Cubic => t * t * t,
        PennerCurve::Quart => t.powi(4),
        PennerCurve::Quint => t.powi(5),
        PennerCurve::Expo => {
            if t <= 0.0 {
                0.0
            } else {
                2f32.powf(10.0 * (t - 1.0))
            }
        }
        PennerCurve::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
        PennerCurve::Back => {
            const OVERSHOOT: f32 = 1.70158;
            t * t * ((OVERSHOOT + 1.0) * t - OVERSHOOT)
        }
        PennerCurve::Elastic => {
            if t <= 0.0 || t >= 1.0 {
                t
            } else {
                -(2f32.powf(10.0 * (t - 1.0))) * ((t - 1.075) * (2.0 * PI) / 0.3).sin()
            }
        }
        PennerCurve::Bounce => 1.0 - bounce_out(1.0 - t),
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Frame-stepped scalar interpolator.
///
/// `start_value` arms the generator; each `update_value` call advances one
/// frame and recomputes `value`. `is_running` stays true for exactly
/// `duration` calls. An endless easing wraps around instead of stopping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Easing {
    pub function: EasingFunction,
    pub start_value: f64,
    pub delta: f64,
    pub value: f64,
    pub duration: u32,
    pub time: u32,
    pub is_running: bool,
    pub is_endless: bool,
}

impl Easing {
    pub fn new(function: EasingFunction) -> Self {
        Self {
            function,
            ..Self::default()
        }
    }

    /// Interpolate from `start` to `end` over `duration` frames.
    pub fn start_value(&mut self, start: f64, end: f64, duration: u32) {
        self.start_value = start;
        self.delta = end - start;
        self.value = start;
        self.duration = duration;
        self.time = 0;
        self.is_endless = false;
        self.is_running = duration > 0;
        if duration == 0 {
            self.value = end;
        }
    }

    /// Interpolate from `start` to `end` over and over until stopped.
    pub fn start_endless(&mut self, start: f64, end: f64, duration: u32) {
        self.start_value(start, end, duration);
        self.is_endless = duration > 0;
    }

    pub fn stop(&mut self) {
        self.is_running = false;
        self.is_endless = false;
    }

    /// The value this easing ends on.
    pub fn end_value(&self) -> f64 {
        self.start_value + self.delta
    }

    /// Advance one frame.
    pub fn update_value(&mut self) {
        if !self.is_running {
            return;
        }
        self.time += 1;
        let progress = self.time as f32 / self.duration as f32;
        self.value = self.start_value + self.delta * self.function.evaluate(progress) as f64;
        if self.time >= self.duration {
            if self.is_endless {
                self.time = 0;
            } else {
                self.value = self.end_value();
                self.is_running = false;
            }
        }
    }
}
