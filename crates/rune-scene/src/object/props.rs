//! Plain property types carried by every game object.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in parent-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Two component vector used for zoom, offsets and anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Tone shift applied on top of the color. Channels range over -255..=255,
/// `grey` over 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tone {
    pub red: i16,
    pub green: i16,
    pub blue: i16,
    pub grey: i16,
}

impl Tone {
    pub const fn new(red: i16, green: i16, blue: i16, grey: i16) -> Self {
        Self {
            red,
            green,
            blue,
            grey,
        }
    }
}

/// Outer spacing around a control, used by layouts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margin {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Alignment of a child inside its parent along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Start = 0,
    Center = 1,
    End = 2,
}

impl Alignment {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Start),
            1 => Some(Self::Center),
            2 => Some(Self::End),
            _ => None,
        }
    }
}

/// How a layout treats a child between explicit invalidations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateBehavior {
    /// Re-laid out only when marked with `needs_update`.
    #[default]
    Normal,
    /// Re-laid out every frame.
    Continuous,
}

/// Masking state. `value` is the reveal threshold in 0..=255.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mask {
    pub enabled: bool,
    pub value: f32,
    pub vague: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelateEffect {
    pub enabled: bool,
    pub width: f32,
    pub height: f32,
}

impl Default for PixelateEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 1.0,
            height: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WobbleEffect {
    pub enabled: bool,
    pub power: f32,
    pub speed: f32,
    pub phase: f32,
}

/// Shader-style effects toggled by the effect animations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Effects {
    pub pixelate: PixelateEffect,
    pub wobble: WobbleEffect,
}
