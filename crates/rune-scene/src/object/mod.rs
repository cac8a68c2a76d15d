//! Game objects: the composition root of the scene graph.
//!
//! A [`GameObject`] is a mutable property bag plus an ordered list of
//! components. Components never own their object; they receive a
//! [`ComponentHandle`](crate::component::ComponentHandle) naming it each time
//! the [`Stage`](crate::stage::Stage) calls into them.
//!
//! Properties are also reachable by string key through [`GameObject::property`]
//! and [`GameObject::set_property`]. That typed registry is what field paths
//! walk, so a binding such as `"$hud.dstRect.x"` ends up here.

pub mod bundle;
pub mod props;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationDescriptor;
use crate::binding::Binding;
use crate::component::ComponentSlot;
use crate::error::{Result, SceneError};
use crate::services::Document;
use crate::stage::ObjectId;
use crate::value::Value;

pub use bundle::ObjectBundle;
pub use props::{
    Alignment, Color, Effects, Margin, Mask, PixelateEffect, Rect, Tone, UpdateBehavior, Vec2,
    WobbleEffect,
};

/// Name of the domain every container starts in.
pub const DEFAULT_DOMAIN: &str = "default";

/// What an object represents. Persisted with the object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Generic,
    Scene {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uid: Option<String>,
    },
    Text {
        text: String,
    },
    Character {
        /// Record id of the character document.
        rid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<String>,
    },
    Background {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
    Picture {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
    Layout,
}

/// Keys understood by the typed property registry. Anything else falls back
/// to the free-form `fields` map.
const PROPERTY_KEYS: &[&str] = &[
    "name",
    "text",
    "dstRect.x",
    "dstRect.y",
    "dstRect.width",
    "dstRect.height",
    "srcRect.x",
    "srcRect.y",
    "srcRect.width",
    "srcRect.height",
    "color.red",
    "color.green",
    "color.blue",
    "color.alpha",
    "tone.red",
    "tone.green",
    "tone.blue",
    "tone.grey",
    "zoom.x",
    "zoom.y",
    "offset.x",
    "offset.y",
    "anchor.x",
    "anchor.y",
    "opacity",
    "angle",
    "mirror",
    "visible",
    "active",
    "enabled",
    "zIndex",
    "index",
    "scrollOffsetY",
    "mask.value",
    "mask.vague",
    "pixelate.width",
    "pixelate.height",
    "wobble.power",
    "wobble.speed",
    "parent",
    "subObjects",
    "domain",
];

/// A node of the scene graph.
pub struct GameObject {
    pub name: Option<String>,
    pub kind: ObjectKind,

    pub parent: Option<ObjectId>,
    /// Children of the active domain. Tombstoned entries are `None`.
    pub sub_objects: Vec<Option<ObjectId>>,
    /// Children of every other domain, keyed by domain name.
    pub sub_objects_by_domain: BTreeMap<String, Vec<Option<ObjectId>>>,
    /// Name of the domain whose list currently lives in `sub_objects`.
    pub domain: String,

    pub dst_rect: Rect,
    pub src_rect: Rect,
    pub color: Color,
    pub tone: Tone,
    pub zoom: Vec2,
    pub offset: Vec2,
    pub anchor: Vec2,
    pub opacity: f32,
    pub angle: f32,
    pub mirror: bool,
    pub visible: bool,
    pub active: bool,
    pub enabled: bool,
    pub z_index: i32,
    /// Position inside the parent's layout, injected by layout behaviors.
    pub index: usize,

    pub margin: Margin,
    pub alignment_x: Option<Alignment>,
    pub alignment_y: Option<Alignment>,
    pub clip_rect: Option<Rect>,
    pub inherit_properties: bool,
    pub needs_update: bool,
    pub update_behavior: UpdateBehavior,
    pub scrollable: bool,
    pub scroll_offset_y: f32,

    pub mask: Mask,
    pub effects: Effects,

    pub animations: Vec<AnimationDescriptor>,
    pub bindings: Vec<Binding>,
    pub fields: BTreeMap<String, Value>,

    /// Data record resolved from the kind's `rid`. Never persisted.
    pub record: Option<Document>,

    pub(crate) components: Vec<ComponentSlot>,
    pub(crate) is_setup: bool,
    pub(crate) disposed: bool,
    pub(crate) updating: u32,
}

impl Default for GameObject {
    fn default() -> Self {
        Self {
            name: None,
            kind: ObjectKind::Generic,
            parent: None,
            sub_objects: Vec::new(),
            sub_objects_by_domain: BTreeMap::new(),
            domain: DEFAULT_DOMAIN.to_string(),
            dst_rect: Rect::default(),
            src_rect: Rect::default(),
            color: Color::WHITE,
            tone: Tone::default(),
            zoom: Vec2::ONE,
            offset: Vec2::ZERO,
            anchor: Vec2::ZERO,
            opacity: 255.0,
            angle: 0.0,
            mirror: false,
            visible: true,
            active: true,
            enabled: true,
            z_index: 0,
            index: 0,
            margin: Margin::default(),
            alignment_x: None,
            alignment_y: None,
            clip_rect: None,
            inherit_properties: false,
            needs_update: false,
            update_behavior: UpdateBehavior::Normal,
            scrollable: false,
            scroll_offset_y: 0.0,
            mask: Mask::default(),
            effects: Effects::default(),
            animations: Vec::new(),
            bindings: Vec::new(),
            fields: BTreeMap::new(),
            record: None,
            components: Vec::new(),
            is_setup: false,
            disposed: false,
            updating: 0,
        }
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("dst_rect", &self.dst_rect)
            .field("visible", &self.visible)
            .field("components", &self.components)
            .field("sub_objects", &self.sub_objects)
            .finish_non_exhaustive()
    }
}

impl GameObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.dst_rect = rect;
        self
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    /// Number of attached components, including ones pending removal.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Whether `key` names a typed property (as opposed to a free-form field).
    pub fn is_property(key: &str) -> bool {
        PROPERTY_KEYS.contains(&key)
    }

    /// Every child across all domains, skipping tombstones. Active domain first.
    pub fn all_sub_objects(&self) -> Vec<ObjectId> {
        self.sub_objects
            .iter()
            .chain(self.sub_objects_by_domain.values().flatten())
            .flatten()
            .copied()
            .collect()
    }

    /// Read a property by registry key, falling back to `fields`.
    pub fn property(&self, key: &str) -> Option<Value> {
        let value = match key {
            "name" => self.name.clone().map(Value::Text).unwrap_or_default(),
            "text" => match &self.kind {
                ObjectKind::Text { text } => Value::Text(text.clone()),
                _ => return self.fields.get(key).cloned(),
            },
            "dstRect.x" => self.dst_rect.x.into(),
            "dstRect.y" => self.dst_rect.y.into(),
            "dstRect.width" => self.dst_rect.width.into(),
            "dstRect.height" => self.dst_rect.height.into(),
            "srcRect.x" => self.src_rect.x.into(),
            "srcRect.y" => self.src_rect.y.into(),
            "srcRect.width" => self.src_rect.width.into(),
            "srcRect.height" => self.src_rect.height.into(),
            "color.red" => (self.color.red as f64).into(),
            "color.green" => (self.color.green as f64).into(),
            "color.blue" => (self.color.blue as f64).into(),
            "color.alpha" => (self.color.alpha as f64).into(),
            "tone.red" => (self.tone.red as f64).into(),
            "tone.green" => (self.tone.green as f64).into(),
            "tone.blue" => (self.tone.blue as f64).into(),
            "tone.grey" => (self.tone.grey as f64).into(),
            "zoom.x" => self.zoom.x.into(),
            "zoom.y" => self.zoom.y.into(),
            "offset.x" => self.offset.x.into(),
            "offset.y" => self.offset.y.into(),
            "anchor.x" => self.anchor.x.into(),
            "anchor.y" => self.anchor.y.into(),
            "opacity" => self.opacity.into(),
            "angle" => self.angle.into(),
            "mirror" => self.mirror.into(),
            "visible" => self.visible.into(),
            "active" => self.active.into(),
            "enabled" => self.enabled.into(),
            "zIndex" => self.z_index.into(),
            "index" => (self.index as f64).into(),
            "scrollOffsetY" => self.scroll_offset_y.into(),
            "mask.value" => self.mask.value.into(),
            "mask.vague" => self.mask.vague.into(),
            "pixelate.width" => self.effects.pixelate.width.into(),
            "pixelate.height" => self.effects.pixelate.height.into(),
            "wobble.power" => self.effects.wobble.power.into(),
            "wobble.speed" => self.effects.wobble.speed.into(),
            "parent" => self.parent.map(Value::object).unwrap_or_default(),
            "subObjects" => Value::List(
                self.sub_objects
                    .iter()
                    .map(|child| child.map(Value::object).unwrap_or_default())
                    .collect(),
            ),
            "domain" => Value::Text(self.domain.clone()),
            _ => return self.fields.get(key).cloned(),
        };
        Some(value)
    }

    /// Write a property by registry key. Unknown keys are stored in `fields`.
    pub fn set_property(&mut self, key: &str, value: Value) -> Result<()> {
        match key {
            "name" => self.name = value.as_str().map(str::to_string),
            "text" => match &mut self.kind {
                ObjectKind::Text { text } => *text = text_of(key, &value)?,
                _ => {
                    self.fields.insert(key.to_string(), value);
                }
            },
            "dstRect.x" => self.dst_rect.x = number(key, &value)? as f32,
            "dstRect.y" => self.dst_rect.y = number(key, &value)? as f32,
            "dstRect.width" => self.dst_rect.width = number(key, &value)? as f32,
            "dstRect.height" => self.dst_rect.height = number(key, &value)? as f32,
            "srcRect.x" => self.src_rect.x = number(key, &value)? as f32,
            "srcRect.y" => self.src_rect.y = number(key, &value)? as f32,
            "srcRect.width" => self.src_rect.width = number(key, &value)? as f32,
            "srcRect.height" => self.src_rect.height = number(key, &value)? as f32,
            "color.red" => self.color.red = channel(key, &value)?,
            "color.green" => self.color.green = channel(key, &value)?,
            "color.blue" => self.color.blue = channel(key, &value)?,
            "color.alpha" => self.color.alpha = channel(key, &value)?,
            "tone.red" => self.tone.red = tone_channel(key, &value, -255.0)?,
            "tone.green" => self.tone.green = tone_channel(key, &value, -255.0)?,
            "tone.blue" => self.tone.blue = tone_channel(key, &value, -255.0)?,
            "tone.grey" => self.tone.grey = tone_channel(key, &value, 0.0)?,
            "zoom.x" => self.zoom.x = number(key, &value)? as f32,
            "zoom.y" => self.zoom.y = number(key, &value)? as f32,
            "offset.x" => self.offset.x = number(key, &value)? as f32,
            "offset.y" => self.offset.y = number(key, &value)? as f32,
            "anchor.x" => self.anchor.x = number(key, &value)? as f32,
            "anchor.y" => self.anchor.y = number(key, &value)? as f32,
            "opacity" => self.opacity = number(key, &value)?.clamp(0.0, 255.0) as f32,
            "angle" => self.angle = number(key, &value)? as f32,
            "mirror" => self.mirror = flag(key, &value)?,
            "visible" => self.visible = flag(key, &value)?,
            "active" => self.active = flag(key, &value)?,
            "enabled" => self.enabled = flag(key, &value)?,
            "zIndex" => self.z_index = number(key, &value)? as i32,
            "index" => self.index = number(key, &value)?.max(0.0) as usize,
            "scrollOffsetY" => self.scroll_offset_y = number(key, &value)? as f32,
            "mask.value" => self.mask.value = number(key, &value)? as f32,
            "mask.vague" => self.mask.vague = number(key, &value)? as f32,
            "pixelate.width" => self.effects.pixelate.width = number(key, &value)? as f32,
            "pixelate.height" => self.effects.pixelate.height = number(key, &value)? as f32,
            "wobble.power" => self.effects.wobble.power = number(key, &value)? as f32,
            "wobble.speed" => self.effects.wobble.speed = number(key, &value)? as f32,
            "parent" | "subObjects" | "domain" => {
                return Err(SceneError::ReadOnly {
                    path: key.to_string(),
                });
            }
            _ => {
                self.fields.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

fn number(key: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| SceneError::TypeMismatch {
        key: key.to_string(),
        expected: "a number",
    })
}

fn flag(key: &str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| SceneError::TypeMismatch {
        key: key.to_string(),
        expected: "a boolean",
    })
}

fn channel(key: &str, value: &Value) -> Result<u8> {
    Ok(number(key, value)?.clamp(0.0, 255.0) as u8)
}

fn tone_channel(key: &str, value: &Value, min: f64) -> Result<i16> {
    Ok(number(key, value)?.clamp(min, 255.0) as i16)
}

fn text_of(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(SceneError::TypeMismatch {
            key: key.to_string(),
            expected: "text",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trips_typed_properties() {
        let mut object = GameObject::default();
        object.set_property("dstRect.x", Value::Number(12.0)).unwrap();
        object.set_property("color.green", Value::Number(300.0)).unwrap();
        object.set_property("tone.red", Value::Number(-400.0)).unwrap();
        object.set_property("visible", Value::Bool(false)).unwrap();

        assert_eq!(object.dst_rect.x, 12.0);
        assert_eq!(object.color.green, 255);
        assert_eq!(object.tone.red, -255);
        assert!(!object.visible);
        assert_eq!(object.property("color.green"), Some(Value::Number(255.0)));
    }

    #[test]
    fn test_unknown_keys_use_fields() {
        let mut object = GameObject::default();
        assert_eq!(object.property("hp"), None);
        object.set_property("hp", Value::Number(40.0)).unwrap();
        assert_eq!(object.property("hp"), Some(Value::Number(40.0)));
        assert!(!GameObject::is_property("hp"));
    }

    #[test]
    fn test_type_mismatch_and_read_only() {
        let mut object = GameObject::default();
        assert!(matches!(
            object.set_property("opacity", Value::Text("full".into())),
            Err(SceneError::TypeMismatch { .. })
        ));
        assert!(matches!(
            object.set_property("parent", Value::Null),
            Err(SceneError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_text_property_follows_kind() {
        let mut label = GameObject::new(ObjectKind::Text { text: "hi".into() });
        label.set_property("text", Value::Number(3.0)).unwrap();
        assert_eq!(label.property("text"), Some(Value::Text("3".into())));

        let mut plain = GameObject::default();
        plain.set_property("text", "loose".into()).unwrap();
        assert_eq!(plain.fields.get("text"), Some(&Value::Text("loose".into())));
    }
}
