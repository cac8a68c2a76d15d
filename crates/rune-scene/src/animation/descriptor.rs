//! Declarative animation flows stored on objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::easing::EasingFunction;
use crate::binding::field_value;
use crate::component::ComponentHandle;
use crate::stage::{ObjectId, Stage};
use crate::value::Value;

/// A step's `wait` field: `true` waits for the step's duration, a number waits
/// that many frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Wait {
    Flag(bool),
    Frames(u32),
}

/// One entry of a flow.
///
/// Parameters the step's animation reads (`x`, `red`, `value`, ...) are kept
/// in `params`; each may be a literal or a field path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationStep {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<Wait>,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,

    #[serde(skip)]
    pub executed: bool,
    /// Animations this step started that may still be running.
    #[serde(skip)]
    pub components: Vec<ComponentHandle>,
    /// Every object this step animated since the flow was last cleared,
    /// including animations that finished the frame they started.
    #[serde(skip)]
    pub targets: Vec<ObjectId>,
}

impl AnimationStep {
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn waiting(frames: u32) -> Self {
        Self {
            wait: Some(Wait::Frames(frames)),
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Frames to block the flow after this step, if it waits at all.
    pub fn wait_frames(&self) -> Option<u32> {
        match self.wait? {
            Wait::Flag(true) => Some(self.duration),
            Wait::Flag(false) => None,
            Wait::Frames(frames) => Some(frames),
        }
    }

    pub fn easing_function(&self) -> EasingFunction {
        match self.easing.as_deref() {
            None => EasingFunction::Linear,
            Some(name) => EasingFunction::from_name(name).unwrap_or_else(|| {
                warn!(easing = name, "unknown easing, using linear");
                EasingFunction::Linear
            }),
        }
    }

    /// Evaluate a numeric parameter relative to `owner`.
    pub fn number(&self, stage: &mut Stage, owner: ObjectId, key: &str) -> Option<f64> {
        let raw = self.params.get(key)?;
        match field_value(stage, owner, raw) {
            Ok(value) => value.as_f64(),
            Err(error) => {
                warn!(?error, key, "animation parameter unresolved");
                None
            }
        }
    }
}

/// An ordered flow of steps plus the interpreter's cursor into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub flow: Vec<AnimationStep>,
    /// Next step to run, in `0..=flow.len()`.
    #[serde(skip)]
    pub pointer: usize,
    #[serde(skip)]
    pub wait_counter: u32,
    #[serde(skip)]
    pub cleared: bool,
}

impl AnimationDescriptor {
    pub fn new(flow: Vec<AnimationStep>) -> Self {
        Self {
            flow,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_json_shape() {
        let json = r#"{
            "flow": [
                {"type": "move", "duration": 20, "x": 100, "y": "$hud.dstRect.y", "easing": "quad_out"},
                {"wait": true, "duration": 12},
                {"wait": 5, "repeat": true}
            ]
        }"#;
        let descriptor: AnimationDescriptor = serde_json::from_str(json).unwrap();
        let [step, wait_flag, wait_frames] = &descriptor.flow[..] else {
            panic!("expected three steps");
        };
        assert_eq!(step.kind.as_deref(), Some("move"));
        assert_eq!(step.params["x"], Value::Number(100.0));
        assert_eq!(step.params["y"], Value::Text("$hud.dstRect.y".into()));
        assert_eq!(step.wait_frames(), None);
        assert_ne!(step.easing_function(), EasingFunction::Linear);
        assert_eq!(wait_flag.wait_frames(), Some(12));
        assert_eq!(wait_frames.wait_frames(), Some(5));
        assert!(wait_frames.repeat);
    }
}
