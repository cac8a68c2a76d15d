use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{resolve_field_path, FieldPath};
use crate::component::{Component, ComponentHandle};
use crate::error::Result;
use crate::stage::{ObjectId, Stage};
use crate::value::Value;

/// A source -> target value transfer, re-executed every frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip)]
    source_func: Option<Rc<FieldPath>>,
    #[serde(skip)]
    target_func: Option<Rc<FieldPath>>,
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.offset == other.offset
            && self.min == other.min
            && self.max == other.max
    }
}

impl Binding {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Compile and cache both accessors.
    fn resolve(&mut self, stage: &mut Stage) -> Result<()> {
        if self.source_func.is_none()
            && let Some(source) = &self.source
        {
            self.source_func = Some(resolve_field_path(stage, source)?);
        }
        if self.target_func.is_none()
            && let Some(target) = &self.target
        {
            self.target_func = Some(resolve_field_path(stage, target)?);
        }
        Ok(())
    }

    /// Apply the offset and clamp range to a numeric source value.
    fn adjust(&self, value: Value) -> Value {
        let Value::Number(mut number) = value else {
            return value;
        };
        if let Some(offset) = self.offset {
            number += offset;
        }
        if let Some(min) = self.min {
            number = number.max(min);
        }
        if let Some(max) = self.max {
            number = number.min(max);
        }
        Value::Number(number)
    }
}

/// Copy the source value into the target.
///
/// No target is a no-op; no source writes `Null`.
pub fn execute_binding(stage: &mut Stage, owner: ObjectId, binding: &mut Binding) -> Result<()> {
    binding.resolve(stage)?;
    let Some(target) = binding.target_func.clone() else {
        return Ok(());
    };
    let value = match &binding.source_func {
        Some(source) => binding.adjust(source.get(stage, owner)?),
        None => Value::Null,
    };
    target.set(stage, owner, value)
}

/// Executes the owner's `bindings` every frame.
#[derive(Debug, Default)]
pub struct BindingHandler;

impl BindingHandler {
    /// Compile every binding path on `owner`, reporting the first malformed one.
    pub fn validate(stage: &mut Stage, owner: ObjectId) -> Result<()> {
        let mut bindings = std::mem::take(&mut stage.object_mut(owner)?.bindings);
        let result = bindings.iter_mut().try_for_each(|binding| binding.resolve(stage));
        restore(stage, owner, bindings);
        result
    }

    pub fn execute_all(stage: &mut Stage, owner: ObjectId) {
        let Some(object) = stage.get_mut(owner) else {
            return;
        };
        let mut bindings = std::mem::take(&mut object.bindings);
        for binding in &mut bindings {
            if let Err(error) = execute_binding(stage, owner, binding) {
                warn!(?error, %owner, "binding failed");
            }
        }
        restore(stage, owner, bindings);
    }
}

/// Put bindings back, keeping any added while they were out.
fn restore(stage: &mut Stage, owner: ObjectId, mut bindings: Vec<Binding>) {
    if let Some(object) = stage.get_mut(owner) {
        bindings.append(&mut object.bindings);
        object.bindings = bindings;
    }
}

impl Component for BindingHandler {
    fn name(&self) -> &'static str {
        "binding_handler"
    }

    fn setup(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        if let Err(error) = Self::validate(stage, handle.object) {
            warn!(?error, object = %handle.object, "invalid binding");
        }
    }

    fn update(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        Self::execute_all(stage, handle.object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::object::GameObject;

    fn stage_with_pair() -> (Stage, ObjectId, ObjectId) {
        let mut stage = Stage::default();
        let bar = stage.spawn(GameObject::named("bar"));
        let owner = stage.spawn(GameObject::default());
        stage.get_mut(owner).unwrap().fields.insert("hp".into(), Value::Number(80.0));
        (stage, owner, bar)
    }

    #[test]
    fn test_binding_applies_offset_then_clamp() {
        let (mut stage, owner, bar) = stage_with_pair();
        let mut binding = Binding::new("hp", "$bar.dstRect.width")
            .with_offset(40.0)
            .with_range(Some(0.0), Some(100.0));
        execute_binding(&mut stage, owner, &mut binding).unwrap();
        assert_eq!(stage.get(bar).unwrap().dst_rect.width, 100.0);

        stage.get_mut(owner).unwrap().fields.insert("hp".into(), Value::Number(-90.0));
        execute_binding(&mut stage, owner, &mut binding).unwrap();
        assert_eq!(stage.get(bar).unwrap().dst_rect.width, 0.0);
    }

    #[test]
    fn test_missing_source_writes_null_and_missing_target_is_noop() {
        let (mut stage, owner, _) = stage_with_pair();
        let mut binding = Binding {
            target: Some("hp".into()),
            ..Binding::default()
        };
        execute_binding(&mut stage, owner, &mut binding).unwrap();
        assert_eq!(stage.get(owner).unwrap().fields["hp"], Value::Null);

        let mut binding = Binding {
            source: Some("visible".into()),
            ..Binding::default()
        };
        execute_binding(&mut stage, owner, &mut binding).unwrap();
    }

    #[test]
    fn test_handler_runs_each_frame_and_validates() {
        let (mut stage, owner, bar) = stage_with_pair();
        stage
            .get_mut(owner)
            .unwrap()
            .bindings
            .push(Binding::new("hp", "$bar.opacity"));
        stage.add_component(owner, BindingHandler);
        stage.update_object(owner);
        assert_eq!(stage.get(bar).unwrap().opacity, 80.0);

        stage.get_mut(owner).unwrap().bindings.push(Binding::new("hp", "$bar..x"));
        assert!(matches!(
            BindingHandler::validate(&mut stage, owner),
            Err(SceneError::Parse { .. })
        ));
        assert_eq!(stage.get(owner).unwrap().bindings.len(), 2);
    }
}
