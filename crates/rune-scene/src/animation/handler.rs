//! Interpreter for the animation flows stored in `GameObject::animations`.
//!
//! Each descriptor is a cursor over its flow. A frame runs steps in order
//! until one of them waits; non-waiting steps chain through without
//! consuming a frame. A waiting step blocks the descriptor for its wait
//! count, after which the flow continues (and wraps around at its end).

use tracing::warn;

use super::animator::Animator;
use super::descriptor::{AnimationDescriptor, AnimationStep};
use crate::binding::{field_value, resolve_field_path};
use crate::component::{Component, ComponentHandle};
use crate::stage::{ObjectId, Stage};
use crate::value::Value;

/// Decides whether a descriptor may run this frame.
pub type CheckObject = Box<dyn Fn(&Stage, ObjectId, &AnimationDescriptor) -> bool>;

/// Runs the owner's animation flows every frame.
pub struct AnimationHandler {
    check_object: CheckObject,
}

impl Default for AnimationHandler {
    fn default() -> Self {
        Self {
            check_object: Box::new(|stage, owner, _| {
                stage
                    .get(owner)
                    .is_some_and(|object| object.active && object.visible)
            }),
        }
    }
}

impl std::fmt::Debug for AnimationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandler").finish_non_exhaustive()
    }
}

impl AnimationHandler {
    pub fn with_check(check_object: impl Fn(&Stage, ObjectId, &AnimationDescriptor) -> bool + 'static) -> Self {
        Self {
            check_object: Box::new(check_object),
        }
    }

    /// Advance every descriptor on `owner` by one frame.
    pub fn update_animations(&self, stage: &mut Stage, owner: ObjectId) {
        let Some(object) = stage.get_mut(owner) else {
            return;
        };
        let mut descriptors = std::mem::take(&mut object.animations);

        for descriptor in &mut descriptors {
            if (self.check_object)(stage, owner, descriptor) {
                descriptor.cleared = false;
                if descriptor.wait_counter > 0 {
                    descriptor.wait_counter -= 1;
                    continue;
                }
                if descriptor.pointer >= descriptor.flow.len() {
                    descriptor.pointer = 0;
                }
                Self::process_animations(stage, owner, descriptor);
            } else if !descriptor.cleared {
                Self::clear(stage, descriptor);
            }
        }

        if let Some(object) = stage.get_mut(owner) {
            descriptors.append(&mut object.animations);
            object.animations = descriptors;
        }
    }

    /// Run steps from the pointer until one waits or the flow ends.
    pub fn process_animations(stage: &mut Stage, owner: ObjectId, descriptor: &mut AnimationDescriptor) {
        while descriptor.pointer < descriptor.flow.len() {
            let step = &mut descriptor.flow[descriptor.pointer];
            descriptor.pointer += 1;

            let wait = step.wait_frames();
            if wait.is_none() && step.executed {
                continue;
            }

            let targets = Self::resolve_targets(stage, owner, step);
            Self::process_targets(stage, owner, step, &targets);

            if let Some(frames) = wait {
                descriptor.wait_counter = frames;
                break;
            }
        }
    }

    fn resolve_targets(stage: &mut Stage, owner: ObjectId, step: &AnimationStep) -> Vec<ObjectId> {
        let Some(target) = &step.target else {
            return vec![owner];
        };
        match field_value(stage, owner, target) {
            Ok(value) => value.objects(),
            Err(error) => {
                warn!(?error, object = %owner, "animation target unresolved");
                Vec::new()
            }
        }
    }

    /// Start the step's animation on each target. Repeating steps never
    /// count as executed, so they replay every pass.
    pub fn process_targets(stage: &mut Stage, owner: ObjectId, step: &mut AnimationStep, targets: &[ObjectId]) {
        if step.kind.is_some() {
            step.components.retain(|handle| stage.has_component(*handle));
            for &target in targets {
                let Some(handle) = Animator::start_step(stage, owner, target, step) else {
                    continue;
                };
                if !step.targets.contains(&target) {
                    step.targets.push(target);
                }
                if stage.has_component(handle) {
                    step.components.push(handle);
                }
            }
        }
        step.executed = !step.repeat;
    }

    /// Rewind the flow and undo what its steps started.
    ///
    /// Running animations are removed. If a step names a `field` and a
    /// `reset` value, the field is written back on every object the step
    /// animated, finished or not.
    pub fn clear(stage: &mut Stage, descriptor: &mut AnimationDescriptor) {
        descriptor.pointer = 0;
        descriptor.wait_counter = 0;
        descriptor.cleared = true;

        for step in &mut descriptor.flow {
            step.executed = false;
            for handle in std::mem::take(&mut step.components) {
                stage.remove_component(handle);
            }
            let targets = std::mem::take(&mut step.targets);
            if let (Some(field), Some(reset)) = (&step.field, &step.reset) {
                for target in targets {
                    reset_field(stage, target, field, reset);
                }
            }
        }
    }
}

fn reset_field(stage: &mut Stage, object: ObjectId, field: &str, reset: &Value) {
    let result = resolve_field_path(stage, field).and_then(|path| path.set(stage, object, reset.clone()));
    if let Err(error) = result {
        warn!(?error, %object, field, "cannot reset animated field");
    }
}

impl Component for AnimationHandler {
    fn name(&self) -> &'static str {
        "animation_handler"
    }

    fn update(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        self.update_animations(stage, handle.object);
    }

    fn dispose(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        let Some(object) = stage.get_mut(handle.object) else {
            return;
        };
        let mut descriptors = std::mem::take(&mut object.animations);
        for descriptor in &mut descriptors {
            Self::clear(stage, descriptor);
        }
        if let Some(object) = stage.get_mut(handle.object) {
            object.animations = descriptors;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::GameObject;

    fn stage_with_flow(flow: Vec<AnimationStep>) -> (Stage, ObjectId) {
        let mut stage = Stage::default();
        let mut object = GameObject::default();
        object.animations.push(AnimationDescriptor::new(flow));
        let id = stage.spawn(object);
        stage.add_component(id, AnimationHandler::default());
        (stage, id)
    }

    fn descriptor(stage: &Stage, id: ObjectId) -> &AnimationDescriptor {
        &stage.get(id).unwrap().animations[0]
    }

    #[test]
    fn test_non_waiting_steps_run_in_one_call() {
        let flow = vec![
            AnimationStep::of_kind("opacity").with_param("value", 0.0).with_duration(10),
            AnimationStep::of_kind("rotate").with_param("angle", 45.0).with_duration(10),
        ];
        let (mut stage, id) = stage_with_flow(flow);
        stage.update_object(id);

        let flow = &descriptor(&stage, id).flow;
        assert!(flow.iter().all(|step| step.executed));
        assert_eq!(flow[0].components.len(), 1);
        assert_eq!(flow[1].components.len(), 1);
        assert_eq!(descriptor(&stage, id).pointer, 2);
    }

    #[test]
    fn test_waiting_step_blocks_for_its_count() {
        let (mut stage, id) = stage_with_flow(vec![AnimationStep::waiting(5)]);
        stage.update_object(id);
        assert_eq!(descriptor(&stage, id).wait_counter, 5);
        assert_eq!(descriptor(&stage, id).pointer, 1);

        for _ in 0..5 {
            stage.update_object(id);
        }
        assert_eq!(descriptor(&stage, id).wait_counter, 0);
        assert_eq!(descriptor(&stage, id).pointer, 1);
    }

    #[test]
    fn test_executed_steps_are_skipped_and_repeats_replay() {
        let once = AnimationStep::of_kind("opacity").with_param("value", 10.0);
        let mut again = AnimationStep::of_kind("rotate").with_param("angle", 90.0);
        again.repeat = true;
        let (mut stage, id) = stage_with_flow(vec![once, again]);

        stage.update_object(id);
        stage.get_mut(id).unwrap().opacity = 255.0;
        stage.get_mut(id).unwrap().angle = 0.0;
        stage.update_object(id);

        let object = stage.get(id).unwrap();
        assert_eq!(object.opacity, 255.0);
        assert_eq!(object.angle, 90.0);
        assert!(!object.animations[0].flow[1].executed);
    }

    #[test]
    fn test_empty_flow_is_a_no_op() {
        let (mut stage, id) = stage_with_flow(Vec::new());
        stage.update_object(id);
        stage.update_object(id);
        assert_eq!(descriptor(&stage, id).pointer, 0);
    }

    #[test]
    fn test_targets_resolve_through_paths() {
        let mut stage = Stage::default();
        let sprite = stage.spawn(GameObject::named("sprite"));
        let mut step = AnimationStep::of_kind("move").with_param("x", 30.0);
        step.target = Some(Value::Text("$sprite".into()));

        let mut director = GameObject::default();
        director.animations.push(AnimationDescriptor::new(vec![step]));
        let id = stage.spawn(director);
        stage.add_component(id, AnimationHandler::default());
        stage.update_object(id);

        assert_eq!(stage.get(sprite).unwrap().dst_rect.x, 30.0);
        assert_eq!(stage.get(id).unwrap().dst_rect.x, 0.0);
    }

    #[test]
    fn test_hidden_owner_clears_and_resets_fields() {
        let mut step = AnimationStep::of_kind("field")
            .with_param("value", 100.0)
            .with_duration(20);
        step.field = Some("dstRect.x".into());
        step.reset = Some(Value::Number(5.0));
        let (mut stage, id) = stage_with_flow(vec![step, AnimationStep::waiting(50)]);

        stage.update_object(id);
        stage.update_object(id);
        assert!(stage.get(id).unwrap().dst_rect.x > 0.0);

        stage.get_mut(id).unwrap().visible = false;
        stage.update_object(id);

        let object = stage.get(id).unwrap();
        assert_eq!(object.dst_rect.x, 5.0);
        let descriptor = &object.animations[0];
        assert!(descriptor.cleared);
        assert_eq!((descriptor.pointer, descriptor.wait_counter), (0, 0));
        assert!(descriptor.flow[0].components.is_empty());
        assert!(!descriptor.flow[0].executed);
        assert!(!Animator::is_animating(&stage, id));
    }

    #[test]
    fn test_clear_resets_fields_of_finished_animations() {
        let mut step = AnimationStep::of_kind("field").with_param("value", 100.0);
        step.field = Some("dstRect.x".into());
        step.reset = Some(Value::Number(5.0));
        let (mut stage, id) = stage_with_flow(vec![step, AnimationStep::waiting(50)]);

        stage.update_object(id);
        let object = stage.get(id).unwrap();
        assert_eq!(object.dst_rect.x, 100.0);
        assert!(object.animations[0].flow[0].components.is_empty());
        assert_eq!(object.animations[0].flow[0].targets, vec![id]);

        stage.get_mut(id).unwrap().visible = false;
        stage.update_object(id);

        let object = stage.get(id).unwrap();
        assert_eq!(object.dst_rect.x, 5.0);
        assert!(object.animations[0].flow[0].targets.is_empty());
    }

    #[test]
    fn test_skipped_animations_still_reset_on_clear() {
        let mut step = AnimationStep::of_kind("field")
            .with_param("value", 40.0)
            .with_duration(30);
        step.field = Some("opacity".into());
        step.reset = Some(Value::Number(255.0));
        let (mut stage, id) = stage_with_flow(vec![step, AnimationStep::waiting(10)]);
        stage.settings.skip_animations = true;

        stage.update_object(id);
        assert_eq!(stage.get(id).unwrap().opacity, 40.0);

        stage.get_mut(id).unwrap().active = false;
        stage.update_object(id);
        assert_eq!(stage.get(id).unwrap().opacity, 255.0);
    }

    #[test]
    fn test_repeating_step_keeps_only_running_handles() {
        let mut spin = AnimationStep::of_kind("rotate")
            .with_param("angle", 90.0)
            .with_duration(2);
        spin.repeat = true;
        let (mut stage, id) = stage_with_flow(vec![spin, AnimationStep::waiting(3)]);

        for _ in 0..400 {
            stage.update_object(id);
        }

        let step = &descriptor(&stage, id).flow[0];
        assert!(step.components.len() <= 1);
        assert_eq!(step.targets, vec![id]);
        assert!(step.components.iter().all(|handle| stage.has_component(*handle)));
    }
}
