use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::object::{GameObject, ObjectKind};
use crate::services::{MemoryDataManager, Services};

type Log = Rc<RefCell<Vec<&'static str>>>;

struct Recorder {
    log: Log,
}

impl SceneScript for Recorder {
    fn initialize(&mut self, _stage: &mut Stage, _scene: ObjectId) {
        self.log.borrow_mut().push("initialize");
    }

    fn prepare_data(&mut self, stage: &mut Stage, scene: ObjectId) {
        self.log.borrow_mut().push("prepare_data");
        let title = stage.spawn_deferred(GameObject::new(ObjectKind::Text { text: "Title".into() }));
        stage.add_child(scene, title).unwrap();
    }

    fn prepare_visual(&mut self, _stage: &mut Stage, _scene: ObjectId) {
        self.log.borrow_mut().push("prepare_visual");
    }

    fn start(&mut self, _stage: &mut Stage, _scene: ObjectId) {
        self.log.borrow_mut().push("start");
    }

    fn update_content(&mut self, _stage: &mut Stage, _scene: ObjectId) {
        self.log.borrow_mut().push("update_content");
    }
}

fn recorder() -> (Recorder, Log) {
    let log = Log::default();
    (Recorder { log: log.clone() }, log)
}

fn instant_stage() -> Stage {
    let mut stage = Stage::default();
    stage.settings.transition_duration = 0;
    stage
}

fn running_scene(stage: &mut Stage, manager: &mut SceneManager) -> ObjectId {
    let (script, _) = recorder();
    let scene = SceneBehavior::spawn(stage, None, script);
    manager.switch_to(stage, Some(scene), false, None);
    manager.update(stage);
    manager.update(stage);
    scene
}

#[test]
fn test_lifecycle_hooks_run_in_order() {
    let mut stage = Stage::default();
    stage.settings.transition_duration = 2;
    let mut manager = SceneManager::new();
    let (script, log) = recorder();
    let scene = SceneBehavior::spawn(&mut stage, Some("title".into()), script);

    manager.switch_to(&mut stage, Some(scene), false, None);
    manager.update(&mut stage);
    assert!(manager.is_fade_out());
    manager.update(&mut stage);
    assert_eq!(*log.borrow(), ["initialize"]);

    manager.update(&mut stage);
    assert!(!manager.is_fade_out());
    assert_eq!(*log.borrow(), ["initialize", "prepare_data", "prepare_visual", "start"]);
    assert_eq!(stage.component::<SceneBehavior>(scene).unwrap().state(), SceneState::Running);

    manager.update(&mut stage);
    assert_eq!(log.borrow().last(), Some(&"update_content"));

    let children = stage.get(scene).unwrap().all_sub_objects();
    assert_eq!(children.len(), 1);
    assert!(stage.get(children[0]).unwrap().is_setup());
}

#[test]
fn test_data_loading_is_polled() {
    let services = Services {
        data: Box::new(MemoryDataManager::default().with_latency(3)),
        ..Services::headless()
    };
    let mut stage = Stage::new(services);
    stage.settings.transition_duration = 0;
    let mut manager = SceneManager::new();
    let (script, log) = recorder();
    let scene = SceneBehavior::spawn(&mut stage, None, script);
    manager.switch_to(&mut stage, Some(scene), false, None);

    manager.update(&mut stage);
    assert!(stage.component::<SceneBehavior>(scene).unwrap().is_loading());
    assert_eq!(*log.borrow(), ["initialize"]);
    manager.update(&mut stage);
    assert!(stage.component::<SceneBehavior>(scene).unwrap().is_loading());
    manager.update(&mut stage);
    assert_eq!(stage.component::<SceneBehavior>(scene).unwrap().state(), SceneState::Running);
    assert_eq!(log.borrow().len(), 4);
}

#[test]
fn test_switch_disposes_unsaved_scene() {
    let mut stage = instant_stage();
    let mut manager = SceneManager::new();
    let first = running_scene(&mut stage, &mut manager);

    let (script, _) = recorder();
    let second = SceneBehavior::spawn(&mut stage, None, script);
    manager.switch_to(&mut stage, Some(second), false, None);
    manager.update(&mut stage);

    assert_eq!(manager.scene(), Some(second));
    assert!(stage.get(first).is_none());
    assert!(manager.previous_scenes().is_empty());
}

#[test]
fn test_switch_hides_saved_scene_and_returns() {
    let mut stage = instant_stage();
    let mut manager = SceneManager::new();
    let first = running_scene(&mut stage, &mut manager);

    let (script, _) = recorder();
    let second = SceneBehavior::spawn(&mut stage, None, script);
    manager.switch_to(&mut stage, Some(second), true, None);
    manager.update(&mut stage);

    assert_eq!(manager.scene(), Some(second));
    let hidden = stage.get(first).unwrap();
    assert!(!hidden.visible && !hidden.active && !hidden.is_disposed());

    assert!(manager.return_to_previous(&mut stage, None));
    manager.update(&mut stage);
    assert_eq!(manager.scene(), Some(first));
    assert!(stage.get(first).unwrap().visible);
    assert!(stage.get(second).is_none());
    assert!(!manager.return_to_previous(&mut stage, None));
}

#[test]
fn test_repeated_saving_switch_stacks_scene_once() {
    let mut stage = instant_stage();
    let mut manager = SceneManager::new();
    let first = running_scene(&mut stage, &mut manager);

    let (script, _) = recorder();
    let second = SceneBehavior::spawn(&mut stage, None, script);
    let (script, _) = recorder();
    let third = SceneBehavior::spawn(&mut stage, None, script);
    manager.switch_to(&mut stage, Some(second), true, None);
    manager.switch_to(&mut stage, Some(third), true, None);
    manager.update(&mut stage);

    assert_eq!(manager.scene(), Some(third));
    assert_eq!(manager.previous_scenes(), &[first]);
    assert!(manager.return_to_previous(&mut stage, None));
    manager.update(&mut stage);
    assert_eq!(manager.scene(), Some(first));
    assert!(!manager.return_to_previous(&mut stage, None));
}

#[test]
fn test_switch_callback_sees_new_scene() {
    let mut stage = instant_stage();
    let mut manager = SceneManager::new();
    let (script, _) = recorder();
    let scene = SceneBehavior::spawn(&mut stage, None, script);
    let seen = Rc::new(Cell::new(None));
    let probe = seen.clone();
    let callback: SwitchCallback = Box::new(move |_: &mut Stage, current: Option<ObjectId>| probe.set(current));

    manager.switch_to(&mut stage, Some(scene), false, Some(callback));
    assert_eq!(seen.get(), None);
    manager.update(&mut stage);
    assert_eq!(seen.get(), Some(scene));
}

#[test]
fn test_no_scene_requests_exit() {
    let mut stage = instant_stage();
    let mut manager = SceneManager::new();
    let scene = running_scene(&mut stage, &mut manager);
    stage.field_paths.resolve("dstRect.x").unwrap();

    manager.switch_to(&mut stage, None, false, None);
    manager.update(&mut stage);

    assert!(stage.exit_requested());
    assert!(stage.get(scene).is_none());
    assert!(stage.field_paths.is_empty());
}

#[test]
fn test_dispose_releases_all_scenes() {
    let mut stage = instant_stage();
    let mut manager = SceneManager::new();
    let first = running_scene(&mut stage, &mut manager);
    let (script, _) = recorder();
    let second = SceneBehavior::spawn(&mut stage, None, script);
    manager.switch_to(&mut stage, Some(second), true, None);
    manager.update(&mut stage);

    manager.dispose(&mut stage);
    assert!(stage.get(first).is_none());
    assert!(stage.get(second).is_none());
    assert_eq!(manager.scene(), None);
}
