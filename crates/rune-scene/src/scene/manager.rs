use tracing::{debug, info};

use super::SceneBehavior;
use crate::stage::{ObjectId, Stage};

/// Invoked once the manager has swapped in the scene passed to `switch_to`.
pub type SwitchCallback = Box<dyn FnOnce(&mut Stage, Option<ObjectId>)>;

/// Owns the current scene and drives the top-level frame.
///
/// Switching is deferred: [`SceneManager::switch_to`] only records the target
/// and freezes the screen, the swap itself happens on the next
/// [`SceneManager::update`]. While a transition into a freshly initialized
/// scene plays, game logic is paused and only graphics and input are pumped.
#[derive(Default)]
pub struct SceneManager {
    scene: Option<ObjectId>,
    next_scene: Option<ObjectId>,
    previous_scenes: Vec<ObjectId>,
    is_fade_out: bool,
    switch_callback: Option<SwitchCallback>,
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("scene", &self.scene)
            .field("next_scene", &self.next_scene)
            .field("previous_scenes", &self.previous_scenes)
            .field("is_fade_out", &self.is_fade_out)
            .finish_non_exhaustive()
    }
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> Option<ObjectId> {
        self.scene
    }

    pub fn previous_scenes(&self) -> &[ObjectId] {
        &self.previous_scenes
    }

    pub fn is_fade_out(&self) -> bool {
        self.is_fade_out
    }

    /// Schedule a switch to `scene` (or to no scene, which ends the game).
    ///
    /// With `save_previous` the current scene is kept hidden on a stack for
    /// [`SceneManager::return_to_previous`] instead of being disposed.
    pub fn switch_to(
        &mut self,
        stage: &mut Stage,
        scene: Option<ObjectId>,
        save_previous: bool,
        callback: Option<SwitchCallback>,
    ) {
        if save_previous
            && let Some(current) = self.scene
            && self.previous_scenes.last() != Some(&current)
        {
            self.previous_scenes.push(current);
        }
        self.next_scene = scene;
        self.switch_callback = callback;
        stage.services.graphics.freeze();
        debug!(?scene, save_previous, "scene switch scheduled");
    }

    /// Switch back to the most recently saved scene. Returns false if there is none.
    pub fn return_to_previous(&mut self, stage: &mut Stage, callback: Option<SwitchCallback>) -> bool {
        match self.previous_scenes.pop() {
            Some(previous) => {
                self.switch_to(stage, Some(previous), false, callback);
                true
            }
            None => false,
        }
    }

    /// Advance one frame.
    pub fn update(&mut self, stage: &mut Stage) {
        if self.next_scene != self.scene {
            self.swap(stage);
        }

        if self.is_fade_out {
            if stage.services.graphics.frozen() {
                stage.services.graphics.update();
                stage.services.input.update();
                return;
            }
            self.is_fade_out = false;
            stage.services.audio.stop_all();
            if self.next_scene != self.scene {
                stage.services.graphics.freeze();
                return;
            }
            if self.scene.is_none() {
                info!("no scene left, exiting");
                stage.field_paths.clear();
                stage.request_exit();
                return;
            }
        }

        stage.services.data.update();
        stage.services.resources.update();
        if stage.services.data.records_initialized() {
            stage.services.audio.update();
        }
        if let Some(scene) = self.scene {
            stage.update_object(scene);
        }
        stage.services.graphics.update();
        stage.services.input.update();
    }

    fn swap(&mut self, stage: &mut Stage) {
        stage.services.input.clear();

        if let Some(old) = self.scene {
            if self.previous_scenes.contains(&old) {
                if let Some(object) = stage.get_mut(old) {
                    object.visible = false;
                    object.active = false;
                }
                info!(scene = %old, "scene hidden");
            } else {
                stage.dispose_object(old);
                info!(scene = %old, "scene disposed");
            }
        }

        self.scene = self.next_scene;
        if let Some(callback) = self.switch_callback.take() {
            callback(stage, self.scene);
        }

        let Some(scene) = self.scene else {
            stage.services.graphics.transition(stage.settings.transition_duration);
            self.is_fade_out = true;
            return;
        };

        let initialized = stage
            .component::<SceneBehavior>(scene)
            .is_none_or(SceneBehavior::is_initialized);
        if initialized {
            if let Some(object) = stage.get_mut(scene) {
                object.visible = true;
                object.active = true;
            }
            stage.update_object(scene);
        } else {
            stage.with_component(scene, |behavior: &mut SceneBehavior, stage| {
                behavior.initialize(stage, scene);
            });
            self.is_fade_out = true;
        }
        info!(%scene, "scene switched");

        let duration = stage
            .component::<SceneBehavior>(scene)
            .map_or(stage.settings.transition_duration, |behavior| behavior.transition_duration(stage));
        stage.services.graphics.request_frame();
        stage.services.graphics.transition(duration);
    }

    /// Dispose the current scene and every saved one.
    pub fn dispose(&mut self, stage: &mut Stage) {
        for scene in self.previous_scenes.drain(..).chain(self.scene.take()) {
            stage.dispose_object(scene);
        }
        self.next_scene = None;
        self.switch_callback = None;
    }
}
