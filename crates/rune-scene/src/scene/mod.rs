//! Scene lifecycle.
//!
//! A scene is a game object carrying a [`SceneBehavior`]. The behavior owns a
//! [`SceneScript`] with the game-specific hooks and walks it through loading:
//!
//! ```text
//! Preparing --initialize--> LoadingData --documents loaded--> LoadingResources
//!     --resources loaded--> (freeze, setup, prepare_visual, transition, start) --> Running
//! ```
//!
//! Loading is observed by polling the data and resource managers once per
//! frame. Nothing blocks. The [`SceneManager`] decides which scene is current
//! and plays the transitions between them.

mod manager;

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::component::{Component, ComponentHandle};
use crate::container::ObjectContainer;
use crate::object::{GameObject, ObjectKind};
use crate::stage::{ObjectId, Stage};

pub use manager::{SceneManager, SwitchCallback};

/// Game-specific hooks of a scene. Every hook defaults to a no-op.
pub trait SceneScript {
    /// Called once when the scene first becomes current.
    fn initialize(&mut self, _stage: &mut Stage, _scene: ObjectId) {}

    /// Called once documents are loaded. Create content objects here.
    fn prepare_data(&mut self, _stage: &mut Stage, _scene: ObjectId) {}

    /// Called once resources are loaded, after the scene tree is set up.
    fn prepare_visual(&mut self, _stage: &mut Stage, _scene: ObjectId) {}

    fn start(&mut self, _stage: &mut Stage, _scene: ObjectId) {}

    /// Called every frame once the scene is running.
    fn update_content(&mut self, _stage: &mut Stage, _scene: ObjectId) {}

    /// Length of the transition into this scene, in frames.
    fn transition_duration(&self, stage: &Stage) -> u32 {
        stage.settings.transition_duration
    }

    fn dispose(&mut self, _stage: &mut Stage, _scene: ObjectId) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Preparing,
    LoadingData,
    LoadingResources,
    Running,
    Disposed,
}

pub struct SceneBehavior {
    script: Box<dyn SceneScript>,
    state: SceneState,
}

impl std::fmt::Debug for SceneBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneBehavior").field("state", &self.state).finish_non_exhaustive()
    }
}

impl SceneBehavior {
    pub fn new(script: impl SceneScript + 'static) -> Self {
        Self {
            script: Box::new(script),
            state: SceneState::Preparing,
        }
    }

    /// Create a scene object driven by `script`, with a container for its content.
    pub fn spawn(stage: &mut Stage, uid: Option<String>, script: impl SceneScript + 'static) -> ObjectId {
        let scene = stage.spawn(GameObject::new(ObjectKind::Scene { uid }));
        stage.add_component(scene, SceneBehavior::new(script));
        stage.add_component(scene, ObjectContainer);
        scene
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != SceneState::Preparing
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SceneState::LoadingData | SceneState::LoadingResources)
    }

    pub fn transition_duration(&self, stage: &Stage) -> u32 {
        self.script.transition_duration(stage)
    }

    /// Run the script's `initialize` hook and start loading. Only the first call has any effect.
    pub fn initialize(&mut self, stage: &mut Stage, scene: ObjectId) {
        if self.state != SceneState::Preparing {
            return;
        }
        self.script.initialize(stage, scene);
        self.state = SceneState::LoadingData;
        debug!(%scene, "scene initialized");
    }

    /// Loading screen hand-off: set the finished tree up behind a frozen
    /// frame, then transition into it.
    fn hand_off(&mut self, stage: &mut Stage, scene: ObjectId) {
        stage.services.graphics.freeze();
        stage.setup_object(scene);
        self.script.prepare_visual(stage, scene);
        let duration = self.script.transition_duration(stage);
        stage.services.graphics.transition(duration);
        self.script.start(stage, scene);
        self.state = SceneState::Running;
        debug!(%scene, "scene running");
    }
}

impl Component for SceneBehavior {
    fn name(&self) -> &'static str {
        "scene"
    }

    fn update(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        let scene = handle.object;
        if self.state == SceneState::LoadingData && stage.services.data.documents_loaded() {
            self.script.prepare_data(stage, scene);
            self.state = SceneState::LoadingResources;
            debug!(%scene, "scene data prepared");
        }
        if self.state == SceneState::LoadingResources && stage.services.resources.resources_loaded() {
            self.hand_off(stage, scene);
            return;
        }
        if self.state == SceneState::Running {
            self.script.update_content(stage, scene);
        }
    }

    fn dispose(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        self.script.dispose(stage, handle.object);
        self.state = SceneState::Disposed;
    }
}
