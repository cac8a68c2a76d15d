//! Scene runtime for the rune visual-novel engine.
//!
//! Game objects live in a [`Stage`] arena and carry ordered lists of
//! [`Component`]s that the stage drives once per frame. On top of that the
//! crate provides easing-driven animations, declarative animation flows,
//! field-path bindings, layouts, domain containers, the scene lifecycle and
//! save-game snapshots.

pub mod animation;
pub mod binding;
pub mod component;
pub mod container;
pub mod error;
pub mod layout;
pub mod object;
pub mod save;
pub mod scene;
pub mod services;
pub mod stage;
pub mod value;

pub use component::{Component, ComponentHandle, ComponentId};
pub use error::{Result, SceneError};
pub use object::{GameObject, ObjectBundle, ObjectKind};
pub use save::{SaveGame, SaveStore};
pub use scene::{SceneBehavior, SceneManager, SceneScript, SceneState};
pub use services::Services;
pub use stage::{ObjectId, Stage, StageSettings};
pub use value::Value;
