//! The component contract.
//!
//! Components are attached to exactly one [`GameObject`] and driven by the
//! [`Stage`] in list order: `setup` once, `update` once per frame while the
//! object is updated, `dispose` once when removed. The stage takes a component
//! out of its slot while calling into it, so a component may freely mutate the
//! stage (its own object included) from any of these hooks.
//!
//! [`GameObject`]: crate::object::GameObject
//! [`Stage`]: crate::stage::Stage

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stage::{ObjectId, Stage};

/// Unique identifier of an attached component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

/// Names a component together with the object that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    pub object: ObjectId,
    pub component: ComponentId,
}

/// Downcasting support for boxed components.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-frame behavior attached to a game object.
///
/// Every hook defaults to a no-op.
pub trait Component: AsAny {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn setup(&mut self, _stage: &mut Stage, _handle: ComponentHandle) {}

    fn update(&mut self, _stage: &mut Stage, _handle: ComponentHandle) {}

    fn dispose(&mut self, _stage: &mut Stage, _handle: ComponentHandle) {}
}

pub(crate) fn downcast_ref<T: Component + Any>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

pub(crate) fn downcast_mut<'a, T: Component + Any>(component: &'a mut (dyn Component + 'static)) -> Option<&'a mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// Storage cell for one component on an object.
///
/// `component` is `None` while the stage is calling into it.
pub(crate) struct ComponentSlot {
    pub id: ComponentId,
    pub name: &'static str,
    pub component: Option<Box<dyn Component>>,
    pub is_setup: bool,
    pub disposed: bool,
    pub remove_requested: bool,
}

impl ComponentSlot {
    pub fn new(id: ComponentId, component: Box<dyn Component>) -> Self {
        Self {
            id,
            name: component.name(),
            component: Some(component),
            is_setup: false,
            disposed: false,
            remove_requested: false,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.disposed && !self.remove_requested
    }
}

impl fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("is_setup", &self.is_setup)
            .field("disposed", &self.disposed)
            .finish()
    }
}
