//! The object arena and per-frame component driver.
//!
//! Objects are addressed by generational [`ObjectId`]s: disposing an object
//! frees its slot and bumps the slot generation, so stale ids held by parents
//! or descriptors simply stop resolving instead of aliasing a newer object.
//!
//! Everything is single threaded. A component's hooks run to completion
//! before the next component starts; the only ordering discipline is the
//! order of each object's component list.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::binding::FieldPathCache;
use crate::component::{downcast_mut, downcast_ref, Component, ComponentHandle, ComponentId, ComponentSlot};
use crate::error::{Result, SceneError};
use crate::object::GameObject;
use crate::services::Services;

/// Generational reference to an object in a [`Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Runtime switches shared by every component.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSettings {
    /// Finish every animation on the frame it starts.
    pub skip_animations: bool,
    /// Pixels scrolled per unit of mouse-wheel delta.
    pub scroll_speed: f32,
    /// Default scene transition length in frames.
    pub transition_duration: u32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            skip_animations: false,
            scroll_speed: 1.0,
            transition_duration: 30,
        }
    }
}

impl StageSettings {
    pub fn from_config(config: &rune_config::EngineConfig) -> Self {
        Self {
            skip_animations: config.skip_animations,
            scroll_speed: config.scroll_speed,
            transition_duration: config.transition_duration,
        }
    }
}

struct ObjectSlot {
    generation: u32,
    object: Option<GameObject>,
}

/// Owner of every live game object plus the collaborators they talk to.
pub struct Stage {
    slots: Vec<ObjectSlot>,
    free: Vec<u32>,
    next_component: u64,
    pub services: Services,
    pub settings: StageSettings,
    /// Memoized field paths, keyed by their literal text.
    pub field_paths: FieldPathCache,
    exit_requested: bool,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(Services::headless())
    }
}

impl Stage {
    pub fn new(services: Services) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            next_component: 1,
            services,
            settings: StageSettings::default(),
            field_paths: FieldPathCache::default(),
            exit_requested: false,
        }
    }

    pub fn with_settings(mut self, settings: StageSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Insert an object whose components are set up as they are attached.
    pub fn spawn(&mut self, mut object: GameObject) -> ObjectId {
        object.is_setup = true;
        self.insert(object)
    }

    /// Insert an object whose component setup waits for [`Stage::setup_object`].
    pub fn spawn_deferred(&mut self, mut object: GameObject) -> ObjectId {
        object.is_setup = false;
        self.insert(object)
    }

    fn insert(&mut self, object: GameObject) -> ObjectId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            ObjectId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(ObjectSlot {
                generation: 0,
                object: Some(object),
            });
            ObjectId::new(index, 0)
        }
    }

    fn release(&mut self, id: ObjectId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize)
            && slot.generation == id.generation
        {
            slot.object = None;
            slot.generation += 1;
            self.free.push(id.index);
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_mut())
    }

    /// The object if it exists, or a [`SceneError::MissingObject`].
    pub fn object(&self, id: ObjectId) -> Result<&GameObject> {
        self.get(id).ok_or(SceneError::MissingObject(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut GameObject> {
        self.get_mut(id).ok_or(SceneError::MissingObject(id))
    }

    /// True if the object exists and has not started disposing.
    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.get(id).is_some_and(|object| !object.disposed)
    }

    pub fn object_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.object.is_some()).count()
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let object = slot.object.as_ref()?;
            (!object.disposed && object.name.as_deref() == Some(name))
                .then(|| ObjectId::new(index as u32, slot.generation))
        })
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Attach `child` to the parent's active domain.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<()> {
        let domain = self.object(parent)?.domain.clone();
        self.add_child_to_domain(parent, child, &domain)
    }

    /// Attach `child` to a named domain of `parent`, creating the domain list if needed.
    pub fn add_child_to_domain(&mut self, parent: ObjectId, child: ObjectId, domain: &str) -> Result<()> {
        self.object_mut(child)?.parent = Some(parent);
        let parent_object = self.object_mut(parent)?;
        if parent_object.domain == domain {
            parent_object.sub_objects.push(Some(child));
        } else {
            parent_object
                .sub_objects_by_domain
                .entry(domain.to_string())
                .or_default()
                .push(Some(child));
        }
        Ok(())
    }

    /// Attach a component. It is set up immediately unless the owner defers setup.
    pub fn add_component<C: Component + Any>(&mut self, owner: ObjectId, component: C) -> Option<ComponentHandle> {
        self.add_boxed_component(owner, Box::new(component))
    }

    pub fn add_boxed_component(
        &mut self,
        owner: ObjectId,
        component: Box<dyn Component>,
    ) -> Option<ComponentHandle> {
        let id = ComponentId(self.next_component);
        let object = self.get_mut(owner)?;
        if object.disposed {
            return None;
        }
        self.next_component += 1;
        let object = self.get_mut(owner)?;
        object.components.push(ComponentSlot::new(id, component));
        let ready = object.is_setup;
        let handle = ComponentHandle {
            object: owner,
            component: id,
        };
        if ready {
            self.setup_component(handle);
        }
        Some(handle)
    }

    fn take_component(&mut self, handle: ComponentHandle) -> Option<Box<dyn Component>> {
        self.get_mut(handle.object)?
            .components
            .iter_mut()
            .find(|slot| slot.id == handle.component)?
            .component
            .take()
    }

    /// Put a component back after calling into it.
    fn restore_component(&mut self, handle: ComponentHandle, mut component: Box<dyn Component>) {
        let slot = self
            .get_mut(handle.object)
            .and_then(|object| object.components.iter_mut().find(|slot| slot.id == handle.component));
        match slot {
            Some(slot) => slot.component = Some(component),
            // The owner went away while the component was out of its slot.
            None => component.dispose(self, handle),
        }
        if self.get(handle.object).is_some_and(|object| object.updating == 0) {
            self.flush_removals(handle.object);
        }
    }

    fn setup_component(&mut self, handle: ComponentHandle) {
        let Some(mut component) = self.take_component(handle) else {
            return;
        };
        component.setup(self, handle);
        if let Some(slot) = self
            .get_mut(handle.object)
            .and_then(|object| object.components.iter_mut().find(|slot| slot.id == handle.component))
        {
            slot.is_setup = true;
        }
        self.restore_component(handle, component);
    }

    /// Detach a component. Removal is deferred until the owner finishes its update.
    pub fn remove_component(&mut self, handle: ComponentHandle) {
        let Some(object) = self.get_mut(handle.object) else {
            return;
        };
        let Some(slot) = object.components.iter_mut().find(|slot| slot.id == handle.component) else {
            return;
        };
        slot.remove_requested = true;
        if object.updating == 0 {
            self.flush_removals(handle.object);
        }
    }

    fn flush_removals(&mut self, owner: ObjectId) {
        let Some(object) = self.get_mut(owner) else {
            return;
        };
        let mut removed = Vec::new();
        object.components.retain_mut(|slot| {
            if !slot.remove_requested || slot.component.is_none() {
                return true;
            }
            if !slot.disposed
                && let Some(component) = slot.component.take()
            {
                removed.push((slot.id, component));
            }
            false
        });
        for (id, mut component) in removed {
            let handle = ComponentHandle {
                object: owner,
                component: id,
            };
            trace!(name = component.name(), %owner, "component removed");
            component.dispose(self, handle);
        }
    }

    /// Run `setup` for every component not yet set up, here and in children.
    pub fn setup_object(&mut self, id: ObjectId) {
        let Some(object) = self.get_mut(id) else {
            return;
        };
        object.is_setup = true;
        let pending: Vec<ComponentId> = object
            .components
            .iter()
            .filter(|slot| !slot.is_setup && slot.is_live())
            .map(|slot| slot.id)
            .collect();
        let children = object.all_sub_objects();
        for component in pending {
            self.setup_component(ComponentHandle { object: id, component });
        }
        for child in children {
            if self.get(child).is_some_and(|object| !object.is_setup) {
                self.setup_object(child);
            }
        }
    }

    /// Update every set-up component of an object, in list order.
    pub fn update_object(&mut self, id: ObjectId) {
        match self.get_mut(id) {
            Some(object) if !object.disposed => object.updating += 1,
            _ => return,
        }

        let mut index = 0;
        loop {
            let Some(object) = self.get_mut(id) else {
                return;
            };
            let Some(slot) = object.components.get_mut(index) else {
                break;
            };
            index += 1;
            if !slot.is_live() || !slot.is_setup {
                continue;
            }
            let handle = ComponentHandle {
                object: id,
                component: slot.id,
            };
            let Some(mut component) = slot.component.take() else {
                continue;
            };
            component.update(self, handle);
            self.restore_component(handle, component);
        }

        if let Some(object) = self.get_mut(id) {
            object.updating -= 1;
            if object.updating == 0 {
                self.flush_removals(id);
            }
        }
    }

    /// Dispose every component exactly once, then free the object's slot.
    pub fn dispose_object(&mut self, id: ObjectId) {
        let Some(object) = self.get_mut(id) else {
            return;
        };
        if object.disposed {
            return;
        }
        object.disposed = true;
        let components: Vec<(ComponentId, Box<dyn Component>)> = object
            .components
            .iter_mut()
            .filter(|slot| !slot.disposed)
            .filter_map(|slot| {
                slot.disposed = true;
                slot.component.take().map(|component| (slot.id, component))
            })
            .collect();
        for (component_id, mut component) in components {
            component.dispose(
                self,
                ComponentHandle {
                    object: id,
                    component: component_id,
                },
            );
        }
        trace!(%id, "object disposed");
        self.release(id);
    }

    /// Borrow the first live component of type `T` on `id` together with the stage.
    pub fn with_component<T, R>(&mut self, id: ObjectId, f: impl FnOnce(&mut T, &mut Stage) -> R) -> Option<R>
    where
        T: Component + Any,
    {
        let handle = self.component_handle::<T>(id)?;
        self.with_handle(handle, f)
    }

    /// Like [`Stage::with_component`], addressing one specific component.
    pub fn with_handle<T, R>(&mut self, handle: ComponentHandle, f: impl FnOnce(&mut T, &mut Stage) -> R) -> Option<R>
    where
        T: Component + Any,
    {
        if !self.has_component(handle) {
            return None;
        }
        let mut component = self.take_component(handle)?;
        let result = downcast_mut::<T>(component.as_mut()).map(|typed| f(typed, self));
        self.restore_component(handle, component);
        result
    }

    pub fn component<T: Component + Any>(&self, id: ObjectId) -> Option<&T> {
        self.get(id)?
            .components
            .iter()
            .filter(|slot| slot.is_live())
            .find_map(|slot| slot.component.as_deref().and_then(downcast_ref::<T>))
    }

    pub fn component_mut<T: Component + Any>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.get_mut(id)?
            .components
            .iter_mut()
            .filter(|slot| slot.is_live())
            .find_map(|slot| slot.component.as_deref_mut().and_then(downcast_mut::<T>))
    }

    pub fn component_handle<T: Component + Any>(&self, id: ObjectId) -> Option<ComponentHandle> {
        self.get(id)?
            .components
            .iter()
            .filter(|slot| slot.is_live())
            .find(|slot| {
                slot.component
                    .as_deref()
                    .is_some_and(|component| downcast_ref::<T>(component).is_some())
            })
            .map(|slot| ComponentHandle {
                object: id,
                component: slot.id,
            })
    }

    /// True if the component exists and has not been removed or disposed.
    pub fn has_component(&self, handle: ComponentHandle) -> bool {
        self.get(handle.object).is_some_and(|object| {
            object
                .components
                .iter()
                .any(|slot| slot.id == handle.component && slot.is_live())
        })
    }
}
