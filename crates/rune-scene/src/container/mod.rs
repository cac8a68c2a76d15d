//! Components that own and update an object's children.
//!
//! Disposed children are not compacted out of the lists. Their entries are
//! replaced with `None` so indices held elsewhere keep pointing at the same
//! slots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::{Component, ComponentHandle};
use crate::stage::{ObjectId, Stage};

/// Which container a persisted object carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Objects,
    Domains,
}

/// Update every active child in `list`, tombstoning the ones that are gone.
fn update_list(stage: &mut Stage, list: &[Option<ObjectId>]) -> Vec<usize> {
    let mut dead = Vec::new();
    for (index, entry) in list.iter().enumerate() {
        let Some(child) = *entry else {
            continue;
        };
        match stage.get(child) {
            Some(object) if !object.is_disposed() => {
                if object.active {
                    stage.update_object(child);
                }
            }
            _ => dead.push(index),
        }
    }
    dead
}

fn tombstone(list: &mut [Option<ObjectId>], dead: &[usize]) {
    for &index in dead {
        if let Some(entry) = list.get_mut(index) {
            *entry = None;
        }
    }
}

fn dispose_list(stage: &mut Stage, list: Vec<Option<ObjectId>>) {
    for child in list.into_iter().flatten() {
        stage.dispose_object(child);
    }
}

/// Updates the active domain's children of a plain object.
#[derive(Debug, Default)]
pub struct ObjectContainer;

impl Component for ObjectContainer {
    fn name(&self) -> &'static str {
        "object_container"
    }

    fn update(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        let Some(object) = stage.get(handle.object) else {
            return;
        };
        let children = object.sub_objects.clone();
        let dead = update_list(stage, &children);
        if let Some(object) = stage.get_mut(handle.object) {
            tombstone(&mut object.sub_objects, &dead);
        }
    }

    fn dispose(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        if let Some(object) = stage.get_mut(handle.object) {
            let children = std::mem::take(&mut object.sub_objects);
            dispose_list(stage, children);
        }
    }
}

/// Partitions an object's children into named domains.
///
/// The active domain's list always lives in `GameObject::sub_objects`; every
/// other domain waits in `sub_objects_by_domain` until it is switched in.
#[derive(Debug, Default)]
pub struct DomainContainer {
    domains: Vec<String>,
}

impl DomainContainer {
    /// Names of every domain known to the owner, active one first.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Refresh the known-domains index from the owner.
    pub fn refresh(&mut self, stage: &Stage, owner: ObjectId) {
        self.domains = stage
            .get(owner)
            .map(|object| {
                std::iter::once(object.domain.clone())
                    .chain(object.sub_objects_by_domain.keys().cloned())
                    .collect()
            })
            .unwrap_or_default();
    }

    /// Make `domain` the active domain, creating it empty if needed.
    pub fn change_domain(&mut self, stage: &mut Stage, owner: ObjectId, domain: &str) {
        let Some(object) = stage.get_mut(owner) else {
            return;
        };
        if object.domain == domain {
            return;
        }
        let incoming = object.sub_objects_by_domain.remove(domain).unwrap_or_default();
        let outgoing = std::mem::replace(&mut object.sub_objects, incoming);
        let previous = std::mem::replace(&mut object.domain, domain.to_string());
        object.sub_objects_by_domain.insert(previous.clone(), outgoing);
        debug!(%owner, from = %previous, to = domain, "domain changed");
        self.refresh(stage, owner);
    }

    /// Show or hide the children of every domain, not just the active one.
    pub fn set_visible(&mut self, stage: &mut Stage, owner: ObjectId, visible: bool) {
        let Some(object) = stage.get(owner) else {
            return;
        };
        for child in object.all_sub_objects() {
            if let Some(object) = stage.get_mut(child) {
                object.visible = visible;
            }
            stage.update_object(child);
        }
    }
}

impl Component for DomainContainer {
    fn name(&self) -> &'static str {
        "domain_container"
    }

    fn setup(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        self.refresh(stage, handle.object);
    }

    fn update(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        let owner = handle.object;
        for domain in self.domains.clone() {
            let Some(object) = stage.get(owner) else {
                return;
            };
            let active = object.domain == domain;
            let children = if active {
                object.sub_objects.clone()
            } else {
                match object.sub_objects_by_domain.get(&domain) {
                    Some(list) => list.clone(),
                    None => continue,
                }
            };
            let dead = update_list(stage, &children);
            if dead.is_empty() {
                continue;
            }
            if let Some(object) = stage.get_mut(owner) {
                let list = if object.domain == domain {
                    Some(&mut object.sub_objects)
                } else {
                    object.sub_objects_by_domain.get_mut(&domain)
                };
                if let Some(list) = list {
                    tombstone(list, &dead);
                }
            }
        }
    }

    fn dispose(&mut self, stage: &mut Stage, handle: ComponentHandle) {
        let Some(object) = stage.get_mut(handle.object) else {
            return;
        };
        let inactive = std::mem::take(&mut object.sub_objects_by_domain);
        let active = std::mem::take(&mut object.sub_objects);
        for (_, list) in inactive {
            dispose_list(stage, list);
        }
        dispose_list(stage, active);
    }
}
