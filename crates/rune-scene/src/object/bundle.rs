//! Plain-data snapshots of object trees for save games.
//!
//! A bundle carries the persistable state of an object and, recursively, of
//! its children. Back-references (`parent`), resolved records, runtime cursors
//! and compiled field paths are left out; restoring rebuilds them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Alignment, Color, Effects, GameObject, Margin, Mask, ObjectKind, Rect, Tone, UpdateBehavior, Vec2};
use crate::animation::{AnimationDescriptor, AnimationHandler, AnimationStep};
use crate::binding::{Binding, BindingHandler};
use crate::container::{ContainerKind, DomainContainer, ObjectContainer};
use crate::error::Result;
use crate::layout::{LayoutBehavior, LayoutKind};
use crate::stage::{ObjectId, Stage};
use crate::value::Value;

fn default_zoom() -> Vec2 {
    Vec2::ONE
}

fn default_true() -> bool {
    true
}

/// The flow of a descriptor without its interpreter state.
fn persisted(descriptor: &AnimationDescriptor) -> AnimationDescriptor {
    let flow = descriptor
        .flow
        .iter()
        .map(|step| AnimationStep {
            executed: false,
            components: Vec::new(),
            targets: Vec::new(),
            ..step.clone()
        })
        .collect();
    AnimationDescriptor::new(flow)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: ObjectKind,

    #[serde(default)]
    pub dst_rect: Rect,
    #[serde(default)]
    pub src_rect: Rect,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default = "default_zoom")]
    pub zoom: Vec2,
    #[serde(default)]
    pub offset: Vec2,
    #[serde(default)]
    pub anchor: Vec2,
    pub opacity: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub z_index: i32,

    #[serde(default)]
    pub margin: Margin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_x: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_y: Option<Alignment>,
    #[serde(default)]
    pub inherit_properties: bool,
    #[serde(default)]
    pub update_behavior: UpdateBehavior,
    #[serde(default)]
    pub scrollable: bool,
    #[serde(default)]
    pub scroll_offset_y: f32,
    #[serde(default)]
    pub mask: Mask,
    #[serde(default)]
    pub effects: Effects,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<AnimationDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerKind>,
    #[serde(default)]
    pub animation_handler: bool,
    #[serde(default)]
    pub binding_handler: bool,

    pub domain: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_objects: Vec<ObjectBundle>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_objects_by_domain: BTreeMap<String, Vec<ObjectBundle>>,
}

impl ObjectBundle {
    fn from_object(object: &GameObject) -> Self {
        Self {
            name: object.name.clone(),
            kind: object.kind.clone(),
            dst_rect: object.dst_rect,
            src_rect: object.src_rect,
            color: object.color,
            tone: object.tone,
            zoom: object.zoom,
            offset: object.offset,
            anchor: object.anchor,
            opacity: object.opacity,
            angle: object.angle,
            mirror: object.mirror,
            visible: object.visible,
            active: object.active,
            enabled: object.enabled,
            z_index: object.z_index,
            margin: object.margin,
            alignment_x: object.alignment_x,
            alignment_y: object.alignment_y,
            inherit_properties: object.inherit_properties,
            update_behavior: object.update_behavior,
            scrollable: object.scrollable,
            scroll_offset_y: object.scroll_offset_y,
            mask: object.mask.clone(),
            effects: object.effects,
            fields: object.fields.clone(),
            animations: object.animations.iter().map(persisted).collect(),
            bindings: object.bindings.clone(),
            layout: None,
            container: None,
            animation_handler: false,
            binding_handler: false,
            domain: object.domain.clone(),
            sub_objects: Vec::new(),
            sub_objects_by_domain: BTreeMap::new(),
        }
    }

    fn into_object(self) -> GameObject {
        GameObject {
            name: self.name,
            kind: self.kind,
            dst_rect: self.dst_rect,
            src_rect: self.src_rect,
            color: self.color,
            tone: self.tone,
            zoom: self.zoom,
            offset: self.offset,
            anchor: self.anchor,
            opacity: self.opacity,
            angle: self.angle,
            mirror: self.mirror,
            visible: self.visible,
            active: self.active,
            enabled: self.enabled,
            z_index: self.z_index,
            margin: self.margin,
            alignment_x: self.alignment_x,
            alignment_y: self.alignment_y,
            inherit_properties: self.inherit_properties,
            update_behavior: self.update_behavior,
            scrollable: self.scrollable,
            scroll_offset_y: self.scroll_offset_y,
            mask: self.mask,
            effects: self.effects,
            fields: self.fields,
            animations: self.animations,
            bindings: self.bindings,
            domain: self.domain,
            ..GameObject::default()
        }
    }
}

impl Stage {
    /// Snapshot `id` and everything below it.
    pub fn to_data_bundle(&self, id: ObjectId) -> Result<ObjectBundle> {
        let object = self.object(id)?;
        let mut bundle = ObjectBundle::from_object(object);

        bundle.layout = self.component::<LayoutBehavior>(id).map(|layout| layout.kind.clone());
        bundle.container = if self.component::<DomainContainer>(id).is_some() {
            Some(ContainerKind::Domains)
        } else if self.component::<ObjectContainer>(id).is_some() {
            Some(ContainerKind::Objects)
        } else {
            None
        };
        bundle.animation_handler = self.component::<AnimationHandler>(id).is_some();
        bundle.binding_handler = self.component::<BindingHandler>(id).is_some();

        bundle.sub_objects = self.bundle_list(&object.sub_objects)?;
        for (domain, list) in &object.sub_objects_by_domain {
            bundle.sub_objects_by_domain.insert(domain.clone(), self.bundle_list(list)?);
        }
        Ok(bundle)
    }

    fn bundle_list(&self, list: &[Option<ObjectId>]) -> Result<Vec<ObjectBundle>> {
        list.iter()
            .flatten()
            .filter(|child| self.is_alive(**child))
            .map(|child| self.to_data_bundle(*child))
            .collect()
    }

    /// Recreate a bundled tree under `parent` (or as a root).
    ///
    /// Character records are re-resolved through the data manager and the
    /// bundled handlers are re-attached. The tree is set up at the end unless
    /// its parent is still waiting for setup.
    pub fn restore_bundle(&mut self, parent: Option<ObjectId>, bundle: ObjectBundle) -> Result<ObjectId> {
        if let Some(parent) = parent {
            self.object(parent)?;
        }
        let id = self.restore_tree(parent, bundle)?;
        if parent.is_none_or(|parent| self.get(parent).is_some_and(GameObject::is_setup)) {
            self.setup_object(id);
        }
        debug!(%id, "object tree restored");
        Ok(id)
    }

    fn restore_tree(&mut self, parent: Option<ObjectId>, mut bundle: ObjectBundle) -> Result<ObjectId> {
        let children = std::mem::take(&mut bundle.sub_objects);
        let domains = std::mem::take(&mut bundle.sub_objects_by_domain);
        let layout = bundle.layout.take();
        let container = bundle.container.take();
        let (animation_handler, binding_handler) = (bundle.animation_handler, bundle.binding_handler);

        let mut object = bundle.into_object();
        if let ObjectKind::Character { rid, .. } = &object.kind {
            object.record = self.services.data.get_document(rid).cloned();
            if object.record.is_none() {
                warn!(rid = %rid, "character record not found");
            }
        }
        let active_domain = object.domain.clone();
        let id = self.spawn_deferred(object);

        if let Some(parent) = parent {
            self.add_child(parent, id)?;
        }
        for child in children {
            let child = self.restore_tree(None, child)?;
            self.add_child_to_domain(id, child, &active_domain)?;
        }
        for (domain, list) in domains {
            self.object_mut(id)?.sub_objects_by_domain.entry(domain.clone()).or_default();
            for child in list {
                let child = self.restore_tree(None, child)?;
                self.add_child_to_domain(id, child, &domain)?;
            }
        }

        if animation_handler {
            self.add_component(id, AnimationHandler::default());
        }
        if binding_handler {
            self.add_component(id, BindingHandler);
        }
        if let Some(kind) = layout {
            self.add_component(id, LayoutBehavior::new(kind));
        }
        match container {
            Some(ContainerKind::Objects) => {
                self.add_component(id, ObjectContainer);
            }
            Some(ContainerKind::Domains) => {
                self.add_component(id, DomainContainer::default());
            }
            None => {}
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridLayout;
    use crate::services::{Document, DocumentItems, MemoryDataManager, Services};

    fn stage_with_character() -> Stage {
        let document = Document {
            uid: "ayane".into(),
            items: DocumentItems {
                kind: "character".into(),
                data: serde_json::json!({"name": "Ayane"}),
            },
            loaded: false,
        };
        Stage::new(Services {
            data: Box::new(MemoryDataManager::new([document])),
            ..Services::headless()
        })
    }

    fn decorate(object: &mut GameObject, seed: f32) {
        object.dst_rect = Rect::new(seed, seed + 1.0, 64.0, 32.0);
        object.src_rect = Rect::new(0.5, 0.25, 16.0, 8.0);
        object.color = Color::rgba(1, 2, 3, 4);
        object.tone = Tone::new(-10, 20, -30, 40);
        object.zoom = Vec2::new(1.5, 0.75);
        object.angle = seed * 3.0;
        object.mirror = true;
    }

    #[test]
    fn test_round_trip_keeps_declared_fields_and_drops_parent() {
        let mut stage = stage_with_character();
        let root = stage.spawn(GameObject::default());
        let kinds = [
            ObjectKind::Text { text: "Hello".into() },
            ObjectKind::Character {
                rid: "ayane".into(),
                expression: Some("smile".into()),
            },
            ObjectKind::Background {
                image: Some("bg/school.png".into()),
            },
        ];

        for (seed, kind) in kinds.into_iter().enumerate() {
            let mut object = GameObject::new(kind);
            decorate(&mut object, seed as f32 * 10.0);
            let id = stage.spawn(object);
            stage.add_child(root, id).unwrap();

            let bundle = stage.to_data_bundle(id).unwrap();
            let json = serde_json::to_string(&bundle).unwrap();
            assert!(!json.contains("parent"));
            let bundle: ObjectBundle = serde_json::from_str(&json).unwrap();

            let copy = stage.restore_bundle(None, bundle).unwrap();
            let (before, restored) = (stage.get(id).unwrap(), stage.get(copy).unwrap());
            assert_eq!(restored.kind, before.kind);
            assert_eq!(restored.dst_rect, before.dst_rect);
            assert_eq!(restored.src_rect, before.src_rect);
            assert_eq!((restored.color, restored.tone), (before.color, before.tone));
            assert_eq!(restored.zoom, before.zoom);
            assert_eq!(restored.angle.to_bits(), before.angle.to_bits());
            assert_eq!(restored.mirror, before.mirror);
            assert_eq!(before.parent, Some(root));
            assert_eq!(restored.parent, None);
        }
    }

    #[test]
    fn test_character_record_is_resolved_on_restore() {
        let mut stage = stage_with_character();
        let id = stage.spawn(GameObject::new(ObjectKind::Character {
            rid: "ayane".into(),
            expression: None,
        }));
        let bundle = stage.to_data_bundle(id).unwrap();
        let copy = stage.restore_bundle(None, bundle).unwrap();
        assert_eq!(stage.get(copy).unwrap().record.as_ref().map(|doc| doc.uid.as_str()), Some("ayane"));
    }

    #[test]
    fn test_tree_with_handlers_and_domains() {
        let mut stage = Stage::default();
        let menu = stage.spawn(GameObject::named("menu"));
        let mut flow = GameObject::named("item");
        flow.animations.push(AnimationDescriptor::new(vec![AnimationStep::waiting(3)]));
        flow.bindings.push(Binding::new("$menu.dstRect.x", "dstRect.x"));
        let item = stage.spawn(flow);
        let extra = stage.spawn(GameObject::named("extra"));
        stage.add_child(menu, item).unwrap();
        stage.add_child_to_domain(menu, extra, "options").unwrap();
        stage.add_component(menu, LayoutBehavior::grid(GridLayout::new(1, 4)));
        stage.add_component(menu, DomainContainer::default());
        stage.add_component(item, AnimationHandler::default());
        stage.add_component(item, BindingHandler);
        stage.update_object(item);

        let bundle = stage.to_data_bundle(menu).unwrap();
        assert_eq!(bundle.container, Some(ContainerKind::Domains));
        let persisted_step = &bundle.sub_objects[0].animations[0].flow[0];
        assert!(!persisted_step.executed);

        let copy = stage.restore_bundle(None, bundle.clone()).unwrap();
        assert_eq!(stage.to_data_bundle(copy).unwrap(), bundle);

        let restored = stage.get(copy).unwrap();
        let child = restored.sub_objects[0].unwrap();
        assert_eq!(stage.get(child).unwrap().parent, Some(copy));
        assert!(stage.get(child).unwrap().is_setup());
        assert!(stage.component::<AnimationHandler>(child).is_some());
        assert_eq!(restored.sub_objects_by_domain["options"].len(), 1);
    }
}
