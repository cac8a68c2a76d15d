//! Demo title scene for the headless driver.

use rune_scene::animation::{AnimationDescriptor, AnimationHandler, AnimationStep, Animator, EasingFunction};
use rune_scene::binding::{Binding, BindingHandler};
use rune_scene::container::DomainContainer;
use rune_scene::layout::{GridLayout, LayoutBehavior, LayoutKind, Orientation, SpreadLayout};
use rune_scene::object::{GameObject, ObjectKind, Rect};
use rune_scene::{ObjectId, SceneScript, Stage};

const MENU_ENTRIES: [&str; 3] = ["New Game", "Continue", "Settings"];
const GALLERY_SIZE: usize = 6;

#[derive(Debug, Default)]
pub struct TitleScene {
    menu: Option<ObjectId>,
    frames: u64,
}

impl TitleScene {
    fn add(stage: &mut Stage, parent: ObjectId, object: GameObject) -> ObjectId {
        let id = stage.spawn_deferred(object);
        if let Err(error) = stage.add_child(parent, id) {
            log::warn!("cannot attach {id}: {error}");
        }
        id
    }
}

impl SceneScript for TitleScene {
    fn initialize(&mut self, _stage: &mut Stage, scene: ObjectId) {
        log::info!("title scene {scene} initializing");
    }

    fn prepare_data(&mut self, stage: &mut Stage, scene: ObjectId) {
        stage.services.resources.get_bitmap("backgrounds/title.png");

        let background = GameObject::new(ObjectKind::Background {
            image: Some("backgrounds/title.png".into()),
        })
        .with_rect(Rect::new(0.0, 0.0, 1280.0, 720.0));
        Self::add(stage, scene, background);

        let mut logo = GameObject::new(ObjectKind::Text {
            text: "Rune".into(),
        })
        .with_name("logo")
        .with_rect(Rect::new(440.0, 80.0, 400.0, 120.0));
        logo.opacity = 0.0;
        logo.animations.push(AnimationDescriptor::new(vec![
            AnimationStep::of_kind("opacity").with_param("value", 255.0).with_duration(30),
            AnimationStep::of_kind("zoom")
                .with_param("x", 1.05)
                .with_param("y", 1.05)
                .with_duration(45),
            AnimationStep::waiting(45),
            AnimationStep::of_kind("zoom")
                .with_param("x", 1.0)
                .with_param("y", 1.0)
                .with_duration(45),
            AnimationStep::waiting(45),
        ]));
        let logo = Self::add(stage, scene, logo);
        stage.add_component(logo, AnimationHandler::default());

        let mut shadow = GameObject::named("logo_shadow").with_rect(Rect::new(0.0, 0.0, 400.0, 120.0));
        shadow.bindings.push(Binding::new("$logo.dstRect.x", "dstRect.x").with_offset(4.0));
        shadow.bindings.push(Binding::new("$logo.dstRect.y", "dstRect.y").with_offset(4.0));
        shadow.bindings.push(Binding::new("$logo.opacity", "opacity").with_range(Some(0.0), Some(128.0)));
        let shadow = Self::add(stage, scene, shadow);
        stage.add_component(shadow, BindingHandler);

        let menu = Self::add(
            stage,
            scene,
            GameObject::named("menu").with_rect(Rect::new(540.0, 400.0, 200.0, 180.0)),
        );
        for entry in MENU_ENTRIES {
            let item = GameObject::new(ObjectKind::Text { text: entry.into() }).with_rect(Rect::new(0.0, 0.0, 200.0, 40.0));
            Self::add(stage, menu, item);
        }
        for index in 0..GALLERY_SIZE {
            let thumb = stage.spawn_deferred(
                GameObject::new(ObjectKind::Picture {
                    image: Some(format!("gallery/{index}.png")),
                })
                .with_rect(Rect::new(0.0, 0.0, 60.0, 60.0)),
            );
            if let Err(error) = stage.add_child_to_domain(menu, thumb, "gallery") {
                log::warn!("cannot attach gallery thumb: {error}");
            }
        }
        stage.add_component(menu, LayoutBehavior::spread(SpreadLayout::new(Orientation::Vertical)));
        stage.add_component(menu, DomainContainer::default());
        self.menu = Some(menu);

        let mut heroine = GameObject::new(ObjectKind::Character {
            rid: "heroine".into(),
            expression: Some("smile".into()),
        })
        .with_rect(Rect::new(900.0, 200.0, 300.0, 500.0));
        heroine.record = stage.services.data.get_document("heroine").cloned();
        heroine.visible = heroine.record.is_some();
        Self::add(stage, scene, heroine);
    }

    fn prepare_visual(&mut self, stage: &mut Stage, scene: ObjectId) {
        if let Some(menu) = self.menu {
            Animator::mask_in(stage, menu, Some(32.0), 20, EasingFunction::Linear, None);
        }
        log::info!("title scene {scene} ready with {} objects", stage.object_count());
    }

    fn update_content(&mut self, stage: &mut Stage, _scene: ObjectId) {
        self.frames += 1;
        let Some(menu) = self.menu else {
            return;
        };
        // Flip the menu to the gallery page and back every few seconds.
        if self.frames % 180 == 0 {
            let target = if self.frames % 360 == 0 { "default" } else { "gallery" };
            stage.with_component(menu, |container: &mut DomainContainer, stage| {
                container.change_domain(stage, menu, target);
            });
            let kind = match target {
                "gallery" => LayoutKind::Grid(GridLayout::new(2, 3)),
                _ => LayoutKind::Spread(SpreadLayout::new(Orientation::Vertical)),
            };
            stage.with_component(menu, |layout: &mut LayoutBehavior, _| layout.kind = kind);
            log::debug!("menu switched to {target}");
        }
    }

    fn dispose(&mut self, _stage: &mut Stage, scene: ObjectId) {
        log::info!("title scene {scene} disposed after {} frames", self.frames);
    }
}

/// Scene root running the title script.
pub fn spawn(stage: &mut Stage) -> ObjectId {
    rune_scene::SceneBehavior::spawn(stage, Some("title".into()), TitleScene::default())
}
