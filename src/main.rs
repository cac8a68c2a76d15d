//! Headless runner: drives the title scene through the scene manager until
//! the frame budget runs out, then ends the game.

mod title;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use env_logger::Env;
use rune_config::RuneConfig;
use rune_scene::services::{Document, DocumentItems, MemoryDataManager};
use rune_scene::{SaveGame, SaveStore, SceneManager, Services, Stage, StageSettings};

fn main() -> Result<()> {
    let config = RuneConfig::load();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(filter) = &config.logging.filter {
        logger.parse_filters(filter);
    }
    let _ = logger.try_init();

    let mut services = Services::headless();
    services.data = Box::new(MemoryDataManager::new([Document {
        uid: "heroine".into(),
        items: DocumentItems {
            kind: "character".into(),
            data: serde_json::json!({ "name": "Aoi", "expressions": ["smile", "frown"] }),
        },
        loaded: true,
    }]));
    let mut stage = Stage::new(services).with_settings(StageSettings::from_config(&config.engine));
    let mut manager = SceneManager::new();

    let scene = title::spawn(&mut stage);
    manager.switch_to(&mut stage, Some(scene), false, None);

    let frame_rate = config.engine.frame_rate.max(1);
    let frame_time = Duration::from_secs_f64(1.0 / frame_rate as f64);
    let max_frames = config.engine.max_frames.unwrap_or(frame_rate as u64 * 5);
    log::info!("running {max_frames} frames at {frame_rate} fps");

    let mut frame = 0u64;
    let mut ending = false;
    while !stage.exit_requested() {
        let started = Instant::now();
        manager.update(&mut stage);
        frame += 1;

        if frame >= max_frames && !ending {
            if config.save.directory.is_some() {
                quick_save(&stage, &manager, &config)?;
            }
            manager.switch_to(&mut stage, None, false, None);
            ending = true;
        }

        if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    manager.dispose(&mut stage);
    log::info!("stopped after {frame} frames, {} objects left", stage.object_count());
    Ok(())
}

fn quick_save(stage: &Stage, manager: &SceneManager, config: &RuneConfig) -> Result<()> {
    let Some(scene) = manager.scene() else {
        return Ok(());
    };
    let store = SaveStore::from_config(&config.save)?;
    let bundle = stage.to_data_bundle(scene)?;
    store.save(config.save.slot, &SaveGame::new(Some("title".into()), vec![bundle]))?;
    log::info!("saved slot {} to {}", config.save.slot, store.slot_path(config.save.slot).display());
    Ok(())
}
