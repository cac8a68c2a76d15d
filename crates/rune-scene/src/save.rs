//! Save-game slots on disk.
//!
//! A save is a list of [`ObjectBundle`] trees plus the uid of the scene they
//! belong to, stored as pretty-printed JSON, one file per slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::object::ObjectBundle;

const APP_HOME_DIR: &str = ".rune";
const SAVES_DIR: &str = "saves";
const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectBundle>,
}

impl SaveGame {
    pub fn new(scene: Option<String>, objects: Vec<ObjectBundle>) -> Self {
        Self {
            version: SAVE_VERSION,
            scene,
            objects,
        }
    }
}

pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.rune/saves`, or `./saves` when there is no home directory.
    pub fn default_location() -> Result<Self> {
        let dir = match dirs::home_dir() {
            Some(home) => home.join(APP_HOME_DIR).join(SAVES_DIR),
            None => std::env::current_dir()?.join(SAVES_DIR),
        };
        Ok(Self::new(dir))
    }

    pub fn from_config(config: &rune_config::SaveConfig) -> Result<Self> {
        match &config.directory {
            Some(dir) => Ok(Self::new(dir.clone())),
            None => Self::default_location(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: u32) -> PathBuf {
        self.dir.join(format!("slot{slot}.json"))
    }

    pub fn exists(&self, slot: u32) -> bool {
        self.slot_path(slot).is_file()
    }

    pub fn save(&self, slot: u32, game: &SaveGame) -> Result<()> {
        let path = self.slot_path(slot);
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(game)?;
        fs::write(&path, json)?;
        debug!(?path, "game saved");
        Ok(())
    }

    /// Read a slot. A missing slot is `Ok(None)`; an unreadable one is an error.
    pub fn load(&self, slot: u32) -> Result<Option<SaveGame>> {
        let path = self.slot_path(slot);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                warn!(?error, ?path, "failed to read save slot");
                return Err(error.into());
            }
        };
        match serde_json::from_slice::<SaveGame>(&data) {
            Ok(game) => {
                if game.version != SAVE_VERSION {
                    warn!(version = game.version, ?path, "save written by another version");
                }
                Ok(Some(game))
            }
            Err(error) => {
                warn!(?error, ?path, "failed to parse save slot");
                Err(error.into())
            }
        }
    }

    /// Slots present on disk, in ascending order.
    pub fn list_slots(&self) -> Result<Vec<u32>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };
        let mut slots: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                name.to_str()?
                    .strip_prefix("slot")?
                    .strip_suffix(".json")?
                    .parse()
                    .ok()
            })
            .collect();
        slots.sort_unstable();
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{GameObject, ObjectKind};
    use crate::stage::Stage;

    fn sample_game() -> SaveGame {
        let mut stage = Stage::default();
        let label = stage.spawn(GameObject::new(ObjectKind::Text { text: "Chapter 1".into() }));
        SaveGame::new(Some("title".into()), vec![stage.to_data_bundle(label).unwrap()])
    }

    #[test]
    fn test_save_then_load_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("saves"));
        assert!(store.load(3).unwrap().is_none());

        let game = sample_game();
        store.save(3, &game).unwrap();
        assert!(store.exists(3));
        assert_eq!(store.load(3).unwrap(), Some(game));
    }

    #[test]
    fn test_list_slots_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        assert!(store.list_slots().unwrap().is_empty());

        let game = sample_game();
        store.save(2, &game).unwrap();
        store.save(0, &game).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        assert_eq!(store.list_slots().unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_corrupt_slot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        fs::write(store.slot_path(1), "{not json").unwrap();
        assert!(store.load(1).is_err());
    }

    #[test]
    fn test_config_directory_overrides_default() {
        let config = rune_config::SaveConfig {
            directory: Some(PathBuf::from("/tmp/rune-saves")),
            slot: 0,
        };
        let store = SaveStore::from_config(&config).unwrap();
        assert_eq!(store.dir(), Path::new("/tmp/rune-saves"));
    }
}
