//! External collaborators consumed by the scene runtime.
//!
//! Rendering, asset loading, document storage, audio and input live outside
//! this crate. The runtime only talks to them through the traits below and
//! polls their "loaded" flags once per frame; nothing here ever blocks.
//!
//! The in-memory implementations model asynchronous loading by flipping their
//! flags after a configurable number of polled ticks. They back the headless
//! driver and the tests.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Opaque handle to a loaded bitmap, video or audio buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle(pub u64);

/// Payload of a data document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentItems {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A record from the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub uid: String,
    pub items: DocumentItems,
    #[serde(default)]
    pub loaded: bool,
}

/// Renderer state the runtime drives during scene transitions.
pub trait Graphics {
    /// Capture the current frame; the screen stays frozen until a transition ends.
    fn freeze(&mut self);
    /// Play a transition from the frozen frame to the live one over `duration` frames.
    fn transition(&mut self, duration: u32);
    /// True while frozen or while a transition is playing.
    fn frozen(&self) -> bool;
    /// Advance the renderer by one frame.
    fn update(&mut self);
    /// Ask the renderer to present a frame even if nothing changed.
    fn request_frame(&mut self) {}
    fn frame_count(&self) -> u64;
}

/// Document store.
pub trait DataManager {
    fn documents_loaded(&self) -> bool;
    /// True once the records the audio layer depends on are available.
    fn records_initialized(&self) -> bool {
        self.documents_loaded()
    }
    fn get_document(&self, uid: &str) -> Option<&Document>;
    fn get_documents_by_type(&self, kind: &str) -> Vec<&Document>;
    fn get_document_by_type(&self, kind: &str) -> Option<&Document> {
        self.get_documents_by_type(kind).into_iter().next()
    }
    fn update(&mut self);
}

/// Asset loader.
pub trait ResourceManager {
    fn resources_loaded(&self) -> bool;
    fn get_bitmap(&mut self, path: &str) -> ResourceHandle;
    fn get_video(&mut self, path: &str) -> ResourceHandle;
    fn get_audio_buffer(&mut self, path: &str) -> ResourceHandle;
    fn update(&mut self);
}

pub trait AudioManager {
    fn stop_all(&mut self);
    fn update(&mut self);
}

/// Per-frame input snapshot.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Mouse wheel movement this frame; positive scrolls content up.
    pub wheel_delta: f32,
    pub clicked: bool,
}

impl InputState {
    /// Drop any buffered input, e.g. across a scene switch.
    pub fn clear(&mut self) {
        self.wheel_delta = 0.0;
        self.clicked = false;
    }

    pub fn update(&mut self) {
        self.clear();
    }
}

/// Bundle of collaborators owned by the stage.
pub struct Services {
    pub graphics: Box<dyn Graphics>,
    pub data: Box<dyn DataManager>,
    pub resources: Box<dyn ResourceManager>,
    pub audio: Box<dyn AudioManager>,
    pub input: InputState,
}

impl Services {
    /// Collaborators that load everything immediately and render nothing.
    pub fn headless() -> Self {
        Self {
            graphics: Box::new(HeadlessGraphics::default()),
            data: Box::new(MemoryDataManager::default()),
            resources: Box::new(MemoryResourceManager::default()),
            audio: Box::new(HeadlessAudio::default()),
            input: InputState::default(),
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::headless()
    }
}

/// Graphics backend that only tracks freeze/transition state.
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    frozen: bool,
    transition_remaining: u32,
    frames: u64,
}

impl Graphics for HeadlessGraphics {
    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn transition(&mut self, duration: u32) {
        self.transition_remaining = duration;
        self.frozen = duration > 0;
    }

    fn frozen(&self) -> bool {
        self.frozen
    }

    fn update(&mut self) {
        self.frames += 1;
        if self.transition_remaining > 0 {
            self.transition_remaining -= 1;
            if self.transition_remaining == 0 {
                self.frozen = false;
            }
        }
    }

    fn frame_count(&self) -> u64 {
        self.frames
    }
}

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryDataManager {
    /// Keyed by uid, so lookups by type come back in uid order.
    documents: BTreeMap<String, Document>,
    /// Polled ticks left before documents report as loaded.
    pending_ticks: u32,
}

impl MemoryDataManager {
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|mut doc| {
                    doc.loaded = true;
                    (doc.uid.clone(), doc)
                })
                .collect(),
            pending_ticks: 0,
        }
    }

    pub fn with_latency(mut self, ticks: u32) -> Self {
        self.pending_ticks = ticks;
        self
    }

    pub fn insert(&mut self, mut document: Document) {
        document.loaded = true;
        self.documents.insert(document.uid.clone(), document);
    }
}

impl DataManager for MemoryDataManager {
    fn documents_loaded(&self) -> bool {
        self.pending_ticks == 0
    }

    fn get_document(&self, uid: &str) -> Option<&Document> {
        self.documents.get(uid)
    }

    fn get_documents_by_type(&self, kind: &str) -> Vec<&Document> {
        self.documents.values().filter(|doc| doc.items.kind == kind).collect()
    }

    fn update(&mut self) {
        self.pending_ticks = self.pending_ticks.saturating_sub(1);
    }
}

/// Resource loader whose requests finish a fixed number of ticks after they are made.
#[derive(Debug, Default)]
pub struct MemoryResourceManager {
    handles: HashMap<String, ResourceHandle>,
    pending: Vec<(ResourceHandle, u32)>,
    latency: u32,
    next_handle: u64,
}

impl MemoryResourceManager {
    pub fn with_latency(latency: u32) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    fn request(&mut self, path: &str) -> ResourceHandle {
        if let Some(handle) = self.handles.get(path) {
            return *handle;
        }
        self.next_handle += 1;
        let handle = ResourceHandle(self.next_handle);
        self.handles.insert(path.to_string(), handle);
        if self.latency > 0 {
            self.pending.push((handle, self.latency));
        }
        handle
    }
}

impl ResourceManager for MemoryResourceManager {
    fn resources_loaded(&self) -> bool {
        self.pending.is_empty()
    }

    fn get_bitmap(&mut self, path: &str) -> ResourceHandle {
        self.request(path)
    }

    fn get_video(&mut self, path: &str) -> ResourceHandle {
        self.request(path)
    }

    fn get_audio_buffer(&mut self, path: &str) -> ResourceHandle {
        self.request(path)
    }

    fn update(&mut self) {
        for (_, ticks) in &mut self.pending {
            *ticks = ticks.saturating_sub(1);
        }
        self.pending.retain(|(_, ticks)| *ticks > 0);
    }
}

/// Audio backend that only counts calls.
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    pub stop_count: u32,
    pub updates: u64,
}

impl AudioManager for HeadlessAudio {
    fn stop_all(&mut self) {
        self.stop_count += 1;
    }

    fn update(&mut self) {
        self.updates += 1;
    }
}
