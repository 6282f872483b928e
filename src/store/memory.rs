use std::sync::{Mutex, MutexGuard};

use sha2::{Digest, Sha256};

use crate::{
    foundation::error::{AvatarError, AvatarResult},
    store::{ArtifactStore, ContentId},
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// One operation observed by a [`MemoryStore`], in call order.
pub enum StoreEvent {
    /// `find_by_name(name)`.
    Find(String),
    /// `unpin(cid)`.
    Unpin(ContentId),
    /// `publish(_, name)` returning `cid`.
    Publish { name: String, cid: ContentId },
}

#[derive(Clone, Debug)]
struct Pin {
    cid: ContentId,
    name: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    pins: Vec<Pin>,
    events: Vec<StoreEvent>,
}

/// In-process store with SHA-256 content identifiers.
///
/// Used for offline runs and tests. Identical bytes always produce the same identifier.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier the store assigns to `bytes`.
    pub fn content_id_for(bytes: &[u8]) -> ContentId {
        let digest = Sha256::digest(bytes);
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        ContentId(format!("sha256-{hex}"))
    }

    /// Bytes pinned under `id`.
    pub fn get(&self, id: &ContentId) -> Option<Vec<u8>> {
        self.lock()
            .pins
            .iter()
            .find(|p| &p.cid == id)
            .map(|p| p.bytes.clone())
    }

    /// Names currently pinned, in publish order.
    pub fn pinned_names(&self) -> Vec<String> {
        self.lock().pins.iter().map(|p| p.name.clone()).collect()
    }

    /// Every operation seen so far.
    pub fn events(&self) -> Vec<StoreEvent> {
        self.lock().events.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ArtifactStore for MemoryStore {
    fn find_by_name(&self, name: &str) -> AvatarResult<Vec<ContentId>> {
        let mut state = self.lock();
        state.events.push(StoreEvent::Find(name.to_string()));
        let mut found: Vec<ContentId> = Vec::new();
        for pin in state.pins.iter().filter(|p| p.name == name) {
            if !found.contains(&pin.cid) {
                found.push(pin.cid.clone());
            }
        }
        Ok(found)
    }

    fn unpin(&self, id: &ContentId) -> AvatarResult<()> {
        let mut state = self.lock();
        state.events.push(StoreEvent::Unpin(id.clone()));
        let before = state.pins.len();
        state.pins.retain(|p| &p.cid != id);
        if state.pins.len() == before {
            return Err(AvatarError::replace_conflict(format!("{id} is not pinned")));
        }
        Ok(())
    }

    fn publish(&self, bytes: &[u8], name: &str) -> AvatarResult<ContentId> {
        let cid = Self::content_id_for(bytes);
        let mut state = self.lock();
        state.pins.push(Pin {
            cid: cid.clone(),
            name: name.to_string(),
            bytes: bytes.to_vec(),
        });
        state.events.push(StoreEvent::Publish {
            name: name.to_string(),
            cid: cid.clone(),
        });
        Ok(cid)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/memory.rs"]
mod tests;
