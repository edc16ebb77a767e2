use crate::input::ImageInput;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Registry of images currently handed to an inference provider.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `input` until the returned lease is dropped.
    pub fn stage(&self, input: &ImageInput) -> StagedImage {
        let id = Uuid::new_v4();
        self.entries().insert(id);
        debug!("Staged {} as blob:{}", input.name(), id);

        StagedImage {
            id,
            name: input.name().to_string(),
            mime_type: input.mime_type().to_string(),
            bytes: Arc::clone(input.bytes()),
            store: self.clone(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.entries().contains(&id)
    }

    fn release(&self, id: Uuid) {
        if self.entries().remove(&id) {
            debug!("Released blob:{}", id);
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lease on a staged image; released on drop.
#[derive(Debug)]
pub struct StagedImage {
    id: Uuid,
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
    store: ImageStore,
}

impl StagedImage {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn reference(&self) -> String {
        format!("blob:{}", self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        self.store.release(self.id);
    }
}
