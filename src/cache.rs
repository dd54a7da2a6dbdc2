// Process-wide cache of the raw dataset.
//
// The source file is read at most once per process. The lock is held for the
// whole load, so a second caller waits for the first read instead of
// starting another one. `clear` drops the cached table; the next `load`
// reads the file again.
use crate::error::LoadError;
use crate::loader::{load_raw, RawDataset};
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

static CACHE: Lazy<Mutex<Option<Arc<RawDataset>>>> = Lazy::new(|| Mutex::new(None));

fn lock() -> MutexGuard<'static, Option<Arc<RawDataset>>> {
    // A panic while loading leaves `None` behind, which is a valid state.
    CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Return the cached dataset, reading `path` only if nothing is cached yet.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Arc<RawDataset>, LoadError> {
    let mut slot = lock();
    if let Some(data) = slot.as_ref() {
        debug!("serving hotspot dataset from cache");
        return Ok(Arc::clone(data));
    }
    let data = Arc::new(load_raw(path)?);
    *slot = Some(Arc::clone(&data));
    Ok(data)
}

/// Forget the cached dataset.
pub fn clear() {
    if lock().take().is_some() {
        info!("hotspot dataset cache cleared");
    }
}

pub fn is_loaded() -> bool {
    lock().is_some()
}
