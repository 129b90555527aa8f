use std::sync::Arc;

use parking_lot::Mutex;

/// Single-flight initialization barrier.
///
/// The first caller of [`InitGate::get_or_try_init`] runs the loader while holding the gate;
/// concurrent callers block until it finishes and then observe the same value. A loader error is
/// returned to the caller that ran it and leaves the gate empty, so a later call retries.
#[derive(Debug)]
pub struct InitGate<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for InitGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InitGate<T> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.lock().clone()
    }

    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock();
        if let Some(v) = slot.as_ref() {
            return Ok(Arc::clone(v));
        }
        let v = Arc::new(init()?);
        *slot = Some(Arc::clone(&v));
        Ok(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/gate.rs"]
mod tests;
