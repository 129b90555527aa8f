//! Bounded memoization of pipeline output, keyed by [`FrameId`].
//!
//! The default policy is admission-capped: once `capacity` frames are stored the cache never
//! evicts and never admits again. Later misses are still computed and returned, just not kept,
//! so callers pay the pipeline cost again for every frame beyond the cap. [`EvictionPolicy::Lru`]
//! is the opt-in alternative that evicts the least recently used entry instead.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{foundation::error::FlipbookResult, pipeline::EncodedFrame, source::FrameId};

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Stop admitting at capacity; existing entries live until teardown.
    #[default]
    AdmissionCapped,
    /// Evict the least recently used entry to admit a new one.
    Lru,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Successful compute calls (a failed compute is a miss but not a compute).
    pub computes: u64,
    /// Computed values returned without being stored.
    pub rejected: u64,
    pub evicted: u64,
}

struct CacheState<V> {
    entries: HashMap<FrameId, Arc<V>>,
    /// Insertion order; for LRU, front is least recently used.
    order: VecDeque<FrameId>,
    stats: CacheStats,
}

pub struct FrameCache<V = EncodedFrame> {
    capacity: usize,
    policy: EvictionPolicy,
    state: Mutex<CacheState<V>>,
}

impl<V> Default for FrameCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, EvictionPolicy::default())
    }
}

impl<V> FrameCache<V> {
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            capacity,
            policy,
            state: Mutex::new(CacheState {
                entries: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &FrameId) -> bool {
        self.state.lock().entries.contains_key(id)
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    /// Return the stored value for `id`, or run `compute` and try to admit its result.
    ///
    /// `compute` runs outside the lock. If another caller stored `id` meanwhile, the stored value
    /// wins and is returned. A failing `compute` leaves the cache untouched.
    pub fn get_or_compute(
        &self,
        id: &FrameId,
        compute: impl FnOnce() -> FlipbookResult<V>,
    ) -> FlipbookResult<Arc<V>> {
        {
            let mut st = self.state.lock();
            if let Some(v) = st.entries.get(id).cloned() {
                st.stats.hits += 1;
                if self.policy == EvictionPolicy::Lru {
                    touch(&mut st.order, id);
                }
                tracing::debug!(frame = %id, "frame cache hit");
                return Ok(v);
            }
            st.stats.misses += 1;
            tracing::debug!(frame = %id, "frame cache miss");
        }

        let value = Arc::new(compute()?);

        let mut st = self.state.lock();
        st.stats.computes += 1;
        if let Some(existing) = st.entries.get(id).cloned() {
            return Ok(existing);
        }

        if st.entries.len() >= self.capacity {
            match self.policy {
                EvictionPolicy::AdmissionCapped => {
                    st.stats.rejected += 1;
                    tracing::debug!(
                        frame = %id,
                        capacity = self.capacity,
                        "frame cache full, not admitted"
                    );
                    return Ok(value);
                }
                EvictionPolicy::Lru => {
                    let Some(oldest) = st.order.pop_front() else {
                        // capacity 0: nothing to evict, nothing to admit.
                        st.stats.rejected += 1;
                        return Ok(value);
                    };
                    st.entries.remove(&oldest);
                    st.stats.evicted += 1;
                    tracing::debug!(frame = %oldest, "frame cache evicted");
                }
            }
        }

        st.entries.insert(id.clone(), Arc::clone(&value));
        st.order.push_back(id.clone());
        tracing::debug!(frame = %id, len = st.entries.len(), "frame cache admitted");
        Ok(value)
    }
}

fn touch(order: &mut VecDeque<FrameId>, id: &FrameId) {
    if let Some(pos) = order.iter().position(|x| x == id) {
        if let Some(moved) = order.remove(pos) {
            order.push_back(moved);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/cache.rs"]
mod tests;
