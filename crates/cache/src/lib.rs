//! Size-bounded, least-recently-used render cache.
//!
//! Entries live in an arena of slots indexed by fingerprint, with recency
//! tracked through an intrusive doubly-linked list of slot indices. Touch
//! and evict are O(1); eviction walks from the LRU tail until the byte
//! budget fits the incoming payload.
//!
//! The cache is not safe for concurrent mutation. It assumes a
//! single-writer execution model; callers that share it across threads
//! wrap it in a `Mutex` at the call boundary.

pub mod fingerprint;

pub use fingerprint::Fingerprint;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

const NIL: usize = usize::MAX;

/// Default byte budget: 32 MiB of rendered output.
pub const DEFAULT_BYTE_BUDGET: usize = 32 * 1024 * 1024;

#[derive(Debug)]
struct Slot {
    key: Fingerprint,
    payload: Arc<Vec<u8>>,
    size: usize,
    created: Instant,
    last_access: Instant,
    prev: usize,
    next: usize,
}

/// Aggregate cache statistics for the metrics report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub entry_count: usize,
    pub used_bytes: usize,
    pub byte_budget: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}

/// Content-addressed LRU store mapping a document fingerprint to rendered
/// output bytes.
pub struct RenderCache {
    slots: Vec<Option<Slot>>,
    index: HashMap<Fingerprint, usize>,
    free: Vec<usize>,
    /// Most recently used slot index.
    head: usize,
    /// Least recently used slot index.
    tail: usize,
    used_bytes: usize,
    byte_budget: usize,
    hits: u64,
    misses: u64,
}

impl RenderCache {
    pub fn new(byte_budget: usize) -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            used_bytes: 0,
            byte_budget,
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up a payload, updating recency without copying it.
    pub fn get(&mut self, key: &Fingerprint) -> Option<Arc<Vec<u8>>> {
        let Some(&slot_index) = self.index.get(key) else {
            self.misses += 1;
            return None;
        };
        self.hits += 1;
        self.unlink(slot_index);
        self.push_front(slot_index);
        let slot = self.slots[slot_index].as_mut().expect("indexed slot");
        slot.last_access = Instant::now();
        Some(Arc::clone(&slot.payload))
    }

    /// Stores a payload, evicting least-recently-used entries until the
    /// byte budget fits it. Returns `false` when the payload alone exceeds
    /// the whole budget and is not stored.
    pub fn insert(&mut self, key: Fingerprint, payload: Arc<Vec<u8>>) -> bool {
        let size = payload.len();
        if size > self.byte_budget {
            log::warn!(
                "render output of {size} bytes exceeds cache budget {}, not caching",
                self.byte_budget
            );
            return false;
        }

        if let Some(&existing) = self.index.get(&key) {
            self.remove_slot(existing);
        }
        while self.used_bytes + size > self.byte_budget {
            let evicted = self.evict_lru();
            debug_assert!(evicted, "budget check guarantees eviction progress");
        }

        let now = Instant::now();
        let slot = Slot {
            key,
            payload,
            size,
            created: now,
            last_access: now,
            prev: NIL,
            next: NIL,
        };
        let slot_index = match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(slot);
                i
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot_index);
        self.push_front(slot_index);
        self.used_bytes += size;
        true
    }

    /// Drops every entry, returning the number of bytes released. Used as
    /// the monitor's reclamation target.
    pub fn clear(&mut self) -> usize {
        let freed = self.used_bytes;
        self.slots.clear();
        self.index.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.used_bytes = 0;
        freed
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entry_count: self.index.len(),
            used_bytes: self.used_bytes,
            byte_budget: self.byte_budget,
            hit_count: self.hits,
            miss_count: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
        }
    }

    /// Age of the least-recently-used entry, if any.
    pub fn oldest_entry_age(&self) -> Option<std::time::Duration> {
        let slot = self.slots.get(self.tail)?.as_ref()?;
        Some(slot.created.elapsed())
    }

    fn evict_lru(&mut self) -> bool {
        if self.tail == NIL {
            return false;
        }
        let tail = self.tail;
        let key = self.slots[tail].as_ref().expect("tail slot").key;
        log::debug!("evicting cache entry {key:?}");
        self.remove_slot(tail);
        debug_assert!(!self.index.contains_key(&key));
        true
    }

    fn remove_slot(&mut self, slot_index: usize) {
        self.unlink(slot_index);
        let slot = self.slots[slot_index].take().expect("slot to remove");
        self.index.remove(&slot.key);
        self.used_bytes -= slot.size;
        self.free.push(slot_index);
    }

    fn unlink(&mut self, slot_index: usize) {
        let (prev, next) = {
            let slot = self.slots[slot_index].as_ref().expect("slot to unlink");
            (slot.prev, slot.next)
        };
        match prev {
            NIL => {
                if self.head == slot_index {
                    self.head = next;
                }
            }
            p => self.slots[p].as_mut().expect("prev slot").next = next,
        }
        match next {
            NIL => {
                if self.tail == slot_index {
                    self.tail = prev;
                }
            }
            n => self.slots[n].as_mut().expect("next slot").prev = prev,
        }
        let slot = self.slots[slot_index].as_mut().expect("slot to unlink");
        slot.prev = NIL;
        slot.next = NIL;
    }

    fn push_front(&mut self, slot_index: usize) {
        let old_head = self.head;
        {
            let slot = self.slots[slot_index].as_mut().expect("slot to link");
            slot.prev = NIL;
            slot.next = old_head;
        }
        if old_head != NIL {
            self.slots[old_head].as_mut().expect("old head").prev = slot_index;
        }
        self.head = slot_index;
        if self.tail == NIL {
            self.tail = slot_index;
        }
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_BYTE_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facture_types::document::{
        DocumentKind, DocumentRequest, FinancialSummary, IssuerProfile, LineItem, Party,
    };

    fn key(tag: &str) -> Fingerprint {
        let request = DocumentRequest {
            document_number: tag.to_string(),
            kind: DocumentKind::Invoice,
            issue_date: "2026-08-01".to_string(),
            due_date: None,
            issuer: IssuerProfile::default(),
            customer: Party {
                name: "c".to_string(),
                ..Default::default()
            },
            items: vec![LineItem::default()],
            summary: FinancialSummary::default(),
            notes: None,
        };
        Fingerprint::of_request(&request).unwrap()
    }

    fn payload(size: usize) -> Arc<Vec<u8>> {
        Arc::new(vec![0u8; size])
    }

    #[test]
    fn budget_is_never_exceeded() {
        let mut cache = RenderCache::new(1000);
        for i in 0..50 {
            cache.insert(key(&format!("doc-{i}")), payload(100 + i));
            assert!(cache.used_bytes() <= 1000, "at insert {i}");
        }
    }

    #[test]
    fn eviction_is_strictly_lru() {
        let mut cache = RenderCache::new(300);
        let (a, b, c) = (key("a"), key("b"), key("c"));
        cache.insert(a, payload(100));
        cache.insert(b, payload(100));
        cache.insert(c, payload(100));

        // Touch `a`, making `b` the least recently used.
        assert!(cache.get(&a).is_some());

        cache.insert(key("d"), payload(100));
        assert!(cache.get(&b).is_none(), "b should be evicted first");
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn one_large_insert_evicts_many_small_entries() {
        let mut cache = RenderCache::new(400);
        cache.insert(key("a"), payload(100));
        cache.insert(key("b"), payload(100));
        cache.insert(key("c"), payload(100));
        assert_eq!(cache.len(), 3);

        cache.insert(key("big"), payload(400));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("big")).is_some());
        assert!(cache.used_bytes() <= 400);
    }

    #[test]
    fn hit_returns_the_same_allocation() {
        let mut cache = RenderCache::new(1000);
        let k = key("a");
        let bytes = payload(64);
        cache.insert(k, Arc::clone(&bytes));
        let hit = cache.get(&k).unwrap();
        assert!(Arc::ptr_eq(&hit, &bytes));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut cache = RenderCache::new(100);
        assert!(!cache.insert(key("huge"), payload(101)));
        assert!(cache.is_empty());
    }

    #[test]
    fn reinserting_a_key_replaces_its_payload() {
        let mut cache = RenderCache::new(1000);
        let k = key("a");
        cache.insert(k, payload(100));
        cache.insert(k, payload(200));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used_bytes(), 200);
        assert_eq!(cache.get(&k).unwrap().len(), 200);
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let mut cache = RenderCache::new(1000);
        let k = key("a");
        cache.insert(k, payload(10));
        cache.get(&k);
        cache.get(&key("missing"));

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.used_bytes, 10);
    }

    #[test]
    fn clear_reports_bytes_freed() {
        let mut cache = RenderCache::new(1000);
        cache.insert(key("a"), payload(300));
        cache.insert(key("b"), payload(200));
        assert_eq!(cache.clear(), 500);
        assert!(cache.is_empty());
        assert_eq!(cache.used_bytes(), 0);
    }
}
