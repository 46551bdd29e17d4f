//! In-memory cache of fetched resources with tag-based invalidation.
//!
//! Entries are keyed by {resource kind, id or LIST} and tagged with the
//! same shape. A mutation declares the tags it touches; every entry whose
//! tag set intersects that declaration is marked invalidated and the next
//! read refetches. Entries move through
//! `Absent -> Loading -> Populated`, `Populated -> Invalidated -> Loading`,
//! and `Loading -> Error` with retry only on the next explicit read.

use std::collections::HashMap;

use crate::api::types::{Booking, Room};

/// Resource families the admin surface works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Room,
    Booking,
}

/// Either a concrete resource id or the whole-collection marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagId {
    List,
    Id(u64),
}

/// Cache key and invalidation label: {kind, id or LIST}.
///
/// The same shape serves both purposes, as a list entry is keyed by
/// {kind, LIST} but tagged with every contained item id as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceTag {
    pub kind: ResourceKind,
    pub id: TagId,
}

impl ResourceTag {
    pub fn list(kind: ResourceKind) -> Self {
        Self {
            kind,
            id: TagId::List,
        }
    }

    pub fn id(kind: ResourceKind, id: u64) -> Self {
        Self {
            kind,
            id: TagId::Id(id),
        }
    }
}

/// Typed cached payloads. Resources are deserialized at the transport
/// boundary, so nothing untyped ever enters the cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Rooms(Vec<Room>),
    Room(Box<Room>),
    Bookings(Vec<Booking>),
}

/// Lifecycle of a cache entry. Absence from the map is the implicit
/// `Absent` state.
#[derive(Debug, Clone)]
pub enum EntryState {
    /// A read is in flight for this key.
    Loading,
    /// A value is available and fresh.
    Populated(CachedValue),
    /// A tagged mutation stalled this entry; the next read refetches.
    Invalidated,
    /// The last read failed; retried only on the next explicit read.
    Error(String),
}

struct CacheEntry {
    state: EntryState,
    tags: Vec<ResourceTag>,
}

/// Keyed store of fetched resource collections and items.
///
/// The façade is the sole writer. Population and invalidation each happen
/// under one `&mut self` call, so a reader never observes a half-written
/// entry.
pub struct ResourceCache {
    entries: HashMap<ResourceTag, CacheEntry>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Get the populated value for a key, if any.
    ///
    /// Loading, invalidated and errored entries all return `None`: the
    /// caller must go to the transport.
    pub fn lookup(&self, key: &ResourceTag) -> Option<&CachedValue> {
        match self.entries.get(key).map(|e| &e.state) {
            Some(EntryState::Populated(value)) => Some(value),
            _ => None,
        }
    }

    /// Current state of a key, `None` meaning Absent.
    pub fn state(&self, key: &ResourceTag) -> Option<&EntryState> {
        self.entries.get(key).map(|e| &e.state)
    }

    /// Mark a key as having a read in flight. Tags are assigned when the
    /// value arrives.
    pub fn mark_loading(&mut self, key: ResourceTag) {
        self.entries.insert(
            key,
            CacheEntry {
                state: EntryState::Loading,
                tags: Vec::new(),
            },
        );
    }

    /// Store a fetched value under a key with its invalidation tags.
    pub fn populate(&mut self, key: ResourceTag, value: CachedValue, tags: Vec<ResourceTag>) {
        self.entries.insert(
            key,
            CacheEntry {
                state: EntryState::Populated(value),
                tags,
            },
        );
    }

    /// Record a failed read. The entry stays errored until the next read
    /// attempt replaces it; nothing retries automatically.
    pub fn mark_error(&mut self, key: ResourceTag, message: String) {
        self.entries.insert(
            key,
            CacheEntry {
                state: EntryState::Error(message),
                tags: Vec::new(),
            },
        );
    }

    /// Invalidate every entry whose tag set intersects `touched`.
    ///
    /// Returns the number of entries invalidated.
    pub fn invalidate(&mut self, touched: &[ResourceTag]) -> usize {
        let mut count = 0;
        for entry in self.entries.values_mut() {
            if matches!(entry.state, EntryState::Populated(_))
                && entry.tags.iter().any(|t| touched.contains(t))
            {
                entry.state = EntryState::Invalidated;
                entry.tags.clear();
                count += 1;
            }
        }
        count
    }

    /// Drop all entries (used when the session ends).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}
