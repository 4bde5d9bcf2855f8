//! Shared note table for `RouteChat`.
//!
//! Every location owns a mailbox: the ordered list of notes left there so far.
//! Mailboxes live in a fixed number of shards, each behind its own mutex, so
//! sessions writing to different locations rarely contend. A location always
//! maps to the same shard, which makes appending a note and copying its
//! mailbox a single critical section.
//!
//! The table only grows. Nothing is evicted for the lifetime of the process.

use core::hash::BuildHasher;
use parking_lot::Mutex;
use routeguide_core::{proto::RouteNote, types::GeoPoint};
use std::collections::{HashMap, hash_map::RandomState};

type Shard = Mutex<HashMap<GeoPoint, Vec<RouteNote>>>;

pub struct NoteHub {
    shards: Box<[Shard]>,
    hasher: RandomState,
}

impl NoteHub {
    /// Creates an empty table split into `num_shards` shards (at least one).
    pub fn new(num_shards: usize) -> Self {
        let shards = (0..num_shards.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    fn shard(&self, key: &GeoPoint) -> &Shard {
        let idx = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[idx]
    }

    /// Appends `note` to the mailbox at its location and returns a copy of
    /// that mailbox, `note` included as the last entry.
    ///
    /// The append and the copy happen under one lock: no other note for the
    /// same location can land between them.
    pub fn record(&self, note: RouteNote) -> Vec<RouteNote> {
        let key = note.point();
        let mut shard = self.shard(&key).lock();
        let mailbox = shard.entry(key).or_default();
        mailbox.push(note);
        mailbox.clone()
    }

    /// Copy of the mailbox at `location`, empty if nothing was left there.
    pub fn snapshot(&self, location: GeoPoint) -> Vec<RouteNote> {
        self.shard(&location)
            .lock()
            .get(&location)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of locations holding at least one note.
    pub fn locations(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }
}

impl Default for NoteHub {
    fn default() -> Self {
        Self::new(16)
    }
}
