//! In-memory ordered store with snapshot isolation.
//!
//! The map lives behind an `Arc`; writers clone-on-write under the lock, so a
//! snapshot keeps seeing the map exactly as it was when it was taken.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use crate::core::{Error, Result};
use crate::storage::{Cursor, CursorOptions, OrderedStore, Snapshot};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// A single mutation applied by `MemoryStore::write_batch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<Arc<Map>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Result<()> {
        self.write_batch([WriteOp::Put(key.into(), value.into())])
    }

    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.write_batch([WriteOp::Delete(key.to_vec())])
    }

    /// Apply all operations atomically with respect to snapshots.
    pub fn write_batch(&self, ops: impl IntoIterator<Item = WriteOp>) -> Result<()> {
        let mut guard = self
            .map
            .write()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))?;
        let map = Arc::make_mut(&mut guard);
        for op in ops {
            match op {
                WriteOp::Put(key, value) => {
                    map.insert(key, value);
                }
                WriteOp::Delete(key) => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.map.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderedStore for MemoryStore {
    fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>> {
        let map = self
            .map
            .read()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))?;
        Ok(Box::new(MemorySnapshot {
            map: Arc::clone(&map),
        }))
    }
}

/// Frozen view of a `MemoryStore`.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    map: Arc<Map>,
}

impl Snapshot for MemorySnapshot {
    fn cursor(&self, opts: CursorOptions) -> Box<dyn Cursor + '_> {
        Box::new(MemoryCursor {
            map: &self.map,
            opts,
            current: None,
        })
    }
}

pub struct MemoryCursor<'a> {
    map: &'a Map,
    opts: CursorOptions,
    current: Option<(&'a [u8], &'a [u8])>,
}

impl<'a> MemoryCursor<'a> {
    fn land(&mut self, entry: Option<(&'a Vec<u8>, &'a Vec<u8>)>) {
        self.current = entry.map(|(k, v)| (k.as_slice(), v.as_slice()));
    }

    fn after(&self, key: &[u8]) -> Option<(&'a Vec<u8>, &'a Vec<u8>)> {
        self.map
            .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
            .next()
    }

    fn before(&self, key: &[u8]) -> Option<(&'a Vec<u8>, &'a Vec<u8>)> {
        self.map
            .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
    }
}

impl Cursor for MemoryCursor<'_> {
    fn seek(&mut self, key: &[u8]) {
        let entry = if self.opts.reverse {
            self.map
                .range::<[u8], _>((Bound::Unbounded, Bound::Included(key)))
                .next_back()
        } else {
            self.map
                .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
                .next()
        };
        self.land(entry);
    }

    fn key(&self) -> Option<&[u8]> {
        let (key, _) = self.current?;
        match &self.opts.prefix {
            Some(prefix) if !key.starts_with(prefix) => None,
            _ => Some(key),
        }
    }

    fn value(&self) -> Result<Vec<u8>> {
        match self.current {
            Some((_, value)) if self.valid() => Ok(value.to_vec()),
            _ => Err(Error::Store("cursor is not positioned".into())),
        }
    }

    fn next(&mut self) {
        let Some((key, _)) = self.current else {
            return;
        };
        let entry = if self.opts.reverse {
            self.before(key)
        } else {
            self.after(key)
        };
        self.land(entry);
    }

    fn is_reverse(&self) -> bool {
        self.opts.reverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(keys: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for key in keys {
            store.put(key.as_bytes(), key.as_bytes()).unwrap();
        }
        store
    }

    fn collect(cursor: &mut (dyn Cursor + '_), from: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        cursor.seek(from);
        while let Some(key) = cursor.key() {
            out.push(String::from_utf8(key.to_vec()).unwrap());
            cursor.next();
        }
        out
    }

    #[test]
    fn forward_seek_lands_on_first_greater_or_equal() {
        let store = store_with(&["a", "c", "e"]);
        let snap = store.snapshot().unwrap();
        let mut cursor = snap.cursor(CursorOptions::forward());
        assert_eq!(collect(cursor.as_mut(), b"b"), ["c", "e"]);
        assert_eq!(collect(cursor.as_mut(), b"c"), ["c", "e"]);
    }

    #[test]
    fn reverse_seek_lands_on_last_less_or_equal() {
        let store = store_with(&["a", "c", "e"]);
        let snap = store.snapshot().unwrap();
        let mut cursor = snap.cursor(CursorOptions::backward());
        assert_eq!(collect(cursor.as_mut(), b"d"), ["c", "a"]);
        assert_eq!(collect(cursor.as_mut(), b"e"), ["e", "c", "a"]);
    }

    #[test]
    fn prefix_bounds_validity() {
        let store = store_with(&["x:1", "x:2", "y:1"]);
        let snap = store.snapshot().unwrap();
        let mut cursor = snap.cursor(CursorOptions::forward().with_prefix("x:"));
        assert_eq!(collect(cursor.as_mut(), b"x:"), ["x:1", "x:2"]);
        assert!(cursor.value().is_err());
    }

    #[test]
    fn snapshots_ignore_later_writes() {
        let store = store_with(&["a"]);
        let snap = store.snapshot().unwrap();
        store
            .write_batch([WriteOp::Put(b"b".to_vec(), vec![1]), WriteOp::Delete(b"a".to_vec())])
            .unwrap();

        let mut old = snap.cursor(CursorOptions::forward());
        assert_eq!(collect(old.as_mut(), b""), ["a"]);

        let fresh = store.snapshot().unwrap();
        let mut new = fresh.cursor(CursorOptions::forward());
        assert_eq!(collect(new.as_mut(), b""), ["b"]);
    }
}
