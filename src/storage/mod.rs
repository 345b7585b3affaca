//! Ordered key-value engine seam.
//!
//! Readers only ever need three things from the engine: a read-only snapshot,
//! a directional cursor over that snapshot, and byte-wise key order. The
//! traits below capture exactly that, in the shape of a Badger-style
//! transaction/iterator API:
//!
//! ```text
//! OrderedStore ──snapshot()──▶ Snapshot ──cursor(opts)──▶ Cursor
//!                                                          seek / valid / key / value / next
//! ```
//!
//! Snapshots and cursors are released on drop.

mod memory;

pub use memory::{MemoryCursor, MemorySnapshot, MemoryStore, WriteOp};

use crate::core::Result;

/// Options for opening a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorOptions {
    /// Iterate from larger to smaller keys.
    pub reverse: bool,
    /// Fetch values eagerly alongside keys.
    pub prefetch_values: bool,
    /// How many entries to prefetch. Zero lets the engine decide.
    pub prefetch_size: usize,
    /// Restrict `valid()` to keys carrying this prefix.
    pub prefix: Option<Vec<u8>>,
}

impl CursorOptions {
    pub fn forward() -> Self {
        Self {
            prefetch_values: true,
            ..Self::default()
        }
    }

    pub fn backward() -> Self {
        Self {
            reverse: true,
            prefetch_values: true,
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_prefetch_size(mut self, size: usize) -> Self {
        self.prefetch_size = size;
        self
    }
}

/// An ordered byte-keyed store that hands out read-only snapshots.
pub trait OrderedStore: Send + Sync {
    /// Open a read-only snapshot, unaffected by later writes.
    fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>>;
}

/// A consistent read-only view of the store.
pub trait Snapshot: Send + Sync {
    fn cursor(&self, opts: CursorOptions) -> Box<dyn Cursor + '_>;
}

/// Directional cursor over a snapshot.
///
/// A freshly opened cursor is not positioned; call `seek` first.
pub trait Cursor {
    /// Forward cursors land on the first key `>= key`, reverse cursors on the
    /// last key `<= key`.
    fn seek(&mut self, key: &[u8]);

    /// Current key, or `None` when exhausted or outside the prefix.
    fn key(&self) -> Option<&[u8]>;

    /// Copy of the current value.
    fn value(&self) -> Result<Vec<u8>>;

    /// Step in the cursor's direction.
    fn next(&mut self);

    fn is_reverse(&self) -> bool;

    fn valid(&self) -> bool {
        self.key().is_some()
    }
}
