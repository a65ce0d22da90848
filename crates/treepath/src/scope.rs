//! Branchable scope chains for namespace prefix bindings.
//!
//! A [`ScopedMap`] is a cheap handle to one frame in a family of frames that
//! share a single per-key binding table. Every frame gets an identifier from
//! a counter shared by the family, so identifiers grow strictly from parent to
//! child. The per-key lists are therefore ordered by frame identifier, which
//! is what lookups and frame teardown rely on:
//!
//! - a lookup walks the key's list newest-first while walking the frame chain
//!   towards the root, answering with the first entry whose identifier is on
//!   the chain;
//! - a dropped frame erases only its own entries, located by binary search,
//!   so frames of independent branches may be dropped in any order.
//!
//! ```
//! use treepath::scope::ScopedMap;
//!
//! let root: ScopedMap<&str, &str> = ScopedMap::new();
//! let outer = root.enter_scope([("p", "urn:outer")]);
//! let inner = outer.enter_scope([("p", "urn:inner")]);
//! let sibling = outer.enter_scope([("q", "urn:q")]);
//!
//! assert_eq!(inner.get("p"), Some("urn:inner"));
//! assert_eq!(sibling.get("p"), Some("urn:outer"));
//! assert_eq!(inner.get("q"), None);
//! drop(inner);
//! assert_eq!(outer.get("p"), Some("urn:outer"));
//! ```
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::Hash;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use smallvec::SmallVec;

/// Scope map used by contexts: namespace prefix to namespace URI.
pub type NamespaceScope = ScopedMap<String, String>;

type FrameId = u64;

struct Table<K, V> {
    next_id: FrameId,
    // (frame id, value), sorted by frame id
    entries: HashMap<K, Vec<(FrameId, V)>>,
}

struct Frame<K: Eq + Hash, V> {
    id: FrameId,
    parent: Option<Rc<Frame<K, V>>>,
    keys: SmallVec<[K; 4]>,
    table: Rc<RefCell<Table<K, V>>>,
}

impl<K: Eq + Hash, V> Drop for Frame<K, V> {
    fn drop(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let mut table = self.table.borrow_mut();
        for key in &self.keys {
            let emptied = table.entries.get_mut(key).and_then(|list| {
                let pos = list.binary_search_by_key(&self.id, |(id, _)| *id).ok()?;
                list.remove(pos);
                Some(list.is_empty())
            });
            debug_assert!(emptied.is_some(), "scope frame {} has no entry to erase", self.id);
            if emptied == Some(true) {
                table.entries.remove(key);
            }
        }
        tracing::trace!(frame = self.id, keys = self.keys.len(), "scope frame released");
    }
}

/// Handle to one frame of a branchable key/value scope chain.
///
/// Cloning is cheap and shares the frame; the frame (and the bindings it
/// introduced) lives as long as the longest-lived handle or descendant frame.
/// Handles are `!Send`: a family of frames must stay on one thread.
pub struct ScopedMap<K: Eq + Hash, V> {
    frame: Rc<Frame<K, V>>,
}

impl<K: Eq + Hash, V> Clone for ScopedMap<K, V> {
    fn clone(&self) -> Self {
        Self { frame: Rc::clone(&self.frame) }
    }
}

impl<K: Eq + Hash, V> Default for ScopedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> ScopedMap<K, V> {
    /// Creates a new family with an empty root frame.
    pub fn new() -> Self {
        let table = Rc::new(RefCell::new(Table { next_id: 1, entries: HashMap::new() }));
        Self { frame: Rc::new(Frame { id: 0, parent: None, keys: SmallVec::new(), table }) }
    }

    /// Returns a map for a new child frame holding `bindings`.
    ///
    /// Entering an empty scope does not allocate a frame and returns a handle
    /// equal to `self`.
    #[must_use]
    pub fn enter_scope<I>(&self, bindings: I) -> Self
    where
        K: Clone,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut bindings = bindings.into_iter().peekable();
        if bindings.peek().is_none() {
            return self.clone();
        }
        let mut table = self.frame.table.borrow_mut();
        let id = table.next_id;
        table.next_id += 1;
        let mut keys = SmallVec::new();
        for (key, value) in bindings {
            table.entries.entry(key.clone()).or_default().push((id, value));
            keys.push(key);
        }
        drop(table);
        Self {
            frame: Rc::new(Frame {
                id,
                parent: Some(Rc::clone(&self.frame)),
                keys,
                table: Rc::clone(&self.frame.table),
            }),
        }
    }

    /// Looks `key` up in this frame and its ancestors, nearest first.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let table = RefCell::borrow(&self.frame.table);
        let list = table.entries.get(key)?;
        let mut frame = Some(&*self.frame);
        let mut idx = list.len();
        while idx > 0 {
            let Some(current) = frame else { break };
            let (id, value) = &list[idx - 1];
            match current.id.cmp(id) {
                Ordering::Greater => frame = current.parent.as_deref(),
                Ordering::Less => idx -= 1,
                Ordering::Equal => return Some(value.clone()),
            }
        }
        None
    }

    /// Returns `true` if `key` is bound in this frame or an ancestor.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).is_some()
    }

    /// Number of binding frames between this frame and the root frame.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.frame.parent.as_deref();
        while let Some(current) = frame {
            depth += 1;
            frame = current.parent.as_deref();
        }
        depth
    }

    /// `true` when no binding is visible from this frame.
    pub fn is_empty(&self) -> bool {
        let mut frame = Some(&*self.frame);
        while let Some(current) = frame {
            if !current.keys.is_empty() {
                return false;
            }
            frame = current.parent.as_deref();
        }
        true
    }

    /// All bindings visible from this frame, nearest binding per key.
    pub fn bindings(&self) -> BTreeMap<K, V>
    where
        K: Ord + Clone,
        V: Clone,
    {
        let mut out = BTreeMap::new();
        let mut frame = Some(&*self.frame);
        while let Some(current) = frame {
            for key in &current.keys {
                if !out.contains_key(key)
                    && let Some(value) = self.get(key)
                {
                    out.insert(key.clone(), value);
                }
            }
            frame = current.parent.as_deref();
        }
        out
    }

    #[cfg(test)]
    fn stored_entries(&self) -> usize {
        RefCell::borrow(&self.frame.table).entries.values().map(Vec::len).sum()
    }
}

impl<K, V> PartialEq for ScopedMap<K, V>
where
    K: Eq + Hash + Ord + Clone,
    V: PartialEq + Clone,
{
    /// Maps are equal when they expose the same bindings, however their
    /// frame chains were built.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.frame, &other.frame) || self.bindings() == other.bindings()
    }
}

impl<K, V> fmt::Debug for ScopedMap<K, V>
where
    K: Eq + Hash + Ord + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.bindings()).finish()
    }
}
