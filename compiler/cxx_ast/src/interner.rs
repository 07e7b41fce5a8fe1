//! String interner for identifier storage.
//!
//! O(1) interning and lookup with thread-safe concurrent access. Interned
//! strings live for the duration of the compilation, so the backing
//! storage leaks each string once and hands out `&'static str`.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

struct Inner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
pub struct StringInterner {
    inner: RwLock<Inner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned as
    /// [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert("", 0);
        Self {
            inner: RwLock::new(Inner {
                map,
                strings: vec![""],
            }),
        }
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// Re-interning an identical string returns the same `Name`.
    pub fn intern(&self, s: &str) -> Name {
        {
            let inner = self.inner.read();
            if let Some(&idx) = inner.map.get(s) {
                return Name::from_index(idx);
            }
        }

        let mut inner = self.inner.write();
        // Another thread may have interned it between the read and write lock.
        if let Some(&idx) = inner.map.get(s) {
            return Name::from_index(idx);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(inner.strings.len()).unwrap_or(u32::MAX);
        inner.strings.push(leaked);
        inner.map.insert(leaked, idx);
        Name::from_index(idx)
    }

    /// Resolve a [`Name`] back to its string.
    pub fn lookup(&self, name: Name) -> &'static str {
        let inner = self.inner.read();
        inner.strings.get(name.index()).copied().unwrap_or("")
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
