use std::any::Any;
use std::collections::BTreeMap;

/// Per-tree key/value store, keyed by a string path.
///
/// Values are type-erased; reading a path back with a different type than the one stored is a
/// programming error and panics.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<String, Box<dyn Any + Send + Sync>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn store<T: Any + Send + Sync>(&mut self, path: impl Into<String>, value: T) {
        self.values.insert(path.into(), Box::new(value));
    }

    pub fn fetch<T: Any>(&self, path: &str) -> Option<&T> {
        let value = self.values.get(path)?;
        value.downcast_ref::<T>().or_else(|| {
            panic!("blackboard type mismatch for path {path:?} (stored type differs from requested)")
        })
    }

    pub fn fetch_mut<T: Any>(&mut self, path: &str) -> Option<&mut T> {
        let value = self.values.get_mut(path)?;
        value.downcast_mut::<T>().or_else(|| {
            panic!("blackboard type mismatch for path {path:?} (stored type differs from requested)")
        })
    }

    pub fn remove<T: Any>(&mut self, path: &str) -> Option<T> {
        let value = self.values.remove(path)?;
        value.downcast::<T>().map(|b| *b).ok().or_else(|| {
            panic!("blackboard type mismatch for path {path:?} (stored type differs from requested)")
        })
    }
}

impl std::fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blackboard")
            .field("paths", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
