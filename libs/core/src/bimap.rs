use std::fmt::{Debug, Display};
use std::hash::Hash;

use failure_derive::Fail;
use indexmap::IndexMap;

use crate::types::{FieldData, MethodData, SymbolKind, TypeName};

/// A symbol that can be renamed
pub trait Symbol: Clone + Eq + Hash + Display + Debug {
    const KIND: SymbolKind;
}
impl Symbol for TypeName {
    const KIND: SymbolKind = SymbolKind::Class;
}
impl Symbol for FieldData {
    const KIND: SymbolKind = SymbolKind::Field;
}
impl Symbol for MethodData {
    const KIND: SymbolKind = SymbolKind::Method;
}

/// A map that's injective in both directions.
///
/// Inserting a second original for an already renamed value
/// (or a second renamed value for an existing original) is an error,
/// and leaves the map untouched.
/// Both halves remember their insertion order.
#[derive(Clone, Debug)]
pub struct InjectiveMap<T: Symbol> {
    forward: IndexMap<T, T>,
    inverse: IndexMap<T, T>,
}
impl<T: Symbol> InjectiveMap<T> {
    #[inline]
    pub fn new() -> Self {
        InjectiveMap { forward: IndexMap::new(), inverse: IndexMap::new() }
    }
    pub fn insert(&mut self, original: T, renamed: T) -> Result<(), RenameError> {
        if let Some(existing) = self.forward.get(&original) {
            if *existing == renamed {
                return Ok(());
            }
            return Err(RenameError::Conflicting {
                kind: T::KIND,
                original: original.to_string(),
                first: existing.to_string(),
                second: renamed.to_string(),
            });
        }
        if let Some(existing) = self.inverse.get(&renamed) {
            return Err(RenameError::Ambiguous {
                kind: T::KIND,
                first: existing.to_string(),
                second: original.to_string(),
                renamed: renamed.to_string(),
            });
        }
        self.forward.insert(original.clone(), renamed.clone());
        self.inverse.insert(renamed, original);
        Ok(())
    }
    #[inline]
    pub fn get(&self, original: &T) -> Option<&T> {
        self.forward.get(original)
    }
    #[inline]
    pub fn get_inverse(&self, renamed: &T) -> Option<&T> {
        self.inverse.get(renamed)
    }
    #[inline]
    pub fn contains_original(&self, original: &T) -> bool {
        self.forward.contains_key(original)
    }
    #[inline]
    pub fn contains_renamed(&self, renamed: &T) -> bool {
        self.inverse.contains_key(renamed)
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&T, &T)> {
        self.forward.iter()
    }
    #[inline]
    pub fn inverted(self) -> Self {
        InjectiveMap { forward: self.inverse, inverse: self.forward }
    }
    pub fn retain<F: FnMut(&T, &T) -> bool>(&mut self, mut func: F) {
        self.forward.retain(|original, renamed| func(original, renamed));
        let forward = &self.forward;
        self.inverse.retain(|_, original| forward.contains_key(original));
    }
    #[inline]
    pub fn clear(&mut self) {
        self.forward.clear();
        self.inverse.clear();
    }
}
impl<T: Symbol> Default for InjectiveMap<T> {
    #[inline]
    fn default() -> Self {
        InjectiveMap::new()
    }
}
impl<T: Symbol> PartialEq for InjectiveMap<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // The inverse is determined by the forward half
        self.forward == other.forward
    }
}
impl<T: Symbol> Eq for InjectiveMap<T> {}

#[derive(Debug, Fail, Clone, Eq, PartialEq)]
pub enum RenameError {
    #[fail(display = "Ambiguous {} rename: both {} and {} are renamed to {}", kind, first, second, renamed)]
    Ambiguous {
        kind: SymbolKind,
        first: String,
        second: String,
        renamed: String,
    },
    #[fail(display = "Conflicting {} rename: {} is renamed to both {} and {}", kind, original, first, second)]
    Conflicting {
        kind: SymbolKind,
        original: String,
        first: String,
        second: String,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    fn class(name: &str) -> TypeName {
        TypeName::new(name)
    }

    #[test]
    fn ambiguous_rename() {
        let mut map = InjectiveMap::new();
        map.insert(class("a"), class("Foo")).unwrap();
        let error = map.insert(class("b"), class("Foo")).unwrap_err();
        assert_eq!(error, RenameError::Ambiguous {
            kind: SymbolKind::Class,
            first: "a".into(),
            second: "b".into(),
            renamed: "Foo".into(),
        });
        // The failed insert must not leave anything behind
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&class("b")), None);
        assert_eq!(map.get_inverse(&class("Foo")), Some(&class("a")));
    }

    #[test]
    fn conflicting_rename() {
        let mut map = InjectiveMap::new();
        map.insert(class("a"), class("Foo")).unwrap();
        // Repeating an identical entry is harmless
        map.insert(class("a"), class("Foo")).unwrap();
        match map.insert(class("a"), class("Bar")) {
            Err(RenameError::Conflicting { kind: SymbolKind::Class, .. }) => {}
            other => panic!("Unexpected result {:?}", other),
        }
        assert!(!map.contains_renamed(&class("Bar")));
    }

    #[test]
    fn retain_keeps_both_halves() {
        let mut map = InjectiveMap::new();
        map.insert(class("a"), class("a")).unwrap();
        map.insert(class("c"), class("d")).unwrap();
        map.retain(|original, renamed| original != renamed);
        assert_eq!(map.len(), 1);
        assert!(!map.contains_renamed(&class("a")));
        assert!(map.contains_renamed(&class("d")));
        // Now that `a` is gone, its old name can be reused
        map.insert(class("b"), class("a")).unwrap();
    }

    #[test]
    fn inverted_swaps_halves() {
        let mut map = InjectiveMap::new();
        map.insert(class("a"), class("Foo")).unwrap();
        map.insert(class("b"), class("Bar")).unwrap();
        let inverted = map.clone().inverted();
        assert_eq!(inverted.get(&class("Foo")), Some(&class("a")));
        assert_eq!(inverted.get_inverse(&class("b")), Some(&class("Bar")));
        assert_eq!(inverted.inverted(), map);
    }
}
