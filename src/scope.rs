use std::{
    any::{Any, TypeId},
    collections::HashMap,
    hash::{Hash, Hasher},
    rc::Rc,
};

use crate::types::Instance;

/// Identity of one registered binding. Part of the singleton scope key so
/// every singleton binding owns its own cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub(crate) u64);

/// A caller-supplied scope key value, compared by value rather than by
/// reference. The concrete type participates in equality, so `1i32` and
/// `1u32` name different slots.
pub trait ScopeValue: 'static {
    fn dyn_eq(&self, other: &dyn Any) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn as_any(&self) -> &dyn Any;
    fn fmt_debug(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result;
}

impl<T: Eq + Hash + std::fmt::Debug + 'static> ScopeValue for T {
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        match other.downcast_ref::<T>() {
            Some(other) => self == other,
            None => false,
        }
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn fmt_debug(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An erased [`ScopeValue`] with value-equality semantics.
#[derive(Clone)]
pub struct Key(Rc<dyn ScopeValue>);

impl Key {
    pub fn new<V: ScopeValue>(value: V) -> Self {
        Key(Rc::new(value))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_any())
    }
}
impl Eq for Key {}
impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}
impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt_debug(f)
    }
}

/// Which cached instance (if any) satisfies a resolution.
///
/// Transient bindings carry no key at all and are never cached. Singleton
/// keys are a per-binding constant marker; keyed entries are shared between
/// any bindings whose key functions produce value-equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    Singleton(BindingId),
    Keyed(Key),
}

/// Map from scope key to a previously constructed instance.
///
/// Entries persist until explicitly released; the cache never evicts on its
/// own.
#[derive(Default)]
pub(crate) struct ScopeCache {
    entries: HashMap<ScopeKey, Instance>,
}

impl ScopeCache {
    pub fn get(&self, key: &ScopeKey) -> Option<Instance> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: ScopeKey, instance: Instance) {
        self.entries.insert(key, instance);
    }

    pub fn remove(&mut self, key: &ScopeKey) -> bool {
        self.entries.remove(key).is_some()
    }
}
