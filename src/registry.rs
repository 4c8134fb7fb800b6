use std::{any::TypeId, collections::HashMap};

use crate::{
    binding::Binding,
    scope::BindingId,
    types::TypeInfo,
};

/// Insertion-ordered store of bindings keyed by contract type.
#[derive(Default)]
pub(crate) struct BindingRegistry {
    next_id: u64,
    bindings: HashMap<BindingId, Binding>,
    by_contract: HashMap<TypeId, Vec<BindingId>>,
}

impl BindingRegistry {
    /// Appends a placeholder binding for the contract and returns its id.
    /// Duplicate bindings for one contract are permitted here; the kernel's
    /// duplicate policy decides whether to allow the call at all.
    pub fn register(&mut self, contract: TypeInfo) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;

        self.bindings.insert(id, Binding::placeholder(id, contract));
        self.by_contract.entry(contract.type_id).or_default().push(id);

        tracing::debug!("registered binding {:?} for '{}'", id, contract);
        id
    }

    pub fn insert(&mut self, binding: Binding) {
        let contract = binding.contract;
        self.by_contract
            .entry(contract.type_id)
            .or_default()
            .push(binding.id);
        self.bindings.insert(binding.id, binding);
    }

    pub fn next_id(&mut self) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Removes every binding for the contract. Returns how many were
    /// dropped.
    pub fn clear_contract(&mut self, contract: TypeId) -> usize {
        let ids = self.by_contract.remove(&contract).unwrap_or_default();
        for id in &ids {
            self.bindings.remove(id);
        }
        ids.len()
    }

    pub fn is_bound(&self, contract: TypeId) -> bool {
        self.by_contract
            .get(&contract)
            .is_some_and(|ids| !ids.is_empty())
    }

    /// A registration-order snapshot of every binding for the contract.
    /// Contextual filtering and one-vs-many selection are the resolver's
    /// concern.
    pub fn bindings_for(&self, contract: TypeId) -> Vec<Binding> {
        self.by_contract
            .get(&contract)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.bindings.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn binding_mut(&mut self, id: BindingId) -> Option<&mut Binding> {
        self.bindings.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeInfo;

    #[test]
    fn bindings_come_back_in_registration_order() {
        let mut registry = BindingRegistry::default();
        let contract = TypeInfo::of::<String>();
        let first = registry.register(contract);
        let second = registry.register(contract);

        let ids: Vec<_> = registry
            .bindings_for(contract.type_id)
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn clear_contract_drops_every_binding_for_it() {
        let mut registry = BindingRegistry::default();
        let contract = TypeInfo::of::<String>();
        let other = TypeInfo::of::<u32>();
        registry.register(contract);
        registry.register(contract);
        registry.register(other);

        assert_eq!(registry.clear_contract(contract.type_id), 2);
        assert!(!registry.is_bound(contract.type_id));
        assert!(registry.is_bound(other.type_id));
    }
}
