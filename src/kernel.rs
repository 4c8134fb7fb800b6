use std::{
    any::TypeId,
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use crate::{
    binding::{Binding, BindingBuilder, Provider},
    contract::Contract,
    descriptor::{ImplDescriptor, Implementation},
    errors::{BindingError, ResolutionError},
    registry::BindingRegistry,
    resolver::ResolveContext,
    scope::{BindingId, Key, ScopeCache, ScopeKey, ScopeValue},
    types::{Injectable, Instance, TypeInfo},
};

/// What happens when a contract that already has a binding is bound again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Multi-binding: duplicates are kept and ambiguity is detected lazily
    /// at resolution
    #[default]
    Allow,
    /// A second `bind` for an already-bound contract is an immediate
    /// registration error
    Reject,
}

/// Kernel construction knobs.
#[derive(Debug, Clone, Copy)]
pub struct KernelSettings {
    /// Implicitly self-bind described concrete types when requested without
    /// a binding
    pub auto_bind: bool,
    pub duplicates: DuplicatePolicy,
}

impl Default for KernelSettings {
    fn default() -> Self {
        KernelSettings {
            auto_bind: true,
            duplicates: DuplicatePolicy::Allow,
        }
    }
}

/// A bindings module: anything that can register its bindings against a
/// kernel. Modules are passed explicitly to [`Kernel::with_modules`]; there
/// is no program-wide discovery.
pub trait BindingsModule {
    fn init(&self, kernel: &Kernel) -> Result<(), BindingError>;
}

/// Named constructor-argument overrides for a single resolution.
///
/// Overrides are matched by parameter name before any binding is consulted
/// and propagate into nested constructions.
#[derive(Default, Clone)]
pub struct Overrides {
    values: HashMap<String, Instance>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the parameter with a sized value.
    pub fn with<T: Injectable>(mut self, name: &str, value: T) -> Self {
        self.values
            .insert(name.to_string(), Instance::new::<T>(Rc::new(value)));
        self
    }

    /// Overrides the parameter with an existing handle; use this for
    /// trait-typed parameters.
    pub fn with_handle<C: Contract + ?Sized>(mut self, name: &str, handle: Rc<C>) -> Self {
        self.values
            .insert(name.to_string(), Instance::new::<C>(handle));
        self
    }

    pub(crate) fn get(&self, name: &str) -> Option<Instance> {
        self.values.get(name).cloned()
    }
}

/// The container: binding registry, implementation descriptor table and
/// scope cache behind one single-owner handle.
///
/// All state lives in `RefCell`s so factories and scope-key callbacks may
/// call back into the kernel mid-resolution. The kernel is deliberately not
/// `Send`/`Sync`; concurrent use must be externally serialized.
pub struct Kernel {
    registry: RefCell<BindingRegistry>,
    descriptors: RefCell<HashMap<TypeId, ImplDescriptor>>,
    cache: RefCell<ScopeCache>,
    auto_bind: Cell<bool>,
    duplicates: DuplicatePolicy,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self::with_settings(KernelSettings::default())
    }

    pub fn with_settings(settings: KernelSettings) -> Self {
        Kernel {
            registry: RefCell::new(BindingRegistry::default()),
            descriptors: RefCell::new(HashMap::new()),
            cache: RefCell::new(ScopeCache::default()),
            auto_bind: Cell::new(settings.auto_bind),
            duplicates: settings.duplicates,
        }
    }

    /// Builds a kernel and lets a single module register its bindings.
    pub fn with_module(module: &dyn BindingsModule) -> Result<Self, BindingError> {
        Self::with_modules(&[module])
    }

    /// Builds a kernel and invokes each module's entry point once, in
    /// order.
    pub fn with_modules(modules: &[&dyn BindingsModule]) -> Result<Self, BindingError> {
        let kernel = Self::new();
        tracing::debug!("initializing kernel with {} modules", modules.len());
        for module in modules {
            module.init(&kernel)?;
        }
        Ok(kernel)
    }

    /// Start binding contract `C`. Finish the binding with the returned
    /// builder.
    pub fn bind<C: Contract + ?Sized>(&self) -> Result<BindingBuilder<'_, C>, BindingError> {
        let contract = TypeInfo::of::<C>();
        if self.duplicates == DuplicatePolicy::Reject
            && self.registry.borrow().is_bound(contract.type_id)
        {
            return Err(BindingError::AlreadyBound(contract));
        }

        let id = self.registry.borrow_mut().register(contract);
        Ok(BindingBuilder::new(self, id))
    }

    /// Clears every binding for `C`, then starts a fresh one.
    pub fn rebind<C: Contract + ?Sized>(&self) -> BindingBuilder<'_, C> {
        let contract = TypeInfo::of::<C>();
        let removed = self.registry.borrow_mut().clear_contract(contract.type_id);
        tracing::debug!("rebinding '{}', cleared {} bindings", contract, removed);

        let id = self.registry.borrow_mut().register(contract);
        BindingBuilder::new(self, id)
    }

    /// Registers the implementation descriptor for `T`, making it a
    /// candidate for auto-binding.
    pub fn describe<T: Implementation>(&self) -> &Self {
        let descriptor = T::descriptor();
        tracing::debug!("described implementation '{}'", descriptor.info);
        self.descriptors
            .borrow_mut()
            .insert(descriptor.info.type_id, descriptor);
        self
    }

    /// Resolves a fully constructed instance of contract `C`.
    pub fn get<C: Contract + ?Sized>(&self) -> Result<Rc<C>, ResolutionError> {
        self.get_with(&Overrides::new())
    }

    /// Resolves `C` with named constructor-argument overrides.
    pub fn get_with<C: Contract + ?Sized>(
        &self,
        overrides: &Overrides,
    ) -> Result<Rc<C>, ResolutionError> {
        let instance =
            ResolveContext::new(self).resolve_one(TypeInfo::of::<C>(), overrides, None)?;
        downcast_handle(instance)
    }

    /// Resolves every eligible binding for `C` independently, in
    /// registration order.
    pub fn get_all<C: Contract + ?Sized>(&self) -> Result<Vec<Rc<C>>, ResolutionError> {
        self.get_all_with(&Overrides::new())
    }

    pub fn get_all_with<C: Contract + ?Sized>(
        &self,
        overrides: &Overrides,
    ) -> Result<Vec<Rc<C>>, ResolutionError> {
        let instances =
            ResolveContext::new(self).resolve_all(TypeInfo::of::<C>(), overrides, None)?;
        instances.into_iter().map(downcast_handle).collect()
    }

    /// Removes the cache entry for a custom scope key, forcing
    /// reconstruction on next access.
    pub fn release<V: ScopeValue>(&self, key: V) -> bool {
        self.cache
            .borrow_mut()
            .remove(&ScopeKey::Keyed(Key::new(key)))
    }

    pub fn set_auto_bind(&self, enabled: bool) {
        self.auto_bind.set(enabled);
    }

    pub fn auto_bind_enabled(&self) -> bool {
        self.auto_bind.get()
    }
}

// Internal surface used by the builder and the resolver.
impl Kernel {
    pub(crate) fn with_binding_mut(&self, id: BindingId, mutate: impl FnOnce(&mut Binding)) {
        let mut registry = self.registry.borrow_mut();
        if let Some(binding) = registry.binding_mut(id) {
            mutate(binding);
        }
    }

    pub(crate) fn bindings_for(&self, contract: TypeId) -> Vec<Binding> {
        self.registry.borrow().bindings_for(contract)
    }

    pub(crate) fn descriptor_for(&self, contract: TypeId) -> Option<ImplDescriptor> {
        self.descriptors.borrow().get(&contract).cloned()
    }

    /// Implicitly registers a transient self-binding for a described
    /// concrete type.
    pub(crate) fn register_self_binding(&self, descriptor: ImplDescriptor) -> Binding {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        let binding = Binding {
            id,
            contract: descriptor.info,
            provider: Provider::Constructed {
                coerce: descriptor.self_coerce.clone(),
                descriptor,
            },
            scope: None,
            restriction: None,
        };
        registry.insert(binding.clone());
        binding
    }

    pub(crate) fn cached(&self, key: &ScopeKey) -> Option<Instance> {
        self.cache.borrow().get(key)
    }

    pub(crate) fn cache_instance(&self, key: ScopeKey, instance: Instance) {
        self.cache.borrow_mut().insert(key, instance);
    }
}

fn downcast_handle<C: Contract + ?Sized>(instance: Instance) -> Result<Rc<C>, ResolutionError> {
    instance
        .downcast::<C>()
        .map_err(|actual| ResolutionError::DowncastFailed {
            required: std::any::type_name::<C>(),
            actual,
        })
}
