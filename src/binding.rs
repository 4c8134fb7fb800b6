use std::{marker::PhantomData, rc::Rc};

use crate::{
    contract::{Contract, SatisfiedBy},
    descriptor::{ArgError, Coercer, ImplDescriptor, Implementation},
    kernel::Kernel,
    scope::{BindingId, Key, ScopeKey, ScopeValue},
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// What the binding resolves to.
#[derive(Clone)]
pub(crate) enum Provider {
    /// Registered but not yet completed by the builder
    Unset,
    /// Construct through the implementation descriptor, then coerce the
    /// product to the contract handle
    Constructed {
        descriptor: ImplDescriptor,
        coerce: Coercer,
    },
    /// Invoke the factory and use its product verbatim
    Factory(Rc<dyn Fn(&Kernel) -> Result<Instance, DynError>>),
}

/// How the binding's scope key is computed per resolution.
#[derive(Clone)]
pub(crate) enum ScopePolicy {
    /// One constant marker per binding
    Singleton,
    /// Caller-supplied key function of the kernel
    Keyed(Rc<dyn Fn(&Kernel) -> Key>),
}

/// One registered rule: contract, provider, optional scope policy and
/// optional contextual restriction.
#[derive(Clone)]
pub struct Binding {
    pub(crate) id: BindingId,
    pub(crate) contract: TypeInfo,
    pub(crate) provider: Provider,
    pub(crate) scope: Option<ScopePolicy>,
    pub(crate) restriction: Option<TypeInfo>,
}

impl Binding {
    pub(crate) fn placeholder(id: BindingId, contract: TypeInfo) -> Self {
        Binding {
            id,
            contract,
            provider: Provider::Unset,
            scope: None,
            restriction: None,
        }
    }

    /// A binding restricted to consumer `X` is eligible only while `X` is
    /// the requesting type; unrestricted bindings always are.
    pub(crate) fn eligible_for(&self, requesting: Option<TypeInfo>) -> bool {
        match self.restriction {
            Some(consumer) => requesting == Some(consumer),
            None => true,
        }
    }

    /// Transient bindings carry no key and are never cached.
    pub(crate) fn scope_key(&self, kernel: &Kernel) -> Option<ScopeKey> {
        match &self.scope {
            None => None,
            Some(ScopePolicy::Singleton) => Some(ScopeKey::Singleton(self.id)),
            Some(ScopePolicy::Keyed(key_fn)) => Some(ScopeKey::Keyed(key_fn(kernel))),
        }
    }
}

/// Fluent builder for one registered binding.
///
/// The binding is already part of the registry; each builder call rewrites
/// it in place, so it stays mutable until a resolution first snapshots it.
pub struct BindingBuilder<'k, C: Contract + ?Sized> {
    kernel: &'k Kernel,
    id: BindingId,
    _contract: PhantomData<fn() -> Box<C>>,
}

impl<C: Contract + ?Sized> std::fmt::Debug for BindingBuilder<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingBuilder").finish_non_exhaustive()
    }
}

impl<'k, C: Contract + ?Sized> BindingBuilder<'k, C> {
    pub(crate) fn new(kernel: &'k Kernel, id: BindingId) -> Self {
        BindingBuilder {
            kernel,
            id,
            _contract: PhantomData,
        }
    }

    fn update(self, mutate: impl FnOnce(&mut Binding)) -> Self {
        self.kernel.with_binding_mut(self.id, mutate);
        self
    }

    /// Finish the binding with implementation type `I`.
    pub fn to<I>(self) -> Self
    where
        I: Implementation,
        C: SatisfiedBy<I>,
    {
        let coerce: Coercer = Rc::new(|product| {
            let value = product
                .downcast::<I>()
                .map_err(|_| ArgError::Product(std::any::type_name::<I>()))?;
            Ok(Instance::new::<C>(C::upcast(Rc::from(value))))
        });
        self.update(|binding| {
            binding.provider = Provider::Constructed {
                descriptor: I::descriptor(),
                coerce,
            };
        })
    }

    /// Bind the contract to itself.
    pub fn to_self(self) -> Self
    where
        C: Implementation + Sized,
    {
        self.to::<C>()
    }

    /// Bind to an existing value; every resolution yields the identical
    /// instance.
    pub fn to_constant<I>(self, value: I) -> Self
    where
        I: Injectable,
        C: SatisfiedBy<I>,
    {
        let handle = C::upcast(Rc::new(value));
        self.to_factory(move |_| Ok(handle.clone()))
    }

    /// Bind to a factory; its product is used verbatim, bypassing
    /// constructor selection but still subject to scope caching.
    pub fn to_factory<F>(self, factory: F) -> Self
    where
        F: Fn(&Kernel) -> Result<Rc<C>, DynError> + 'static,
    {
        self.update(move |binding| {
            let factory = Rc::new(factory);
            binding.provider = Provider::Factory(Rc::new(move |kernel| {
                factory(kernel).map(Instance::new::<C>)
            }));
        })
    }

    /// Fresh instance per resolution; the default.
    pub fn in_transient_scope(self) -> Self {
        self.update(|binding| binding.scope = None)
    }

    /// Exactly one instance ever created for this binding.
    pub fn in_singleton_scope(self) -> Self {
        self.update(|binding| binding.scope = Some(ScopePolicy::Singleton))
    }

    /// Custom scope: resolutions whose key function returns value-equal keys
    /// share an instance.
    pub fn in_scope<V, F>(self, key_fn: F) -> Self
    where
        V: ScopeValue,
        F: Fn(&Kernel) -> V + 'static,
    {
        self.update(move |binding| {
            binding.scope = Some(ScopePolicy::Keyed(Rc::new(move |kernel| {
                Key::new(key_fn(kernel))
            })));
        })
    }

    /// Restrict eligibility to resolutions happening while constructing `X`.
    pub fn when_injected_into<X: Injectable>(self) -> Self {
        self.update(|binding| binding.restriction = Some(TypeInfo::of::<X>()))
    }
}
