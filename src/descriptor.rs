use std::{any::Any, collections::HashMap, rc::Rc};

use crate::{
    contract::Contract,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// Errors raised inside a constructor closure while pulling arguments out of
/// [`ResolvedArgs`]. Surfaced to callers wrapped in a construction failure.
#[derive(thiserror::Error, Debug)]
pub enum ArgError {
    #[error("constructor argument '{0}' was not resolved")]
    Missing(&'static str),
    #[error("argument '{name}' is a '{actual}', not the required '{required}'")]
    Downcast {
        name: &'static str,
        required: &'static str,
        actual: &'static str,
    },
    #[error("constructed value is not a '{0}'")]
    Product(&'static str),
}

/// Describes how the kernel can construct a concrete type.
///
/// This is the build-time stand-in for constructor reflection: each
/// implementation type spells out its constructors, their named parameters
/// and how to invoke them.
pub trait Implementation: Injectable {
    fn descriptor() -> ImplDescriptor;
}

/// One constructor parameter: a name plus the contract to resolve for it.
///
/// Value parameters additionally carry a default supplier, used when no
/// binding for the contract exists and no override names the parameter.
#[derive(Clone)]
pub struct ParamInfo {
    pub name: &'static str,
    pub contract: TypeInfo,
    pub(crate) default: Option<Rc<dyn Fn() -> Instance>>,
}

impl ParamInfo {
    /// A parameter satisfied by resolving `C` through the kernel.
    pub fn of<C: Contract + ?Sized>(name: &'static str) -> Self {
        ParamInfo {
            name,
            contract: TypeInfo::of::<C>(),
            default: None,
        }
    }

    /// A value parameter with a default, for plain data the kernel should
    /// not have to know about.
    pub fn with_default<T, F>(name: &'static str, default: F) -> Self
    where
        T: Injectable,
        F: Fn() -> T + 'static,
    {
        ParamInfo {
            name,
            contract: TypeInfo::of::<T>(),
            default: Some(Rc::new(move || Instance::new::<T>(Rc::new(default())))),
        }
    }
}

/// Arguments resolved for one constructor invocation, keyed by parameter
/// name.
pub struct ResolvedArgs {
    args: HashMap<&'static str, Instance>,
}

impl ResolvedArgs {
    pub(crate) fn new() -> Self {
        ResolvedArgs {
            args: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: &'static str, instance: Instance) {
        self.args.insert(name, instance);
    }

    /// Takes a contract-typed argument as a shared handle.
    pub fn handle<C: Contract + ?Sized>(&self, name: &'static str) -> Result<Rc<C>, DynError> {
        let instance = self.args.get(name).ok_or(ArgError::Missing(name))?;
        instance.downcast::<C>().map_err(|actual| {
            ArgError::Downcast {
                name,
                required: std::any::type_name::<C>(),
                actual,
            }
            .into()
        })
    }

    /// Takes a value argument by cloning it out of its handle.
    pub fn value<T: Injectable + Clone>(&self, name: &'static str) -> Result<T, DynError> {
        self.handle::<T>(name).map(|handle| (*handle).clone())
    }
}

pub(crate) type Coercer = Rc<dyn Fn(Box<dyn Any>) -> Result<Instance, DynError>>;

/// One way of building the implementation type: named parameters plus the
/// invocation closure.
#[derive(Clone)]
pub struct Constructor {
    pub(crate) params: Vec<ParamInfo>,
    invoke: Rc<dyn Fn(&ResolvedArgs) -> Result<Box<dyn Any>, DynError>>,
}

impl Constructor {
    pub fn new<I, F>(params: Vec<ParamInfo>, build: F) -> Self
    where
        I: Injectable,
        F: Fn(&ResolvedArgs) -> Result<I, DynError> + 'static,
    {
        Constructor {
            params,
            invoke: Rc::new(move |args| build(args).map(|value| Box::new(value) as Box<dyn Any>)),
        }
    }

    /// The zero-parameter fallback constructor.
    pub fn default_of<I, F>(build: F) -> Self
    where
        I: Injectable,
        F: Fn() -> I + 'static,
    {
        Constructor::new(vec![], move |_| Ok(build()))
    }

    pub(crate) fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn invoke(&self, args: &ResolvedArgs) -> Result<Box<dyn Any>, DynError> {
        (self.invoke)(args)
    }
}

/// The full constructor table for one implementation type, plus the
/// coercion used when the type is auto-bound to itself.
#[derive(Clone)]
pub struct ImplDescriptor {
    pub(crate) info: TypeInfo,
    constructors: Vec<Constructor>,
    pub(crate) self_coerce: Coercer,
}

impl ImplDescriptor {
    pub fn of<I: Injectable>() -> Self {
        ImplDescriptor {
            info: TypeInfo::of::<I>(),
            constructors: Vec::new(),
            self_coerce: Rc::new(|product: Box<dyn Any>| {
                let value = product
                    .downcast::<I>()
                    .map_err(|_| ArgError::Product(std::any::type_name::<I>()))?;
                Ok(Instance::new::<I>(Rc::from(value)))
            }),
        }
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Constructors ordered most-specific first. The zero-parameter
    /// constructor, if any, is not part of this list; it is the last-resort
    /// fallback.
    pub(crate) fn parameterized(&self) -> Vec<&Constructor> {
        let mut ordered: Vec<&Constructor> =
            self.constructors.iter().filter(|c| c.arity() > 0).collect();
        ordered.sort_by(|a, b| b.arity().cmp(&a.arity()));
        ordered
    }

    pub(crate) fn fallback(&self) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.arity() == 0)
    }
}
