use crate::{
    binding::{Binding, Provider},
    descriptor::{Coercer, Constructor, ImplDescriptor, ResolvedArgs},
    errors::ResolutionError,
    kernel::{Kernel, Overrides},
    types::{Instance, TypeInfo},
};

/// One top-level `get`/`get_all` call: binding selection, contextual
/// filtering, auto-binding, scope-cache consultation, constructor selection
/// and recursive parameter resolution.
///
/// The context carries the chain of contracts currently under construction
/// so a cyclic registration fails fast instead of recursing without bound.
pub(crate) struct ResolveContext<'k> {
    kernel: &'k Kernel,
    stack: Vec<TypeInfo>,
}

impl<'k> ResolveContext<'k> {
    pub fn new(kernel: &'k Kernel) -> Self {
        ResolveContext {
            kernel,
            stack: Vec::new(),
        }
    }

    /// Resolves exactly one instance of the contract.
    pub fn resolve_one(
        &mut self,
        contract: TypeInfo,
        overrides: &Overrides,
        requesting: Option<TypeInfo>,
    ) -> Result<Instance, ResolutionError> {
        self.enter(contract)?;
        let result = self.resolve_one_inner(contract, overrides, requesting);
        self.leave();
        result
    }

    fn resolve_one_inner(
        &mut self,
        contract: TypeInfo,
        overrides: &Overrides,
        requesting: Option<TypeInfo>,
    ) -> Result<Instance, ResolutionError> {
        let eligible = self.eligible_bindings(contract, requesting)?;
        if eligible.len() > 1 {
            return Err(ResolutionError::AmbiguousBinding {
                contract,
                count: eligible.len(),
            });
        }

        self.resolve_binding(&eligible[0], overrides, requesting)
    }

    /// Resolves every eligible binding independently, in registration
    /// order. Multiplicity is never an error here.
    pub fn resolve_all(
        &mut self,
        contract: TypeInfo,
        overrides: &Overrides,
        requesting: Option<TypeInfo>,
    ) -> Result<Vec<Instance>, ResolutionError> {
        self.enter(contract)?;
        let result = self.resolve_all_inner(contract, overrides, requesting);
        self.leave();
        result
    }

    fn resolve_all_inner(
        &mut self,
        contract: TypeInfo,
        overrides: &Overrides,
        requesting: Option<TypeInfo>,
    ) -> Result<Vec<Instance>, ResolutionError> {
        let eligible = self.eligible_bindings(contract, requesting)?;
        eligible
            .iter()
            .map(|binding| self.resolve_binding(binding, overrides, requesting))
            .collect()
    }

    /// Bindings for the contract that survive contextual filtering. An
    /// empty result attempts an auto-bind before failing.
    fn eligible_bindings(
        &mut self,
        contract: TypeInfo,
        requesting: Option<TypeInfo>,
    ) -> Result<Vec<Binding>, ResolutionError> {
        let eligible: Vec<Binding> = self
            .kernel
            .bindings_for(contract.type_id)
            .into_iter()
            .filter(|binding| binding.eligible_for(requesting))
            .collect();

        if !eligible.is_empty() {
            return Ok(eligible);
        }

        if self.kernel.auto_bind_enabled() {
            if let Some(descriptor) = self.kernel.descriptor_for(contract.type_id) {
                let binding = self.kernel.register_self_binding(descriptor);
                tracing::debug!("auto-bound '{}' to itself", contract);
                return Ok(vec![binding]);
            }
        }

        tracing::error!("no binding found for '{}'", contract);
        Err(ResolutionError::BindingNotFound {
            contract,
            requesting,
        })
    }

    fn resolve_binding(
        &mut self,
        binding: &Binding,
        overrides: &Overrides,
        requesting: Option<TypeInfo>,
    ) -> Result<Instance, ResolutionError> {
        let key = binding.scope_key(self.kernel);
        if let Some(key) = &key {
            if let Some(hit) = self.kernel.cached(key) {
                tracing::trace!("scope cache hit for '{}'", binding.contract);
                return Ok(hit);
            }
        }

        let instance = match &binding.provider {
            Provider::Unset => {
                return Err(ResolutionError::InvalidBinding(binding.contract));
            }
            Provider::Factory(factory) => {
                factory(self.kernel).map_err(|error| ResolutionError::ConstructionFailure {
                    implementation: binding.contract,
                    error,
                })?
            }
            Provider::Constructed { descriptor, coerce } => {
                self.construct(descriptor, coerce, overrides)?
            }
        };

        if let Some(key) = key {
            self.kernel.cache_instance(key, instance.clone());
        }

        Ok(instance)
    }

    /// Chooses and invokes a constructor of the implementation type.
    ///
    /// Candidates are tried most-specific first; a candidate is feasible
    /// only if every parameter has a default or an eligible binding. The
    /// zero-parameter constructor is the last resort.
    fn construct(
        &mut self,
        descriptor: &ImplDescriptor,
        coerce: &Coercer,
        overrides: &Overrides,
    ) -> Result<Instance, ResolutionError> {
        for constructor in descriptor.parameterized() {
            if !self.feasible(constructor, descriptor.info) {
                continue;
            }

            let args = self.resolve_params(constructor, overrides, descriptor.info)?;
            return self.invoke(constructor, &args, descriptor, coerce);
        }

        match descriptor.fallback() {
            Some(constructor) => {
                let args = ResolvedArgs::new();
                self.invoke(constructor, &args, descriptor, coerce)
            }
            None => Err(ResolutionError::NoUsableConstructor(descriptor.info)),
        }
    }

    fn invoke(
        &mut self,
        constructor: &Constructor,
        args: &ResolvedArgs,
        descriptor: &ImplDescriptor,
        coerce: &Coercer,
    ) -> Result<Instance, ResolutionError> {
        let product =
            constructor
                .invoke(args)
                .map_err(|error| ResolutionError::ConstructionFailure {
                    implementation: descriptor.info,
                    error,
                })?;

        tracing::debug!("constructed instance of '{}'", descriptor.info);

        coerce(product).map_err(|error| ResolutionError::ConstructionFailure {
            implementation: descriptor.info,
            error,
        })
    }

    fn feasible(&self, constructor: &Constructor, under_construction: TypeInfo) -> bool {
        constructor.params.iter().all(|param| {
            param.default.is_some()
                || self.has_eligible_binding(param.contract, under_construction)
        })
    }

    /// A parameter is resolvable if some binding for it is eligible while
    /// constructing the implementation type, i.e. its restriction (if any)
    /// names that type rather than the original caller.
    fn has_eligible_binding(&self, contract: TypeInfo, under_construction: TypeInfo) -> bool {
        self.kernel
            .bindings_for(contract.type_id)
            .iter()
            .any(|binding| binding.eligible_for(Some(under_construction)))
    }

    /// Resolves the constructor's parameters: named overrides first, then
    /// recursion with the implementation type as the new requesting type,
    /// then the default supplier for unbound value parameters.
    fn resolve_params(
        &mut self,
        constructor: &Constructor,
        overrides: &Overrides,
        under_construction: TypeInfo,
    ) -> Result<ResolvedArgs, ResolutionError> {
        let mut args = ResolvedArgs::new();
        for param in &constructor.params {
            let instance = match overrides.get(param.name) {
                Some(instance) => instance,
                None => match &param.default {
                    Some(default)
                        if !self.has_eligible_binding(param.contract, under_construction) =>
                    {
                        default()
                    }
                    _ => self.resolve_one(param.contract, overrides, Some(under_construction))?,
                },
            };
            args.insert(param.name, instance);
        }
        Ok(args)
    }

    fn enter(&mut self, contract: TypeInfo) -> Result<(), ResolutionError> {
        if self.stack.contains(&contract) {
            let mut chain = self.stack.clone();
            chain.push(contract);
            return Err(ResolutionError::CircularDependency { chain });
        }
        self.stack.push(contract);
        Ok(())
    }

    fn leave(&mut self) {
        self.stack.pop();
    }
}
