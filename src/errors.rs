use thiserror::Error;

use crate::types::{DynError, TypeInfo};

/// Errors raised while registering bindings.
#[derive(Error, Debug, Clone)]
pub enum BindingError {
    /// The contract already has a binding and the kernel's duplicate policy
    /// rejects multi-binding
    #[error("'{0}' is already bound to this kernel")]
    AlreadyBound(TypeInfo),
}

/// Errors raised while resolving a contract.
///
/// Resolution is all-or-nothing: a failure aborts the failing call and no
/// partial object graph is ever returned.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// No eligible binding, or a contextual mismatch with no usable fallback
    #[error("no binding found for '{contract}'{}", requesting_suffix(.requesting))]
    BindingNotFound {
        contract: TypeInfo,
        requesting: Option<TypeInfo>,
    },
    /// More than one binding is eligible for a single-result request
    #[error("{count} bindings are eligible for '{contract}', expected exactly one")]
    AmbiguousBinding { contract: TypeInfo, count: usize },
    /// The binding was registered but never completed with an
    /// implementation, constant or factory
    #[error("binding for '{0}' declares no implementation or factory")]
    InvalidBinding(TypeInfo),
    /// The chosen constructor or factory failed; the underlying error is
    /// preserved
    #[error("construction of '{implementation}' failed - error: {error:?}")]
    ConstructionFailure {
        implementation: TypeInfo,
        error: DynError,
    },
    /// No constructor of the implementation type could be satisfied
    #[error("'{0}' has no constructor the kernel can satisfy")]
    NoUsableConstructor(TypeInfo),
    /// The dependency graph loops back on itself
    #[error("a circular dependency exists through {}", chain_display(.chain))]
    CircularDependency { chain: Vec<TypeInfo> },
    /// The resolved instance is not of the requested contract type
    #[error("failed to downcast, required: '{required}' actual: '{actual}'")]
    DowncastFailed {
        required: &'static str,
        actual: &'static str,
    },
}

fn requesting_suffix(requesting: &Option<TypeInfo>) -> String {
    match requesting {
        Some(consumer) => format!(" injected into '{}'", consumer),
        None => String::new(),
    }
}

fn chain_display(chain: &[TypeInfo]) -> String {
    chain
        .iter()
        .map(|info| format!("'{}'", info))
        .collect::<Vec<_>>()
        .join(" -> ")
}
