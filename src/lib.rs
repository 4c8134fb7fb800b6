//! Bindery is a teeny inversion-of-control container: register bindings
//! mapping a contract type to an implementation, a constant or a factory,
//! then request fully constructed object graphs by contract type.
//!
//! The kernel consists of the following parts:
//!
//! 1. Kernel - the registration and resolution surface
//! 2. Binding - one registered rule, built fluently
//! 3. Descriptor - the build-time stand-in for constructor reflection
//! 4. Scope - keyed instance caching with explicit release
//!
//! # Examples
//!
//! ```rust
//! use bindery::{contract, Constructor, ImplDescriptor, Implementation, Kernel, ParamInfo};
//!
//! trait Greeter {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "Hello".to_string()
//!     }
//! }
//! impl Implementation for English {
//!     fn descriptor() -> ImplDescriptor {
//!         ImplDescriptor::of::<English>().constructor(Constructor::default_of(|| English))
//!     }
//! }
//! contract!(dyn Greeter = [English]);
//!
//! struct Door {
//!     greeter: std::rc::Rc<dyn Greeter>,
//! }
//! impl Implementation for Door {
//!     fn descriptor() -> ImplDescriptor {
//!         ImplDescriptor::of::<Door>().constructor(Constructor::new(
//!             vec![ParamInfo::of::<dyn Greeter>("greeter")],
//!             |args| {
//!                 Ok(Door {
//!                     greeter: args.handle::<dyn Greeter>("greeter")?,
//!                 })
//!             },
//!         ))
//!     }
//! }
//!
//! let kernel = Kernel::new();
//! kernel.bind::<dyn Greeter>().unwrap().to::<English>();
//! kernel.bind::<Door>().unwrap().to_self().in_singleton_scope();
//!
//! let door = kernel.get::<Door>().unwrap();
//! assert_eq!(door.greeter.greet(), "Hello");
//! ```
//!
//! The kernel is single-owner and synchronous: no operation performs I/O or
//! suspends, and concurrent use from multiple threads must be externally
//! serialized.

pub mod binding;
pub mod contract;
pub mod descriptor;
pub mod errors;
pub mod kernel;
pub(crate) mod registry;
pub(crate) mod resolver;
pub mod scope;
pub mod types;

pub use binding::{Binding, BindingBuilder};
pub use contract::{Contract, SatisfiedBy};
pub use descriptor::{ArgError, Constructor, ImplDescriptor, Implementation, ParamInfo, ResolvedArgs};
pub use errors::{BindingError, ResolutionError};
pub use kernel::{BindingsModule, DuplicatePolicy, Kernel, KernelSettings, Overrides};
pub use scope::{BindingId, Key, ScopeKey, ScopeValue};
pub use types::{DynError, Injectable, Instance, TypeInfo};
