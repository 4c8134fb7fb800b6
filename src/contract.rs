use std::rc::Rc;

use crate::types::Injectable;

/// Anything a caller can request from the kernel: a concrete type or a
/// trait object standing in for an abstraction.
pub trait Contract: 'static {}
impl<T: ?Sized + 'static> Contract for T {}

/// Records that implementation `I` satisfies contract `Self`.
///
/// For sized types this holds reflexively; for trait contracts the
/// [`contract!`](crate::contract!) macro declares the satisfying
/// implementations. Binding an implementation to a contract it does not
/// satisfy is therefore rejected by the compiler rather than at runtime.
pub trait SatisfiedBy<I: Injectable>: Contract {
    fn upcast(instance: Rc<I>) -> Rc<Self>;
}

impl<T: Injectable> SatisfiedBy<T> for T {
    fn upcast(instance: Rc<T>) -> Rc<T> {
        instance
    }
}

/// Declares which implementation types satisfy a trait contract.
///
/// ```
/// trait Greeter {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "Hello".to_string()
///     }
/// }
///
/// bindery::contract!(dyn Greeter = [English]);
/// ```
#[macro_export]
macro_rules! contract {
    (dyn $contract:path = [$($implementation:ty),+ $(,)?]) => {
        $(
            impl $crate::SatisfiedBy<$implementation> for dyn $contract {
                fn upcast(
                    instance: ::std::rc::Rc<$implementation>,
                ) -> ::std::rc::Rc<Self> {
                    instance
                }
            }
        )+
    };
}
