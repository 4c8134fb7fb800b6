use std::{any::Any, any::TypeId, rc::Rc};

use crate::contract::Contract;

pub type DynError = Box<dyn std::error::Error>;

/// The kernel is single-owner and synchronous, so anything with a static
/// lifetime can be injected.
pub trait Injectable: 'static {}
impl<T: 'static> Injectable for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// An erased resolved value.
///
/// The payload is always an `Rc<C>` for the contract `C` the value was
/// produced under, so a trait-typed handle survives erasure intact.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    payload: Rc<dyn Any>,
}

impl Instance {
    pub fn new<C: Contract + ?Sized>(handle: Rc<C>) -> Self {
        Instance {
            info: TypeInfo::of::<C>(),
            payload: Rc::new(handle),
        }
    }

    pub fn downcast<C: Contract + ?Sized>(&self) -> Result<Rc<C>, &'static str> {
        match self.payload.downcast_ref::<Rc<C>>() {
            Some(handle) => Ok(handle.clone()),
            None => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_returns_the_stored_handle() {
        let instance = Instance::new::<String>(Rc::new("hello".to_string()));
        let handle = instance.downcast::<String>().unwrap();
        assert_eq!(*handle, "hello");
    }

    #[test]
    fn downcast_to_the_wrong_contract_reports_the_actual_type() {
        let instance = Instance::new::<String>(Rc::new("hello".to_string()));
        let err = instance.downcast::<u32>().unwrap_err();
        assert!(err.contains("String"));
    }
}
