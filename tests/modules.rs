mod common;

use bindery::{BindingError, BindingsModule, Kernel};
use common::*;

struct GreeterModule;
impl BindingsModule for GreeterModule {
    fn init(&self, kernel: &Kernel) -> Result<(), BindingError> {
        kernel.bind::<dyn Greeter>()?.to::<BasicGreeter>();
        Ok(())
    }
}

struct ConsumerModule;
impl BindingsModule for ConsumerModule {
    fn init(&self, kernel: &Kernel) -> Result<(), BindingError> {
        kernel.bind::<Reverser>()?.to_self();
        Ok(())
    }
}

#[test]
fn a_single_module_registers_its_bindings() {
    let kernel = Kernel::with_module(&GreeterModule).unwrap();
    assert_eq!(kernel.get::<dyn Greeter>().unwrap().speak(), "Hello World!");
}

#[test]
fn modules_initialize_once_each_in_order() {
    let kernel = Kernel::with_modules(&[&GreeterModule, &ConsumerModule]).unwrap();

    let reverser = kernel.get::<Reverser>().unwrap();
    assert_eq!(reverser.speak(), "!dlroW olleH");
}
