mod common;

use bindery::{BindingError, DuplicatePolicy, Kernel, KernelSettings, ResolutionError};
use common::*;

#[test]
fn get_all_returns_every_binding_in_registration_order() {
    let kernel = Kernel::new();
    kernel.bind::<dyn Greeter>().unwrap().to::<BasicGreeter>();
    kernel.bind::<dyn Greeter>().unwrap().to::<OtherGreeter>();

    let greeters = kernel.get_all::<dyn Greeter>().unwrap();
    let spoken: Vec<String> = greeters.iter().map(|g| g.speak()).collect();
    assert_eq!(spoken, vec!["Hello World!", "Howdy!"]);
}

#[test]
fn restricted_bindings_do_not_count_at_the_top_level() {
    let kernel = Kernel::new();
    kernel.bind::<dyn Greeter>().unwrap().to::<BasicGreeter>();
    kernel.bind::<dyn Greeter>().unwrap().to::<OtherGreeter>();
    kernel
        .bind::<dyn Greeter>()
        .unwrap()
        .to::<TaggedGreeter>()
        .when_injected_into::<Reverser>();

    assert_eq!(kernel.get_all::<dyn Greeter>().unwrap().len(), 2);
}

#[test]
fn multiple_eligible_bindings_make_a_bare_get_ambiguous() {
    let kernel = Kernel::new();
    kernel.bind::<dyn Greeter>().unwrap().to::<BasicGreeter>();
    kernel.bind::<dyn Greeter>().unwrap().to::<OtherGreeter>();

    let err = kernel.get::<dyn Greeter>().unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::AmbiguousBinding { count: 2, .. }
    ));

    // get_all is the supported way to consume a multi-binding.
    assert_eq!(kernel.get_all::<dyn Greeter>().unwrap().len(), 2);
}

#[test]
fn get_all_fails_when_nothing_is_bound() {
    let kernel = Kernel::new();

    let err = kernel.get_all::<dyn Greeter>().unwrap_err();
    assert!(matches!(err, ResolutionError::BindingNotFound { .. }));
}

#[test]
fn reject_policy_makes_a_duplicate_bind_an_immediate_error() {
    let kernel = Kernel::with_settings(KernelSettings {
        duplicates: DuplicatePolicy::Reject,
        ..KernelSettings::default()
    });

    kernel.bind::<dyn Greeter>().unwrap().to::<BasicGreeter>();
    let err = kernel.bind::<dyn Greeter>().unwrap_err();
    assert!(matches!(err, BindingError::AlreadyBound(_)));

    // Rebind is still the supported way to replace the binding.
    kernel.rebind::<dyn Greeter>().to::<OtherGreeter>();
    assert_eq!(kernel.get::<dyn Greeter>().unwrap().speak(), "Howdy!");
}
