#![allow(dead_code)]

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bindery::{contract, Constructor, ImplDescriptor, Implementation, ParamInfo};

static NEXT_TAG: AtomicU64 = AtomicU64::new(0);

/// A process-unique tag, used to tell instances apart.
pub fn next_tag() -> u64 {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}

pub trait Greeter {
    fn speak(&self) -> String;
}

impl std::fmt::Debug for dyn Greeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Greeter")
    }
}

#[derive(Debug)]
pub struct BasicGreeter;
impl Greeter for BasicGreeter {
    fn speak(&self) -> String {
        "Hello World!".to_string()
    }
}
impl Implementation for BasicGreeter {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<BasicGreeter>().constructor(Constructor::default_of(|| BasicGreeter))
    }
}

pub struct OtherGreeter;
impl Greeter for OtherGreeter {
    fn speak(&self) -> String {
        "Howdy!".to_string()
    }
}
impl Implementation for OtherGreeter {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<OtherGreeter>().constructor(Constructor::default_of(|| OtherGreeter))
    }
}

/// Carries a process-unique id so identity across resolutions is
/// observable.
pub struct TaggedGreeter {
    pub id: u64,
}
impl Greeter for TaggedGreeter {
    fn speak(&self) -> String {
        format!("greeter #{}", self.id)
    }
}
impl Implementation for TaggedGreeter {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<TaggedGreeter>()
            .constructor(Constructor::default_of(|| TaggedGreeter { id: next_tag() }))
    }
}

contract!(dyn Greeter = [BasicGreeter, OtherGreeter, TaggedGreeter]);

/// Speaks its injected greeter's words backwards.
#[derive(Debug)]
pub struct Reverser {
    pub greeter: Rc<dyn Greeter>,
}
impl Reverser {
    pub fn speak(&self) -> String {
        self.greeter.speak().chars().rev().collect()
    }
}
impl Implementation for Reverser {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<Reverser>().constructor(Constructor::new(
            vec![ParamInfo::of::<dyn Greeter>("greeter")],
            |args| {
                Ok(Reverser {
                    greeter: args.handle::<dyn Greeter>("greeter")?,
                })
            },
        ))
    }
}

/// One level above [`Reverser`], for checking that nested contextual
/// bindings see their immediate consumer.
pub struct Porch {
    pub reverser: Rc<Reverser>,
}
impl Implementation for Porch {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<Porch>().constructor(Constructor::new(
            vec![ParamInfo::of::<Reverser>("reverser")],
            |args| {
                Ok(Porch {
                    reverser: args.handle::<Reverser>("reverser")?,
                })
            },
        ))
    }
}

/// Has a value parameter with a default.
pub struct Widget {
    pub size: u32,
}
impl Implementation for Widget {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<Widget>().constructor(Constructor::new(
            vec![ParamInfo::with_default("size", || 7u32)],
            |args| {
                Ok(Widget {
                    size: args.value("size")?,
                })
            },
        ))
    }
}

/// Two constructors: a specific one needing a greeter and the
/// zero-parameter fallback. Records which one built it.
pub struct Flexible {
    pub via: String,
}
impl Implementation for Flexible {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<Flexible>()
            .constructor(Constructor::default_of(|| Flexible {
                via: "default".to_string(),
            }))
            .constructor(Constructor::new(
                vec![
                    ParamInfo::of::<dyn Greeter>("greeter"),
                    ParamInfo::with_default("size", || 1u32),
                ],
                |args| {
                    let greeter = args.handle::<dyn Greeter>("greeter")?;
                    let size = args.value::<u32>("size")?;
                    Ok(Flexible {
                        via: format!("{} x{}", greeter.speak(), size),
                    })
                },
            ))
    }
}

/// Its only constructor always fails.
#[derive(Debug)]
pub struct Explosive;
impl Implementation for Explosive {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<Explosive>().constructor(Constructor::new(
            vec![],
            |_| -> Result<Explosive, bindery::DynError> { Err("boom".into()) },
        ))
    }
}

#[derive(Debug)]
pub struct Ping {
    pub pong: Rc<Pong>,
}
impl Implementation for Ping {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<Ping>().constructor(Constructor::new(
            vec![ParamInfo::of::<Pong>("pong")],
            |args| {
                Ok(Ping {
                    pong: args.handle::<Pong>("pong")?,
                })
            },
        ))
    }
}

#[derive(Debug)]
pub struct Pong {
    pub ping: Rc<Ping>,
}
impl Implementation for Pong {
    fn descriptor() -> ImplDescriptor {
        ImplDescriptor::of::<Pong>().constructor(Constructor::new(
            vec![ParamInfo::of::<Ping>("ping")],
            |args| {
                Ok(Pong {
                    ping: args.handle::<Ping>("ping")?,
                })
            },
        ))
    }
}
