// ABOUTME: Test support utilities.
// ABOUTME: Tracing init and shorthand constructors for members and classes.

use std::sync::Once;

use telos::{Member, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("telos=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// An instance method returning a constant.
#[allow(dead_code)]
pub fn const_method(name: &str, value: i64) -> Member {
    Member::method(name, move |_| Value::Int(value))
}

/// An instance method echoing its first real argument (after the receiver).
#[allow(dead_code)]
pub fn echo_method(name: &str) -> Member {
    Member::method(name, |args| args.get(1).cloned().unwrap_or(Value::None))
}

/// A getter reading the named instance field.
#[allow(dead_code)]
pub fn field_getter(name: &str, field: &'static str) -> Member {
    Member::getter(name, move |args| {
        args[0]
            .as_object()
            .and_then(|obj| obj.field(field))
            .unwrap_or(Value::None)
    })
}

/// A setter writing the named instance field.
#[allow(dead_code)]
pub fn field_setter(name: &str, field: &'static str) -> Member {
    Member::setter(name, move |args| {
        if let Some(obj) = args[0].as_object() {
            obj.set_field(field, args[1].clone());
        }
        Value::None
    })
}
