use std::{
    rc::Rc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    environment::EnvironmentRef,
    value::{NativeFunction, Value},
};

/// Defines the native functions in the global frame.
pub fn install(env: &EnvironmentRef) {
    let mut scope = env.borrow_mut();
    scope.define("clock", native("clock", 0, clock));
}

fn native(name: &'static str, arity: usize, callback: fn(&[Value]) -> Value) -> Value {
    Value::NativeFunction(Rc::new(NativeFunction {
        name,
        arity,
        callback,
    }))
}

/// Seconds since the Unix epoch, with sub-second precision.
fn clock(_args: &[Value]) -> Value {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Value::Number(elapsed.as_secs_f64())
}
