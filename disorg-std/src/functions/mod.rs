//! Builtin functions and operators

mod operators;
mod math;
mod trig;
mod aggregate;
mod lookup;

pub use operators::{Add, Sub, Mul, Div};
pub use math::Sqrt;
pub use trig::{Sin, Cos, Tan};
pub use aggregate::Sum;
pub use lookup::Ident;

use disorg_core::{DisorgError, Number, NumberError, Value};

/// Collapse a single-element sequence; anything longer is a contract violation
pub(crate) fn scalar(func: &str, value: Value) -> Value {
    match value.unwrap_scalar() {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(function = func, error = %e, "sequence where a single value is required");
            Value::Error(e)
        }
    }
}

/// Apply a numeric function to a single evaluated argument
pub(crate) fn unary(
    func: &str,
    args: &[Value],
    f: impl FnOnce(&Number) -> Result<Number, NumberError>,
) -> Value {
    let Some(arg) = args.first() else {
        return Value::Error(DisorgError::arg_count(func, "1", 0));
    };
    match scalar(func, arg.clone()) {
        Value::Number(n) => match f(&n) {
            Ok(result) => Value::Number(result),
            Err(e) => Value::Error(e.into()),
        },
        Value::Error(e) => Value::Error(e),
        other => Value::Error(
            DisorgError::type_error("Number", other.type_name())
                .with_note(format!("argument of {}", func)),
        ),
    }
}
