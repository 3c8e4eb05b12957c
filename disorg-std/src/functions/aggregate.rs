//! Aggregate functions

use disorg_plugin::prelude::*;

/// Lazy, so a range argument is resolved exactly once and summed element-wise
pub struct Sum;

static SUM_ARGS: [ArgMeta; 1] = [ArgMeta::variadic("values", "Number...", "Values or ranges to sum")];
static SUM_EXAMPLES: [&str; 2] = ["sum(1, 2, 3)", "sum([0..2][1])"];

impl LazyPlugin for Sum {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sum",
            description: "Sum of values; ranges are flattened, blanks and text are skipped",
            usage: "sum(a, b, ...)",
            args: &SUM_ARGS,
            arity: Arity::AtLeast(1),
            returns: "Number",
            examples: &SUM_EXAMPLES,
            category: "aggregate",
            related: &["+"],
        }
    }

    fn call(&self, args: &[&Expr], ctx: &mut EvalContext<'_>) -> Value {
        let mut total = Number::from_i64(0);
        for arg in args {
            let value = ctx.eval(arg);
            if let Err(e) = accumulate(&mut total, &value) {
                return Value::Error(e);
            }
        }
        Value::Number(total)
    }
}

fn accumulate(total: &mut Number, value: &Value) -> Result<(), DisorgError> {
    match value {
        Value::Number(n) => *total = total.add(n),
        Value::List(items) => {
            for item in items {
                accumulate(total, item)?;
            }
        }
        Value::Error(e) => return Err(e.clone()),
        Value::Empty | Value::Text(_) => {}
    }
    Ok(())
}
