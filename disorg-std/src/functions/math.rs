//! Core math functions

use super::unary;
use disorg_plugin::prelude::*;

pub struct Sqrt;

static SQRT_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value (must be non-negative)")];
static SQRT_EXAMPLES: [&str; 2] = ["sqrt(2)", "sqrt(16)"];

impl FunctionPlugin for Sqrt {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sqrt",
            description: "Square root with arbitrary precision",
            usage: "sqrt(x)",
            args: &SQRT_ARGS,
            arity: Arity::Exact(1),
            returns: "Decimal",
            examples: &SQRT_EXAMPLES,
            category: "math",
            related: &[],
        }
    }

    fn call(&self, args: &[Value], ctx: &mut EvalContext<'_>) -> Value {
        unary("sqrt", args, |n| n.sqrt(ctx.precision))
    }
}
