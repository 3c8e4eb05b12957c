//! Trigonometric functions

use super::unary;
use disorg_plugin::prelude::*;

pub struct Sin;
pub struct Cos;
pub struct Tan;

static ANGLE_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Angle in radians")];

static SIN_EXAMPLES: [&str; 2] = ["sin(0)", "sin(pi / 2)"];
static SIN_RELATED: [&str; 2] = ["cos", "tan"];

static COS_EXAMPLES: [&str; 2] = ["cos(0)", "cos(pi)"];
static COS_RELATED: [&str; 2] = ["sin", "tan"];

static TAN_EXAMPLES: [&str; 2] = ["tan(0)", "tan(pi / 4)"];
static TAN_RELATED: [&str; 2] = ["sin", "cos"];

impl FunctionPlugin for Sin {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sin",
            description: "Sine function",
            usage: "sin(x)",
            args: &ANGLE_ARGS,
            arity: Arity::Exact(1),
            returns: "Decimal",
            examples: &SIN_EXAMPLES,
            category: "trig",
            related: &SIN_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &mut EvalContext<'_>) -> Value {
        unary("sin", args, |n| Ok(n.sin(ctx.precision)))
    }
}

impl FunctionPlugin for Cos {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "cos",
            description: "Cosine function",
            usage: "cos(x)",
            args: &ANGLE_ARGS,
            arity: Arity::Exact(1),
            returns: "Decimal",
            examples: &COS_EXAMPLES,
            category: "trig",
            related: &COS_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &mut EvalContext<'_>) -> Value {
        unary("cos", args, |n| Ok(n.cos(ctx.precision)))
    }
}

impl FunctionPlugin for Tan {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "tan",
            description: "Tangent function",
            usage: "tan(x)",
            args: &ANGLE_ARGS,
            arity: Arity::Exact(1),
            returns: "Decimal",
            examples: &TAN_EXAMPLES,
            category: "trig",
            related: &TAN_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &mut EvalContext<'_>) -> Value {
        unary("tan", args, |n| n.tan(ctx.precision))
    }
}
