//! Binary arithmetic operators
//!
//! Both operands are evaluated, single-element sequences are collapsed, and
//! the first error operand (left before right) wins.

use super::scalar;
use disorg_plugin::prelude::*;

pub struct Add;
pub struct Sub;
pub struct Mul;
pub struct Div;

static LHS_RHS: [ArgMeta; 2] = [
    ArgMeta::required("lhs", "Number", "Left operand"),
    ArgMeta::required("rhs", "Number", "Right operand"),
];
static ADD_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("lhs", "Number | Text | Empty", "Left operand"),
    ArgMeta::required("rhs", "Number | Text | Empty", "Right operand"),
];
static RELATED: [&str; 4] = ["+", "-", "*", "/"];

fn operator_meta(
    name: &'static str,
    description: &'static str,
    usage: &'static str,
    args: &'static [ArgMeta],
    examples: &'static [&'static str],
) -> FunctionMeta {
    FunctionMeta {
        name,
        description,
        usage,
        args,
        arity: Arity::Exact(2),
        returns: "Number",
        examples,
        category: "operator",
        related: &RELATED,
    }
}

/// Evaluate the shared operand rules, then hand two clean scalars to `f`
fn binary(op: &str, args: &[Value], f: impl FnOnce(Value, Value) -> Value) -> Value {
    let [lhs, rhs] = args else {
        return Value::Error(DisorgError::arg_count(op, "2", args.len()));
    };
    let lhs = scalar(op, lhs.clone());
    let rhs = scalar(op, rhs.clone());
    match (lhs, rhs) {
        (Value::Error(e), _) | (_, Value::Error(e)) => Value::Error(e),
        (lhs, rhs) => f(lhs, rhs),
    }
}

fn mismatch(op: &str, lhs: &Value, rhs: &Value) -> Value {
    Value::Error(DisorgError::new(
        codes::TYPE_ERROR,
        format!("Cannot apply '{}' to {} and {}", op, lhs.type_name(), rhs.type_name()),
    ))
}

/// Numeric-only operator
fn numeric(op: &str, args: &[Value], f: impl FnOnce(&Number, &Number) -> Value) -> Value {
    binary(op, args, |lhs, rhs| match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => f(a, b),
        _ => mismatch(op, &lhs, &rhs),
    })
}

impl FunctionPlugin for Add {
    fn meta(&self) -> FunctionMeta {
        operator_meta(
            "+",
            "Addition; joins text; an empty cell is the identity",
            "a + b",
            &ADD_ARGS,
            &["1 + 2", "1.5 + 2", "\"ab\" + \"c\""],
        )
    }

    fn call(&self, args: &[Value], _ctx: &mut EvalContext<'_>) -> Value {
        binary("+", args, |lhs, rhs| match (lhs, rhs) {
            (Value::Empty, other) | (other, Value::Empty) => other,
            (Value::Number(a), Value::Number(b)) => Value::Number(a.add(&b)),
            (Value::Text(a), Value::Text(b)) => Value::Text(a + &b),
            (lhs, rhs) => mismatch("+", &lhs, &rhs),
        })
    }
}

impl FunctionPlugin for Sub {
    fn meta(&self) -> FunctionMeta {
        operator_meta("-", "Subtraction", "a - b", &LHS_RHS, &["5 - 3"])
    }

    fn call(&self, args: &[Value], _ctx: &mut EvalContext<'_>) -> Value {
        numeric("-", args, |a, b| Value::Number(a.sub(b)))
    }
}

impl FunctionPlugin for Mul {
    fn meta(&self) -> FunctionMeta {
        operator_meta("*", "Multiplication", "a * b", &LHS_RHS, &["6 * 7"])
    }

    fn call(&self, args: &[Value], _ctx: &mut EvalContext<'_>) -> Value {
        numeric("*", args, |a, b| Value::Number(a.mul(b)))
    }
}

impl FunctionPlugin for Div {
    fn meta(&self) -> FunctionMeta {
        operator_meta(
            "/",
            "Division; exact integer quotients stay integers",
            "a / b",
            &LHS_RHS,
            &["84 / 2", "1 / 3"],
        )
    }

    fn call(&self, args: &[Value], ctx: &mut EvalContext<'_>) -> Value {
        let precision = ctx.precision;
        numeric("/", args, |a, b| match a.checked_div(b, precision) {
            Ok(q) => Value::Number(q),
            Err(e) => Value::Error(e.into()),
        })
    }
}
