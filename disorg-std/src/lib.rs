//! Disorg Standard Library
//!
//! The builtin scope frame: `pi`, `sin`, `cos`, `tan`, `sqrt`, `sum`, the four
//! arithmetic operators and `ident`.

pub mod functions;
pub mod constants;

use disorg_plugin::PluginRegistry;

/// Load standard library into registry
pub fn load_standard_library(registry: PluginRegistry, precision: u32) -> PluginRegistry {
    registry
        // Operators, looked up by symbol
        .with_function(functions::Add)
        .with_function(functions::Sub)
        .with_function(functions::Mul)
        .with_function(functions::Div)
        .with_function(functions::Sqrt)
        .with_function(functions::Sin)
        .with_function(functions::Cos)
        .with_function(functions::Tan)
        .with_lazy(functions::Sum)
        .with_lazy(functions::Ident)
        .with_constant(constants::pi(precision))
}

/// Create registry with standard library
pub fn standard_registry(precision: u32) -> PluginRegistry {
    load_standard_library(PluginRegistry::new(), precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use disorg_core::{codes, AxisRef, BinOp, Coord, Expr, Literal, Number, Value, DEFAULT_PRECISION};
    use disorg_plugin::{Callable, CellSource, EvalContext, EvalPolicy, LazyPlugin, Scope, CELL};

    fn int(n: i64) -> Expr {
        Expr::Literal(Literal::Number(Number::from_i64(n)))
    }

    fn dec(s: &str) -> Expr {
        Expr::Literal(Literal::Number(s.parse().unwrap()))
    }

    fn text(s: &str) -> Expr {
        Expr::Literal(Literal::Text(s.to_string()))
    }

    fn ident(s: &str) -> Expr {
        Expr::Identifier(s.to_string())
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::FunctionCall(name.to_string(), args)
    }

    fn eval(expr: &Expr) -> Value {
        let registry = standard_registry(DEFAULT_PRECISION);
        EvalContext::new(&registry).eval(expr)
    }

    fn code(v: &Value) -> Option<&str> {
        v.as_error().map(|e| e.code.as_str())
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_all_builtins_registered() {
            let r = standard_registry(DEFAULT_PRECISION);
            for name in ["+", "-", "*", "/", "sin", "cos", "tan", "sqrt", "sum", "ident"] {
                assert!(r.get_function(name).is_some(), "missing builtin {}", name);
            }
            assert!(r.get_constant("pi").is_some());
        }

        #[test]
        fn test_policies() {
            let r = standard_registry(DEFAULT_PRECISION);
            assert_eq!(r.get_function("+").map(Callable::policy), Some(EvalPolicy::Eager));
            assert_eq!(r.get_function("sum").map(Callable::policy), Some(EvalPolicy::Lazy));
            assert_eq!(r.get_function("ident").map(Callable::policy), Some(EvalPolicy::Lazy));
        }
    }

    mod operator_tests {
        use super::*;

        #[test]
        fn test_integer_addition_stays_integer() {
            let v = eval(&Expr::binary(BinOp::Add, int(1), int(2)));
            assert_eq!(v, Value::from(3));
            assert_eq!(v.type_name(), "Integer");
        }

        #[test]
        fn test_mixed_addition_is_decimal() {
            let v = eval(&Expr::binary(BinOp::Add, dec("1.5"), int(2)));
            assert_eq!(v.type_name(), "Decimal");
            assert_eq!(v.to_string(), "3.5");
        }

        #[test]
        fn test_empty_is_additive_identity() {
            for x in [int(4), dec("2.5"), text("abc"), Expr::EmptyCell] {
                let expected = eval(&x);
                let left = eval(&Expr::binary(BinOp::Add, Expr::EmptyCell, x.clone()));
                let right = eval(&Expr::binary(BinOp::Add, x.clone(), Expr::EmptyCell));
                assert_eq!(left, expected, "EmptyCell + {:?}", x);
                assert_eq!(right, expected, "{:?} + EmptyCell", x);
            }
        }

        #[test]
        fn test_empty_in_other_operators_is_type_error() {
            let v = eval(&Expr::binary(BinOp::Mul, Expr::EmptyCell, int(2)));
            assert_eq!(code(&v), Some(codes::TYPE_ERROR));
        }

        #[test]
        fn test_text_concatenation() {
            let v = eval(&Expr::binary(BinOp::Add, text("ab"), text("c")));
            assert_eq!(v, Value::from("abc"));
        }

        #[test]
        fn test_text_and_number_mismatch() {
            let v = eval(&Expr::binary(BinOp::Add, text("a"), int(1)));
            assert_eq!(code(&v), Some(codes::TYPE_ERROR));
        }

        #[test]
        fn test_precedence_is_structural() {
            // 2 + 3 * 4
            let e = Expr::binary(BinOp::Add, int(2), Expr::binary(BinOp::Mul, int(3), int(4)));
            assert_eq!(eval(&e), Value::from(14));
        }

        #[test]
        fn test_division() {
            assert_eq!(eval(&Expr::binary(BinOp::Div, int(84), int(2))), Value::from(42));
            assert_eq!(eval(&Expr::binary(BinOp::Div, int(1), int(4))).to_string(), "0.25");
        }

        #[test]
        fn test_division_by_zero() {
            let v = eval(&Expr::binary(BinOp::Div, int(1), int(0)));
            assert_eq!(code(&v), Some(codes::DIV_ZERO));
        }

        #[test]
        fn test_left_error_wins() {
            let e = Expr::binary(
                BinOp::Add,
                Expr::binary(BinOp::Div, int(1), int(0)),
                ident("nope"),
            );
            assert_eq!(code(&eval(&e)), Some(codes::DIV_ZERO));
        }
    }

    mod function_tests {
        use super::*;

        #[test]
        fn test_sqrt() {
            assert_eq!(eval(&call("sqrt", vec![int(16)])).to_string(), "4");
            assert_eq!(code(&eval(&call("sqrt", vec![int(-1)]))), Some(codes::DOMAIN_ERROR));
        }

        #[test]
        fn test_trig() {
            assert_eq!(eval(&call("sin", vec![int(0)])).to_string(), "0");
            assert_eq!(eval(&call("cos", vec![int(0)])).to_string(), "1");
            assert_eq!(eval(&call("tan", vec![int(0)])).to_string(), "0");
        }

        #[test]
        fn test_trig_rejects_text() {
            let v = eval(&call("sin", vec![text("x")]));
            assert_eq!(code(&v), Some(codes::TYPE_ERROR));
        }

        #[test]
        fn test_arg_count() {
            let v = eval(&call("sin", vec![int(1), int(2)]));
            assert_eq!(code(&v), Some(codes::ARG_COUNT));
            let v = eval(&call("sum", vec![]));
            assert_eq!(code(&v), Some(codes::ARG_COUNT));
        }

        #[test]
        fn test_pi_identifier() {
            let v = eval(&ident("pi"));
            assert!(v.to_string().starts_with("3.14159265358979"), "got: {}", v);
        }

        #[test]
        fn test_pi_follows_precision() {
            let registry = standard_registry(10);
            let v = EvalContext::new(&registry).eval(&ident("pi"));
            assert_eq!(v.to_string(), "3.141592654");
        }

        #[test]
        fn test_unknown_identifier() {
            assert_eq!(code(&eval(&ident("nope"))), Some(codes::UNDEFINED_VAR));
        }

        #[test]
        fn test_function_name_as_identifier() {
            assert_eq!(code(&eval(&ident("sin"))), Some(codes::EVAL_ERROR));
        }

        #[test]
        fn test_identifier_from_scope_frame() {
            let registry = standard_registry(DEFAULT_PRECISION);
            let mut ctx = EvalContext::new(&registry)
                .with_scope(Scope::new().with_value("pi", Value::from(3)));
            assert_eq!(ctx.eval(&ident("pi")), Value::from(3), "innermost frame shadows builtin");
        }
    }

    /// `cell` stand-in returning `row * 10 + col` for every resolved coordinate
    mod sequence_tests {
        use super::*;

        struct Grid;

        impl CellSource for Grid {
            fn value_at(&mut self, coord: Coord) -> Value {
                Value::from((coord.row * 10 + coord.col) as i64)
            }
        }

        /// Rows 0..=2 of column 1, ignoring the origin
        struct Column;

        impl LazyPlugin for Column {
            fn meta(&self) -> disorg_plugin::FunctionMeta {
                disorg_plugin::FunctionMeta {
                    name: "cell",
                    description: "test",
                    usage: "",
                    args: &[],
                    arity: disorg_plugin::Arity::Exact(1),
                    returns: "List",
                    examples: &[],
                    category: "test",
                    related: &[],
                }
            }

            fn call(&self, args: &[&Expr], ctx: &mut EvalContext<'_>) -> Value {
                let rows = match args.first() {
                    Some(Expr::CellRef(AxisRef::Range(..), _)) => 0..=2,
                    _ => 0..=0,
                };
                Value::List(rows.map(|r| ctx.cell_value(Coord::new(r, 1))).collect())
            }
        }

        fn run(expr: &Expr) -> Value {
            let registry = standard_registry(DEFAULT_PRECISION);
            let mut grid = Grid;
            let mut ctx = EvalContext::new(&registry)
                .with_scope(Scope::at(Coord::new(0, 0)).with_function(CELL, Callable::lazy(Column)))
                .with_cells(&mut grid);
            ctx.eval(expr)
        }

        fn range() -> Expr {
            Expr::CellRef(
                AxisRef::range(AxisRef::Absolute(0), AxisRef::Absolute(2)),
                AxisRef::Absolute(1),
            )
        }

        fn single() -> Expr {
            Expr::CellRef(AxisRef::Absolute(0), AxisRef::Absolute(1))
        }

        #[test]
        fn test_sum_flattens_range() {
            // 1 + 11 + 21
            assert_eq!(run(&call("sum", vec![range()])), Value::from(33));
        }

        #[test]
        fn test_sum_mixes_scalars_and_ranges() {
            assert_eq!(run(&call("sum", vec![range(), int(7)])), Value::from(40));
        }

        #[test]
        fn test_sum_skips_blanks_and_text() {
            let v = run(&call("sum", vec![Expr::EmptyCell, text("x")]));
            assert_eq!(v, Value::from(0));
            assert_eq!(v.type_name(), "Integer");
        }

        #[test]
        fn test_sum_propagates_errors() {
            let v = run(&call("sum", vec![int(1), Expr::binary(BinOp::Div, int(1), int(0))]));
            assert_eq!(code(&v), Some(codes::DIV_ZERO));
        }

        #[test]
        fn test_operator_unwraps_single_element() {
            let v = run(&Expr::binary(BinOp::Add, single(), int(1)));
            assert_eq!(v, Value::from(2));
        }

        #[test]
        fn test_function_unwraps_single_element() {
            let v = run(&call("sqrt", vec![Expr::binary(BinOp::Mul, single(), int(16))]));
            assert_eq!(v.to_string(), "4");
        }

        #[test]
        fn test_operator_on_range_is_contract_violation() {
            let v = run(&Expr::binary(BinOp::Add, range(), int(1)));
            let err = v.as_error().unwrap();
            assert_eq!(err.code, codes::INTERNAL);
            assert_eq!(err.severity, disorg_core::Severity::Fatal);
        }
    }
}
