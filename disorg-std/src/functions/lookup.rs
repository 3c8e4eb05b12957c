//! Identifier lookup

use disorg_plugin::prelude::*;
use disorg_plugin::Binding;

/// Resolves a bare name through the Scope Stack
pub struct Ident;

static IDENT_ARGS: [ArgMeta; 1] = [ArgMeta::required("name", "Identifier", "Name to resolve")];

impl LazyPlugin for Ident {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "ident",
            description: "Value bound to a name, searched innermost scope first",
            usage: "name",
            args: &IDENT_ARGS,
            arity: Arity::Exact(1),
            returns: "Any",
            examples: &["pi"],
            category: "lookup",
            related: &[],
        }
    }

    fn call(&self, args: &[&Expr], ctx: &mut EvalContext<'_>) -> Value {
        let Some(Expr::Identifier(name)) = args.first() else {
            let kind = args.first().map_or("nothing", |e| e.kind());
            return Value::Error(DisorgError::eval_error(format!(
                "ident expects an identifier, got {}",
                kind
            )));
        };
        match ctx.lookup(name) {
            Some(Binding::Value(v)) => v,
            Some(Binding::Function(_)) => Value::Error(
                DisorgError::eval_error(format!("'{}' is a function", name))
                    .with_suggestion(format!("Call it: {}(...)", name)),
            ),
            None => Value::Error(DisorgError::undefined_var(name)),
        }
    }
}
