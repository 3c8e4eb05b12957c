//! Formula parser
//!
//! Turns a formula cell's text into an `Expr`. Parsing never fails outward:
//! text the grammar rejects becomes `Expr::ParseError` carrying the original
//! text, so one malformed cell cannot disturb the rest of the table.

use disorg_core::{AxisRef, Direction, Expr, Literal, Number, BinOp};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "formula.pest"]
struct FormulaParser;

type Build<T> = Result<T, String>;

/// Parse formula text (without the leading `=`)
pub fn parse_formula(text: &str) -> Expr {
    let parsed = FormulaParser::parse(Rule::formula, text)
        .map_err(|e| e.to_string())
        .and_then(|mut pairs| pairs.next().ok_or_else(|| "empty parse".to_string()))
        .and_then(build_formula);

    match parsed {
        Ok(expr) => expr,
        Err(reason) => {
            tracing::debug!(formula = text, %reason, "formula does not parse");
            Expr::ParseError(text.to_string())
        }
    }
}

fn build_formula(pair: Pair<'_, Rule>) -> Build<Expr> {
    match pair.into_inner().find(|p| p.as_rule() == Rule::expr) {
        Some(expr) => build_expr(expr),
        None => Ok(Expr::EmptyCell),
    }
}

fn next_pair<'i>(pairs: &mut impl Iterator<Item = Pair<'i, Rule>>, what: &str) -> Build<Pair<'i, Rule>> {
    pairs.next().ok_or_else(|| format!("missing {}", what))
}

fn build_expr(pair: Pair<'_, Rule>) -> Build<Expr> {
    match pair.as_rule() {
        Rule::expr | Rule::term => fold_binary(pair),
        Rule::integer | Rule::decimal => pair
            .as_str()
            .parse::<Number>()
            .map(|n| Expr::Literal(Literal::Number(n)))
            .map_err(|e| e.to_string()),
        Rule::string => {
            let text = pair.into_inner().next().map_or("", |t| t.as_str());
            Ok(Expr::Literal(Literal::Text(text.to_string())))
        }
        Rule::ident => Ok(Expr::Identifier(pair.as_str().to_string())),
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner, "function name")?.as_str().to_string();
            let args = next_pair(&mut inner, "argument list")?
                .into_inner()
                .map(build_expr)
                .collect::<Build<Vec<_>>>()?;
            Ok(Expr::FunctionCall(name, args))
        }
        Rule::split_ref | Rule::explicit_ref => {
            let mut inner = pair.into_inner();
            let row = build_axis(next_pair(&mut inner, "row reference")?)?;
            let col = build_axis(next_pair(&mut inner, "column reference")?)?;
            Ok(Expr::CellRef(row, col))
        }
        Rule::shorthand_ref => {
            let shift = next_pair(&mut pair.into_inner(), "shift")?;
            let still = AxisRef::Relative(0);
            match shift.as_rule() {
                Rule::hshift => Ok(Expr::CellRef(still, build_axis(shift)?)),
                _ => Ok(Expr::CellRef(build_axis(shift)?, still)),
            }
        }
        other => Err(format!("unexpected {:?}", other)),
    }
}

/// Left-associative fold of `operand (op operand)*`
fn fold_binary(pair: Pair<'_, Rule>) -> Build<Expr> {
    let mut inner = pair.into_inner();
    let mut acc = build_expr(next_pair(&mut inner, "operand")?)?;
    while let Some(op) = inner.next() {
        let rhs = build_expr(next_pair(&mut inner, "right operand")?)?;
        let op = match op.as_str() {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            other => return Err(format!("unknown operator {}", other)),
        };
        acc = Expr::binary(op, acc, rhs);
    }
    Ok(acc)
}

fn build_axis(pair: Pair<'_, Rule>) -> Build<AxisRef> {
    match pair.as_rule() {
        Rule::axis_ref => {
            let mut inner = pair.into_inner();
            let start = build_axis(next_pair(&mut inner, "reference")?)?;
            match inner.next() {
                Some(end) => Ok(AxisRef::range(start, build_axis(end)?)),
                None => Ok(start),
            }
        }
        Rule::relative => Ok(AxisRef::Relative(signed(next_pair(&mut pair.into_inner(), "offset")?)?)),
        Rule::absolute => Ok(AxisRef::Absolute(signed(next_pair(&mut pair.into_inner(), "index")?)?)),
        Rule::keyword => match pair.as_str() {
            "before" => Ok(AxisRef::Directional(Direction::Before)),
            "after" => Ok(AxisRef::Directional(Direction::After)),
            _ => Ok(AxisRef::Directional(Direction::This)),
        },
        Rule::hshift | Rule::vshift => {
            let mut inner = pair.into_inner();
            let dir = next_pair(&mut inner, "direction")?;
            let n = signed(next_pair(&mut inner, "distance")?)?;
            match dir.as_str() {
                "l" | "u" => Ok(AxisRef::Relative(-n)),
                _ => Ok(AxisRef::Relative(n)),
            }
        }
        other => Err(format!("unexpected {:?} in reference", other)),
    }
}

fn signed(pair: Pair<'_, Rule>) -> Build<i64> {
    pair.as_str()
        .parse()
        .map_err(|_| format!("reference index out of range: {}", pair.as_str()))
}

/// A formula cell split into the parts that survive re-rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaCell<'a> {
    /// Whitespace before the `=` marker
    pub lead: &'a str,
    /// The formula as originally written, without any rendered value
    pub formula: &'a str,
    /// Whitespace after the cell's content
    pub trail: &'a str,
}

/// Split a raw cell into its formula parts, or `None` for a literal cell.
///
/// A cell rendered by an earlier pass reads `=<formula>=<value>`; only the
/// formula is kept.
pub fn split_formula_cell(raw: &str) -> Option<FormulaCell<'_>> {
    let content = raw.trim_start();
    let rest = content.strip_prefix('=')?;
    let lead = &raw[..raw.len() - content.len()];
    let trail = &raw[raw.trim_end().len()..];
    let formula = extract_formula(rest).trim_end();
    Some(FormulaCell { lead, formula, trail })
}

/// Text before the first `=` that is not inside a closed `"..."` string.
///
/// A quote with no partner is an ordinary character.
pub fn extract_formula(rest: &str) -> &str {
    let mut pos = 0;
    while let Some(offset) = rest[pos..].find(['=', '"']) {
        let at = pos + offset;
        if rest.as_bytes()[at] == b'=' {
            return &rest[..at];
        }
        match rest[at + 1..].find('"') {
            Some(close) => pos = at + 1 + close + 1,
            None => pos = at + 1,
        }
    }
    rest
}
