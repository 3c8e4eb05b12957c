//! Expression tree for cell formulas

use crate::Number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based `(row, col)` inside a table block.
///
/// Column 0 is the padding before the first bar, not a data cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Index along one axis
    pub fn along(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.row,
            Axis::Col => self.col,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Col,
}

/// `before`, `this` and `after`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Before,
    This,
    After,
}

impl Direction {
    pub fn offset(self) -> i64 {
        match self {
            Direction::Before => -1,
            Direction::This => 0,
            Direction::After => 1,
        }
    }
}

/// One axis of a cell reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisRef {
    /// Bare integer
    Absolute(i64),
    /// `@n`, or a `l`/`r`/`u`/`d` shift
    Relative(i64),
    /// `before` / `this` / `after`
    Directional(Direction),
    /// `start..end`, inclusive. Neither bound may itself be a range.
    Range(Box<AxisRef>, Box<AxisRef>),
}

impl AxisRef {
    pub fn range(start: AxisRef, end: AxisRef) -> Self {
        AxisRef::Range(Box::new(start), Box::new(end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Name the operator is registered under
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Integer or decimal, as written
    Number(Number),
    /// Quoted string with the quotes stripped, no escape processing
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    /// Row axis, then column axis
    CellRef(AxisRef, AxisRef),
    FunctionCall(String, Vec<Expr>),
    BinaryOp(BinOp, Box<Expr>, Box<Expr>),
    /// A formula cell with nothing after the marker
    EmptyCell,
    /// Unparseable formula text, kept verbatim
    ParseError(String),
}

impl Expr {
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinaryOp(op, Box::new(lhs), Box::new(rhs))
    }

    /// Node kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "Literal",
            Expr::Identifier(_) => "Identifier",
            Expr::CellRef(..) => "CellRef",
            Expr::FunctionCall(..) => "FunctionCall",
            Expr::BinaryOp(..) => "BinaryOp",
            Expr::EmptyCell => "EmptyCell",
            Expr::ParseError(_) => "ParseError",
        }
    }
}
