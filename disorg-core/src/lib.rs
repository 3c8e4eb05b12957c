//! Disorg Core - Fundamental types
//!
//! This crate provides the core types used throughout Disorg:
//! - `Number`: Exact integers and arbitrary precision decimals
//! - `Value`: Runtime values (numbers, text, sequences, empty cells, errors)
//! - `DisorgError`: Structured in-band errors
//! - `Expr`: Formula expression tree, including cell references

mod number;
mod value;
mod error;
mod expr;

pub use number::{Number, NumberError, DEFAULT_PRECISION};
pub use value::Value;
pub use error::{DisorgError, ErrorContext, Severity, codes};
pub use expr::{Axis, AxisRef, BinOp, Coord, Direction, Expr, Literal};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Coord, DisorgError, Expr, Number, Severity, Value};
    pub use crate::error::codes;
}
