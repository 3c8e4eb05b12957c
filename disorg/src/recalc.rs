//! Recalculation
//!
//! One pass over a table block snapshot: every formula cell is evaluated at
//! most once, pulling the values it references on demand. Cells read while
//! they are still being evaluated, and every cell caught in the same cycle,
//! end up as `CIRCULAR_REF`.

use crate::cycle::CycleTracker;
use crate::parser::{parse_formula, split_formula_cell, FormulaCell};
use crate::reference::resolve_cell;
use crate::render::render_cell;
use crate::table::TableBlock;
use disorg_core::{Coord, DisorgError, Expr, Value};
use disorg_plugin::{
    Arity, Callable, CellSource, EvalContext, FunctionMeta, LazyPlugin, PluginRegistry, Scope,
    CELL,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Outcome of recalculating one block
#[derive(Debug, Clone)]
pub struct Recalculation {
    /// The block with every formula cell re-rendered
    pub block: TableBlock,
    /// Final value of every formula cell
    pub values: BTreeMap<Coord, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellState {
    Unvisited,
    InProgress,
    Done,
}

/// Recalculate every formula cell of a block, top to bottom
pub fn recalculate(registry: &PluginRegistry, precision: u32, block: &TableBlock) -> Recalculation {
    let order: Vec<Coord> = block.coords().collect();
    recalculate_in_order(registry, precision, block, &order)
}

/// Recalculate visiting formula cells in the given order first.
///
/// Any formula cell missing from `order` is visited afterwards. The result
/// does not depend on the order.
pub fn recalculate_in_order(
    registry: &PluginRegistry,
    precision: u32,
    block: &TableBlock,
    order: &[Coord],
) -> Recalculation {
    let cells: Vec<(Coord, FormulaCell<'_>)> = block
        .coords()
        .filter_map(|coord| Some((coord, split_formula_cell(block.cell(coord)?)?)))
        .collect();

    let _span = tracing::debug_span!(
        "recalculate",
        start = block.start,
        rows = block.height(),
        formulas = cells.len()
    )
    .entered();

    let mut pass = Pass {
        registry,
        precision,
        block,
        formulas: cells
            .iter()
            .map(|(coord, cell)| {
                let formula = Formula {
                    text: cell.formula,
                    expr: parse_formula(cell.formula),
                };
                (*coord, formula)
            })
            .collect(),
        states: HashMap::new(),
        values: HashMap::new(),
        cycles: CycleTracker::default(),
        cell_fn: Callable::lazy(CellFn),
    };

    for &coord in order.iter().chain(cells.iter().map(|(coord, _)| coord)) {
        if pass.formulas.contains_key(&coord) && pass.state(coord) == CellState::Unvisited {
            pass.evaluate(coord);
        }
    }

    let mut out = block.clone();
    let mut values = BTreeMap::new();
    for (coord, cell) in &cells {
        let value = pass.cached(*coord);
        out.set_cell(*coord, render_cell(cell, &value));
        values.insert(*coord, value);
    }

    Recalculation { block: out, values }
}

struct Formula<'a> {
    text: &'a str,
    expr: Expr,
}

struct Pass<'a> {
    registry: &'a PluginRegistry,
    precision: u32,
    block: &'a TableBlock,
    formulas: HashMap<Coord, Formula<'a>>,
    states: HashMap<Coord, CellState>,
    values: HashMap<Coord, Value>,
    cycles: CycleTracker,
    cell_fn: Callable,
}

impl Pass<'_> {
    fn state(&self, coord: Coord) -> CellState {
        self.states.get(&coord).copied().unwrap_or(CellState::Unvisited)
    }

    fn cached(&self, coord: Coord) -> Value {
        self.values.get(&coord).cloned().unwrap_or_else(|| {
            Value::Error(DisorgError::internal(format!("no value recorded for {}", coord)))
        })
    }

    fn evaluate(&mut self, coord: Coord) {
        let Some(formula) = self.formulas.get(&coord) else {
            return;
        };
        let (expr, text) = (formula.expr.clone(), formula.text);
        self.states.insert(coord, CellState::InProgress);
        self.cycles.enter(coord);

        let registry = self.registry;
        let precision = self.precision;
        let scope = Scope::at(coord).with_function(CELL, self.cell_fn.clone());
        let value = EvalContext::new(registry)
            .with_precision(precision)
            .with_scope(scope)
            .with_cells(self)
            .eval(&expr);
        let value = attach_origin(single(value), coord, text);
        trace!(cell = %coord, %value, "evaluated");

        self.values.insert(coord, value);
        self.states.insert(coord, CellState::Done);

        if let Some(members) = self.cycles.leave(coord) {
            debug!(cells = ?members, "circular reference");
            for member in members {
                let error = DisorgError::circular_ref().in_cell(member.to_string());
                self.values.insert(member, Value::Error(error));
            }
        }
    }
}

/// A one-element sequence stands for its element, so a bare reference
/// stores the value it read.
fn single(value: Value) -> Value {
    match value {
        Value::List(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

/// Tag an error with the cell it arose in. Errors read from another cell keep
/// that cell as their origin.
fn attach_origin(value: Value, coord: Coord, formula: &str) -> Value {
    match value {
        Value::Error(e) if e.context.as_ref().map_or(true, |c| c.cell.is_none()) => {
            Value::Error(e.in_cell(coord.to_string()).with_formula(formula))
        }
        other => other,
    }
}

impl CellSource for Pass<'_> {
    fn value_at(&mut self, coord: Coord) -> Value {
        if !self.block.contains(coord) {
            return Value::Error(DisorgError::ref_error(format!(
                "{} is outside the {}x{} table",
                coord,
                self.block.height(),
                self.block.width()
            )));
        }
        if !self.formulas.contains_key(&coord) {
            return self.block.cell(coord).map_or(Value::Empty, Value::from_literal);
        }

        match self.state(coord) {
            CellState::Done => {
                self.cycles.read_finished(coord);
                self.cached(coord)
            }
            CellState::InProgress => {
                debug!(cell = %coord, "cell read while in progress");
                self.cycles.revisit(coord);
                Value::Error(DisorgError::circular_ref())
            }
            CellState::Unvisited => {
                self.evaluate(coord);
                self.cycles.read_evaluated(coord);
                self.cached(coord)
            }
        }
    }
}

/// Handler bound to `cell` during a pass: resolves a cell reference against
/// the evaluation origin and reads every addressed cell.
struct CellFn;

impl LazyPlugin for CellFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: CELL,
            description: "Values of the cells a reference addresses, row-major",
            usage: "[row][col]",
            args: &[],
            arity: Arity::Exact(1),
            returns: "List",
            examples: &["[this][l 1]", "[0..2][1]", "[@-1][@0]"],
            category: "reference",
            related: &["sum"],
        }
    }

    fn call(&self, args: &[&Expr], ctx: &mut EvalContext<'_>) -> Value {
        let Some(Expr::CellRef(row, col)) = args.first().copied() else {
            return Value::Error(DisorgError::eval_error("cell expects a cell reference"));
        };
        let Some(origin) = ctx.origin() else {
            return Value::Error(DisorgError::ref_error("no evaluation origin"));
        };
        match resolve_cell(row, col, origin) {
            Ok(coords) => Value::List(coords.into_iter().map(|c| ctx.cell_value(c)).collect()),
            Err(e) => Value::Error(e),
        }
    }
}
