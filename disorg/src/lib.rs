//! Disorg - spreadsheet formulas inside plain-text tables
//!
//! Cells whose text starts with `=` hold formulas. A recalculation pass
//! evaluates every formula cell of a table block and writes the value back
//! after a second `=`, keeping the formula so the next pass can recompute it.

mod cycle;
pub mod parser;
mod recalc;
pub mod reference;
pub mod render;
pub mod table;

pub use parser::{extract_formula, parse_formula, split_formula_cell, FormulaCell};
pub use recalc::{recalculate, recalculate_in_order, Recalculation};
pub use render::display_value;
pub use table::{block_at, find_blocks, is_table_line, write_back, TableBlock};

use disorg_core::{Coord, DisorgError, Value, DEFAULT_PRECISION};
use disorg_plugin::{EvalContext, FunctionMeta, PluginRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Significant digits for transcendental functions and inexact division
    pub precision: u32,
    /// Realign column widths after recalculating
    pub reformat: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            reformat: true,
        }
    }
}

/// What processing did to one table block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    /// Line index of the block's first row
    pub start: usize,
    pub rows: usize,
    pub formulas: usize,
    /// Rows whose text changed
    pub rows_written: usize,
}

/// A processed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub text: String,
    pub blocks: Vec<BlockReport>,
}

impl Processed {
    pub fn changed(&self) -> bool {
        self.blocks.iter().any(|b| b.rows_written > 0)
    }
}

/// Main Disorg engine
pub struct Disorg {
    registry: Arc<PluginRegistry>,
    config: EngineConfig,
}

impl Disorg {
    pub fn new(registry: PluginRegistry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    pub fn with_standard_library() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(disorg_std::standard_registry(config.precision), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Evaluate a formula outside any table. Cell references are `REF_ERROR`.
    pub fn eval_formula(&self, formula: &str) -> Value {
        EvalContext::new(&self.registry)
            .with_precision(self.config.precision)
            .eval(&parse_formula(formula))
    }

    /// The block with every formula cell re-rendered
    pub fn recalculate(&self, block: &TableBlock) -> TableBlock {
        self.run(block).block
    }

    /// Final value of every formula cell
    pub fn values(&self, block: &TableBlock) -> BTreeMap<Coord, Value> {
        self.run(block).values
    }

    /// Align the block's columns, returning the column widths
    pub fn reformat(&self, block: &mut TableBlock) -> Vec<usize> {
        block.reformat()
    }

    /// Recalculate, then reformat when configured to
    pub fn process_block(&self, block: &TableBlock) -> TableBlock {
        let mut out = self.recalculate(block);
        if self.config.reformat {
            out.reformat();
        }
        out
    }

    /// Process every table block in a document
    pub fn process_document(&self, text: &str) -> Processed {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let mut blocks = Vec::new();

        for block in find_blocks(&lines) {
            let formulas = block
                .coords()
                .filter(|&c| block.cell(c).and_then(split_formula_cell).is_some())
                .count();
            let processed = self.process_block(&block);
            let rows_written = write_back(&mut lines, &processed);
            tracing::debug!(start = block.start, formulas, rows_written, "block processed");
            blocks.push(BlockReport {
                start: block.start,
                rows: block.height(),
                formulas,
                rows_written,
            });
        }

        Processed {
            text: lines.join("\n"),
            blocks,
        }
    }

    pub fn help(&self, name: Option<&str>) -> Result<serde_json::Value, DisorgError> {
        self.registry.help(name)
    }

    pub fn list_functions(&self, category: Option<&str>) -> Vec<FunctionMeta> {
        self.registry.list_functions(category)
    }

    fn run(&self, block: &TableBlock) -> Recalculation {
        recalculate(&self.registry, self.config.precision, block)
    }
}

impl Default for Disorg {
    fn default() -> Self {
        Self::with_standard_library()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disorg_core::codes;

    fn engine() -> Disorg {
        Disorg::with_standard_library()
    }

    fn no_reformat() -> Disorg {
        Disorg::with_config(EngineConfig {
            reformat: false,
            ..EngineConfig::default()
        })
    }

    fn value_at(disorg: &Disorg, table: &str, row: usize, col: usize) -> Value {
        let values = disorg.values(&TableBlock::parse(table));
        values
            .get(&Coord::new(row, col))
            .cloned()
            .unwrap_or_else(|| panic!("({},{}) is not a formula cell", row, col))
    }

    fn code(value: &Value) -> Option<String> {
        value.first_error().map(|e| e.code.clone())
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn test_integer_sum() {
            assert_eq!(value_at(&engine(), "| =1 + 2 |", 0, 1), Value::from(3));
        }

        #[test]
        fn test_mixed_sum_is_decimal() {
            let v = value_at(&engine(), "| =1.5 + 2 |", 0, 1);
            assert_eq!(v.to_string(), "3.5");
            assert!(!v.as_number().unwrap().is_integer());
        }

        #[test]
        fn test_division() {
            let disorg = engine();
            assert_eq!(disorg.eval_formula("6 / 3"), Value::from(2));
            assert_eq!(disorg.eval_formula("1 / 4").to_string(), "0.25");
            assert_eq!(
                code(&disorg.eval_formula("1 / 0")).as_deref(),
                Some(codes::DIV_ZERO)
            );
        }

        #[test]
        fn test_text_concatenation() {
            assert_eq!(engine().eval_formula("\"ab\" + \"cd\""), Value::from("abcd"));
            assert_eq!(
                code(&engine().eval_formula("\"ab\" * 2")).as_deref(),
                Some(codes::TYPE_ERROR)
            );
        }

        #[test]
        fn test_builtins() {
            let disorg = engine();
            assert!(disorg.eval_formula("pi").to_string().starts_with("3.14159265358979"));
            assert_eq!(disorg.eval_formula("sqrt(16)").to_string(), "4");
            assert_eq!(disorg.eval_formula("sin(0)").to_string(), "0");
            assert_eq!(
                code(&disorg.eval_formula("nope + 1")).as_deref(),
                Some(codes::UNDEFINED_VAR)
            );
        }

        #[test]
        fn test_precision_follows_config() {
            let disorg = Disorg::with_config(EngineConfig {
                precision: 10,
                ..EngineConfig::default()
            });
            assert_eq!(disorg.eval_formula("pi").to_string(), "3.141592654");
            assert_eq!(disorg.eval_formula("1 / 3").to_string(), "0.3333333333");
            assert_eq!(disorg.eval_formula("sin(10)").to_string(), "-0.5440211109");
        }
    }

    mod references {
        use super::*;

        #[test]
        fn test_left_neighbour() {
            let v = value_at(&engine(), "| 20 | =[this][l 1] + 1 |", 0, 2);
            assert_eq!(v, Value::from(21));
        }

        #[test]
        fn test_column_sum() {
            let table = "| 1 | a |\n| 2 | b |\n| 3 | c |\n| =sum([0..2][1]) | |";
            assert_eq!(value_at(&engine(), table, 3, 1), Value::from(6));
        }

        #[test]
        fn test_bare_reference_chains_into_arithmetic() {
            let table = "| 7 | =[this][l 1] | =[this][l 1] + 1 |";
            let disorg = engine();
            assert_eq!(value_at(&disorg, table, 0, 2), Value::from(7));
            assert_eq!(value_at(&disorg, table, 0, 3), Value::from(8));

            let out = no_reformat().recalculate(&TableBlock::parse(table));
            assert_eq!(out.to_lines(), vec!["| 7 | =[this][l 1]=7 | =[this][l 1] + 1=8 |"]);
        }

        #[test]
        fn test_absolute_and_relative_bare_references_agree() {
            let table = "| 7 | =[0][1] | =[@0][@-1] * 2 |";
            let disorg = engine();
            assert_eq!(value_at(&disorg, table, 0, 2), Value::from(7));
            assert_eq!(value_at(&disorg, table, 0, 3), Value::from(14));
        }

        #[test]
        fn test_relative_column_sum_including_itself() {
            let table = "| =sum([@0..@2][@0]) | =[this][l 1] |\n| 2 |\n| 3 |";
            let disorg = engine();
            assert_eq!(code(&value_at(&disorg, table, 0, 1)).as_deref(), Some(codes::CIRCULAR_REF));
            assert_eq!(code(&value_at(&disorg, table, 0, 2)).as_deref(), Some(codes::CIRCULAR_REF));
            let out = disorg.recalculate(&TableBlock::parse(table));
            assert!(out.to_lines()[0].contains("=sum([@0..@2][@0])=#ERROR: CIRCULAR_REF"));
        }

        #[test]
        fn test_relative_range_sum() {
            let table = "| 1 | =sum([@0..@2][@-1]) |\n| 2 |\n| 3 |";
            assert_eq!(value_at(&engine(), table, 0, 2), Value::from(6));
        }

        #[test]
        fn test_reversed_range_is_ref_error() {
            let v = value_at(&engine(), "| 1 |\n| 2 |\n| =sum([1..0][1]) |", 2, 1);
            assert_eq!(code(&v).as_deref(), Some(codes::REF_ERROR));
        }

        #[test]
        fn test_self_reference_renders_circular_token() {
            let out = engine().recalculate(&TableBlock::parse("| =[this][this] |"));
            assert_eq!(out.to_lines(), vec!["| =[this][this]=#ERROR: CIRCULAR_REF |"]);
        }

        #[test]
        fn test_cycle_through_sum() {
            let table = "| 1 |\n| =sum([0..2][1]) |\n| 2 |";
            let v = value_at(&engine(), table, 1, 1);
            assert_eq!(code(&v).as_deref(), Some(codes::CIRCULAR_REF));
        }
    }

    mod passes {
        use super::*;

        const TABLE: &str = "\
| item  | qty | price | total                  |
| apple | 3   | 0.5   | =[this][l 2] * [this][l 1] |
| pear  | 2   | 1.25  | =[this][l 2] * [this][l 1] |
| all   |     |       | =sum([1..2][4])        |";

        #[test]
        fn test_values() {
            let values = engine().values(&TableBlock::parse(TABLE));
            assert_eq!(values[&Coord::new(1, 4)].to_string(), "1.5");
            assert_eq!(values[&Coord::new(2, 4)].to_string(), "2.5");
            assert_eq!(values[&Coord::new(3, 4)].to_string(), "4");
        }

        #[test]
        fn test_recalculation_is_idempotent() {
            let disorg = engine();
            let once = disorg.recalculate(&TableBlock::parse(TABLE));
            let twice = disorg.recalculate(&once);
            assert_eq!(once.to_lines(), twice.to_lines());
        }

        #[test]
        fn test_processing_is_idempotent() {
            let disorg = engine();
            let once = disorg.process_document(TABLE);
            let twice = disorg.process_document(&once.text);
            assert_eq!(once.text, twice.text);
            assert!(once.changed());
            assert!(!twice.changed(), "second pass rewrote rows");
        }

        #[test]
        fn test_order_independence() {
            let disorg = engine();
            let block = TableBlock::parse(
                "| =[this][r 1] + 1 | =[d 1] * 2 | 4 |\n\
                 | =[u 1] | =[this][l 1] - [this][r 1] | =sum([0][1..3]) |",
            );
            let forward: Vec<Coord> = block.coords().collect();
            let mut backward = forward.clone();
            backward.reverse();
            let mut middle_out = forward.clone();
            middle_out.rotate_left(forward.len() / 2);

            let expected = recalculate_in_order(disorg.registry(), 28, &block, &forward);
            for order in [&backward, &middle_out] {
                let other = recalculate_in_order(disorg.registry(), 28, &block, order);
                assert_eq!(other.values, expected.values, "order {:?}", order);
                assert_eq!(other.block, expected.block);
            }
        }

        #[test]
        fn test_stale_value_is_replaced() {
            let out = engine().recalculate(&TableBlock::parse("| 2 | =[this][l 1] * 5=99 |"));
            assert_eq!(out.to_lines(), vec!["| 2 | =[this][l 1] * 5=10 |"]);
        }
    }

    mod documents {
        use super::*;

        #[test]
        fn test_process_document() {
            let doc = "# Budget\n\n| a | 1 |\n| b | =[u 1] + 1 |\n\nnotes\n  | =2 * 3 |\n";
            let processed = no_reformat().process_document(doc);
            assert_eq!(
                processed.text,
                "# Budget\n\n| a | 1 |\n| b | =[u 1] + 1=2 |\n\nnotes\n  | =2 * 3=6 |\n"
            );
            assert_eq!(processed.blocks.len(), 2);
            assert_eq!(processed.blocks[0].start, 2);
            assert_eq!(processed.blocks[0].rows_written, 1);
            assert_eq!(processed.blocks[1].formulas, 1);
        }

        #[test]
        fn test_document_without_tables_is_untouched() {
            let doc = "just text\nno bars here\n";
            let processed = engine().process_document(doc);
            assert_eq!(processed.text, doc);
            assert!(processed.blocks.is_empty());
        }

        #[test]
        fn test_reformat_after_recalculation() {
            let processed = engine().process_document("| x | =10 * 10 |\n| long name | 1 |");
            assert_eq!(
                processed.text,
                "| x        | =10 * 10=100|\n| long name| 1           |"
            );
        }

        #[test]
        fn test_config_from_json() {
            let config: EngineConfig = serde_json::from_str(r#"{"precision": 12}"#).unwrap();
            assert_eq!(config.precision, 12);
            assert!(config.reformat, "missing fields take defaults");
        }
    }

    mod help {
        use super::*;

        #[test]
        fn test_help_overview() {
            let help = engine().help(None).unwrap();
            assert!(help.is_object());
        }

        #[test]
        fn test_help_function() {
            let help = engine().help(Some("sqrt")).unwrap();
            assert_eq!(help["name"], "sqrt");
            assert!(engine().help(Some("no_such_thing")).is_err());
        }

        #[test]
        fn test_list_functions() {
            let names: Vec<&str> = engine().list_functions(None).iter().map(|m| m.name).collect();
            for name in ["sum", "sin", "sqrt", "+"] {
                assert!(names.contains(&name), "missing {}", name);
            }
        }
    }
}
