//! Cell renderer
//!
//! Writes a computed value back into a formula cell as
//! `<lead>=<formula>=<value>`.

use crate::parser::FormulaCell;
use disorg_core::Value;

/// Text shown for a formula's value.
///
/// A one-element sequence shows its element; a sequence holding an error
/// shows the first error.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::List(items) if items.len() == 1 => display_value(&items[0]),
        Value::List(_) => match value.first_error() {
            Some(e) => e.token(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// New text for a formula cell
pub fn render_cell(cell: &FormulaCell<'_>, value: &Value) -> String {
    format!(
        "{}={}={}{}",
        cell.lead,
        cell.formula,
        display_value(value),
        cell.trail
    )
}
