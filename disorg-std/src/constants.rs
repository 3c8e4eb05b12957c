//! Mathematical constants

use disorg_core::{Number, Value};
use disorg_plugin::ConstantDef;

/// Pi, computed to the registry's working precision
pub fn pi(precision: u32) -> ConstantDef {
    ConstantDef {
        name: "pi".to_string(),
        value: Value::Number(Number::pi(precision)),
        description: "Ratio of a circle's circumference to its diameter (https://oeis.org/A000796)".to_string(),
        category: "transcendental".to_string(),
    }
}
