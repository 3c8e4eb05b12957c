//! Reference resolution
//!
//! Turns the axis references of a parsed cell reference into concrete
//! coordinates, relative to the coordinate being evaluated.

use disorg_core::{Axis, AxisRef, Coord, DisorgError};

/// Resolve one axis to an ascending, non-empty run of indices
pub fn resolve_axis(axis_ref: &AxisRef, origin: Coord, axis: Axis) -> Result<Vec<usize>, DisorgError> {
    match axis_ref {
        AxisRef::Range(start, end) => {
            let start = resolve_single(start, origin, axis)?;
            let end = resolve_single(end, origin, axis)?;
            if start > end {
                return Err(DisorgError::ref_error(format!(
                    "range {}..{} is reversed",
                    start, end
                )));
            }
            Ok((start..=end).collect())
        }
        single => resolve_single(single, origin, axis).map(|i| vec![i]),
    }
}

/// Resolve a non-range reference to exactly one index
fn resolve_single(axis_ref: &AxisRef, origin: Coord, axis: Axis) -> Result<usize, DisorgError> {
    let here = origin.along(axis) as i64;
    let index = match axis_ref {
        AxisRef::Absolute(n) => *n,
        AxisRef::Relative(d) => here + d,
        AxisRef::Directional(dir) => here + dir.offset(),
        AxisRef::Range(..) => {
            return Err(DisorgError::ref_error("a range bound cannot itself be a range"))
        }
    };
    usize::try_from(index).map_err(|_| {
        DisorgError::ref_error(format!("{:?} index {} is before the table", axis, index))
    })
}

/// Row-major cartesian product of the row and column resolutions
pub fn resolve_cell(row: &AxisRef, col: &AxisRef, origin: Coord) -> Result<Vec<Coord>, DisorgError> {
    let rows = resolve_axis(row, origin, Axis::Row)?;
    let cols = resolve_axis(col, origin, Axis::Col)?;
    Ok(rows
        .iter()
        .flat_map(|&r| cols.iter().map(move |&c| Coord::new(r, c)))
        .collect())
}
