//! Circular reference detection for a recalculation pass.
//!
//! Cells are evaluated on demand, so there is no dependency graph to sort up
//! front. Instead Tarjan's strongly connected components algorithm runs
//! alongside evaluation: every formula cell gets a discovery index when it
//! starts, each read of another formula cell lowers the reader's lowlink, and
//! a cell whose lowlink equals its own index closes a component when it
//! finishes. Every member of a component that contains a cycle is then
//! reported, whichever member the pass happened to start from.

use disorg_core::Coord;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub(crate) struct CycleTracker {
    next_index: usize,
    index: HashMap<Coord, usize>,
    lowlink: HashMap<Coord, usize>,
    /// Cells whose component is still open
    stack: Vec<Coord>,
    on_stack: HashSet<Coord>,
    /// Cells currently being evaluated, innermost last
    active: Vec<Coord>,
    /// Cells that were read while in progress
    revisited: HashSet<Coord>,
}

impl CycleTracker {
    /// A formula cell starts evaluating
    pub fn enter(&mut self, coord: Coord) {
        self.index.insert(coord, self.next_index);
        self.lowlink.insert(coord, self.next_index);
        self.next_index += 1;
        self.stack.push(coord);
        self.on_stack.insert(coord);
        self.active.push(coord);
    }

    /// The active cell read `dep` while `dep` was still in progress
    pub fn revisit(&mut self, dep: Coord) {
        self.revisited.insert(dep);
        if let Some(&i) = self.index.get(&dep) {
            self.lower_active(i);
        }
    }

    /// The active cell read `dep`, which had already finished
    pub fn read_finished(&mut self, dep: Coord) {
        if !self.on_stack.contains(&dep) {
            return;
        }
        if let Some(&i) = self.index.get(&dep) {
            self.lower_active(i);
        }
    }

    /// The active cell read `dep` right after evaluating it
    pub fn read_evaluated(&mut self, dep: Coord) {
        if let Some(&low) = self.lowlink.get(&dep) {
            self.lower_active(low);
        }
    }

    fn lower_active(&mut self, to: usize) {
        if let Some(active) = self.active.last() {
            if let Some(low) = self.lowlink.get_mut(active) {
                *low = (*low).min(to);
            }
        }
    }

    /// The cell finished evaluating.
    ///
    /// Returns the members of the component it closes when that component is
    /// circular: more than one cell, or a cell that reads itself.
    pub fn leave(&mut self, coord: Coord) -> Option<Vec<Coord>> {
        self.active.pop();
        if self.lowlink.get(&coord) != self.index.get(&coord) {
            return None;
        }

        let mut members = Vec::new();
        while let Some(top) = self.stack.pop() {
            self.on_stack.remove(&top);
            members.push(top);
            if top == coord {
                break;
            }
        }

        if members.len() > 1 || self.revisited.contains(&coord) {
            members.sort();
            Some(members)
        } else {
            None
        }
    }
}
