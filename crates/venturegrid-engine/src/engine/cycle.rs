//! Circular dependency detection for formula cells.
//!
//! Evaluation only rejects a cell that names itself. Longer loops
//! (A1 references B1, B1 references A1) are tolerated by recalculation and
//! simply stop at the pass cap. This module finds those loops with a
//! depth-first search over the formula dependency graph so they can be
//! reported. The search keeps its own stack, so arbitrarily long reference
//! chains are fine.

use std::collections::{HashMap, HashSet};

use super::deps::formula_dependencies;
use super::{CellRef, Grid};

/// Detect circular dependencies starting from a cell.
/// Returns Some(cycle_path) if a cycle is found, None otherwise.
///
/// The path starts at `start` and ends with the repeated cell.
pub fn detect_cycle(start: CellRef, grid: &Grid) -> Option<Vec<CellRef>> {
    let mut found = None;
    walk_loops(grid, [start], |path, repeated| {
        let mut cycle = path.to_vec();
        cycle.push(repeated);
        found = Some(cycle);
        true
    });
    found
}

/// Every distinct formula cycle in the grid, each listed once.
///
/// A cycle is reported as the cells on the loop in visiting order, without
/// repeating the first cell.
pub fn find_cycles(grid: &Grid) -> Vec<Vec<CellRef>> {
    let mut seen: HashSet<Vec<CellRef>> = HashSet::new();
    let mut cycles = Vec::new();

    walk_loops(grid, grid.formula_cells().map(|(cell, _)| cell), |path, repeated| {
        if let Some(loop_start) = path.iter().position(|c| *c == repeated) {
            let cycle = path[loop_start..].to_vec();
            let mut key = cycle.clone();
            key.sort();
            if seen.insert(key) {
                cycles.push(cycle);
            }
        }
        false
    });

    cycles
}

/// Depth-first walk over formula dependencies from each root in turn, sharing
/// the finished set between roots.
///
/// `on_loop` receives the current path and the cell on it that was reached
/// again. Returning `true` ends the walk.
fn walk_loops<F>(grid: &Grid, roots: impl IntoIterator<Item = CellRef>, mut on_loop: F)
where
    F: FnMut(&[CellRef], CellRef) -> bool,
{
    let mut on_path: HashSet<CellRef> = HashSet::new();
    let mut finished: HashSet<CellRef> = HashSet::new();
    let mut path: Vec<CellRef> = Vec::new();
    // Dependencies still to visit for each cell on `path`.
    let mut pending: Vec<(Vec<CellRef>, usize)> = Vec::new();

    for root in roots {
        if finished.contains(&root) {
            continue;
        }
        let Some(deps) = formula_dependencies(grid, root) else {
            continue;
        };
        path.push(root);
        on_path.insert(root);
        pending.push((deps, 0));

        while let Some((deps, next)) = pending.last_mut() {
            let Some(&dep) = deps.get(*next) else {
                pending.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(&done);
                    finished.insert(done);
                }
                continue;
            };
            *next += 1;

            if on_path.contains(&dep) {
                if on_loop(path.as_slice(), dep) {
                    return;
                }
            } else if !finished.contains(&dep)
                && let Some(dep_deps) = formula_dependencies(grid, dep)
            {
                path.push(dep);
                on_path.insert(dep);
                pending.push((dep_deps, 0));
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Open,
    Clean,
    ReachesLoop,
}

/// Formula cells reachable from `roots` that cannot reach a reference loop,
/// ordered so every cell comes after the formula cells it reads.
///
/// `leaf` is treated as a literal: it is never listed and its dependencies
/// are not followed.
pub(crate) fn acyclic_dependency_order(
    grid: &Grid,
    roots: impl IntoIterator<Item = CellRef>,
    leaf: Option<CellRef>,
) -> Vec<CellRef> {
    let deps_of = |cell: CellRef| {
        if leaf == Some(cell) {
            None
        } else {
            formula_dependencies(grid, cell)
        }
    };
    let mut marks: HashMap<CellRef, Mark> = HashMap::new();
    let mut order = Vec::new();
    // (cell, its dependencies, next dependency, reaches a loop)
    let mut stack: Vec<(CellRef, Vec<CellRef>, usize, bool)> = Vec::new();

    for root in roots {
        if marks.contains_key(&root) {
            continue;
        }
        let Some(deps) = deps_of(root) else {
            continue;
        };
        marks.insert(root, Mark::Open);
        stack.push((root, deps, 0, false));

        while let Some((_, deps, next, reaches_loop)) = stack.last_mut() {
            let Some(&dep) = deps.get(*next) else {
                let Some((cell, _, _, reaches_loop)) = stack.pop() else {
                    break;
                };
                if reaches_loop {
                    marks.insert(cell, Mark::ReachesLoop);
                    if let Some(parent) = stack.last_mut() {
                        parent.3 = true;
                    }
                } else {
                    marks.insert(cell, Mark::Clean);
                    order.push(cell);
                }
                continue;
            };
            *next += 1;

            match marks.get(&dep).copied() {
                Some(Mark::Clean) => {}
                Some(Mark::Open | Mark::ReachesLoop) => *reaches_loop = true,
                None => {
                    if let Some(dep_deps) = deps_of(dep) {
                        marks.insert(dep, Mark::Open);
                        stack.push((dep, dep_deps, 0, false));
                    }
                }
            }
        }
    }

    order
}
