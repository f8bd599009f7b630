use std::collections::HashMap;

use prettytable::{Cell, Row, Table};

use crate::solver::{constraint::Constraints, value::Value};

/// The index of a constraint within its [`Constraints`] collection.
pub type ConstraintId = usize;

/// Per-constraint counters from an arc-consistency pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerConstraintStats {
    /// How many times an arc of this constraint was revised.
    pub revisions: u64,
    /// How many revisions actually shrank a domain.
    pub prunings: u64,
    /// Total time spent revising this constraint, in microseconds.
    pub time_spent_micros: u64,
}

/// Counters for one backtracking search.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    /// The number of candidate assignments tried.
    pub nodes_visited: u64,
    /// The number of abandoned search levels.
    pub backtracks: u64,
}

/// Counters for one arc-consistency pass.
#[derive(Debug, Default, Clone)]
pub struct ArcStats {
    /// Total arc revisions across all constraints.
    pub revisions: u64,
    /// Total domain values removed.
    pub removed: u64,
    /// Breakdown per constraint.
    pub constraint_stats: HashMap<ConstraintId, PerConstraintStats>,
}

pub fn render_search_stats(stats: &SearchStats) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));
    table.add_row(Row::new(vec![
        Cell::new("Nodes visited"),
        Cell::new(&stats.nodes_visited.to_string()),
    ]));
    table.add_row(Row::new(vec![
        Cell::new("Backtracks"),
        Cell::new(&stats.backtracks.to_string()),
    ]));
    table.to_string()
}

pub fn render_arc_stats<V: Value>(stats: &ArcStats, constraints: &Constraints<V>) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Constraint"),
        Cell::new("ID"),
        Cell::new("Revisions"),
        Cell::new("Prunings"),
        Cell::new("Time / Revision (µs)"),
        Cell::new("Total Time (ms)"),
    ]));

    let mut sorted_stats: Vec<(&ConstraintId, &PerConstraintStats)> =
        stats.constraint_stats.iter().collect();
    sorted_stats.sort_by_key(|(id, per)| (per.time_spent_micros, **id));

    for (constraint_id, per) in sorted_stats {
        let avg_time = if per.revisions > 0 {
            per.time_spent_micros as f64 / per.revisions as f64
        } else {
            0.0
        };
        table.add_row(Row::new(vec![
            Cell::new(constraints.get(*constraint_id).label()),
            Cell::new(&constraint_id.to_string()),
            Cell::new(&per.revisions.to_string()),
            Cell::new(&per.prunings.to_string()),
            Cell::new(&format!("{avg_time:.2}")),
            Cell::new(&format!("{:.2}", per.time_spent_micros as f64 / 1000.0)),
        ]));
    }

    table.to_string()
}
