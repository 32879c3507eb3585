use std::fmt::Write as _;

use serde::Serialize;
use sleuth_core::belief::constraint::{Constraint, ConstraintStatus};
use sleuth_core::belief::contradiction::Contradiction;
use sleuth_core::belief::grid::CellState;
use sleuth_core::belief::query::{GridMetrics, SolutionReport, SolutionVerdict};
use sleuth_core::game::table::{GridSnapshot, Table};
use sleuth_core::model::card::Category;

/// Machine-readable view of a replayed table.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub grid: GridSnapshot,
    pub constraints: Vec<Constraint>,
    pub solution: SolutionReport,
    pub metrics: GridMetrics,
    pub contradictions: Vec<Contradiction>,
    pub history: Vec<String>,
}

impl ReplayReport {
    pub fn capture(table: &Table) -> Self {
        Self {
            grid: table.grid_snapshot(),
            constraints: table.constraints_snapshot(),
            solution: table.solution_status(),
            metrics: table.metrics(),
            contradictions: table.contradictions().to_vec(),
            history: table.history(),
        }
    }
}

pub fn render_json(table: &Table) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReplayReport::capture(table))
}

fn cell_symbol(cell: &CellState) -> &'static str {
    match cell {
        CellState::Unknown => ".",
        CellState::Has(_) => "X",
        CellState::Lacks(_) => "-",
    }
}

fn verdict_label(verdict: Option<SolutionVerdict>) -> &'static str {
    match verdict {
        Some(SolutionVerdict::ConfirmedIn) => "SOLUTION",
        Some(SolutionVerdict::ConfirmedOut) => "out",
        _ => "",
    }
}

/// Notebook-style grid: one row per card, one column per player.
pub fn render_grid(table: &Table) -> String {
    let setup = table.setup();
    let universe = setup.universe();
    let grid = table.state().grid();
    let report = table.solution_status();
    let names: Vec<&str> = setup
        .roster()
        .players()
        .iter()
        .map(|player| player.name.as_str())
        .collect();
    let card_width = universe
        .specs()
        .iter()
        .map(|spec| spec.slug.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let widths: Vec<usize> = names.iter().map(|name| name.len().max(3)).collect();

    let mut out = String::new();
    let _ = write!(out, "{:card_width$}", "card");
    for (name, width) in names.iter().zip(widths.iter().copied()) {
        let _ = write!(out, " | {name:^width$}");
    }
    out.push_str(" | solution\n");

    for category in Category::ALL {
        let _ = writeln!(out, "[{category}]");
        for card in universe.in_category(category) {
            let _ = write!(out, "{:card_width$}", universe.slug(card));
            for (player, width) in setup.roster().ids().zip(widths.iter().copied()) {
                let symbol = cell_symbol(grid.state(player, card));
                let _ = write!(out, " | {symbol:^width$}");
            }
            let _ = writeln!(out, " | {}", verdict_label(report.verdict(card)));
        }
    }
    out
}

pub fn render_constraints(table: &Table) -> String {
    let setup = table.setup();
    let mut out = String::new();
    for constraint in table.constraints_snapshot() {
        let cards: Vec<&str> = constraint
            .cards
            .iter()
            .map(|card| setup.universe().slug(*card))
            .collect();
        let status = match constraint.status {
            ConstraintStatus::Open => "open".to_string(),
            ConstraintStatus::Satisfied { card } => {
                format!("satisfied by {}", setup.universe().slug(card))
            }
            ConstraintStatus::Forced { card } => {
                format!("forced {}", setup.universe().slug(card))
            }
            ConstraintStatus::Contradicted => "contradicted".to_string(),
        };
        let _ = writeln!(
            out,
            "{}: {} holds one of [{}] ({}) - {status}",
            constraint.id,
            setup.roster().name(constraint.player),
            cards.join(", "),
            constraint.origin
        );
    }
    if out.is_empty() {
        out.push_str("no constraints\n");
    }
    out
}

pub fn render_solution(table: &Table) -> String {
    let universe = table.setup().universe();
    let report = table.solution_status();
    let mut out = String::new();
    for category in Category::ALL {
        let line = match report.confirmed(category) {
            Some(card) => universe.slug(card).to_string(),
            None => {
                let candidates: Vec<&str> = report
                    .candidates(category)
                    .into_iter()
                    .map(|card| universe.slug(card))
                    .collect();
                format!("one of [{}]", candidates.join(", "))
            }
        };
        let _ = writeln!(out, "{category}: {line}");
    }
    out
}

pub fn render_text(table: &Table) -> String {
    let metrics = table.metrics();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} events, {} settled cells, {} unknown, {} open constraints",
        table.event_log().len(),
        metrics.settled_cells,
        metrics.unknown_cells,
        metrics.open_constraints
    );
    out.push('\n');
    out.push_str(&render_grid(table));
    out.push('\n');
    out.push_str(&render_constraints(table));
    out.push('\n');
    out.push_str(&render_solution(table));
    for contradiction in table.contradictions() {
        let _ = writeln!(out, "contradiction: {contradiction}");
    }
    out
}

/// Markdown summary suitable for pasting into notes.
pub fn render_markdown(table: &Table) -> String {
    let setup = table.setup();
    let universe = setup.universe();
    let grid = table.state().grid();
    let report = table.solution_status();

    let mut out = String::from("# Deduction summary\n\n");
    out.push_str("| Card |");
    for player in setup.roster().players() {
        let _ = write!(out, " {} |", player.name);
    }
    out.push_str(" Solution |\n|---|");
    for _ in setup.roster().players() {
        out.push_str(":---:|");
    }
    out.push_str("---|\n");
    for card in universe.ids() {
        let _ = write!(out, "| {} |", universe.slug(card));
        for player in setup.roster().ids() {
            let _ = write!(out, " {} |", cell_symbol(grid.state(player, card)));
        }
        let _ = writeln!(out, " {} |", verdict_label(report.verdict(card)));
    }

    out.push_str("\n## Solution\n\n");
    for line in render_solution(table).lines() {
        let _ = writeln!(out, "- {line}");
    }

    let history = table.history();
    if !history.is_empty() {
        out.push_str("\n## History\n\n");
        for line in history {
            let _ = writeln!(out, "1. {line}");
        }
    }
    out
}
