//! Objective evaluation.
//!
//! [`evaluate`] is pure and deterministic: it reads a finished board and
//! returns the points an objective pays on it.

use std::collections::BTreeSet;

use codex_types::{Coordinate, ObjectiveCard, ObjectiveRule, PatternCell};

use crate::board::PlayerBoard;

/// Points `objective` pays on `board`.
///
/// - `Threshold` pays its points once when every count is reached.
/// - `Sets` pays once per complete set in the resource store.
/// - `Pattern` pays once per occurrence; a card is never used by two
///   occurrences of the same objective.
pub fn evaluate(objective: &ObjectiveCard, board: &PlayerBoard) -> u32 {
    objective.points.saturating_mul(times_met(&objective.rule, board))
}

/// How many times `rule` is satisfied on `board`.
pub fn times_met(rule: &ObjectiveRule, board: &PlayerBoard) -> u32 {
    match rule {
        ObjectiveRule::Threshold { requires } => u32::from(board.resources().satisfies(requires)),
        ObjectiveRule::Sets { per_set } => board.resources().complete_sets(per_set),
        ObjectiveRule::Pattern { cells } => count_patterns(cells, board),
    }
}

/// Greedy disjoint matching. Anchors are tried in coordinate order and a
/// match claims every card it touches.
fn count_patterns(cells: &[PatternCell], board: &PlayerBoard) -> u32 {
    if cells.is_empty() {
        return 0;
    }
    let mut used: BTreeSet<Coordinate> = BTreeSet::new();
    let mut matches: u32 = 0;
    for (anchor, _) in board.iter() {
        let Some(claimed) = match_at(anchor, cells, board, &used) else {
            continue;
        };
        used.extend(claimed);
        matches = matches.saturating_add(1);
    }
    matches
}

fn match_at(
    anchor: Coordinate,
    cells: &[PatternCell],
    board: &PlayerBoard,
    used: &BTreeSet<Coordinate>,
) -> Option<Vec<Coordinate>> {
    let mut claimed = Vec::with_capacity(cells.len());
    for cell in cells {
        let at = anchor.offset(cell.dx, cell.dy)?;
        if used.contains(&at) || claimed.contains(&at) {
            return None;
        }
        let placement = board.get(at)?;
        if placement.kingdom() != Some(cell.kingdom) {
            return None;
        }
        claimed.push(at);
    }
    Some(claimed)
}
