//! Points awarded by a face when it is placed.
//!
//! There is one dispatch over [`Scoring`]; every variant is evaluated
//! against the owner's board totals as they stand right after the placement.

use codex_types::{Coordinate, Face, Scoring};
use tracing::trace;

use crate::store::ResourceStore;

/// Points scored by `face` placed at `coordinate`.
///
/// `covered_corners` and `store` are the board totals with the placement
/// included. The placement engine calls this with the totals it is about to
/// commit so that scoring cannot fail after the board has changed. Pure:
/// nothing is mutated and the same inputs always give the same result.
/// Results saturate at `u32::MAX`.
pub fn face_points(
    face: &Face,
    coordinate: Coordinate,
    covered_corners: u32,
    store: &ResourceStore,
) -> u32 {
    let points = rule_points(&face.scoring, covered_corners, store);
    trace!(%coordinate, points, "face points");
    points
}

fn rule_points(scoring: &Scoring, covered_corners: u32, store: &ResourceStore) -> u32 {
    match scoring {
        Scoring::Fixed(points) => *points,
        Scoring::CoveredCorners { multiplier } => multiplier.saturating_mul(covered_corners),
        Scoring::Symbols { kinds, multiplier } => multiplier.saturating_mul(store.min_of(kinds)),
    }
}
