//! Module combining the rotator and grid codec into the canonical identifier
//! of a free polycube (spec.md §4.4).

use crate::grid::{ord, Grid, Identifier};
use crate::rotate::rotations;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// Computes the canonical identifier of `p` against a known set, with
/// early-exit: the first rotation whose packed identifier is already a member
/// of `known` is returned immediately; otherwise the lexicographic maximum
/// identifier across all 24 rotations is returned.
///
/// Only safe to use within a single-threaded region, or across workers that
/// share one `known` set with no concurrent insertions from other workers —
/// see [`canonical_shape_invariant`] for the parallel-safe variant mandated by
/// spec.md §4.4's "Merge correctness note".
#[must_use]
pub fn canonical(p: &Grid, known: &FxHashSet<Identifier>) -> Identifier {
    let mut max_id = Identifier::min_value();
    for r in rotations(p) {
        let h = r.pack();
        if known.contains(&h) {
            return h;
        }
        if ord(&h, &max_id) == Ordering::Greater {
            max_id = h;
        }
    }
    max_id
}

/// Computes the canonical identifier of `p` as the pure lexicographic-maximum
/// rotation identifier, ignoring any known set.
///
/// This is shape-invariant by construction (P6): rotating `p` permutes the set
/// of 24 rotation identifiers onto itself, so the maximum is unchanged. This is
/// the path the tier engine's parallel dispatch uses, since per-worker
/// early-exit against independently-evolving known sets can make two workers
/// emit different representatives for the same free shape (spec.md §9, "open
/// question").
#[must_use]
pub fn canonical_shape_invariant(p: &Grid) -> Identifier {
    let mut max_id = Identifier::min_value();
    for r in rotations(p) {
        let h = r.pack();
        if ord(&h, &max_id) == Ordering::Greater {
            max_id = h;
        }
    }
    max_id
}
