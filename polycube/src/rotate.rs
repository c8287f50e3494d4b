//! Module generating the 24 proper rotations of a grid.
//!
//! Rotations are built from three quarter-turn primitives — one per axis-pair
//! plane — composed the way spec.md §4.2 lays out: six "prefix" reorientations
//! (one per cube face brought to the front), each followed by the four spins
//! around the axis now facing the viewer.

use crate::grid::Grid;

type Axis = usize;

/// One 90° turn within the `(a, b)` index-plane; the third axis is untouched.
///
/// Mirrors a matrix-transpose-and-flip: for a `(R, C)`-shaped plane, index
/// `(r, c)` lands at `(c, R - 1 - r)` in the `(C, R)`-shaped result.
fn quarter_turn(g: &Grid, a: Axis, b: Axis) -> Grid {
    let mut shape = [0usize; 3];
    (shape[0], shape[1], shape[2]) = g.shape();

    let mut new_shape = shape;
    new_shape[a] = shape[b];
    new_shape[b] = shape[a];

    let mut out = Grid::zeros(new_shape[0], new_shape[1], new_shape[2])
        .expect("rotation never changes total cell count, so bounds stay valid");

    for (x, y, z) in g.filled_cells() {
        let mut coord = [x, y, z];
        let old_a = coord[a];
        coord[a] = coord[b];
        coord[b] = shape[a] - 1 - old_a;
        out.set(coord[0], coord[1], coord[2]);
    }
    out
}

fn turns(g: &Grid, a: Axis, b: Axis, k: u8) -> Grid {
    let mut cur = g.clone();
    for _ in 0..k {
        cur = quarter_turn(&cur, a, b);
    }
    cur
}

/// One of the six ways to bring a cube face to the front, prior to spinning
/// around the now-forward axis.
#[derive(Clone, Copy)]
enum Prefix {
    Identity,
    Turn02By2,
    Turn02By1,
    Turn02By3,
    Turn01By1,
    Turn01By3,
}

const PREFIXES: [Prefix; 6] = [
    Prefix::Identity,
    Prefix::Turn02By2,
    Prefix::Turn02By1,
    Prefix::Turn02By3,
    Prefix::Turn01By1,
    Prefix::Turn01By3,
];

fn apply_prefix(g: &Grid, p: Prefix) -> (Grid, Axis, Axis) {
    match p {
        Prefix::Identity => (g.clone(), 1, 2),
        Prefix::Turn02By2 => (turns(g, 0, 2, 2), 1, 2),
        Prefix::Turn02By1 => (turns(g, 0, 2, 1), 0, 1),
        Prefix::Turn02By3 => (turns(g, 0, 2, 3), 0, 1),
        Prefix::Turn01By1 => (turns(g, 0, 1, 1), 0, 2),
        Prefix::Turn01By3 => (turns(g, 0, 1, 3), 0, 2),
    }
}

/// Lazily yields the 24 proper rotations of `g` (with repeats when `g` has
/// rotational symmetry — see spec.md §4.2 / P4). Callers that only need a
/// known-set membership test should stop consuming as soon as they find a hit;
/// this iterator computes each rotation on demand.
pub fn rotations(g: &Grid) -> impl Iterator<Item = Grid> + '_ {
    PREFIXES.iter().flat_map(move |&p| {
        let (base, a, b) = apply_prefix(g, p);
        (0..4u8).map(move |k| turns(&base, a, b, k))
    })
}
