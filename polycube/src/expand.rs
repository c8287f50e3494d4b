//! Module generating every size+1 neighbor of a polycube.

use crate::error::Result;
use crate::grid::Grid;

/// Lazily yields every polycube obtainable from `p` by adding one face-adjacent
/// cube, each cropped to its own bounding box.
///
/// The output may contain duplicates across different added cells (rotations of
/// the same free shape) and across different parent polycubes; deduplication is
/// the canonicalizer's job (spec.md §4.3). This stage only guarantees every free
/// polycube of size k+1 arises at least once from some `(parent, added cell)`.
///
/// # Errors
///
/// Returns an error if cropping the padded+expanded grid fails, which cannot
/// happen for a nonempty `p` but is propagated rather than panicked on.
pub fn expand(p: &Grid) -> Result<Vec<Grid>> {
    let (dx, dy, dz) = p.shape();
    let mut padded = Grid::zeros(dx + 2, dy + 2, dz + 2)?;
    for (x, y, z) in p.filled_cells() {
        padded.set(x + 1, y + 1, z + 1);
    }

    let (px, py, pz) = padded.shape();
    let mut candidates = Vec::new();
    for x in 0..px {
        for y in 0..py {
            for z in 0..pz {
                if padded.get(x, y, z) {
                    continue;
                }
                if has_filled_neighbor(&padded, x, y, z) {
                    candidates.push((x, y, z));
                }
            }
        }
    }

    let mut out = Vec::with_capacity(candidates.len());
    for (x, y, z) in candidates {
        let mut next = padded.clone();
        next.set(x, y, z);
        out.push(next.crop()?);
    }
    Ok(out)
}

fn has_filled_neighbor(g: &Grid, x: usize, y: usize, z: usize) -> bool {
    let (dx, dy, dz) = g.shape();
    (x > 0 && g.get(x - 1, y, z))
        || (x + 1 < dx && g.get(x + 1, y, z))
        || (y > 0 && g.get(x, y - 1, z))
        || (y + 1 < dy && g.get(x, y + 1, z))
        || (z > 0 && g.get(x, y, z - 1))
        || (z + 1 < dz && g.get(x, y, z + 1))
}

/// Checks face-connectivity of every filled cell via breadth-first flood fill.
#[must_use]
pub fn is_connected(g: &Grid) -> bool {
    let (dx, dy, dz) = g.shape();
    let filled: Vec<(usize, usize, usize)> = g.filled_cells().collect();
    let Some(&start) = filled.first() else {
        return false;
    };

    let mut visited = vec![false; dx * dy * dz];
    let idx = |x: usize, y: usize, z: usize| (x * dy + y) * dz + z;
    let mut stack = vec![start];
    visited[idx(start.0, start.1, start.2)] = true;
    let mut seen = 1usize;

    while let Some((x, y, z)) = stack.pop() {
        let mut push_if_filled = |nx: usize, ny: usize, nz: usize| {
            if g.get(nx, ny, nz) && !visited[idx(nx, ny, nz)] {
                visited[idx(nx, ny, nz)] = true;
                seen += 1;
                stack.push((nx, ny, nz));
            }
        };
        if x > 0 {
            push_if_filled(x - 1, y, z);
        }
        if x + 1 < dx {
            push_if_filled(x + 1, y, z);
        }
        if y > 0 {
            push_if_filled(x, y - 1, z);
        }
        if y + 1 < dy {
            push_if_filled(x, y + 1, z);
        }
        if z > 0 {
            push_if_filled(x, y, z - 1);
        }
        if z + 1 < dz {
            push_if_filled(x, y, z + 1);
        }
    }
    seen == filled.len()
}

/// Checks that every boundary face of the grid's bounding box contains a
/// filled cell (spec.md's "cropped" invariant, P8).
#[must_use]
pub fn is_cropped(g: &Grid) -> bool {
    let (dx, dy, dz) = g.shape();
    let x_face = |x: usize| (0..dy).any(|y| (0..dz).any(|z| g.get(x, y, z)));
    let y_face = |y: usize| (0..dx).any(|x| (0..dz).any(|z| g.get(x, y, z)));
    let z_face = |z: usize| (0..dx).any(|x| (0..dy).any(|y| g.get(x, y, z)));
    x_face(0) && x_face(dx - 1) && y_face(0) && y_face(dy - 1) && z_face(0) && z_face(dz - 1)
}
