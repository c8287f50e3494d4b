//! Stub seam for the 3D voxel renderer, out of core scope (spec.md §1).
//!
//! The renderer is an external collaborator; this crate only needs to expose
//! the seam the CLI's `--render` flag hooks into; it never gets to silently
//! swallow the flag.

use anyhow::Result;
use polycube::Grid;

/// Would hand `grids` to the external 3D voxel renderer. Not implemented here;
/// announces that fact rather than pretending `--render` did something.
pub fn render(grids: &[Grid]) -> Result<()> {
    eprintln!(
        "note: --render requested but the voxel renderer is an external collaborator \
         not implemented in this crate ({} polycubes ready to render)",
        grids.len()
    );
    Ok(())
}
