//! Module containing the packed grid representation and its wire identifier.
//!
//! A [`Grid`] is a dense 3D `{0,1}` array with each axis in `[1, 255]`. Internally
//! it stores its cells in exactly the layout the wire [`Identifier`] uses (bits
//! packed little-endian, row-major flatten order with axis 0 slowest), so
//! [`Grid::pack`] and [`Identifier::unpack`] never touch the body bytes.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// Maximum length of any grid axis; identifiers reserve one byte per dimension.
pub const MAX_AXIS: usize = 255;

/// A dense 3D `{0,1}` grid, cells packed in wire layout.
#[derive(Clone, Eq, PartialEq)]
pub struct Grid {
    dx: u8,
    dy: u8,
    dz: u8,
    body: Vec<u8>,
}

/// Byte sequence uniquely encoding one specific oriented grid.
///
/// Equality and ordering are defined purely over the bytes: header (3 bytes,
/// `dx, dy, dz`) followed by the packed body. Ordering is unsigned lexicographic
/// and is what [`canonical`](crate::canonical::canonical) maximizes over.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Identifier(Vec<u8>);

impl Grid {
    /// Constructs an all-zero grid of the given shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any dimension is `0` or exceeds
    /// [`MAX_AXIS`].
    pub fn zeros(dx: usize, dy: usize, dz: usize) -> Result<Self> {
        if dx == 0 || dy == 0 || dz == 0 || dx > MAX_AXIS || dy > MAX_AXIS || dz > MAX_AXIS {
            return Err(Error::InvalidArgument(format!(
                "grid dimensions must be in [1, {MAX_AXIS}], got ({dx}, {dy}, {dz})"
            )));
        }
        let body_len = (dx * dy * dz).div_ceil(8);
        Ok(Self {
            dx: dx as u8,
            dy: dy as u8,
            dz: dz as u8,
            body: vec![0u8; body_len],
        })
    }

    /// Shape as `(dx, dy, dz)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.dx as usize, self.dy as usize, self.dz as usize)
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.dx as usize && y < self.dy as usize && z < self.dz as usize);
        (x * self.dy as usize + y) * self.dz as usize + z
    }

    /// Reads the cell at `(x, y, z)`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        let i = self.index(x, y, z);
        (self.body[i / 8] >> (i % 8)) & 1 == 1
    }

    /// Sets the cell at `(x, y, z)` to `1`.
    pub fn set(&mut self, x: usize, y: usize, z: usize) {
        let i = self.index(x, y, z);
        self.body[i / 8] |= 1 << (i % 8);
    }

    /// Number of filled cells.
    #[must_use]
    pub fn count_ones(&self) -> u32 {
        self.body.iter().map(|b| b.count_ones()).sum()
    }

    /// Iterates over the coordinates of every filled cell, in flatten order.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let (dx, dy, dz) = self.shape();
        (0..dx).flat_map(move |x| {
            (0..dy).flat_map(move |y| (0..dz).filter_map(move |z| self.get(x, y, z).then_some((x, y, z))))
        })
    }

    /// Crops the grid to the minimal bounding box of its filled cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the grid has no filled cells.
    pub fn crop(&self) -> Result<Self> {
        let (dx, dy, dz) = self.shape();
        let (mut x0, mut y0, mut z0) = (dx, dy, dz);
        let (mut x1, mut y1, mut z1) = (0usize, 0usize, 0usize);
        let mut any = false;
        for (x, y, z) in self.filled_cells() {
            any = true;
            x0 = x0.min(x);
            y0 = y0.min(y);
            z0 = z0.min(z);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
            z1 = z1.max(z + 1);
        }
        if !any {
            return Err(Error::InvalidArgument("cannot crop an empty grid".into()));
        }
        let mut out = Self::zeros(x1 - x0, y1 - y0, z1 - z0)?;
        for (x, y, z) in self.filled_cells() {
            out.set(x - x0, y - y0, z - z0);
        }
        Ok(out)
    }

    /// Packs the grid into its wire [`Identifier`].
    #[must_use]
    pub fn pack(&self) -> Identifier {
        let mut bytes = Vec::with_capacity(3 + self.body.len());
        bytes.push(self.dx);
        bytes.push(self.dy);
        bytes.push(self.dz);
        bytes.extend_from_slice(&self.body);
        Identifier(bytes)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (dx, dy, dz) = self.shape();
        write!(f, "Grid({dx}x{dy}x{dz}, {} cells)", self.count_ones())
    }
}

impl Identifier {
    /// Wraps a raw identifier byte sequence without validating it.
    ///
    /// Intended for archive readers that have already checked the header against
    /// the declared shape; prefer [`Grid::pack`] or [`Identifier::unpack`] to
    /// obtain one through validated construction.
    #[must_use]
    pub fn from_raw(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes: 3-byte shape header followed by the packed body.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the identifier, returning its raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// The minimum possible identifier, used as the canonicalizer's starting
    /// accumulator. Always compares less than any identifier produced by
    /// [`Grid::pack`], since a real header is never all-zero.
    #[must_use]
    pub fn min_value() -> Self {
        Self(Vec::new())
    }

    /// Unpacks the identifier back into a [`Grid`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveCorrupt`] if the header is missing or the body is
    /// shorter than the shape demands.
    pub fn unpack(&self) -> Result<Grid> {
        if self.0.len() < 3 {
            return Err(Error::ArchiveCorrupt(
                "identifier shorter than the 3-byte shape header".into(),
            ));
        }
        let (dx, dy, dz) = (self.0[0], self.0[1], self.0[2]);
        if dx == 0 || dy == 0 || dz == 0 {
            return Err(Error::ArchiveCorrupt(format!(
                "identifier declares a zero dimension ({dx}, {dy}, {dz})"
            )));
        }
        let count = dx as usize * dy as usize * dz as usize;
        let body_len = count.div_ceil(8);
        let body = &self.0[3..];
        if body.len() < body_len {
            return Err(Error::ArchiveCorrupt(format!(
                "identifier body truncated: need {body_len} bytes, have {}",
                body.len()
            )));
        }
        Ok(Grid {
            dx,
            dy,
            dz,
            body: body[..body_len].to_vec(),
        })
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({} bytes)", self.0.len())
    }
}

/// Unsigned lexicographic comparison of two identifiers' byte sequences.
#[must_use]
pub fn ord(a: &Identifier, b: &Identifier) -> Ordering {
    a.0.cmp(&b.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let mut g = Grid::zeros(2, 3, 4).unwrap();
        g.set(0, 0, 0);
        g.set(1, 2, 3);
        g.set(0, 1, 2);
        let id = g.pack();
        let back = id.unpack().unwrap();
        assert_eq!(g, back);
    }

    #[test]
    fn identifier_min_is_smaller_than_any_real_identifier() {
        let g = Grid::zeros(1, 1, 1).unwrap();
        let id = g.pack();
        assert_eq!(ord(&Identifier::min_value(), &id), Ordering::Less);
    }

    #[test]
    fn rejects_oversized_dimension() {
        assert!(Grid::zeros(256, 1, 1).is_err());
        assert!(Grid::zeros(0, 1, 1).is_err());
    }

    #[test]
    fn crop_shrinks_to_bounding_box() {
        let mut g = Grid::zeros(5, 5, 5).unwrap();
        g.set(1, 1, 1);
        g.set(2, 1, 1);
        let cropped = g.crop().unwrap();
        assert_eq!(cropped.shape(), (2, 1, 1));
        assert_eq!(cropped.count_ones(), 2);
    }

    #[test]
    fn header_orders_before_body() {
        let a = Identifier(vec![1, 1, 1, 0xFF]);
        let b = Identifier(vec![2, 1, 1, 0x00]);
        assert_eq!(ord(&a, &b), Ordering::Less);
    }
}
