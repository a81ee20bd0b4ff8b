//! Uniform Cartesian mesh centred on the origin.
//!
//! Cell centres span `[-lx, lx] x [-ly, ly]`. Cells are numbered row-major
//! starting from the bottom-left cell, so cell `i` sits at column `i % nx`
//! and row `i / nx`.

use crate::{HfError, HfResult, Real, ensure_finite};

/// Four neighbouring cells. Boundary cells are their own neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    pub left: usize,
    pub right: usize,
    pub bottom: usize,
    pub top: usize,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "MeshDims", into = "MeshDims")
)]
pub struct CartesianMesh {
    lx: Real,
    ly: Real,
    nx: usize,
    ny: usize,
}

/// Serialized form of a mesh; only the defining dimensions are stored.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshDims {
    pub lx: Real,
    pub ly: Real,
    pub nx: usize,
    pub ny: usize,
}

impl TryFrom<MeshDims> for CartesianMesh {
    type Error = HfError;

    fn try_from(d: MeshDims) -> HfResult<Self> {
        CartesianMesh::new(d.lx, d.ly, d.nx, d.ny)
    }
}

impl From<CartesianMesh> for MeshDims {
    fn from(m: CartesianMesh) -> Self {
        MeshDims {
            lx: m.lx,
            ly: m.ly,
            nx: m.nx,
            ny: m.ny,
        }
    }
}

impl CartesianMesh {
    /// Build a mesh. Even cell counts are bumped by one so that the origin
    /// lies at a cell centre.
    pub fn new(lx: Real, ly: Real, nx: usize, ny: usize) -> HfResult<Self> {
        let lx = ensure_finite(lx, "mesh half-length lx")?;
        let ly = ensure_finite(ly, "mesh half-length ly")?;
        if lx <= 0.0 || ly <= 0.0 {
            return Err(HfError::InvalidArg {
                what: "mesh half-lengths must be positive",
            });
        }
        if nx < 2 || ny < 2 {
            return Err(HfError::InvalidArg {
                what: "mesh needs at least two cells per direction",
            });
        }
        let nx = if nx % 2 == 0 { nx + 1 } else { nx };
        let ny = if ny % 2 == 0 { ny + 1 } else { ny };
        Ok(Self { lx, ly, nx, ny })
    }

    pub fn lx(&self) -> Real {
        self.lx
    }

    pub fn ly(&self) -> Real {
        self.ly
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn hx(&self) -> Real {
        2.0 * self.lx / (self.nx - 1) as Real
    }

    pub fn hy(&self) -> Real {
        2.0 * self.ly / (self.ny - 1) as Real
    }

    pub fn number_of_elements(&self) -> usize {
        self.nx * self.ny
    }

    pub fn cell_area(&self) -> Real {
        self.hx() * self.hy()
    }

    /// Index of the cell at the origin.
    pub fn center_element(&self) -> usize {
        (self.ny / 2) * self.nx + self.nx / 2
    }

    pub fn cell_index(&self, col: usize, row: usize) -> usize {
        row * self.nx + col
    }

    /// Column and row of a cell.
    pub fn col_row(&self, cell: usize) -> (usize, usize) {
        (cell % self.nx, cell / self.nx)
    }

    fn check_cell(&self, cell: usize) -> HfResult<()> {
        if cell >= self.number_of_elements() {
            return Err(HfError::IndexOob {
                what: "mesh cell",
                index: cell,
                len: self.number_of_elements(),
            });
        }
        Ok(())
    }

    pub fn center(&self, cell: usize) -> HfResult<(Real, Real)> {
        self.check_cell(cell)?;
        let (col, row) = self.col_row(cell);
        Ok((
            -self.lx + col as Real * self.hx(),
            -self.ly + row as Real * self.hy(),
        ))
    }

    /// Cell centres for every cell, in cell order.
    pub fn centers(&self) -> Vec<(Real, Real)> {
        let (hx, hy) = (self.hx(), self.hy());
        (0..self.number_of_elements())
            .map(|cell| {
                let (col, row) = self.col_row(cell);
                (-self.lx + col as Real * hx, -self.ly + row as Real * hy)
            })
            .collect()
    }

    /// Corner coordinates ordered counter-clockwise from the bottom-left.
    pub fn vertices(&self, cell: usize) -> HfResult<[(Real, Real); 4]> {
        let (cx, cy) = self.center(cell)?;
        let (dx, dy) = (self.hx() / 2.0, self.hy() / 2.0);
        Ok([
            (cx - dx, cy - dy),
            (cx + dx, cy - dy),
            (cx + dx, cy + dy),
            (cx - dx, cy + dy),
        ])
    }

    pub fn neighbors(&self, cell: usize) -> HfResult<Neighbors> {
        self.check_cell(cell)?;
        let (col, row) = self.col_row(cell);
        let nx = self.nx;
        Ok(Neighbors {
            left: if col == 0 { cell } else { cell - 1 },
            right: if col == nx - 1 { cell } else { cell + 1 },
            bottom: if row == 0 { cell } else { cell - nx },
            top: if row == self.ny - 1 { cell } else { cell + nx },
        })
    }

    /// Cell containing `(x, y)`. Points on a shared edge go to the lower
    /// index. Returns `None` outside the mesh.
    pub fn locate_element(&self, x: Real, y: Real) -> Option<usize> {
        let col = locate_axis(x, self.lx, self.hx(), self.nx)?;
        let row = locate_axis(y, self.ly, self.hy(), self.ny)?;
        Some(self.cell_index(col, row))
    }
}

fn locate_axis(v: Real, half: Real, h: Real, n: usize) -> Option<usize> {
    if !v.is_finite() {
        return None;
    }
    let pos = (v + half) / h;
    let slack = Real::EPSILON * 8.0;
    if pos < -0.5 - slack || pos > (n - 1) as Real + 0.5 + slack {
        return None;
    }
    let idx = (pos - 0.5).ceil().max(0.0) as usize;
    Some(idx.min(n - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> CartesianMesh {
        CartesianMesh::new(2.0, 1.0, 5, 3).unwrap()
    }

    #[test]
    fn even_counts_are_bumped() {
        let m = CartesianMesh::new(1.0, 1.0, 4, 6).unwrap();
        assert_eq!(m.nx(), 5);
        assert_eq!(m.ny(), 7);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            CartesianMesh::new(0.0, 1.0, 5, 5),
            Err(HfError::InvalidArg { .. })
        ));
        assert!(matches!(
            CartesianMesh::new(1.0, f64::NAN, 5, 5),
            Err(HfError::NonFinite { what: "mesh half-length ly", .. })
        ));
        assert!(CartesianMesh::new(1.0, 1.0, 1, 5).is_err());
    }

    #[test]
    fn center_element_is_origin() {
        let m = mesh();
        assert_eq!(m.center(m.center_element()).unwrap(), (0.0, 0.0));
        assert_eq!(m.center(0).unwrap(), (-2.0, -1.0));
        assert_eq!(m.hx(), 1.0);
        assert_eq!(m.hy(), 1.0);
    }

    #[test]
    fn neighbors_at_boundary_point_to_self() {
        let m = mesh();
        let n = m.neighbors(0).unwrap();
        assert_eq!(n.left, 0);
        assert_eq!(n.bottom, 0);
        assert_eq!(n.right, 1);
        assert_eq!(n.top, 5);
        assert!(m.neighbors(15).is_err());
    }

    #[test]
    fn locate_element_inside_and_outside() {
        let m = mesh();
        assert_eq!(m.locate_element(0.0, 0.0), Some(m.center_element()));
        assert_eq!(m.locate_element(-2.4, -1.4), Some(0));
        assert_eq!(m.locate_element(0.5, 0.0), Some(7));
        assert_eq!(m.locate_element(3.0, 0.0), None);
        assert_eq!(m.locate_element(0.0, -1.6), None);
    }

    #[test]
    fn vertices_surround_center() {
        let m = mesh();
        let v = m.vertices(m.center_element()).unwrap();
        assert_eq!(v[0], (-0.5, -0.5));
        assert_eq!(v[2], (0.5, 0.5));
    }
}
