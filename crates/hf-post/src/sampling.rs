//! Point and line sampling of per-cell fields.

use std::str::FromStr;

use hf_core::{CartesianMesh, ensure_finite, linspace};
use hf_results::Snapshot;

use crate::error::{PostError, PostResult};
use crate::fields::{EdgeSelect, FieldKind, FieldShape, cell_values, scalar_value};

fn check_len(values: &[f64], mesh: &CartesianMesh) -> PostResult<()> {
    if values.len() != mesh.number_of_elements() {
        return Err(PostError::InvalidInput(format!(
            "field has {} values but the mesh has {} cells",
            values.len(),
            mesh.number_of_elements()
        )));
    }
    Ok(())
}

/// Bilinear interpolation between the four cell centres around `(x, y)`.
/// Points outside the cell-centre box give NaN.
pub fn value_at_point(values: &[f64], mesh: &CartesianMesh, x: f64, y: f64) -> PostResult<f64> {
    check_len(values, mesh)?;
    let fx = (x + mesh.lx()) / mesh.hx();
    let fy = (y + mesh.ly()) / mesh.hy();
    let (max_col, max_row) = ((mesh.nx() - 1) as f64, (mesh.ny() - 1) as f64);
    if !(0.0..=max_col).contains(&fx) || !(0.0..=max_row).contains(&fy) {
        return Ok(f64::NAN);
    }

    let col = (fx.floor() as usize).min(mesh.nx() - 2);
    let row = (fy.floor() as usize).min(mesh.ny() - 2);
    let tx = fx - col as f64;
    let ty = fy - row as f64;

    let v00 = values[mesh.cell_index(col, row)];
    let v10 = values[mesh.cell_index(col + 1, row)];
    let v01 = values[mesh.cell_index(col, row + 1)];
    let v11 = values[mesh.cell_index(col + 1, row + 1)];

    let bottom = v00 + (v10 - v00) * tx;
    let top = v01 + (v11 - v01) * tx;
    Ok(bottom + (top - bottom) * ty)
}

/// `(time, value)` of a field at one point across snapshots. Scalar fields
/// ignore the point.
pub fn field_at_point(
    snapshots: &[Snapshot],
    field: FieldKind,
    edge: EdgeSelect,
    point: (f64, f64),
) -> PostResult<Vec<(f64, f64)>> {
    snapshots
        .iter()
        .map(|s| {
            let value = match field.shape() {
                FieldShape::Scalar => scalar_value(s, field)?,
                FieldShape::Cell => {
                    let values = cell_values(s, field, edge)?;
                    let v = value_at_point(&values, &s.mesh, point.0, point.1)?;
                    if v.is_nan() {
                        tracing::warn!(
                            time_s = s.time_s,
                            x = point.0,
                            y = point.1,
                            "point outside fracture"
                        );
                    }
                    v
                }
                FieldShape::Geometry => {
                    return Err(PostError::InvalidInput(format!(
                        "'{field}' cannot be evaluated at a point"
                    )));
                }
            };
            Ok((s.time_s, value))
        })
        .collect()
}

/// Field sampled along a straight line across the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceProfile {
    pub points: Vec<(f64, f64)>,
    /// Signed distance from the middle sample.
    pub distance: Vec<f64>,
    pub values: Vec<f64>,
}

/// Interpolate `values` along the line through `p1` and `p2`, extended to
/// the edges of the cell-centre box. Samples run left to right (bottom to
/// top for vertical lines).
pub fn slice_interpolated(
    values: &[f64],
    mesh: &CartesianMesh,
    p1: (f64, f64),
    p2: (f64, f64),
    samples: usize,
) -> PostResult<SliceProfile> {
    check_len(values, mesh)?;
    if samples < 2 {
        return Err(PostError::InvalidInput(format!(
            "a slice needs at least 2 samples, got {samples}"
        )));
    }
    let (start, end) = clip_line(mesh, p1, p2)?;

    let xs = linspace(start.0, end.0, samples);
    let ys = linspace(start.1, end.1, samples);
    let points: Vec<(f64, f64)> = xs.into_iter().zip(ys).collect();

    let mid = points[samples / 2];
    let distance = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let d = (p.0 - mid.0).hypot(p.1 - mid.1);
            if i < samples / 2 { -d } else { d }
        })
        .collect();

    let values = points
        .iter()
        .map(|&(x, y)| value_at_point(values, mesh, x, y))
        .collect::<PostResult<Vec<f64>>>()?;

    Ok(SliceProfile {
        points,
        distance,
        values,
    })
}

/// End points of the infinite line through `p1`, `p2` clipped to
/// `[-lx, lx] x [-ly, ly]`.
fn clip_line(
    mesh: &CartesianMesh,
    p1: (f64, f64),
    p2: (f64, f64),
) -> PostResult<((f64, f64), (f64, f64))> {
    for v in [p1.0, p1.1, p2.0, p2.1] {
        ensure_finite(v, "slice point coordinate")?;
    }
    let (mut dx, mut dy) = (p2.0 - p1.0, p2.1 - p1.1);
    if dx == 0.0 && dy == 0.0 {
        return Err(PostError::InvalidInput(
            "slice points must be distinct".to_string(),
        ));
    }
    if dx < 0.0 || (dx == 0.0 && dy < 0.0) {
        dx = -dx;
        dy = -dy;
    }

    let mut s_min = f64::NEG_INFINITY;
    let mut s_max = f64::INFINITY;
    for (p, d, half) in [(p1.0, dx, mesh.lx()), (p1.1, dy, mesh.ly())] {
        if d == 0.0 {
            if p.abs() > half {
                return Err(PostError::InvalidInput(
                    "slice line does not cross the mesh".to_string(),
                ));
            }
            continue;
        }
        let a = (-half - p) / d;
        let b = (half - p) / d;
        s_min = s_min.max(a.min(b));
        s_max = s_max.min(a.max(b));
    }
    if s_min > s_max {
        return Err(PostError::InvalidInput(
            "slice line does not cross the mesh".to_string(),
        ));
    }

    Ok((
        (p1.0 + s_min * dx, p1.1 + s_min * dy),
        (p1.0 + s_max * dx, p1.1 + s_max * dy),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    /// Diagonal rising to the right.
    Increasing,
    /// Diagonal falling to the right.
    Decreasing,
}

impl FromStr for Orientation {
    type Err = PostError;

    fn from_str(s: &str) -> PostResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            "increasing" => Ok(Orientation::Increasing),
            "decreasing" => Ok(Orientation::Decreasing),
            other => Err(PostError::InvalidInput(format!(
                "orientation must be horizontal, vertical, increasing or decreasing, got '{other}'"
            ))),
        }
    }
}

/// Cell values read directly along a row, column or diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSlice {
    pub cells: Vec<usize>,
    /// Distance axis centred on zero.
    pub distance: Vec<f64>,
    pub values: Vec<f64>,
}

/// Cells in line with the cell containing `point`.
pub fn slice_cell_center(
    values: &[f64],
    mesh: &CartesianMesh,
    point: (f64, f64),
    orientation: Orientation,
) -> PostResult<CellSlice> {
    check_len(values, mesh)?;
    let zero_cell = mesh.locate_element(point.0, point.1).ok_or_else(|| {
        PostError::InvalidInput(format!(
            "point ({}, {}) does not lie in the mesh",
            point.0, point.1
        ))
    })?;
    let (col, row) = mesh.col_row(zero_cell);
    let (nx, ny) = (mesh.nx() as isize, mesh.ny() as isize);

    // Step per cell along the slice, as (column, row) increments.
    let (dc, dr): (isize, isize) = match orientation {
        Orientation::Horizontal => (1, 0),
        Orientation::Vertical => (0, 1),
        Orientation::Increasing => (1, 1),
        Orientation::Decreasing => (-1, 1),
    };
    let inside = |c: isize, r: isize| (0..nx).contains(&c) && (0..ny).contains(&r);

    let (mut c, mut r) = (col as isize, row as isize);
    while inside(c - dc, r - dr) {
        c -= dc;
        r -= dr;
    }
    let mut cells = Vec::new();
    while inside(c, r) {
        cells.push(mesh.cell_index(c as usize, r as usize));
        c += dc;
        r += dr;
    }

    let centers = mesh.centers();
    let first = centers[cells[0]];
    let last = centers[cells[cells.len() - 1]];
    let length = (first.0 - last.0).hypot(first.1 - last.1);
    let distance = linspace(0.0, length, cells.len())
        .into_iter()
        .map(|d| d - length / 2.0)
        .collect();

    Ok(CellSlice {
        values: cells.iter().map(|&i| values[i]).collect(),
        cells,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> CartesianMesh {
        CartesianMesh::new(2.0, 2.0, 5, 5).unwrap()
    }

    /// f(x, y) = 2x + 3y + 1 at cell centres.
    fn linear_field(mesh: &CartesianMesh) -> Vec<f64> {
        mesh.centers()
            .into_iter()
            .map(|(x, y)| 2.0 * x + 3.0 * y + 1.0)
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn point_value_of_linear_field_is_exact() {
        let m = mesh();
        let f = linear_field(&m);
        assert!(close(value_at_point(&f, &m, 0.3, -1.2).unwrap(), 2.0 * 0.3 - 3.6 + 1.0));
        assert!(close(value_at_point(&f, &m, 2.0, 2.0).unwrap(), 11.0));
        assert!(close(value_at_point(&f, &m, -2.0, -2.0).unwrap(), -9.0));
    }

    #[test]
    fn point_outside_gives_nan() {
        let m = mesh();
        let f = linear_field(&m);
        assert!(value_at_point(&f, &m, 2.1, 0.0).unwrap().is_nan());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let m = mesh();
        assert!(matches!(
            value_at_point(&[1.0; 3], &m, 0.0, 0.0),
            Err(PostError::InvalidInput(_))
        ));
    }

    #[test]
    fn horizontal_interpolated_slice_spans_mesh() {
        let m = mesh();
        let f = linear_field(&m);
        let slice = slice_interpolated(&f, &m, (0.0, 0.0), (1.0, 0.0), 105).unwrap();
        assert_eq!(slice.points.len(), 105);
        assert_eq!(slice.points[0], (-2.0, 0.0));
        assert_eq!(slice.points[104], (2.0, 0.0));
        assert!(close(slice.distance[52], 0.0));
        assert!(close(slice.distance[0], -2.0));
        assert!(close(slice.distance[104], 2.0));
        for (p, v) in slice.points.iter().zip(&slice.values) {
            assert!(close(*v, 2.0 * p.0 + 3.0 * p.1 + 1.0));
        }
    }

    #[test]
    fn diagonal_slice_is_clipped_and_ordered_left_to_right() {
        let m = mesh();
        let f = linear_field(&m);
        let slice = slice_interpolated(&f, &m, (1.0, 1.0), (0.0, 0.0), 11).unwrap();
        assert!(close(slice.points[0].0, -2.0));
        assert!(close(slice.points[0].1, -2.0));
        assert!(close(slice.points[10].0, 2.0));
        assert!(close(slice.values[10], 11.0));
    }

    #[test]
    fn vertical_slice_runs_bottom_to_top() {
        let m = mesh();
        let f = linear_field(&m);
        let slice = slice_interpolated(&f, &m, (0.5, 1.0), (0.5, -1.0), 5).unwrap();
        assert_eq!(slice.points[0], (0.5, -2.0));
        assert_eq!(slice.points[4], (0.5, 2.0));
    }

    #[test]
    fn degenerate_slices_are_rejected() {
        let m = mesh();
        let f = linear_field(&m);
        assert!(slice_interpolated(&f, &m, (0.0, 0.0), (0.0, 0.0), 10).is_err());
        assert!(slice_interpolated(&f, &m, (0.0, 5.0), (1.0, 5.0), 10).is_err());
        assert!(slice_interpolated(&f, &m, (0.0, 0.0), (1.0, 0.0), 1).is_err());
        assert!(matches!(
            slice_interpolated(&f, &m, (f64::NAN, 0.0), (1.0, 0.0), 10),
            Err(PostError::InvalidInput(_))
        ));
    }

    #[test]
    fn horizontal_cell_slice_through_origin_is_middle_row() {
        let m = mesh();
        let f: Vec<f64> = (0..25).map(|i| i as f64).collect();
        let slice = slice_cell_center(&f, &m, (0.0, 0.0), Orientation::Horizontal).unwrap();
        assert_eq!(slice.cells, vec![10, 11, 12, 13, 14]);
        assert_eq!(slice.values, vec![10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(slice.distance, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn vertical_and_diagonal_cell_slices() {
        let m = mesh();
        let f: Vec<f64> = (0..25).map(|i| i as f64).collect();

        let v = slice_cell_center(&f, &m, (1.0, 0.0), Orientation::Vertical).unwrap();
        assert_eq!(v.cells, vec![3, 8, 13, 18, 23]);

        let inc = slice_cell_center(&f, &m, (1.0, 0.0), Orientation::Increasing).unwrap();
        assert_eq!(inc.cells, vec![1, 7, 13, 19]);

        let dec = slice_cell_center(&f, &m, (0.0, 0.0), Orientation::Decreasing).unwrap();
        assert_eq!(dec.cells, vec![4, 8, 12, 16, 20]);
    }

    #[test]
    fn cell_slice_outside_mesh_is_rejected() {
        let m = mesh();
        let f = vec![0.0; 25];
        assert!(slice_cell_center(&f, &m, (9.0, 0.0), Orientation::Horizontal).is_err());
        assert!("sideways".parse::<Orientation>().is_err());
    }
}
