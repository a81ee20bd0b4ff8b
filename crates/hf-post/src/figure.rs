//! Renderer-agnostic figure descriptions.
//!
//! A [`Figure`] carries everything a plotting backend needs to draw a field:
//! coordinates, values, units and a title. Drawing is left to the caller.

use std::fmt::Write as _;
use std::str::FromStr;

use hf_results::Snapshot;

use crate::error::{PostError, PostResult};
use crate::fields::{EdgeSelect, FieldKind, FieldShape, cell_values, time_series};
use crate::sampling::{field_at_point, slice_interpolated};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    TwoD,
    ThreeD,
}

impl FromStr for Projection {
    type Err = PostError;

    fn from_str(s: &str) -> PostResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2d" => Ok(Projection::TwoD),
            "3d" => Ok(Projection::ThreeD),
            other => Err(PostError::InvalidInput(format!(
                "projection must be 2D or 3D, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub projection: Projection,
    pub units: &'static str,
    pub data: FigureData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FigureData {
    /// Cell values as an image, `ny` rows of `nx` values, bottom row first.
    Grid {
        nx: usize,
        ny: usize,
        x_extent: (f64, f64),
        y_extent: (f64, f64),
        values: Vec<f64>,
    },
    /// Cell values as heights over the cell centres.
    Surface {
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    },
    /// Cell outlines.
    Mesh { cells: Vec<[(f64, f64); 4]> },
    /// Line segments `[x1, y1, x2, y2]`, drawn at height `z` in 3D.
    Lines {
        segments: Vec<[f64; 4]>,
        z: Option<f64>,
    },
    /// Values along a cutting line.
    Slice {
        from: (f64, f64),
        to: (f64, f64),
        distance: Vec<f64>,
        values: Vec<f64>,
    },
    /// Values against time.
    Series { time: Vec<f64>, values: Vec<f64> },
}

impl Figure {
    /// Plain comma-separated table of the figure data, with a header row.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        match &self.data {
            FigureData::Grid {
                nx,
                x_extent,
                y_extent,
                values,
                ny,
            } => {
                let hx = step(x_extent, *nx);
                let hy = step(y_extent, *ny);
                csv.push_str("col,row,x,y,value\n");
                for (i, v) in values.iter().enumerate() {
                    let (col, row) = (i % nx, i / nx);
                    let x = x_extent.0 + col as f64 * hx;
                    let y = y_extent.0 + row as f64 * hy;
                    let _ = writeln!(csv, "{col},{row},{x},{y},{v}");
                }
            }
            FigureData::Surface { x, y, z } => {
                csv.push_str("x,y,z\n");
                for ((x, y), z) in x.iter().zip(y).zip(z) {
                    let _ = writeln!(csv, "{x},{y},{z}");
                }
            }
            FigureData::Mesh { cells } => {
                csv.push_str("cell,x0,y0,x1,y1,x2,y2,x3,y3\n");
                for (i, c) in cells.iter().enumerate() {
                    let _ = writeln!(
                        csv,
                        "{i},{},{},{},{},{},{},{},{}",
                        c[0].0, c[0].1, c[1].0, c[1].1, c[2].0, c[2].1, c[3].0, c[3].1
                    );
                }
            }
            FigureData::Lines { segments, z: None } => {
                csv.push_str("x1,y1,x2,y2\n");
                for s in segments {
                    let _ = writeln!(csv, "{},{},{},{}", s[0], s[1], s[2], s[3]);
                }
            }
            FigureData::Lines {
                segments,
                z: Some(z),
            } => {
                csv.push_str("x1,y1,z1,x2,y2,z2\n");
                for s in segments {
                    let _ = writeln!(csv, "{},{},{z},{},{},{z}", s[0], s[1], s[2], s[3]);
                }
            }
            FigureData::Slice {
                distance, values, ..
            } => {
                csv.push_str("distance,value\n");
                for (d, v) in distance.iter().zip(values) {
                    let _ = writeln!(csv, "{d},{v}");
                }
            }
            FigureData::Series { time, values } => {
                csv.push_str("time_s,value\n");
                for (t, v) in time.iter().zip(values) {
                    let _ = writeln!(csv, "{t},{v}");
                }
            }
        }
        csv
    }
}

fn step(extent: &(f64, f64), n: usize) -> f64 {
    if n > 1 {
        (extent.1 - extent.0) / (n - 1) as f64
    } else {
        0.0
    }
}

fn title(field: FieldKind, snapshot: &Snapshot) -> String {
    format!("{} at t = {:.4} s", field, snapshot.time_s)
}

/// Plot a cell or geometry field of one snapshot.
pub fn plot_field(
    snapshot: &Snapshot,
    field: FieldKind,
    edge: EdgeSelect,
    projection: Projection,
) -> PostResult<Figure> {
    let mesh = &snapshot.mesh;
    let data = match (field.shape(), field) {
        (FieldShape::Cell, _) => {
            let values = cell_values(snapshot, field, edge)?;
            match projection {
                Projection::TwoD => FigureData::Grid {
                    nx: mesh.nx(),
                    ny: mesh.ny(),
                    x_extent: (-mesh.lx(), mesh.lx()),
                    y_extent: (-mesh.ly(), mesh.ly()),
                    values,
                },
                Projection::ThreeD => {
                    let (x, y) = mesh.centers().into_iter().unzip();
                    FigureData::Surface { x, y, z: values }
                }
            }
        }
        (FieldShape::Geometry, FieldKind::Mesh) => FigureData::Mesh {
            cells: (0..mesh.number_of_elements())
                .map(|i| mesh.vertices(i))
                .collect::<Result<_, _>>()?,
        },
        (FieldShape::Geometry, _) => FigureData::Lines {
            segments: snapshot.front.clone(),
            z: match projection {
                Projection::TwoD => None,
                Projection::ThreeD => Some(0.0),
            },
        },
        (FieldShape::Scalar, _) => {
            return Err(PostError::InvalidInput(format!(
                "'{field}' is a scalar; plot it as a time series"
            )));
        }
    };

    Ok(Figure {
        title: title(field, snapshot),
        projection,
        units: field.units(),
        data,
    })
}

/// Plot a cell field along the line through `from` and `to`.
pub fn plot_slice(
    snapshot: &Snapshot,
    field: FieldKind,
    edge: EdgeSelect,
    from: (f64, f64),
    to: (f64, f64),
    samples: usize,
) -> PostResult<Figure> {
    if field.shape() != FieldShape::Cell {
        return Err(PostError::InvalidInput(format!(
            "'{field}' is not a per-cell field and cannot be sliced"
        )));
    }
    let values = cell_values(snapshot, field, edge)?;
    let profile = slice_interpolated(&values, &snapshot.mesh, from, to, samples)?;
    let (first, last) = match (profile.points.first(), profile.points.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => (from, to),
    };

    Ok(Figure {
        title: format!("{} (slice)", title(field, snapshot)),
        projection: Projection::TwoD,
        units: field.units(),
        data: FigureData::Slice {
            from: first,
            to: last,
            distance: profile.distance,
            values: profile.values,
        },
    })
}

/// Plot a scalar field against time.
pub fn plot_series(snapshots: &[Snapshot], field: FieldKind) -> PostResult<Figure> {
    if field.shape() != FieldShape::Scalar {
        return Err(PostError::InvalidInput(format!(
            "'{field}' is not a scalar; give a point to plot it over time"
        )));
    }
    let (time, values) = time_series(snapshots, field)?.into_iter().unzip();
    Ok(Figure {
        title: format!("{field} vs time"),
        projection: Projection::TwoD,
        units: field.units(),
        data: FigureData::Series { time, values },
    })
}

/// Plot a field at a fixed point against time.
pub fn plot_at_point(
    snapshots: &[Snapshot],
    field: FieldKind,
    edge: EdgeSelect,
    point: (f64, f64),
) -> PostResult<Figure> {
    let (time, values) = field_at_point(snapshots, field, edge, point)?
        .into_iter()
        .unzip();
    Ok(Figure {
        title: format!("{field} at ({}, {}) vs time", point.0, point.1),
        projection: Projection::TwoD,
        units: field.units(),
        data: FigureData::Series { time, values },
    })
}
