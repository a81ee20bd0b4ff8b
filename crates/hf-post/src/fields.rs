//! Field identifiers and extraction from snapshots.

use std::fmt;
use std::str::FromStr;

use hf_results::{Edge, EdgeField, Snapshot};
use serde::{Deserialize, Serialize};

use crate::error::{PostError, PostResult};

/// Quantities that can be read from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Time,
    Width,
    FluidPressure,
    NetPressure,
    FrontVelocity,
    ReynoldsNumber,
    FluidFlux,
    FluidVelocity,
    Mesh,
    Footprint,
    Efficiency,
    Volume,
    LeakedOff,
    LeakedOffVolume,
    FrontDistMin,
    FrontDistMax,
    FrontDistMean,
    /// Footprint reach along +x over reach along +y.
    AspectRatio,
}

/// What a field looks like once extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// One value per mesh cell.
    Cell,
    /// One value per snapshot.
    Scalar,
    /// Mesh or front geometry.
    Geometry,
}

impl FieldKind {
    pub const ALL: [FieldKind; 18] = [
        FieldKind::Time,
        FieldKind::Width,
        FieldKind::FluidPressure,
        FieldKind::NetPressure,
        FieldKind::FrontVelocity,
        FieldKind::ReynoldsNumber,
        FieldKind::FluidFlux,
        FieldKind::FluidVelocity,
        FieldKind::Mesh,
        FieldKind::Footprint,
        FieldKind::Efficiency,
        FieldKind::Volume,
        FieldKind::LeakedOff,
        FieldKind::LeakedOffVolume,
        FieldKind::FrontDistMin,
        FieldKind::FrontDistMax,
        FieldKind::FrontDistMean,
        FieldKind::AspectRatio,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Time => "time",
            FieldKind::Width => "width",
            FieldKind::FluidPressure => "fluid pressure",
            FieldKind::NetPressure => "net pressure",
            FieldKind::FrontVelocity => "front velocity",
            FieldKind::ReynoldsNumber => "Reynolds number",
            FieldKind::FluidFlux => "fluid flux",
            FieldKind::FluidVelocity => "fluid velocity",
            FieldKind::Mesh => "mesh",
            FieldKind::Footprint => "footprint",
            FieldKind::Efficiency => "efficiency",
            FieldKind::Volume => "volume",
            FieldKind::LeakedOff => "leaked off",
            FieldKind::LeakedOffVolume => "leaked off volume",
            FieldKind::FrontDistMin => "front_dist_min",
            FieldKind::FrontDistMax => "front_dist_max",
            FieldKind::FrontDistMean => "front_dist_mean",
            FieldKind::AspectRatio => "aspect ratio",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            FieldKind::Time => &["t"],
            FieldKind::Width => &["w"],
            FieldKind::FluidPressure => &["pf", "pressure", "p"],
            FieldKind::NetPressure => &["pn", "Net pressure"],
            FieldKind::FrontVelocity => &["v"],
            FieldKind::ReynoldsNumber => &["Re"],
            FieldKind::FluidFlux => &["ff"],
            FieldKind::FluidVelocity => &["fv"],
            FieldKind::Mesh | FieldKind::Footprint => &[],
            FieldKind::Efficiency => &["ef"],
            FieldKind::Volume => &["V"],
            FieldKind::LeakedOff => &["lk"],
            FieldKind::LeakedOffVolume => &["lkv"],
            FieldKind::FrontDistMin => &["d_min"],
            FieldKind::FrontDistMax => &["d_max"],
            FieldKind::FrontDistMean => &["d_mean"],
            FieldKind::AspectRatio => &["ar"],
        }
    }

    pub fn shape(self) -> FieldShape {
        match self {
            FieldKind::Width
            | FieldKind::FluidPressure
            | FieldKind::NetPressure
            | FieldKind::FrontVelocity
            | FieldKind::ReynoldsNumber
            | FieldKind::FluidFlux
            | FieldKind::FluidVelocity
            | FieldKind::LeakedOff => FieldShape::Cell,
            FieldKind::Time
            | FieldKind::Efficiency
            | FieldKind::Volume
            | FieldKind::LeakedOffVolume
            | FieldKind::FrontDistMin
            | FieldKind::FrontDistMax
            | FieldKind::FrontDistMean
            | FieldKind::AspectRatio => FieldShape::Scalar,
            FieldKind::Mesh | FieldKind::Footprint => FieldShape::Geometry,
        }
    }

    /// Whether the field is stored per cell edge.
    pub fn is_edge_field(self) -> bool {
        matches!(
            self,
            FieldKind::ReynoldsNumber | FieldKind::FluidFlux | FieldKind::FluidVelocity
        )
    }

    pub fn units(self) -> &'static str {
        match self {
            FieldKind::Time => "s",
            FieldKind::Width => "m",
            FieldKind::FluidPressure | FieldKind::NetPressure => "Pa",
            FieldKind::FrontVelocity | FieldKind::FluidVelocity => "m/s",
            FieldKind::FluidFlux => "m^2/s",
            FieldKind::Volume | FieldKind::LeakedOff | FieldKind::LeakedOffVolume => "m^3",
            FieldKind::FrontDistMin
            | FieldKind::FrontDistMax
            | FieldKind::FrontDistMean
            | FieldKind::Mesh
            | FieldKind::Footprint => "m",
            FieldKind::ReynoldsNumber | FieldKind::Efficiency | FieldKind::AspectRatio => "-",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKind {
    type Err = PostError;

    fn from_str(s: &str) -> PostResult<Self> {
        let s = s.trim();
        FieldKind::ALL
            .into_iter()
            .find(|k| k.name() == s || k.aliases().contains(&s))
            .ok_or_else(|| PostError::UnknownField(s.to_string()))
    }
}

/// Which edge value to use for per-edge fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSelect {
    Left,
    Right,
    Bottom,
    Top,
    #[default]
    Mean,
}

impl EdgeSelect {
    pub fn edge(self) -> Option<Edge> {
        match self {
            EdgeSelect::Left => Some(Edge::Left),
            EdgeSelect::Right => Some(Edge::Right),
            EdgeSelect::Bottom => Some(Edge::Bottom),
            EdgeSelect::Top => Some(Edge::Top),
            EdgeSelect::Mean => None,
        }
    }
}

impl FromStr for EdgeSelect {
    type Err = PostError;

    /// Accepts edge names or the numeric codes 0-4 (4 is the mean).
    fn from_str(s: &str) -> PostResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "0" => Ok(EdgeSelect::Left),
            "right" | "1" => Ok(EdgeSelect::Right),
            "bottom" | "2" => Ok(EdgeSelect::Bottom),
            "top" | "3" => Ok(EdgeSelect::Top),
            "mean" | "4" => Ok(EdgeSelect::Mean),
            other => Err(PostError::InvalidInput(format!(
                "edge must be left, right, bottom, top or mean (0-4), got '{other}'"
            ))),
        }
    }
}

fn edge_values(
    field: Option<&EdgeField>,
    kind: FieldKind,
    edge: EdgeSelect,
    time_s: f64,
) -> PostResult<Vec<f64>> {
    let field = field.ok_or_else(|| PostError::UnsupportedField {
        field: kind.name().to_string(),
        time_s,
    })?;
    Ok(match edge.edge() {
        Some(e) => field.edge(e).to_vec(),
        None => field.mean(),
    })
}

/// Per-cell values of a cell field.
pub fn cell_values(snapshot: &Snapshot, field: FieldKind, edge: EdgeSelect) -> PostResult<Vec<f64>> {
    let t = snapshot.time_s;
    match field {
        FieldKind::Width => Ok(snapshot.width.clone()),
        FieldKind::FluidPressure => Ok(snapshot.fluid_pressure.clone()),
        FieldKind::NetPressure => Ok(snapshot.net_pressure.clone()),
        FieldKind::LeakedOff => Ok(snapshot.leaked_off.clone()),
        FieldKind::FrontVelocity => {
            let mut v = vec![f64::NAN; snapshot.mesh.number_of_elements()];
            for (&cell, &vel) in snapshot.tip_elements.iter().zip(&snapshot.front_velocity) {
                if let Some(slot) = v.get_mut(cell) {
                    *slot = vel;
                }
            }
            Ok(v)
        }
        FieldKind::ReynoldsNumber => {
            edge_values(snapshot.reynolds_number.as_ref(), field, edge, t)
        }
        FieldKind::FluidFlux => edge_values(snapshot.fluid_flux.as_ref(), field, edge, t),
        FieldKind::FluidVelocity => edge_values(snapshot.fluid_velocity.as_ref(), field, edge, t),
        other => Err(PostError::InvalidInput(format!(
            "'{other}' is not a per-cell field"
        ))),
    }
}

fn front_distances(snapshot: &Snapshot) -> Vec<f64> {
    snapshot
        .front
        .iter()
        .flat_map(|s| [(s[0], s[1]), (s[2], s[3])])
        .map(|(x, y)| x.hypot(y))
        .collect()
}

/// Farthest front reach along +x divided by the farthest reach along +y.
/// NaN when the front does not reach into the positive y half.
fn aspect_ratio(snapshot: &Snapshot) -> f64 {
    let ends = snapshot
        .front
        .iter()
        .flat_map(|s| [(s[0], s[1]), (s[2], s[3])]);
    let (r_x, r_y) = ends.fold((f64::NAN, f64::NAN), |(rx, ry), (x, y)| (rx.max(x), ry.max(y)));
    if r_y > 0.0 { r_x / r_y } else { f64::NAN }
}

/// Single value of a scalar field.
pub fn scalar_value(snapshot: &Snapshot, field: FieldKind) -> PostResult<f64> {
    match field {
        FieldKind::Time => Ok(snapshot.time_s),
        FieldKind::Efficiency => Ok(snapshot.efficiency),
        FieldKind::Volume => Ok(snapshot.volume),
        FieldKind::LeakedOffVolume => Ok(snapshot
            .crack_elements
            .iter()
            .filter_map(|&c| snapshot.leaked_off.get(c))
            .sum()),
        FieldKind::FrontDistMin => Ok(front_distances(snapshot)
            .into_iter()
            .reduce(f64::min)
            .unwrap_or(f64::NAN)),
        FieldKind::FrontDistMax => Ok(front_distances(snapshot)
            .into_iter()
            .reduce(f64::max)
            .unwrap_or(f64::NAN)),
        FieldKind::FrontDistMean => Ok(hf_core::nan_mean(&front_distances(snapshot))),
        FieldKind::AspectRatio => Ok(aspect_ratio(snapshot)),
        other => Err(PostError::InvalidInput(format!("'{other}' is not a scalar field"))),
    }
}

/// `(time, value)` pairs of a scalar field across snapshots.
pub fn time_series(snapshots: &[Snapshot], field: FieldKind) -> PostResult<Vec<(f64, f64)>> {
    snapshots
        .iter()
        .map(|s| Ok((s.time_s, scalar_value(s, field)?)))
        .collect()
}
