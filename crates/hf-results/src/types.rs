//! Stored run and snapshot data types.

use chrono::{DateTime, Utc};
use hf_core::{CartesianMesh, Real};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_name: String,
    pub full_name: RunId,
    pub created_at: DateTime<Utc>,
    pub properties: RunProperties,
    #[serde(default)]
    pub snapshot_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProperties {
    pub solver_version: String,
    pub mesh: CartesianMesh,
    #[serde(default)]
    pub recorded: RecordedFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Optional per-edge fields. The simulator skips these unless asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedFields {
    #[serde(default)]
    pub reynolds_number: bool,
    #[serde(default)]
    pub fluid_flux: bool,
    #[serde(default)]
    pub fluid_velocity: bool,
}

/// Cell edge, in the order the edge arrays are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top];

    pub fn index(self) -> usize {
        match self {
            Edge::Left => 0,
            Edge::Right => 1,
            Edge::Bottom => 2,
            Edge::Top => 3,
        }
    }
}

/// A per-cell quantity evaluated on each of the four cell edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeField(pub [Vec<Real>; 4]);

impl EdgeField {
    pub fn edge(&self, edge: Edge) -> &[Real] {
        &self.0[edge.index()]
    }

    /// Per-cell mean over the four edges.
    /// Stops at the shortest edge array if their lengths differ.
    pub fn mean(&self) -> Vec<Real> {
        let [left, right, bottom, top] = &self.0;
        left.iter()
            .zip(right)
            .zip(bottom)
            .zip(top)
            .map(|(((l, r), b), t)| (l + r + b + t) / 4.0)
            .collect()
    }

    fn is_sized(&self, n: usize) -> bool {
        self.0.iter().all(|e| e.len() == n)
    }
}

/// Fracture state at one simulated time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time_s: Real,
    pub mesh: CartesianMesh,
    pub width: Vec<Real>,
    pub fluid_pressure: Vec<Real>,
    pub net_pressure: Vec<Real>,
    #[serde(default)]
    pub tip_elements: Vec<usize>,
    /// One value per entry of `tip_elements`.
    #[serde(default)]
    pub front_velocity: Vec<Real>,
    #[serde(default)]
    pub crack_elements: Vec<usize>,
    pub leaked_off: Vec<Real>,
    /// Front segments as `[x1, y1, x2, y2]`.
    #[serde(default)]
    pub front: Vec<[Real; 4]>,
    pub efficiency: Real,
    pub volume: Real,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reynolds_number: Option<EdgeField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_flux: Option<EdgeField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_velocity: Option<EdgeField>,
}

impl Snapshot {
    /// A snapshot with every cell field zeroed and no fracture cells.
    pub fn empty(time_s: Real, mesh: CartesianMesh) -> Self {
        let n = mesh.number_of_elements();
        Self {
            time_s,
            mesh,
            width: vec![0.0; n],
            fluid_pressure: vec![0.0; n],
            net_pressure: vec![0.0; n],
            tip_elements: Vec::new(),
            front_velocity: Vec::new(),
            crack_elements: Vec::new(),
            leaked_off: vec![0.0; n],
            front: Vec::new(),
            efficiency: 0.0,
            volume: 0.0,
            reynolds_number: None,
            fluid_flux: None,
            fluid_velocity: None,
        }
    }

    /// Check that array lengths agree with the mesh.
    pub fn check_shape(&self) -> Result<(), String> {
        if !self.time_s.is_finite() {
            return Err(format!("time is not finite: {}", self.time_s));
        }
        let n = self.mesh.number_of_elements();
        for (name, values) in [
            ("width", &self.width),
            ("fluid_pressure", &self.fluid_pressure),
            ("net_pressure", &self.net_pressure),
            ("leaked_off", &self.leaked_off),
        ] {
            if values.len() != n {
                return Err(format!(
                    "{name} has {} values, mesh has {n} cells",
                    values.len()
                ));
            }
        }
        if self.front_velocity.len() != self.tip_elements.len() {
            return Err(format!(
                "front_velocity has {} values for {} tip cells",
                self.front_velocity.len(),
                self.tip_elements.len()
            ));
        }
        if let Some(&cell) = self
            .tip_elements
            .iter()
            .chain(self.crack_elements.iter())
            .find(|&&c| c >= n)
        {
            return Err(format!("cell index {cell} outside mesh of {n} cells"));
        }
        for (name, field) in [
            ("reynolds_number", &self.reynolds_number),
            ("fluid_flux", &self.fluid_flux),
            ("fluid_velocity", &self.fluid_velocity),
        ] {
            if let Some(f) = field
                && !f.is_sized(n)
            {
                return Err(format!("{name} edge arrays do not match mesh size {n}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> CartesianMesh {
        CartesianMesh::new(1.0, 1.0, 3, 3).unwrap()
    }

    #[test]
    fn empty_snapshot_has_valid_shape() {
        let s = Snapshot::empty(1.0, mesh());
        assert!(s.check_shape().is_ok());
        assert_eq!(s.width.len(), 9);
    }

    #[test]
    fn shape_check_catches_mismatches() {
        let mut s = Snapshot::empty(1.0, mesh());
        s.width.pop();
        assert!(s.check_shape().unwrap_err().contains("width"));

        let mut s = Snapshot::empty(1.0, mesh());
        s.tip_elements = vec![4];
        assert!(s.check_shape().is_err());

        let mut s = Snapshot::empty(1.0, mesh());
        s.crack_elements = vec![9];
        assert!(s.check_shape().is_err());
    }

    #[test]
    fn edge_field_mean() {
        let f = EdgeField([vec![1.0, 0.0], vec![3.0, 0.0], vec![2.0, 4.0], vec![2.0, 0.0]]);
        assert_eq!(f.mean(), vec![2.0, 1.0]);
        assert_eq!(f.edge(Edge::Bottom), &[2.0, 4.0]);

        let ragged = EdgeField([vec![4.0; 9], vec![0.0; 3], vec![0.0; 3], vec![0.0; 3]]);
        assert_eq!(ragged.mean(), vec![1.0; 3]);
    }

    #[test]
    fn shape_check_catches_ragged_edge_arrays() {
        let mut s = Snapshot::empty(1.0, mesh());
        s.reynolds_number = Some(EdgeField([
            vec![0.0; 9],
            vec![0.0; 3],
            vec![0.0; 3],
            vec![0.0; 3],
        ]));
        assert!(s.check_shape().unwrap_err().contains("reynolds_number"));
    }

    #[test]
    fn snapshot_json_omits_unrecorded_fields() {
        let s = Snapshot::empty(0.5, mesh());
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("reynolds_number"));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
