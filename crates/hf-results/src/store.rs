//! Run storage API.

use crate::naming::parse_run_name;
use crate::types::{RunManifest, Snapshot};
use crate::{ResultsError, ResultsResult};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder used when no data location is given.
pub const DEFAULT_DATA_DIR: &str = "_simulation_data";

const MANIFEST_FILE: &str = "manifest.json";
const SNAPSHOTS_FILE: &str = "snapshots.jsonl";

#[derive(Deserialize)]
struct SnapshotTime {
    time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    /// Open a store for writing, creating the root folder if needed.
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Open a store for reading. The root folder is not created.
    pub fn open(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    pub fn default_location() -> Self {
        Self::open(PathBuf::from(".").join(DEFAULT_DATA_DIR))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, full_name: &str) -> PathBuf {
        self.root_dir.join(full_name)
    }

    pub fn has_run(&self, full_name: &str) -> bool {
        self.run_dir(full_name).join(MANIFEST_FILE).exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, snapshots: &[Snapshot]) -> ResultsResult<()> {
        if parse_run_name(&manifest.full_name).is_none() {
            return Err(ResultsError::InvalidRunName(manifest.full_name.clone()));
        }
        for (index, snapshot) in snapshots.iter().enumerate() {
            snapshot
                .check_shape()
                .map_err(|message| ResultsError::InvalidSnapshot { index, message })?;
            if index > 0 && snapshot.time_s < snapshots[index - 1].time_s {
                return Err(ResultsError::UnorderedSnapshots {
                    index,
                    time_s: snapshot.time_s,
                });
            }
        }

        let run_dir = self.run_dir(&manifest.full_name);
        fs::create_dir_all(&run_dir)?;

        let mut manifest = manifest.clone();
        manifest.snapshot_count = snapshots.len();
        let manifest_json = serde_json::to_string_pretty(&manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        let mut content = String::new();
        for snapshot in snapshots {
            content.push_str(&serde_json::to_string(snapshot)?);
            content.push('\n');
        }
        fs::write(run_dir.join(SNAPSHOTS_FILE), content)?;

        Ok(())
    }

    /// Resolve a run name to a stored run directory name.
    ///
    /// A name that already carries a timestamp suffix is used as is.
    /// Otherwise the most recent run stored under that name is picked.
    pub fn resolve_run(&self, name: &str) -> ResultsResult<String> {
        if parse_run_name(name).is_some() {
            if self.has_run(name) {
                return Ok(name.to_string());
            }
            return Err(ResultsError::RunNotFound {
                run_id: name.to_string(),
            });
        }

        let mut best: Option<(NaiveDateTime, String)> = None;
        for full_name in self.run_dir_names()? {
            if let Some((base, created)) = parse_run_name(&full_name)
                && base == name
                && self.has_run(&full_name)
                && best.as_ref().is_none_or(|(t, _)| created > *t)
            {
                best = Some((created, full_name));
            }
        }

        match best {
            Some((_, full_name)) => {
                tracing::debug!(name, full_name = %full_name, "resolved run");
                Ok(full_name)
            }
            None => Err(ResultsError::RunNotFound {
                run_id: name.to_string(),
            }),
        }
    }

    fn run_dir_names(&self) -> ResultsResult<Vec<String>> {
        let mut names = Vec::new();
        if !self.root_dir.exists() {
            return Ok(names);
        }
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        Ok(names)
    }

    fn snapshots_path(&self, full_name: &str) -> ResultsResult<PathBuf> {
        let path = self.run_dir(full_name).join(SNAPSHOTS_FILE);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: full_name.to_string(),
            });
        }
        Ok(path)
    }

    pub fn load_manifest(&self, full_name: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(full_name).join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: full_name.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_snapshots(&self, full_name: &str) -> ResultsResult<Vec<Snapshot>> {
        let content = fs::read_to_string(self.snapshots_path(full_name)?)?;
        let mut snapshots: Vec<Snapshot> = Vec::new();
        for (index, line) in stored_lines(&content).enumerate() {
            let snapshot = decode_snapshot(index, line)?;
            if let Some(prev) = snapshots.last() {
                check_order(index, prev.time_s, snapshot.time_s)?;
            }
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }

    /// Times of all stored snapshots, without decoding the field data.
    /// Fails if the stored times are not finite and non-decreasing.
    pub fn load_snapshot_times(&self, full_name: &str) -> ResultsResult<Vec<f64>> {
        let content = fs::read_to_string(self.snapshots_path(full_name)?)?;
        let mut times: Vec<f64> = Vec::new();
        for (index, line) in stored_lines(&content).enumerate() {
            let SnapshotTime { time_s } = serde_json::from_str(line)?;
            if !time_s.is_finite() {
                return Err(ResultsError::InvalidSnapshot {
                    index,
                    message: format!("time is not finite: {time_s}"),
                });
            }
            if let Some(&prev) = times.last() {
                check_order(index, prev, time_s)?;
            }
            times.push(time_s);
        }
        Ok(times)
    }

    /// Decode only the snapshots at `indices`, returned in the order given.
    /// Repeated indices yield repeated snapshots.
    pub fn load_snapshots_at(
        &self,
        full_name: &str,
        indices: &[usize],
    ) -> ResultsResult<Vec<Snapshot>> {
        let content = fs::read_to_string(self.snapshots_path(full_name)?)?;
        let wanted: HashSet<usize> = indices.iter().copied().collect();
        let mut decoded: HashMap<usize, Snapshot> = HashMap::new();
        let mut stored = 0;
        for (index, line) in stored_lines(&content).enumerate() {
            stored = index + 1;
            if wanted.contains(&index) {
                decoded.insert(index, decode_snapshot(index, line)?);
            }
        }

        indices
            .iter()
            .map(|i| {
                decoded
                    .get(i)
                    .cloned()
                    .ok_or_else(|| ResultsError::InvalidSnapshot {
                        index: *i,
                        message: format!("run {full_name} stores only {stored} snapshots"),
                    })
            })
            .collect()
    }

    /// Stored runs, most recent first. `name` restricts the listing to runs
    /// stored under that base name.
    pub fn list_runs(&self, name: Option<&str>) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        for full_name in self.run_dir_names()? {
            let Some((base, _)) = parse_run_name(&full_name) else {
                continue;
            };
            if name.is_some_and(|n| n != base) {
                continue;
            }
            if let Ok(manifest) = self.load_manifest(&full_name) {
                runs.push(manifest);
            }
        }
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(runs)
    }

    pub fn delete_run(&self, full_name: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(full_name);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

fn stored_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|l| !l.trim().is_empty())
}

fn decode_snapshot(index: usize, line: &str) -> ResultsResult<Snapshot> {
    let snapshot: Snapshot = serde_json::from_str(line)?;
    snapshot
        .check_shape()
        .map_err(|message| ResultsError::InvalidSnapshot { index, message })?;
    Ok(snapshot)
}

fn check_order(index: usize, prev: f64, time_s: f64) -> ResultsResult<()> {
    if time_s < prev {
        return Err(ResultsError::UnorderedSnapshots { index, time_s });
    }
    Ok(())
}
