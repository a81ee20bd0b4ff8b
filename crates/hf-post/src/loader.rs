//! Loading snapshots of a stored run.

use std::path::Path;

use hf_results::{RunManifest, RunStore, Snapshot};

use crate::error::{PostError, PostResult};
use crate::selector::select_indices;

/// Which stored snapshots to return.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Every stored snapshot.
    All,
    /// For each time, the first snapshot at or after it.
    Times(Vec<f64>),
    /// Successive snapshots at least this far apart in time.
    Period(f64),
}

/// Request to load snapshots from a run.
#[derive(Debug, Clone)]
pub struct LoadRequest<'a> {
    /// Run name, with or without its timestamp suffix.
    pub sim_name: &'a str,
    /// Data folder. The default folder is used when absent.
    pub address: Option<&'a Path>,
    pub selection: Selection,
    /// Only every `step_size`-th stored snapshot is considered.
    pub step_size: usize,
}

impl<'a> LoadRequest<'a> {
    pub fn new(sim_name: &'a str) -> Self {
        Self {
            sim_name,
            address: None,
            selection: Selection::All,
            step_size: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedRun {
    pub manifest: RunManifest,
    pub snapshots: Vec<Snapshot>,
}

fn period_indices(times: &[f64], period: f64) -> Vec<usize> {
    let mut picked = Vec::new();
    let mut next_t = f64::NEG_INFINITY;
    for (i, &t) in times.iter().enumerate() {
        if t >= next_t {
            picked.push(i);
            next_t = t + period;
        }
    }
    picked
}

/// Resolve the run named in `request` and load the selected snapshots.
pub fn load_snapshots(request: &LoadRequest<'_>) -> PostResult<LoadedRun> {
    if request.step_size == 0 {
        return Err(PostError::InvalidInput(
            "step_size must be at least 1".to_string(),
        ));
    }
    let store = match request.address {
        Some(dir) => RunStore::open(dir.to_path_buf()),
        None => RunStore::default_location(),
    };

    let full_name = store.resolve_run(request.sim_name)?;
    tracing::info!(
        run = %full_name,
        root = %store.root_dir().display(),
        "loading snapshots"
    );
    let manifest = store.load_manifest(&full_name)?;

    let stored_times = store.load_snapshot_times(&full_name)?;
    let strided: Vec<usize> = (0..stored_times.len())
        .step_by(request.step_size)
        .collect();
    let strided_times: Vec<f64> = strided.iter().map(|&i| stored_times[i]).collect();

    let picked = match &request.selection {
        Selection::Times(times) => select_indices(&strided_times, times)?,
        Selection::Period(period) => {
            let period = hf_core::ensure_finite(*period, "time period")?;
            if period < 0.0 {
                return Err(PostError::InvalidInput(format!(
                    "time period must be non-negative, got {period}"
                )));
            }
            period_indices(&strided_times, period)
        }
        Selection::All => (0..strided_times.len()).collect(),
    };

    if picked.is_empty() && !matches!(request.selection, Selection::Times(_)) {
        return Err(PostError::EmptyRepository);
    }

    let indices: Vec<usize> = picked.iter().map(|&i| strided[i]).collect();
    let snapshots = store.load_snapshots_at(&full_name, &indices)?;
    for s in &snapshots {
        tracing::debug!(time_s = s.time_s, "returning snapshot");
    }
    tracing::info!(count = snapshots.len(), run = %full_name, "loaded snapshots");

    Ok(LoadedRun {
        manifest,
        snapshots,
    })
}
