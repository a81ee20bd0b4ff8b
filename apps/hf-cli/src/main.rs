use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use hf_post::{
    EdgeSelect, Figure, FieldKind, LoadRequest, Orientation, PostConfig, PostResult, Projection,
    Selection, load_snapshots, plot_at_point, plot_field, plot_series, plot_slice,
};
use hf_results::Snapshot;

#[derive(Parser)]
#[command(name = "hf-cli")]
#[command(about = "Post-processing for stored hydraulic-fracture simulation runs", long_about = None)]
struct Cli {
    /// Folder holding stored runs (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored runs, most recent first
    Runs {
        /// Only list runs stored under this name
        #[arg(long)]
        name: Option<String>,
    },
    /// Show details of a stored run
    Show {
        /// Run name, with or without timestamp suffix
        #[arg(short, long)]
        run: Option<String>,
    },
    /// Print the times of the snapshots a selection would load
    Load {
        #[arg(short, long)]
        run: Option<String>,
        /// Comma-separated times; each resolves to the first snapshot at or after it
        #[arg(long, value_delimiter = ',', conflicts_with = "period")]
        times: Option<Vec<f64>>,
        /// Minimum time between successive snapshots
        #[arg(long)]
        period: Option<f64>,
        /// Consider only every n-th stored snapshot
        #[arg(long, default_value_t = 1)]
        step: usize,
    },
    /// Export a field of one snapshot over the mesh
    Field {
        /// Field name (e.g. width, pressure, "front velocity", mesh, footprint)
        field: String,
        #[arg(short, long)]
        run: Option<String>,
        /// Snapshot time; the first snapshot at or after it is used
        #[arg(long)]
        time: f64,
        /// Edge for per-edge fields: left, right, bottom, top or mean
        #[arg(long)]
        edge: Option<String>,
        /// 2d or 3d
        #[arg(long, default_value = "2d")]
        projection: String,
        /// Output CSV file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a field sampled along the line through two points
    Slice {
        field: String,
        #[arg(short, long)]
        run: Option<String>,
        #[arg(long)]
        time: f64,
        /// First point as x,y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: (f64, f64),
        /// Second point as x,y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: (f64, f64),
        /// Number of sample points (defaults to the config value)
        #[arg(long)]
        samples: Option<usize>,
        #[arg(long)]
        edge: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export cell values along a row, column or diagonal of the mesh
    Cells {
        field: String,
        #[arg(short, long)]
        run: Option<String>,
        #[arg(long)]
        time: f64,
        /// Point the slice passes through, as x,y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true, default_value = "0,0")]
        at: (f64, f64),
        /// horizontal, vertical, increasing or decreasing
        #[arg(long, default_value = "horizontal")]
        orientation: String,
        #[arg(long)]
        edge: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a field against time, optionally at a point
    Series {
        field: String,
        #[arg(short, long)]
        run: Option<String>,
        /// Evaluate a per-cell field at this point, as x,y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Option<(f64, f64)>,
        /// Minimum time between successive snapshots
        #[arg(long)]
        period: Option<f64>,
        #[arg(long)]
        edge: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok((x, y))
}

struct Context {
    config: PostConfig,
}

impl Context {
    fn run_name<'a>(&'a self, run: &'a Option<String>) -> &'a str {
        run.as_deref().unwrap_or(&self.config.default_run_name)
    }

    fn edge(&self, edge: &Option<String>) -> PostResult<EdgeSelect> {
        match edge {
            Some(e) => e.parse(),
            None => Ok(self.config.default_edge),
        }
    }

    fn request<'a>(&'a self, run: &'a Option<String>, selection: Selection) -> LoadRequest<'a> {
        LoadRequest {
            address: Some(self.config.data_dir.as_path()),
            selection,
            ..LoadRequest::new(self.run_name(run))
        }
    }

    fn snapshot_at(&self, run: &Option<String>, time: f64) -> PostResult<Snapshot> {
        let loaded = load_snapshots(&self.request(run, Selection::Times(vec![time])))?;
        loaded.snapshots.into_iter().next().ok_or_else(|| {
            hf_post::PostError::InvalidInput(format!("no snapshot selected for t={time}"))
        })
    }
}

fn main() -> PostResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PostConfig::load(path)?,
        None => PostConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let ctx = Context { config };

    match cli.command {
        Commands::Runs { name } => cmd_runs(&ctx, name.as_deref()),
        Commands::Show { run } => cmd_show(&ctx, &run),
        Commands::Load {
            run,
            times,
            period,
            step,
        } => cmd_load(&ctx, &run, times, period, step),
        Commands::Field {
            field,
            run,
            time,
            edge,
            projection,
            output,
        } => {
            let snapshot = ctx.snapshot_at(&run, time)?;
            let figure = plot_field(
                &snapshot,
                field.parse()?,
                ctx.edge(&edge)?,
                projection.parse::<Projection>()?,
            )?;
            write_figure(&figure, output.as_deref())
        }
        Commands::Slice {
            field,
            run,
            time,
            from,
            to,
            samples,
            edge,
            output,
        } => {
            let snapshot = ctx.snapshot_at(&run, time)?;
            let samples = samples.unwrap_or(ctx.config.slice_samples);
            let figure = plot_slice(
                &snapshot,
                field.parse()?,
                ctx.edge(&edge)?,
                from,
                to,
                samples,
            )?;
            write_figure(&figure, output.as_deref())
        }
        Commands::Cells {
            field,
            run,
            time,
            at,
            orientation,
            edge,
            output,
        } => cmd_cells(
            &ctx,
            &run,
            time,
            &field,
            at,
            orientation.parse()?,
            ctx.edge(&edge)?,
            output.as_deref(),
        ),
        Commands::Series {
            field,
            run,
            point,
            period,
            edge,
            output,
        } => {
            let selection = match period {
                Some(p) => Selection::Period(p),
                None => Selection::All,
            };
            let loaded = load_snapshots(&ctx.request(&run, selection))?;
            let field: FieldKind = field.parse()?;
            let figure = match point {
                Some(p) => plot_at_point(&loaded.snapshots, field, ctx.edge(&edge)?, p)?,
                None => plot_series(&loaded.snapshots, field)?,
            };
            write_figure(&figure, output.as_deref())
        }
    }
}

fn cmd_runs(ctx: &Context, name: Option<&str>) -> PostResult<()> {
    let runs = ctx.config.store().list_runs(name)?;

    if runs.is_empty() {
        println!(
            "No stored runs found in {}",
            ctx.config.data_dir.display()
        );
    } else {
        println!("Stored runs in {}:", ctx.config.data_dir.display());
        for manifest in runs {
            println!(
                "  {} ({} snapshots, created {})",
                manifest.full_name, manifest.snapshot_count, manifest.created_at
            );
        }
    }
    Ok(())
}

fn cmd_show(ctx: &Context, run: &Option<String>) -> PostResult<()> {
    let store = ctx.config.store();
    let full_name = store.resolve_run(ctx.run_name(run))?;
    let manifest = store.load_manifest(&full_name)?;
    let times = store.load_snapshot_times(&full_name)?;
    let mesh = &manifest.properties.mesh;

    println!("Run: {}", manifest.full_name);
    println!("  Created: {}", manifest.created_at);
    println!("  Solver version: {}", manifest.properties.solver_version);
    println!(
        "  Mesh: {} x {} cells over [-{}, {}] x [-{}, {}]",
        mesh.nx(),
        mesh.ny(),
        mesh.lx(),
        mesh.lx(),
        mesh.ly(),
        mesh.ly()
    );
    println!("  Snapshots: {}", times.len());
    if let (Some(first), Some(last)) = (times.first(), times.last()) {
        println!("  Time range: {:.4} - {:.4} s", first, last);
    }

    let recorded = manifest.properties.recorded;
    println!("  Optional fields recorded:");
    println!("    Reynolds number: {}", yes_no(recorded.reynolds_number));
    println!("    fluid flux:      {}", yes_no(recorded.fluid_flux));
    println!("    fluid velocity:  {}", yes_no(recorded.fluid_velocity));
    if let Some(notes) = &manifest.properties.notes {
        println!("  Notes: {}", notes);
    }
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn cmd_load(
    ctx: &Context,
    run: &Option<String>,
    times: Option<Vec<f64>>,
    period: Option<f64>,
    step: usize,
) -> PostResult<()> {
    let selection = match (times, period) {
        (Some(t), _) => Selection::Times(t),
        (None, Some(p)) => Selection::Period(p),
        (None, None) => Selection::All,
    };
    let request = LoadRequest {
        step_size: step,
        ..ctx.request(run, selection)
    };
    let loaded = load_snapshots(&request)?;

    println!(
        "Selected {} snapshot(s) from {}:",
        loaded.snapshots.len(),
        loaded.manifest.full_name
    );
    for s in &loaded.snapshots {
        println!("  t = {} s", s.time_s);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_cells(
    ctx: &Context,
    run: &Option<String>,
    time: f64,
    field: &str,
    at: (f64, f64),
    orientation: Orientation,
    edge: EdgeSelect,
    output: Option<&Path>,
) -> PostResult<()> {
    let snapshot = ctx.snapshot_at(run, time)?;
    let values = hf_post::cell_values(&snapshot, field.parse()?, edge)?;
    let slice = hf_post::slice_cell_center(&values, &snapshot.mesh, at, orientation)?;

    let mut csv = String::from("cell,distance,value\n");
    for ((cell, d), v) in slice.cells.iter().zip(&slice.distance).zip(&slice.values) {
        csv.push_str(&format!("{},{},{}\n", cell, d, v));
    }
    write_output(&csv, slice.cells.len(), output)
}

fn write_figure(figure: &Figure, output: Option<&Path>) -> PostResult<()> {
    let csv = figure.to_csv();
    let rows = csv.lines().count().saturating_sub(1);
    if output.is_some() {
        println!("{} [{}]", figure.title, figure.units);
    }
    write_output(&csv, rows, output)
}

fn write_output(csv: &str, rows: usize, output: Option<&Path>) -> PostResult<()> {
    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Exported {} rows to {}", rows, path.display());
    } else {
        print!("{}", csv);
    }
    Ok(())
}
