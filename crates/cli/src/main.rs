use anyhow::{bail, Context, Result};
use blocksplit::api::{
    circle_with_area, hexagon_with_area, square_with_area, BlockSplitter, DeCfg, GeomCfg, Region,
    SegmentSummary, SplitCfg,
};
use clap::{Parser, Subcommand, ValueEnum};
use geo::coord;
use polars::prelude::*;
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod region_io;

use provenance::{write_sidecar, Payload};
use region_io::{RegionFile, ShapesFile};

#[derive(Parser)]
#[command(name = "blocksplit")]
#[command(about = "Split a polygon region into contiguous blocks of given area fractions")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Split a region file and write the sub-regions, a summary CSV and provenance
    Split {
        #[arg(long)]
        input: PathBuf,
        /// Comma-separated target fractions, e.g. 0.2,0.3,0.5
        #[arg(long, value_delimiter = ',', required = true)]
        weights: Vec<f64>,
        #[arg(long, default_value_t = 0.05)]
        cell_fraction: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 1000)]
        maxiter: usize,
        #[arg(long, default_value_t = 15)]
        popsize: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write a primitive shape as a region file
    Demo {
        #[arg(long, value_enum, default_value_t = Shape::Square)]
        shape: Shape,
        #[arg(long, default_value_t = 100.0)]
        area: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block, plus deviations of a summary CSV if given
    Report {
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Shape {
    Square,
    Hexagon,
    Circle,
}

/// Inputs of one `split` run.
#[derive(Clone, Debug)]
struct SplitArgs {
    input: PathBuf,
    weights: Vec<f64>,
    cell_fraction: f64,
    seed: u64,
    maxiter: usize,
    popsize: usize,
    out: PathBuf,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Split {
            input,
            weights,
            cell_fraction,
            seed,
            maxiter,
            popsize,
            out,
        } => split(&SplitArgs {
            input,
            weights,
            cell_fraction,
            seed,
            maxiter,
            popsize,
            out,
        })
        .map(|_| ()),
        Action::Demo { shape, area, out } => demo(shape, area, &out),
        Action::Report { summary } => report(summary.as_deref()),
    }
}

/// Run the full pipeline; returns the per-segment summary.
fn split(args: &SplitArgs) -> Result<Vec<SegmentSummary>> {
    tracing::info!(input = %args.input.display(), weights = ?args.weights, "split");
    let shape = RegionFile::read(&args.input)?.to_multi_polygon()?;
    let region = Region::new(shape).context("invalid region")?;
    let cfg = SplitCfg {
        cell_fraction: args.cell_fraction,
        geom: GeomCfg::default(),
        de: DeCfg {
            seed: args.seed,
            maxiter: args.maxiter,
            popsize: args.popsize,
            ..DeCfg::default()
        },
    };
    let mut splitter = BlockSplitter::with_cfg(region, args.weights.clone(), cfg)?;
    splitter.prepare().context("preparing cells")?;
    let splits = splitter.optimize().context("optimizing splits")?.to_vec();
    let shapes = splitter.final_shapes()?;
    let summary = splitter.summary()?;
    tracing::info!(
        cells = splitter.cells().map_or(0, |c| c.len()),
        splits = ?splits,
        "optimized"
    );

    let file = ShapesFile {
        segments: shapes.iter().map(RegionFile::from).collect(),
    };
    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&args.out, serde_json::to_vec_pretty(&file)?)
        .with_context(|| format!("writing {}", args.out.display()))?;

    let summary_path = summary_path(&args.out);
    write_summary_csv(&summary, &summary_path)?;

    let payload = Payload::new(json!({
        "input": args.input.to_string_lossy(),
        "weights": args.weights,
        "cell_fraction": args.cell_fraction,
        "seed": args.seed,
        "maxiter": args.maxiter,
        "popsize": args.popsize,
        "splits": splits,
    }))
    .with_output(&summary_path);
    write_sidecar(&args.out, payload)?;
    Ok(summary)
}

/// `<out>.summary.csv` next to the shapes file.
fn summary_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shapes".to_string());
    out.with_file_name(format!("{stem}.summary.csv"))
}

fn write_summary_csv(summary: &[SegmentSummary], path: &Path) -> Result<()> {
    let mut df = df!(
        "segment" => summary.iter().map(|s| s.index as u32).collect::<Vec<_>>(),
        "target" => summary.iter().map(|s| s.target).collect::<Vec<_>>(),
        "fraction" => summary.iter().map(|s| s.fraction).collect::<Vec<_>>(),
        "area" => summary.iter().map(|s| s.area).collect::<Vec<_>>(),
        "cells" => summary.iter().map(|s| s.cells as u32).collect::<Vec<_>>(),
    )?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    Ok(())
}

fn demo(shape: Shape, area: f64, out: &Path) -> Result<()> {
    tracing::info!(?shape, area, out = %out.display(), "demo");
    if !(area.is_finite() && area > 0.0) {
        bail!("area must be positive, got {area}");
    }
    let center = coord! { x: 0.0, y: 0.0 };
    let polygon = match shape {
        Shape::Square => square_with_area(center, area),
        Shape::Hexagon => hexagon_with_area(center, area),
        Shape::Circle => circle_with_area(center, area, 64),
    };
    RegionFile::from(&polygon).write(out)
}

/// Largest `|fraction - target|` over the rows of a summary CSV.
fn max_deviation(path: &Path) -> Result<f64> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()?
        .select([col("target"), col("fraction")])
        .collect()?;
    let target = df.column("target")?.f64()?;
    let fraction = df.column("fraction")?.f64()?;
    Ok(target
        .into_iter()
        .zip(fraction)
        .filter_map(|(t, f)| Some((t? - f?).abs()))
        .fold(0.0, f64::max))
}

fn report(summary: Option<&Path>) -> Result<()> {
    let deviation = summary.map(max_deviation).transpose()?;
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": blocksplit::VERSION,
        "summary": summary.map(|p| p.to_string_lossy()),
        "max_deviation": deviation,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn summary_path_sits_next_to_output() {
        assert_eq!(
            summary_path(Path::new("/tmp/run/shapes.json")),
            Path::new("/tmp/run/shapes.summary.csv")
        );
    }

    #[test]
    fn demo_then_split_writes_all_artifacts() {
        let dir = tempdir().unwrap();
        let region = dir.path().join("square.json");
        demo(Shape::Square, 100.0, &region).unwrap();

        let out = dir.path().join("out/shapes.json");
        let summary = split(&SplitArgs {
            input: region,
            weights: vec![0.5, 0.5],
            cell_fraction: 0.1,
            seed: 3,
            maxiter: 200,
            popsize: 15,
            out: out.clone(),
        })
        .unwrap();
        assert_eq!(summary.len(), 2);
        for s in &summary {
            assert!((s.fraction - 0.5).abs() <= 0.05, "fraction {}", s.fraction);
        }

        let shapes: ShapesFile = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(shapes.segments.len(), 2);
        assert!(dir.path().join("out/shapes.provenance.json").exists());

        let csv_path = dir.path().join("out/shapes.summary.csv");
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("segment,target,fraction,area,cells"));
        assert_eq!(csv.lines().count(), 3);
        assert!(max_deviation(&csv_path).unwrap() <= 0.05);
    }

    #[test]
    fn split_rejects_bad_input() {
        let dir = tempdir().unwrap();
        let region = dir.path().join("r.json");
        std::fs::write(&region, r#"{"polygons": []}"#).unwrap();
        let err = split(&SplitArgs {
            input: region,
            weights: vec![1.0],
            cell_fraction: 0.1,
            seed: 0,
            maxiter: 10,
            popsize: 5,
            out: dir.path().join("o.json"),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid region"));
    }

    #[test]
    fn demo_rejects_non_positive_area() {
        let dir = tempdir().unwrap();
        assert!(demo(Shape::Circle, 0.0, &dir.path().join("c.json")).is_err());
    }
}
