//! Snapshots of the cavity Wigner function during Jaynes-Cummings evolution,
//! as filled-contour maps or 3D surfaces.

#![allow(non_snake_case, non_upper_case_globals)]

use clap::Parser;
use ndarray as nd;
use plotters::prelude::*;
use tracing::info;
use jc_sim::{
    mkdir,
    write_npz,
    dynamics::{ HBuilderJc, JcParams, LOperatorJc },
    hilbert::{ Atom, JcState },
    rabi::{ Density, mesolve },
    trajectory::{ ReducedStates, Subsystem },
    wigner::wigner,
};
use lib::{
    config::{ CommonArgs, Preset, RunConfig },
    logging::init_logging,
    plot::{ heatmap, snapshot_file, surface, Labels },
};

const XMAX: f64 = 5.0;
const LEVELS: usize = 100;

/// Cavity Wigner function snapshots in the Jaynes-Cummings model
#[derive(Parser)]
#[command(name = "wigner")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Render 3D surfaces instead of filled-contour maps
    #[arg(long)]
    surface: bool,

    /// Number of phase-space grid points per axis [default: 200, or 50 with
    /// --surface]
    #[arg(long)]
    grid: Option<usize>,
}

fn preset() -> Preset {
    Preset {
        name: "wigner",
        params: JcParams { nmax: 15, ..JcParams::new(0.1) },
        t_end: 25.0,
        samples: 100,
        snapshots: vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0],
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.common.log_level);
    let config = RunConfig::resolve(preset(), &cli.common)?;
    let outdir = config.outdir.clone();
    mkdir!(outdir);

    let builder = HBuilderJc::new(&config.params)?;
    let lop = LOperatorJc::new(&builder);
    info!(dim = builder.dim(), channels = lop.channels().len(), "built model");

    let rho0 = Density::from_single(JcState::new(0, Atom::E));
    let traj = mesolve(&builder, &lop, rho0, &config.time)?;
    info!(samples = traj.len(), "evolved state");

    let npts = cli.grid.unwrap_or(if cli.surface { 50 } else { 200 });
    let xvec: nd::Array1<f64> = nd::Array1::linspace(-XMAX, XMAX, npts);
    let mut reduced = ReducedStates::new(&traj);
    let snapshots = reduced.snapshots(&config.snapshots, Subsystem::Cavity)?;
    let mut W: nd::Array3<f64> = nd::Array3::zeros((snapshots.len(), npts, npts));
    for ((_, rho), mut Wk) in snapshots.iter().zip(W.outer_iter_mut()) {
        Wk.assign(&wigner(rho, &xvec, &xvec)?);
    }
    info!(snapshots = snapshots.len(), grid = npts, "computed Wigner functions");

    let indices: nd::Array1<u64>
        = snapshots.iter().map(|(k, _)| *k as u64).collect();
    write_npz!(
        outdir.join("wigner.npz"),
        arrays: {
            "xvec" => &xvec,
            "W" => &W,
            "snapshot_times" => &nd::Array1::from(config.snapshots.clone()),
            "snapshot_indices" => &indices,
        }
    );

    let x = xvec.to_vec();
    for (k, (&t, Wk)) in config.snapshots.iter().zip(W.outer_iter()).enumerate() {
        let Wk = Wk.to_owned();
        if cli.surface {
            let path = outdir.join(snapshot_file("wigner_3d", k, t));
            let root = SVGBackend::new(&path, (1000, 800)).into_drawing_area();
            root.fill(&WHITE)?;
            surface(&root, &format!("3D Wigner Function at t={t}"), &x, &x, &Wk)?;
            root.present()?;
        } else {
            let path = outdir.join(snapshot_file("wigner_2d", k, t));
            let root = SVGBackend::new(&path, (800, 600)).into_drawing_area();
            root.fill(&WHITE)?;
            let title = format!("2D Wigner Function at t={t}");
            let labels = Labels { title: &title, x: "Re[α]", y: "Im[α]" };
            heatmap(&root, labels, &x, &x, &Wk, LEVELS)?;
            root.present()?;
        }
    }
    info!(outdir = %outdir.display(), "wrote figures and data");
    Ok(())
}
