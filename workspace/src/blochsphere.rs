//! Bloch-sphere snapshots of the atomic state during Jaynes-Cummings
//! evolution.

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
};
use lib::{
    config::{ CommonArgs, Preset, RunConfig },
    logging::init_logging,
    plot::{ bloch_sphere, split_panels, Layout },
};

/// Bloch-sphere snapshots of the atom in the Jaynes-Cummings model
#[derive(Parser)]
#[command(name = "blochsphere")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn preset() -> Preset {
    Preset {
        name: "blochsphere",
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
    let bloch = traj.bloch_vectors()?;
    info!(samples = traj.len(), "computed Bloch vectors");

    let indices = traj.snapshot_indices(&config.snapshots)?;
    write_npz!(
        outdir.join("blochsphere.npz"),
        arrays: {
            "time" => traj.time(),
            "bloch" => &bloch,
            "snapshot_times" => &nd::Array1::from(config.snapshots.clone()),
            "snapshot_indices" => &indices.iter().map(|&k| k as u64).collect::<nd::Array1<u64>>(),
        }
    );

    let vectors: Vec<[f64; 3]>
        = bloch.columns().into_iter()
        .map(|b| [b[0], b[1], b[2]])
        .collect();
    let n = config.snapshots.len();
    let path = outdir.join("blochsphere.svg");
    let root = SVGBackend::new(&path, (300 * n.max(1) as u32, 400))
        .into_drawing_area();
    root.fill(&WHITE)?;
    let panels = split_panels(&root, Layout::Row, n);
    for ((panel, &t), &k) in panels.iter().zip(&config.snapshots).zip(&indices) {
        bloch_sphere(panel, &format!("t = {t}"), vectors[k], &vectors[..=k])?;
    }
    root.present()?;
    info!(panels = n, outdir = %outdir.display(), "wrote figures and data");
    Ok(())
}
