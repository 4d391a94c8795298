//! Occupation dynamics and vacuum Rabi spectrum of a single Jaynes-Cummings
//! system, starting from an excited atom in an empty cavity.

#![allow(non_snake_case, non_upper_case_globals)]

use std::f64::consts::TAU;
use anyhow::ensure;
use clap::Parser;
use ndarray as nd;
use plotters::prelude::*;
use tracing::info;
use jc_sim::{
    mkdir,
    write_npz,
    correlation::correlation_2op_1t,
    dynamics::{ HBuilderJc, JcParams, LOperatorJc },
    hilbert::{ Atom, JcState },
    operators::dag,
    rabi::{ Density, mesolve_expect },
    spectrum::{ dominant_peak, spectrum, spectrum_correlation_fft },
};
use lib::{
    config::{ CommonArgs, Preset, RunConfig },
    logging::init_logging,
    plot::{ line_plot, Labels, Series, Stroke },
};

/// Occupation dynamics and power spectrum of the Jaynes-Cummings model
#[derive(Parser)]
#[command(name = "jaynes_cummings")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Largest delay of the correlation function
    #[arg(long, default_value_t = 100.0)]
    tau_end: f64,

    /// Number of correlation delays
    #[arg(long, default_value_t = 5000)]
    tau_samples: usize,

    /// Number of frequencies in the direct spectrum
    #[arg(long, default_value_t = 200)]
    freq_samples: usize,
}

fn preset() -> Preset {
    Preset {
        name: "jaynes_cummings",
        params: JcParams {
            kappa: 0.7,
            gamma: 0.2,
            gamma_phi: 0.001,
            n_th: 0.25,
            nmax: 4,
            ..JcParams::new(0.1)
        },
        t_end: 25.0,
        samples: 1000,
        snapshots: Vec::new(),
    }
}

fn describe(params: &JcParams) -> String {
    let mut desc = format!(
        "g={}, kappa={}, gamma={}, Detuning={}, n={}",
        params.g, params.kappa, params.gamma, params.detuning, params.n_th,
    );
    if params.nonlinear { desc += ", Non-linear"; }
    desc
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.common.log_level);
    let config = RunConfig::resolve(preset(), &cli.common)?;
    ensure!(cli.tau_samples >= 2, "need at least 2 correlation delays");
    ensure!(cli.freq_samples >= 2, "need at least 2 spectrum frequencies");
    let params = config.params;
    let outdir = config.outdir.clone();
    mkdir!(outdir);

    let builder = HBuilderJc::new(&params)?;
    let lop = LOperatorJc::new(&builder);
    let H = builder.gen();
    let jump_ops = lop.jump_ops();
    let a = builder.cavity_destroy();
    let ad = dag(&a);
    info!(dim = builder.dim(), channels = jump_ops.len(), "built model");

    let rho0 = Density::from_single(JcState::new(0, Atom::E));
    let occupations = mesolve_expect(
        &builder, &lop, rho0, &config.time,
        &[builder.cavity_number(), builder.atom_number()],
    )?;
    info!(samples = config.time.len(), "computed occupation dynamics");

    let taus = nd::Array1::linspace(0.0, cli.tau_end, cli.tau_samples);
    let corr = correlation_2op_1t(&H, &jump_ops, None, &taus, &ad, &a)?;
    let (w_fft, s_fft) = spectrum_correlation_fft(&taus, &corr)?;
    let wlist = nd::Array1::linspace(0.25 * TAU, 1.75 * TAU, cli.freq_samples);
    let s_direct = spectrum(&H, &jump_ops, &wlist, &ad, &a)?;
    let window = (wlist[0], wlist[wlist.len() - 1]);
    let (peak_fft, _) = dominant_peak(&w_fft, &s_fft, Some(window))?;
    let (peak_direct, _) = dominant_peak(&wlist, &s_direct, None)?;
    info!(
        fft = peak_fft / TAU,
        direct = peak_direct / TAU,
        "computed power spectra; dominant peak (cycles)",
    );

    write_npz!(
        outdir.join("jaynes_cummings.npz"),
        arrays: {
            "time" => &config.time,
            "occupations" => &occupations,
            "taus" => &taus,
            "corr" => &corr,
            "w_fft" => &w_fft,
            "s_fft" => &s_fft,
            "w_direct" => &wlist,
            "s_direct" => &s_direct,
        }
    );

    let desc = describe(&params);
    let time = config.time.to_vec();
    let n_cavity = occupations.row(0).to_vec();
    let n_atom = occupations.row(1).to_vec();
    let path = outdir.join("occupations.svg");
    let root = SVGBackend::new(&path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    line_plot(
        &root,
        Labels {
            title: &format!("Jaynes-Cummings Dynamics: {desc}"),
            x: "Time (sec)",
            y: "Occupation Probability",
        },
        None,
        &[
            Series { label: "Cavity".into(), x: &time, y: &n_cavity, stroke: Stroke::Solid },
            Series { label: "Atom".into(), x: &time, y: &n_atom, stroke: Stroke::Solid },
        ],
    )?;
    root.present()?;

    let f_fft = (&w_fft / TAU).to_vec();
    let f_direct = (&wlist / TAU).to_vec();
    let s_fft = s_fft.to_vec();
    let s_direct = s_direct.to_vec();
    let path = outdir.join("spectrum.svg");
    let root = SVGBackend::new(&path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    line_plot(
        &root,
        Labels {
            title: &format!("Vacuum Rabi Splitting: {desc}"),
            x: "Frequency (meV)",
            y: "Power Spectrum (arb. units)",
        },
        Some((window.0 / TAU, window.1 / TAU)),
        &[
            Series { label: "FFT of correlation".into(), x: &f_fft, y: &s_fft, stroke: Stroke::Solid },
            Series { label: "direct (Liouvillian)".into(), x: &f_direct, y: &s_direct, stroke: Stroke::Dashed },
        ],
    )?;
    root.present()?;
    info!(outdir = %outdir.display(), "wrote figures and data");
    Ok(())
}
