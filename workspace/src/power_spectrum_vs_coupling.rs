//! Cavity emission spectra of the Jaynes-Cummings model for a range of
//! coupling strengths, showing the onset of vacuum Rabi splitting.

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
    operators::dag,
    spectrum::{ dominant_peak, spectrum_correlation_fft },
};
use lib::{
    config::{ CommonArgs, Preset, RunConfig },
    logging::init_logging,
    plot::{ line_plot, Labels, Series, Stroke },
};

const XLIM: (f64, f64) = (-0.5, 2.5);

/// Power spectra of the Jaynes-Cummings model versus coupling strength
///
/// The time grid sets the correlation delays; the coupling strengths replace
/// any single value of `g`.
#[derive(Parser)]
#[command(name = "power_spectrum_vs_coupling")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Coupling strengths (cycles), comma-separated [default: 6 values
    /// evenly spaced over 0.01..1.0]
    #[arg(long, value_delimiter = ',')]
    couplings: Option<Vec<f64>>,
}

fn preset() -> Preset {
    Preset {
        name: "power_spectrum_vs_coupling",
        params: JcParams {
            kappa: 0.7,
            gamma: 0.2,
            n_th: 0.25,
            nmax: 15,
            ..JcParams::new(0.01)
        },
        t_end: 100.0,
        samples: 5000,
        snapshots: Vec::new(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.common.log_level);
    let config = RunConfig::resolve(preset(), &cli.common)?;
    let couplings: Vec<f64>
        = cli.couplings.clone()
        .unwrap_or_else(|| nd::Array1::linspace(0.01, 1.0, 6).to_vec());
    ensure!(!couplings.is_empty(), "need at least one coupling strength");
    let outdir = config.outdir.clone();
    mkdir!(outdir);
    let taus = &config.time;

    let mut freqs: nd::Array1<f64> = nd::Array1::zeros(taus.len());
    let mut spectra: nd::Array2<f64> = nd::Array2::zeros((couplings.len(), taus.len()));
    let mut peaks: nd::Array1<f64> = nd::Array1::zeros(couplings.len());
    for (k, &g) in couplings.iter().enumerate() {
        let params = JcParams { g, ..config.params };
        let builder = HBuilderJc::new(&params)?;
        let lop = LOperatorJc::new(&builder);
        let a = builder.cavity_destroy();
        let corr = correlation_2op_1t(
            &builder.gen(), &lop.jump_ops(), None, taus, &dag(&a), &a,
        )?;
        let (w, s) = spectrum_correlation_fft(taus, &corr)?;
        let (peak, _)
            = dominant_peak(&w, &s, Some((XLIM.0 * TAU, XLIM.1 * TAU)))?;
        info!(g, peak = peak / TAU, "computed spectrum");
        freqs = w / TAU;
        spectra.row_mut(k).assign(&s);
        peaks[k] = peak / TAU;
    }

    write_npz!(
        outdir.join("power_spectrum_vs_coupling.npz"),
        arrays: {
            "g" => &nd::Array1::from(couplings.clone()),
            "freq" => &freqs,
            "spectra" => &spectra,
            "peaks" => &peaks,
        }
    );

    let f = freqs.to_vec();
    let s: Vec<Vec<f64>> = spectra.rows().into_iter().map(|row| row.to_vec()).collect();
    let series: Vec<Series>
        = couplings.iter().zip(&s)
        .map(|(g, sk)| Series {
            label: format!("g={g:.2}"),
            x: &f,
            y: sk,
            stroke: Stroke::Solid,
        })
        .collect();
    let title = format!(
        "Vacuum Rabi Splitting for Different Coupling Strengths (κ={}, γ={})",
        config.params.kappa, config.params.gamma,
    );
    let path = outdir.join("power_spectrum_vs_coupling.svg");
    let root = SVGBackend::new(&path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    line_plot(
        &root,
        Labels {
            title: &title,
            x: "Frequency (meV)",
            y: "Power Spectrum (arb. units)",
        },
        Some(XLIM),
        &series,
    )?;
    root.present()?;
    info!(outdir = %outdir.display(), "wrote figures and data");
    Ok(())
}
