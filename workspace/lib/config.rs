//! Layered run configuration for the simulation scripts.
//!
//! Settings are resolved from the following sources, later ones overriding
//! earlier ones:
//!
//! 1. the binary's built-in [`Preset`]
//! 2. an optional TOML file (`--config`)
//! 3. the `JC_SIM_OUTPUT_DIR` environment variable (output directory only)
//! 4. command-line flags
//!
//! A TOML file may contain any of the following tables, all optional:
//!
//! ```toml
//! [model]
//! g = 0.05
//! kappa = 0.7
//! nmax = 12
//!
//! [time]
//! t_end = 25.0
//! samples = 400
//! snapshots = [0.0, 12.5, 25.0]
//!
//! [output]
//! dir = "output/run1"
//! ```

use std::path::{ Path, PathBuf };
use anyhow::{ bail, Context };
use clap::Args;
use ndarray as nd;
use serde::Deserialize;
use tracing::debug;
use jc_sim::dynamics::JcParams;

/// Environment variable overriding the output directory.
pub const OUTPUT_DIR_ENV: &str = "JC_SIM_OUTPUT_DIR";

/// Optional overrides of the model parameters.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Args)]
#[serde(default, deny_unknown_fields)]
pub struct ModelOverrides {
    /// Atom-cavity coupling strength (cycles)
    #[arg(long)]
    pub g: Option<f64>,

    /// Cavity decay rate
    #[arg(long)]
    pub kappa: Option<f64>,

    /// Atomic decay rate
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Atomic pure dephasing rate
    #[arg(long)]
    pub gamma_phi: Option<f64>,

    /// Shift added to the cavity frequency
    #[arg(long, allow_negative_numbers = true)]
    pub detuning: Option<f64>,

    /// Mean thermal photon number
    #[arg(long)]
    pub n_th: Option<f64>,

    /// Number of cavity Fock states
    #[arg(long)]
    pub nmax: Option<usize>,

    /// Apply the 0.1 g² frequency correction (bare flag means `true`)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub nonlinear: Option<bool>,
}

impl ModelOverrides {
    /// Fill every unset field from `lower`.
    pub fn or(self, lower: Self) -> Self {
        Self {
            g: self.g.or(lower.g),
            kappa: self.kappa.or(lower.kappa),
            gamma: self.gamma.or(lower.gamma),
            gamma_phi: self.gamma_phi.or(lower.gamma_phi),
            detuning: self.detuning.or(lower.detuning),
            n_th: self.n_th.or(lower.n_th),
            nmax: self.nmax.or(lower.nmax),
            nonlinear: self.nonlinear.or(lower.nonlinear),
        }
    }

    /// Write every set field into `params`.
    pub fn apply(&self, params: &mut JcParams) {
        if let Some(g) = self.g { params.g = g; }
        if let Some(kappa) = self.kappa { params.kappa = kappa; }
        if let Some(gamma) = self.gamma { params.gamma = gamma; }
        if let Some(gamma_phi) = self.gamma_phi { params.gamma_phi = gamma_phi; }
        if let Some(detuning) = self.detuning { params.detuning = detuning; }
        if let Some(n_th) = self.n_th { params.n_th = n_th; }
        if let Some(nmax) = self.nmax { params.nmax = nmax; }
        if let Some(nonlinear) = self.nonlinear { params.nonlinear = nonlinear; }
    }
}

/// Optional overrides of the evolution time grid and snapshot times.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Args)]
#[serde(default, deny_unknown_fields)]
pub struct TimeOverrides {
    /// Final time of the evolution grid
    #[arg(long)]
    pub t_end: Option<f64>,

    /// Number of samples in the evolution grid
    #[arg(long)]
    pub samples: Option<usize>,

    /// Snapshot times, comma-separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub snapshots: Option<Vec<f64>>,
}

impl TimeOverrides {
    /// Fill every unset field from `lower`.
    pub fn or(self, lower: Self) -> Self {
        Self {
            t_end: self.t_end.or(lower.t_end),
            samples: self.samples.or(lower.samples),
            snapshots: self.snapshots.or(lower.snapshots),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputOverrides {
    pub dir: Option<PathBuf>,
}

/// Contents of a TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub model: ModelOverrides,
    pub time: TimeOverrides,
    pub output: OutputOverrides,
}

impl FileConfig {
    /// Parse a configuration from TOML source.
    pub fn parse(src: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(src)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("couldn't read config file {}", path.display()))?;
        Self::parse(&src)
            .with_context(|| format!("couldn't parse config file {}", path.display()))
    }
}

/// Command-line flags shared by every script.
#[derive(Clone, Debug, Default, Args)]
pub struct CommonArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelOverrides,

    #[command(flatten)]
    pub time: TimeOverrides,
}

/// Built-in defaults of a script.
#[derive(Clone, Debug)]
pub struct Preset {
    /// Name of the script, used for the default output directory.
    pub name: &'static str,
    pub params: JcParams,
    pub t_end: f64,
    pub samples: usize,
    pub snapshots: Vec<f64>,
}

/// Fully resolved settings of a single run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub params: JcParams,
    pub time: nd::Array1<f64>,
    pub snapshots: Vec<f64>,
    pub outdir: PathBuf,
}

impl RunConfig {
    /// Resolve all configuration layers for `preset`, reading the config file
    /// named in `args` and the process environment.
    pub fn resolve(preset: Preset, args: &CommonArgs) -> anyhow::Result<Self> {
        let file
            = args.config.as_deref()
            .map(FileConfig::load)
            .transpose()?
            .unwrap_or_default();
        let env_dir = std::env::var_os(OUTPUT_DIR_ENV).map(PathBuf::from);
        Self::layer(preset, file, env_dir, args)
    }

    /// Combine already-loaded configuration layers.
    pub fn layer(
        preset: Preset,
        file: FileConfig,
        env_dir: Option<PathBuf>,
        args: &CommonArgs,
    ) -> anyhow::Result<Self>
    {
        let model = args.model.clone().or(file.model);
        let time = args.time.clone().or(file.time);

        let mut params = preset.params;
        model.apply(&mut params);
        params.validate().context("invalid model parameters")?;

        let t_end = time.t_end.unwrap_or(preset.t_end);
        if !t_end.is_finite() || t_end <= 0.0 {
            bail!("final time must be finite and positive, got {t_end}");
        }
        let samples = time.samples.unwrap_or(preset.samples);
        if samples < 2 {
            bail!("time grid needs at least 2 samples, got {samples}");
        }
        let snapshots = time.snapshots.unwrap_or(preset.snapshots);
        if let Some(t) = snapshots.iter().find(|t| !t.is_finite()) {
            bail!("snapshot times must be finite, got {t}");
        }

        let outdir
            = args.output.clone()
            .or(env_dir)
            .or(file.output.dir)
            .unwrap_or_else(|| PathBuf::from("output").join(preset.name));

        let config = Self {
            params,
            time: nd::Array1::linspace(0.0, t_end, samples),
            snapshots,
            outdir,
        };
        debug!(params = ?config.params, t_end, samples, outdir = %config.outdir.display(), "resolved run configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        common: CommonArgs,
    }

    fn preset() -> Preset {
        Preset {
            name: "test",
            params: JcParams { nmax: 6, ..JcParams::new(0.1) },
            t_end: 25.0,
            samples: 100,
            snapshots: vec![0.0, 5.0, 10.0],
        }
    }

    #[test]
    fn later_layers_win() {
        let file = FileConfig::parse(r#"
            [model]
            g = 0.2
            kappa = 0.3

            [time]
            samples = 50

            [output]
            dir = "from_file"
        "#).unwrap();
        let cli = Cli::try_parse_from([
            "test", "--g", "0.4", "--snapshots", "1,2", "--detuning", "-0.5",
        ]).unwrap();
        let config = RunConfig::layer(preset(), file.clone(), None, &cli.common)
            .unwrap();
        assert_eq!(config.params.g, 0.4);
        assert_eq!(config.params.kappa, 0.3);
        assert_eq!(config.params.detuning, -0.5);
        assert_eq!(config.params.nmax, 6);
        assert_eq!(config.time.len(), 50);
        assert!((config.time[49] - 25.0).abs() < 1e-12);
        assert_eq!(config.snapshots, vec![1.0, 2.0]);
        assert_eq!(config.outdir, PathBuf::from("from_file"));

        let config = RunConfig::layer(
            preset(), file.clone(), Some(PathBuf::from("from_env")), &cli.common,
        ).unwrap();
        assert_eq!(config.outdir, PathBuf::from("from_env"));

        let cli = Cli::try_parse_from(["test", "-o", "from_cli"]).unwrap();
        let config = RunConfig::layer(
            preset(), file, Some(PathBuf::from("from_env")), &cli.common,
        ).unwrap();
        assert_eq!(config.outdir, PathBuf::from("from_cli"));
        assert_eq!(config.params.g, 0.2);
    }

    #[test]
    fn preset_is_the_fallback() {
        let cli = Cli::try_parse_from(["test"]).unwrap();
        let config = RunConfig::layer(preset(), FileConfig::default(), None, &cli.common)
            .unwrap();
        assert_eq!(config.params, preset().params);
        assert_eq!(config.snapshots, preset().snapshots);
        assert_eq!(config.outdir, PathBuf::from("output").join("test"));
        assert_eq!(cli.common.log_level, "info");
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(FileConfig::parse("[model]\nfoo = 1.0\n").is_err());
        assert!(FileConfig::parse("[model]\nkappa = \"fast\"\n").is_err());

        // a negative rate parses but fails validation
        let cli = Cli::try_parse_from(["test", "--kappa=-1.0"]).unwrap();
        assert!(RunConfig::layer(preset(), FileConfig::default(), None, &cli.common).is_err());

        let cli = Cli::try_parse_from(["test", "--nmax", "1"]).unwrap();
        assert!(RunConfig::layer(preset(), FileConfig::default(), None, &cli.common).is_err());

        let cli = Cli::try_parse_from(["test", "--samples", "1"]).unwrap();
        assert!(RunConfig::layer(preset(), FileConfig::default(), None, &cli.common).is_err());
    }

    #[test]
    fn nonlinear_is_a_flag() {
        let cli = Cli::try_parse_from(["test", "--nonlinear"]).unwrap();
        assert_eq!(cli.common.model.nonlinear, Some(true));
        let config = RunConfig::layer(preset(), FileConfig::default(), None, &cli.common)
            .unwrap();
        assert!(config.params.nonlinear);

        let cli = Cli::try_parse_from(["test", "--nonlinear", "false", "--g", "0.3"])
            .unwrap();
        assert_eq!(cli.common.model.nonlinear, Some(false));
        assert_eq!(cli.common.model.g, Some(0.3));

        let cli = Cli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.common.model.nonlinear, None);
    }
}
