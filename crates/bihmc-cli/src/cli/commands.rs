use super::helpers::{read_json, write_json};
use super::CliError;
use bihmc_core::bispectrum::{blend_contributions, reshape_cube, BispectrumDecomposition};
use bihmc_core::domain::{BlendingExponents, FreeParameters, HmError, Ingredients};
use bihmc_core::pipeline::{bispectrum_from_cosmology, bispectrum_from_table, BispectrumRequest};
use bihmc_core::power::{dewiggle_linear_power, velocity_dispersion_sq};
use bihmc_core::tables::{ContributionsTable, HaloTables, PowerTables, SigmaTable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct ComputeArgs {
    /// Scenario JSON path
    scenario: PathBuf,

    /// JSON report output path
    #[arg(long, default_value = "bispectrum.json")]
    output: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct BlendArgs {
    /// Contributions JSON path
    input: PathBuf,

    /// JSON report output path
    #[arg(long, default_value = "blended.json")]
    output: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct DewiggleArgs {
    /// Spectra JSON path
    input: PathBuf,

    /// JSON report output path
    #[arg(long, default_value = "dewiggled.json")]
    output: PathBuf,
}

/// Full pipeline driven by table-backed collaborators.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    ks: Vec<f64>,
    ms: Vec<f64>,
    z: f64,
    #[serde(default)]
    ingredients: Ingredients,
    #[serde(default)]
    free_parameters: FreeParameters,
    #[serde(default)]
    fast_calc: bool,
    #[serde(default)]
    only_equilateral: bool,
    source: ScenarioSource,
    halo: HaloTables,
    engine: ContributionsTable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ScenarioSource {
    #[serde(rename_all = "camelCase")]
    Tabulated {
        omega_m: f64,
        pk_lin: Vec<f64>,
        sigma: SigmaTable,
    },
    #[serde(rename_all = "camelCase")]
    Cosmology {
        power: PowerTables,
        #[serde(default)]
        dewiggle: bool,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecompositionReport {
    shape: [usize; 3],
    combined: Vec<f64>,
    one_halo: Vec<f64>,
    two_halo: Vec<f64>,
    three_halo: Vec<f64>,
}

impl From<&BispectrumDecomposition> for DecompositionReport {
    fn from(decomposition: &BispectrumDecomposition) -> Self {
        let n = decomposition.grid_len();
        Self {
            shape: [n, n, n],
            combined: decomposition.combined.iter().copied().collect(),
            one_halo: decomposition.one_halo.iter().copied().collect(),
            two_halo: decomposition.two_halo.iter().copied().collect(),
            three_halo: decomposition.three_halo.iter().copied().collect(),
        }
    }
}

pub(super) fn run_compute_command(args: ComputeArgs, verbose: bool) -> Result<i32, CliError> {
    let scenario: Scenario = read_json(&args.scenario)?;
    tracing::debug!(
        "scenario '{}': {} wavenumbers, {} masses",
        args.scenario.display(),
        scenario.ks.len(),
        scenario.ms.len()
    );

    let mut request = BispectrumRequest::new(scenario.ks, scenario.ms);
    request.ingredients = scenario.ingredients;
    request.free_parameters = scenario.free_parameters;
    request.verbose = verbose;
    request.fast_calc = scenario.fast_calc;
    request.only_equilateral = scenario.only_equilateral;

    let decomposition = match &scenario.source {
        ScenarioSource::Tabulated {
            omega_m,
            pk_lin,
            sigma,
        } => bispectrum_from_table(
            &request,
            *omega_m,
            scenario.z,
            pk_lin,
            sigma,
            &scenario.halo,
            &scenario.engine,
        )?,
        ScenarioSource::Cosmology { power, dewiggle } => bispectrum_from_cosmology(
            &request,
            scenario.z,
            *dewiggle,
            power,
            &scenario.halo,
            &scenario.engine,
        )?,
    };

    write_json(&args.output, &DecompositionReport::from(&decomposition))?;
    println!("bispectrum report: {}", args.output.display());
    Ok(0)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlendInput {
    n: usize,
    alpha1: f64,
    alpha2: f64,
    one_halo: Vec<f64>,
    two_halo: Vec<f64>,
    three_halo: Vec<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlendReport {
    shape: [usize; 3],
    combined: Vec<f64>,
}

pub(super) fn run_blend_command(args: BlendArgs) -> Result<i32, CliError> {
    let input: BlendInput = read_json(&args.input)?;
    let exponents =
        BlendingExponents::new(input.alpha1, input.alpha2).map_err(HmError::from)?;
    let combined = blend_contributions(
        &input.one_halo,
        &input.two_halo,
        &input.three_halo,
        exponents,
    )
    .map_err(HmError::from)?;
    let cube = reshape_cube(combined, input.n).map_err(HmError::from)?;

    write_json(
        &args.output,
        &BlendReport {
            shape: [input.n, input.n, input.n],
            combined: cube.iter().copied().collect(),
        },
    )?;
    println!("blend report: {}", args.output.display());
    Ok(0)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DewiggleInput {
    ks: Vec<f64>,
    pk_lin: Vec<f64>,
    pk_no_wiggle: Vec<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DewiggleReport {
    pk: Vec<f64>,
    sigma_v_sq: f64,
}

pub(super) fn run_dewiggle_command(args: DewiggleArgs) -> Result<i32, CliError> {
    let input: DewiggleInput = read_json(&args.input)?;
    let pk = dewiggle_linear_power(&input.ks, &input.pk_lin, &input.pk_no_wiggle)
        .map_err(HmError::from)?;
    let sigma_v_sq =
        velocity_dispersion_sq(&input.ks, &input.pk_lin).map_err(HmError::from)?;

    write_json(&args.output, &DewiggleReport { pk, sigma_v_sq })?;
    println!("dewiggle report: {}", args.output.display());
    Ok(0)
}
