//! End-to-end bispectrum pipeline in its two sourcing variants.
//!
//! Both variants validate the complete free-parameter set before the first
//! collaborator call, then share the profile / engine / blend / reshape tail.

use crate::bispectrum::{
    blend_contributions, reshape_cube, tracer_channel, BispectrumDecomposition, BispectrumEngine,
    BispectrumTerms, EngineRequest, Term,
};
use crate::common::constants::MATTER_TRACER;
use crate::domain::{
    BlendingExponents, FreeParameters, HmError, HmResult, Ingredients, SuppressionParameters,
};
use crate::halo::{build_matter_profile, HaloIngredients, HaloModel};
use crate::power::{
    dewiggle_linear_power, power_h_units, radii_mpc, scale_factor, wavenumbers_per_mpc,
    CosmologyBackend, SigmaSource,
};
use std::collections::BTreeMap;
use tracing::info;

/// Grids, model choices and flags shared by both pipeline variants.
#[derive(Debug, Clone, PartialEq)]
pub struct BispectrumRequest {
    pub ks: Vec<f64>,
    pub ms: Vec<f64>,
    pub ingredients: Ingredients,
    pub free_parameters: FreeParameters,
    pub verbose: bool,
    pub fast_calc: bool,
    pub only_equilateral: bool,
}

impl BispectrumRequest {
    pub fn new(ks: Vec<f64>, ms: Vec<f64>) -> Self {
        Self {
            ks,
            ms,
            ingredients: Ingredients::default(),
            free_parameters: FreeParameters::default(),
            verbose: false,
            fast_calc: false,
            only_equilateral: false,
        }
    }
}

/// Tabulated variant: the linear power spectrum (h-units) and the sigma(R)
/// source are precomputed outside.
pub fn bispectrum_from_table(
    request: &BispectrumRequest,
    omega_m: f64,
    z: f64,
    pk_lin: &[f64],
    sigma_source: &impl SigmaSource,
    halo_ingredients: &impl HaloIngredients,
    engine: &impl BispectrumEngine,
) -> HmResult<BispectrumDecomposition> {
    let blending = request.free_parameters.blending()?;
    let suppression = request.free_parameters.suppression()?;
    if pk_lin.len() != request.ks.len() {
        return Err(HmError::LengthMismatch {
            context: "linear power spectrum",
            expected: request.ks.len(),
            actual: pk_lin.len(),
        });
    }

    let model = HaloModel::new(z, omega_m, &request.ingredients.hmf);
    if request.verbose {
        info!("{model}");
    }

    let radii = model.lagrangian_radii(&request.ms);
    let sigmas = sigma_source
        .sigma_r(&radii, z)
        .map_err(|source| HmError::backend("sigma(R) lookup", source))?;

    finish(
        request,
        &model,
        &sigmas,
        pk_lin,
        blending,
        suppression,
        halo_ingredients,
        engine,
    )
}

/// Boltzmann-backend variant: variance and linear power come from a cosmology
/// collaborator, optionally with BAO dewiggling, and are converted from the
/// backend's Mpc units into h-units.
pub fn bispectrum_from_cosmology(
    request: &BispectrumRequest,
    z: f64,
    dewiggle: bool,
    cosmology_backend: &impl CosmologyBackend,
    halo_ingredients: &impl HaloIngredients,
    engine: &impl BispectrumEngine,
) -> HmResult<BispectrumDecomposition> {
    let blending = request.free_parameters.blending()?;
    let suppression = request.free_parameters.suppression()?;

    let cosmology = *cosmology_backend.cosmology();
    let a = scale_factor(z);
    let model = HaloModel::new(z, cosmology.omega_m, &request.ingredients.hmf);
    if request.verbose {
        info!("{model}");
    }

    let radii = model.lagrangian_radii(&request.ms);
    let sigmas = cosmology_backend
        .sigma_r(&radii_mpc(&radii, cosmology.h), a)
        .map_err(|source| HmError::backend("sigma(R) evaluation", source))?;

    let ks_mpc = wavenumbers_per_mpc(&request.ks, cosmology.h);
    let mut pk = cosmology_backend
        .linear_power(&ks_mpc, a)
        .map_err(|source| HmError::backend("linear power", source))?;
    if pk.len() != request.ks.len() {
        return Err(HmError::LengthMismatch {
            context: "linear power spectrum",
            expected: request.ks.len(),
            actual: pk.len(),
        });
    }

    if dewiggle {
        let pk_no_wiggle = cosmology_backend
            .linear_power_no_wiggle(&ks_mpc, a)
            .map_err(|source| HmError::backend("no-wiggle linear power", source))?;
        pk = dewiggle_linear_power(&ks_mpc, &pk, &pk_no_wiggle)?;
    }
    let pk = power_h_units(&pk, cosmology.h);

    finish(
        request,
        &model,
        &sigmas,
        &pk,
        blending,
        suppression,
        halo_ingredients,
        engine,
    )
}

#[allow(clippy::too_many_arguments)]
fn finish(
    request: &BispectrumRequest,
    model: &HaloModel,
    sigmas: &[f64],
    pk_lin: &[f64],
    blending: BlendingExponents,
    suppression: SuppressionParameters,
    halo_ingredients: &impl HaloIngredients,
    engine: &impl BispectrumEngine,
) -> HmResult<BispectrumDecomposition> {
    let profile = build_matter_profile(
        halo_ingredients,
        model,
        &request.ks,
        &request.ms,
        sigmas,
        &request.ingredients,
        request.free_parameters.eta,
        request.free_parameters.b,
    )?;
    if request.verbose {
        info!("{profile}");
    }

    let mut profiles = BTreeMap::new();
    profiles.insert(MATTER_TRACER.to_string(), profile);

    let engine_request = EngineRequest {
        ks: &request.ks,
        pk_lin,
        ms: &request.ms,
        sigmas,
        profiles: &profiles,
        suppression,
        fast_calc: request.fast_calc,
        only_equilateral: request.only_equilateral,
    };
    let terms = engine
        .bispectrum(&engine_request)
        .map_err(|source| HmError::backend("bispectrum engine", source))?;

    combine_terms(&request.ks, &terms, blending)
}

/// Blends the matter channel of the three halo terms and reshapes everything
/// into (N, N, N) cubes.
fn combine_terms(
    ks: &[f64],
    terms: &BispectrumTerms,
    blending: BlendingExponents,
) -> HmResult<BispectrumDecomposition> {
    let channel = tracer_channel(MATTER_TRACER);
    let one_halo = terms.channel(Term::OneHalo, &channel)?;
    let two_halo = terms.channel(Term::TwoHalo, &channel)?;
    let three_halo = terms.channel(Term::ThreeHalo, &channel)?;

    let combined = blend_contributions(one_halo, two_halo, three_halo, blending)?;
    let n = ks.len();
    Ok(BispectrumDecomposition {
        combined: reshape_cube(combined, n)?,
        one_halo: reshape_cube(one_halo.to_vec(), n)?,
        two_halo: reshape_cube(two_halo.to_vec(), n)?,
        three_halo: reshape_cube(three_halo.to_vec(), n)?,
    })
}
