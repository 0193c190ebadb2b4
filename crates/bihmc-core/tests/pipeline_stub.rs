//! End-to-end pipeline behavior against stub collaborators.

use bihmc_core::bispectrum::{BispectrumEngine, BispectrumTerms, EngineRequest};
use bihmc_core::domain::{BackendError, BackendResult, ConfigError, Cosmology, HmError};
use bihmc_core::halo::HaloIngredients;
use bihmc_core::pipeline::{bispectrum_from_cosmology, bispectrum_from_table, BispectrumRequest};
use bihmc_core::power::{CosmologyBackend, SigmaSource};
use ndarray::Array2;
use std::cell::{Cell, RefCell};

const KS: [f64; 3] = [0.01, 0.1, 1.0];
const MS: [f64; 5] = [1.0e12, 1.0e13, 1.0e14, 1.0e15, 1.0e16];

struct CountingSigma {
    calls: Cell<usize>,
}

impl CountingSigma {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }
}

impl SigmaSource for CountingSigma {
    fn sigma_r(&self, radii: &[f64], _z: f64) -> BackendResult<Vec<f64>> {
        self.calls.set(self.calls.get() + 1);
        // Mildly decreasing in radius, as a realistic variance would be.
        Ok(radii
            .iter()
            .enumerate()
            .map(|(index, _)| 2.0 / (1.0 + index as f64))
            .collect())
    }
}

struct UnitIngredients;

impl HaloIngredients for UnitIngredients {
    fn concentration(
        &self,
        ms: &[f64],
        _z: f64,
        _method: &str,
        _halo_definition: &str,
    ) -> BackendResult<Vec<f64>> {
        Ok(vec![4.0; ms.len()])
    }

    fn window_function(
        &self,
        ks: &[f64],
        _virial_radii: &[f64],
        concentrations: &[f64],
        _profile: &str,
    ) -> BackendResult<Array2<f64>> {
        Ok(Array2::ones((ks.len(), concentrations.len())))
    }
}

/// Emits constant per-term contributions sized by the request flags and
/// counts invocations.
struct StubEngine {
    calls: Cell<usize>,
    seen_pk: RefCell<Vec<f64>>,
}

impl StubEngine {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
            seen_pk: RefCell::new(Vec::new()),
        }
    }
}

impl BispectrumEngine for StubEngine {
    fn bispectrum(&self, request: &EngineRequest<'_>) -> BackendResult<BispectrumTerms> {
        self.calls.set(self.calls.get() + 1);
        *self.seen_pk.borrow_mut() = request.pk_lin.to_vec();

        let n = request.ks.len();
        let triangles = if request.only_equilateral {
            n
        } else {
            n * n * n
        };

        let mut terms = BispectrumTerms::default();
        let channel = "m-m-m".to_string();
        terms.one_halo.insert(channel.clone(), vec![1.0; triangles]);
        terms.two_halo.insert(channel.clone(), vec![2.0; triangles]);
        terms
            .three_halo
            .insert(channel.clone(), vec![3.0; triangles]);
        terms.sum.insert(channel, vec![6.0; triangles]);
        Ok(terms)
    }
}

fn reference_request() -> BispectrumRequest {
    let mut request = BispectrumRequest::new(KS.to_vec(), MS.to_vec());
    request.free_parameters.f = Some(0.0);
    request.free_parameters.kd = Some(1.0);
    request.free_parameters.nd = Some(1.0);
    request
}

#[test]
fn reference_scenario_returns_four_cubes_with_additive_combination() {
    let request = reference_request();
    let engine = StubEngine::new();
    let pk_lin = vec![1.0; KS.len()];

    let decomposition = bispectrum_from_table(
        &request,
        0.3,
        0.0,
        &pk_lin,
        &CountingSigma::new(),
        &UnitIngredients,
        &engine,
    )
    .expect("pipeline should succeed");

    assert_eq!(decomposition.combined.dim(), (3, 3, 3));
    assert_eq!(decomposition.one_halo.dim(), (3, 3, 3));
    assert_eq!(decomposition.two_halo.dim(), (3, 3, 3));
    assert_eq!(decomposition.three_halo.dim(), (3, 3, 3));
    assert_eq!(decomposition.grid_len(), 3);

    // alpha1 = alpha2 = 1 reduces the blend to the plain sum of terms.
    for index in decomposition.combined.indexed_iter() {
        let (position, &combined) = index;
        let sum = decomposition.one_halo[position]
            + decomposition.two_halo[position]
            + decomposition.three_halo[position];
        assert!(
            (combined - sum).abs() < 1.0e-12,
            "at {position:?}: {combined} != {sum}"
        );
    }
}

#[test]
fn missing_required_parameter_fails_before_any_collaborator_call() {
    let mut request = reference_request();
    request.free_parameters.nd = None;

    let sigma = CountingSigma::new();
    let engine = StubEngine::new();
    let pk_lin = vec![1.0; KS.len()];

    let error = bispectrum_from_table(
        &request,
        0.3,
        0.0,
        &pk_lin,
        &sigma,
        &UnitIngredients,
        &engine,
    )
    .expect_err("missing nd must fail");

    assert_eq!(
        error,
        HmError::Config(ConfigError::MissingFreeParameter { name: "nd" })
    );
    assert_eq!(sigma.calls.get(), 0, "sigma source must not be consulted");
    assert_eq!(engine.calls.get(), 0, "engine must not be invoked");
}

#[test]
fn zero_blending_exponent_is_a_configuration_error() {
    let mut request = reference_request();
    request.free_parameters.alpha2 = 0.0;

    let error = bispectrum_from_table(
        &request,
        0.3,
        0.0,
        &[1.0; 3],
        &CountingSigma::new(),
        &UnitIngredients,
        &StubEngine::new(),
    )
    .expect_err("zero alpha2 must fail");
    assert_eq!(
        error,
        HmError::Config(ConfigError::ZeroBlendingExponent { name: "alpha2" })
    );
}

#[test]
fn equilateral_only_output_fails_the_cubic_reshape() {
    let mut request = reference_request();
    request.only_equilateral = true;

    let error = bispectrum_from_table(
        &request,
        0.3,
        0.0,
        &[1.0; 3],
        &CountingSigma::new(),
        &UnitIngredients,
        &StubEngine::new(),
    )
    .expect_err("3 values cannot fill a 27-cell cube");

    match error {
        HmError::Shape(shape) => {
            assert_eq!(shape.n, 3);
            assert_eq!(shape.expected, 27);
            assert_eq!(shape.actual, 3);
        }
        other => panic!("expected a shape error, got {other:?}"),
    }
}

#[test]
fn collaborator_failures_keep_their_stage() {
    struct FailingIngredients;

    impl HaloIngredients for FailingIngredients {
        fn concentration(
            &self,
            _ms: &[f64],
            _z: f64,
            method: &str,
            _halo_definition: &str,
        ) -> BackendResult<Vec<f64>> {
            Err(BackendError::UnknownModel {
                kind: "concentration",
                name: method.to_string(),
            })
        }

        fn window_function(
            &self,
            _ks: &[f64],
            _virial_radii: &[f64],
            _concentrations: &[f64],
            _profile: &str,
        ) -> BackendResult<Array2<f64>> {
            unreachable!("window function is never reached after a concentration failure")
        }
    }

    let mut request = reference_request();
    request.ingredients.concentration = "Bogus et al. (2099)".to_string();

    let error = bispectrum_from_table(
        &request,
        0.3,
        0.0,
        &[1.0; 3],
        &CountingSigma::new(),
        &FailingIngredients,
        &StubEngine::new(),
    )
    .expect_err("unknown relation must propagate");

    match error {
        HmError::Backend { stage, source } => {
            assert_eq!(stage, "concentration");
            assert!(source.to_string().contains("Bogus et al. (2099)"));
        }
        other => panic!("expected a backend error, got {other:?}"),
    }
}

/// Cosmology backend returning Mpc-unit quantities and recording the grids it
/// was asked for.
struct RecordingCosmology {
    cosmology: Cosmology,
    seen_ks: RefCell<Vec<f64>>,
    seen_radii: RefCell<Vec<f64>>,
}

impl RecordingCosmology {
    fn new(h: f64) -> Self {
        Self {
            cosmology: Cosmology {
                omega_m: 0.3,
                omega_c: 0.25,
                omega_b: 0.05,
                h,
                n_s: 0.96,
                sigma8: 0.8,
            },
            seen_ks: RefCell::new(Vec::new()),
            seen_radii: RefCell::new(Vec::new()),
        }
    }
}

impl CosmologyBackend for RecordingCosmology {
    fn cosmology(&self) -> &Cosmology {
        &self.cosmology
    }

    fn sigma_r(&self, radii_mpc: &[f64], _scale_factor: f64) -> BackendResult<Vec<f64>> {
        *self.seen_radii.borrow_mut() = radii_mpc.to_vec();
        Ok(vec![1.0; radii_mpc.len()])
    }

    fn linear_power(&self, ks_per_mpc: &[f64], _scale_factor: f64) -> BackendResult<Vec<f64>> {
        *self.seen_ks.borrow_mut() = ks_per_mpc.to_vec();
        Ok(vec![1.0; ks_per_mpc.len()])
    }

    fn linear_power_no_wiggle(
        &self,
        ks_per_mpc: &[f64],
        _scale_factor: f64,
    ) -> BackendResult<Vec<f64>> {
        Ok(vec![1.0; ks_per_mpc.len()])
    }
}

#[test]
fn cosmology_variant_converts_grids_and_power_through_h() {
    let request = reference_request();
    let backend = RecordingCosmology::new(0.5);
    let engine = StubEngine::new();

    bispectrum_from_cosmology(&request, 1.0, true, &backend, &UnitIngredients, &engine)
        .expect("pipeline should succeed");

    // Wavenumbers handed to the backend are rescaled into 1/Mpc.
    let seen_ks = backend.seen_ks.borrow();
    for (seen, requested) in seen_ks.iter().zip(&KS) {
        assert!((seen - requested * 0.5).abs() < 1.0e-12);
    }
    assert!(!backend.seen_radii.borrow().is_empty());

    // Backend power of 1 Mpc^3 reaches the engine as h^3 (Mpc/h)^3, and a
    // spectrum equal to its no-wiggle twin survives dewiggling unchanged.
    let seen_pk = engine.seen_pk.borrow();
    assert_eq!(seen_pk.len(), KS.len());
    for value in seen_pk.iter() {
        assert!((value - 0.125).abs() < 1.0e-12, "pk was {value}");
    }
}
