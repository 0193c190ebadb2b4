//! Physical constants and naming conventions of the halo-model pipeline.

/// Critical-collapse overdensity of the spherical-collapse model.
pub const DELTA_COLLAPSE: f64 = 1.686;

/// Halo overdensity relative to the mean matter density.
pub const HALO_OVERDENSITY: f64 = 200.0;

/// Critical density of the universe in (Msun/h) / (Mpc/h)^3.
pub const RHO_CRITICAL: f64 = 2.7754e11;

/// Tracer name of the matter field.
pub const MATTER_TRACER: &str = "m";
