#![warn(missing_docs)]
/*!
Thermodynamic engine for drawing SkewT-LogP diagrams.

The engine maps physical `(pressure, temperature)` points onto the skewed log-pressure plane,
generates the background isopleths (dry adiabats, moist adiabats, mixing ratio lines,
isotherms and isobars), and lifts parcels through a sounding to find the LCL, LFC, EL, CAPE,
and CIN. Everything is a pure function of its inputs, so independent profiles or families can
be computed on as many threads as you like. Drawing is left to the caller, every output is a
plain sequence of points.

Data flows in through a [`Sounding`](struct.Sounding.html), a loosely checked container of
profiles that a decoder fills in, which is validated into an
[`EnvironmentProfile`](struct.EnvironmentProfile.html) before any analysis.

```
use skewt_engine::{lift_parcel, Background, DiagramConfig, EnvironmentProfile, SkewTProjection};
use metfor::{Celsius, HectoPascal};

let config = DiagramConfig::default();
let projection = SkewTProjection::new(&config).unwrap();
let background = Background::generate(&config).unwrap();

let profile = EnvironmentProfile::new(
    &[HectoPascal(1000.0), HectoPascal(850.0), HectoPascal(500.0), HectoPascal(200.0)],
    &[Celsius(30.0), Celsius(17.0), Celsius(-14.0), Celsius(-58.0)],
    &[Celsius(22.0), Celsius(11.0), Celsius(-25.0), Celsius(-70.0)],
)
.unwrap();

let parcel = lift_parcel(&profile, 0usize, &config).unwrap();
let parcel_curve = projection.project_clipped(&parcel.trajectory().thermo_points());
let env_curves = projection.project_profile(&profile);

assert!(!background.dry_adiabats.is_empty());
assert_eq!(parcel_curve.len(), parcel.trajectory().len());
assert_eq!(env_curves.temperature.len(), profile.len());
```
*/

//
// API
//
pub use crate::{
    config::{DiagramConfig, IsoplethLabels},
    error::{AnalysisError, Result},
    interpolation::{log_p_interpolate, log_p_interpolate_wind},
    isopleths::{
        dry_adiabat, dry_adiabats, isotherm, isotherms, mixing_ratio_line, mixing_ratio_lines,
        moist_adiabat, moist_adiabats, standard_isobars, Background, Isopleth, IsoplethKind,
        PressureRange, Sampling, MANDATORY_LEVELS,
    },
    keys::ParcelIndex,
    parcel::{
        mixed_layer_parcel, most_unstable_parcel, pressure_parcel, surface_parcel, Parcel,
        ParcelOrigin,
    },
    parcel_profile::{
        lift_parcel, ParcelAscentAnalysis, ParcelProfile, ParcelTrajectory, Segment,
        TrajectoryPoint,
    },
    profile::EnvironmentProfile,
    projection::{PlotPoint, ProfileTraces, SkewTProjection, ThermoPoint},
    pseudoadiabat::MoistStepper,
    sounding::{DataRow, Sounding, StationInfo},
};

pub mod thermo;

#[doc(hidden)]
pub use crate::sounding::doctest;

//
// Internal use only
//
mod config;
mod error;
mod interpolation;
mod isopleths;
mod keys;
mod parcel;
mod parcel_profile;
mod profile;
mod projection;
mod pseudoadiabat;
mod sounding;
mod utility;

#[cfg(test)]
mod test_data;
