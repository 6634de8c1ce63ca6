//! Lift a parcel and analyze its buoyancy against the environment.
use crate::{
    config::DiagramConfig,
    error::Result,
    keys::ParcelIndex,
    parcel::{Parcel, ParcelOrigin},
    profile::EnvironmentProfile,
    projection::ThermoPoint,
};
use metfor::{Celsius, HectoPascal, JpKg, Meters, MetersPSec, Quantity};
use optional::{some, Optioned};
use strum_macros::{AsRefStr, Display};

pub(crate) mod lift;

/// The part of the ascent a trajectory sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Segment {
    /// Unsaturated, following a dry adiabat. This includes the LCL itself.
    Dry,
    /// Saturated, following a pseudo-adiabat.
    Moist,
}

/// A single sample along the path of a lifted parcel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Parcel temperature in C, never virtual temperature.
    pub temperature: Celsius,
    /// Which phase of the ascent produced this sample.
    pub segment: Segment,
}

/// The path of a lifted parcel from its origin to the top of the plot range, ordered by
/// decreasing pressure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParcelTrajectory {
    points: Vec<TrajectoryPoint>,
}

impl ParcelTrajectory {
    pub(crate) fn new(points: Vec<TrajectoryPoint>) -> Self {
        ParcelTrajectory { points }
    }

    /// All the samples.
    #[inline]
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The samples from one phase of the ascent.
    pub fn segment(&self, segment: Segment) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter().filter(move |pnt| pnt.segment == segment)
    }

    /// Strip the segment tags, ready for projection.
    pub fn thermo_points(&self) -> Vec<ThermoPoint> {
        self.points
            .iter()
            .map(|pnt| ThermoPoint {
                pressure: pnt.pressure,
                temperature: pnt.temperature,
            })
            .collect()
    }
}

/// Hold profiles for a parcel and its environment where both exist.
///
/// Temperatures are virtual temperatures if the analysis was configured to use them, and
/// zero crossings of the buoyancy are included as levels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParcelProfile {
    /// Pressure profile
    pub pressure: Vec<HectoPascal>,
    /// Height above the parcel origin
    pub height: Vec<Meters>,
    /// Parcel temperature profile
    pub parcel_t: Vec<Celsius>,
    /// Environment temperature profile
    pub environment_t: Vec<Celsius>,
}

/// Parcel analysis, this is a way to package the analysis of a parcel.
#[derive(Debug, Clone)]
pub struct ParcelAscentAnalysis {
    // The orginal parcel and what it did
    parcel: Parcel,
    trajectory: ParcelTrajectory,
    profile: ParcelProfile,

    lcl_pressure: HectoPascal,
    lcl_temperature: Celsius,
    lcl_height_agl: Optioned<Meters>, // Cloud base

    lfc_pressure: Optioned<HectoPascal>,
    lfc_temperature: Optioned<Celsius>,
    lfc_height_agl: Optioned<Meters>,

    el_pressure: Optioned<HectoPascal>,
    el_temperature: Optioned<Celsius>, // Compare to satellite cloud tops
    el_height_agl: Optioned<Meters>,

    cape: JpKg,
    cin: JpKg,
    ncape: Optioned<f64>,
}

impl ParcelAscentAnalysis {
    /// The parcel that was lifted.
    #[inline]
    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    /// The path of the lifted parcel, tagged by segment.
    #[inline]
    pub fn trajectory(&self) -> &ParcelTrajectory {
        &self.trajectory
    }

    /// Retrieve the parcel's profile
    #[inline]
    pub fn profile(&self) -> &ParcelProfile {
        &self.profile
    }

    /// Get the LCL pressure level.
    pub fn lcl_pressure(&self) -> HectoPascal {
        self.lcl_pressure
    }

    /// Get the temperature at the LCL.
    pub fn lcl_temperature(&self) -> Celsius {
        self.lcl_temperature
    }

    /// Get the LCL height above the parcel origin. Missing if the LCL is above the top of the
    /// environment data.
    pub fn lcl_height_agl(&self) -> Optioned<Meters> {
        self.lcl_height_agl
    }

    /// Get the pressure at the LFC.
    pub fn lfc_pressure(&self) -> Optioned<HectoPascal> {
        self.lfc_pressure
    }

    /// Get the parcel temperature at the LFC.
    pub fn lfc_temperature(&self) -> Optioned<Celsius> {
        self.lfc_temperature
    }

    /// Get the height of the LFC above the parcel origin.
    pub fn lfc_height_agl(&self) -> Optioned<Meters> {
        self.lfc_height_agl
    }

    /// Get the pressure at the equilibrium level.
    pub fn el_pressure(&self) -> Optioned<HectoPascal> {
        self.el_pressure
    }

    /// Get the parcel temperature at the equilibrium level.
    pub fn el_temperature(&self) -> Optioned<Celsius> {
        self.el_temperature
    }

    /// Get the height of the equilibrium level above the parcel origin.
    pub fn el_height_agl(&self) -> Optioned<Meters> {
        self.el_height_agl
    }

    /// Get the CAPE, zero when there is no free convection.
    pub fn cape(&self) -> JpKg {
        self.cape
    }

    /// Get the CIN, zero or negative.
    pub fn cin(&self) -> JpKg {
        self.cin
    }

    /// Get the normalized cape.
    pub fn ncape(&self) -> Optioned<f64> {
        self.ncape
    }

    /// Calculate the parcel vertical speed at the equilibrium level. Note that this is an over
    /// estimate of updraft speed due to the effects of entrainment and water/ice loading.
    #[inline]
    pub fn cape_speed(&self) -> MetersPSec {
        MetersPSec(f64::sqrt(2.0 * self.cape.unpack()))
    }

    /// Look up an index by key.
    pub fn index(&self, key: ParcelIndex) -> Optioned<f64> {
        use crate::keys::ParcelIndex::*;

        match key {
            LCLPressure => some(self.lcl_pressure.unpack()),
            LCLTemperature => some(self.lcl_temperature.unpack()),
            LCLHeightAGL => self.lcl_height_agl.map_t(|h| h.unpack()),
            LFCPressure => self.lfc_pressure.map_t(|p| p.unpack()),
            LFCTemperature => self.lfc_temperature.map_t(|t| t.unpack()),
            LFCHeightAGL => self.lfc_height_agl.map_t(|h| h.unpack()),
            ELPressure => self.el_pressure.map_t(|p| p.unpack()),
            ELTemperature => self.el_temperature.map_t(|t| t.unpack()),
            ELHeightAGL => self.el_height_agl.map_t(|h| h.unpack()),
            CAPE => some(self.cape.unpack()),
            CIN => some(self.cin.unpack()),
            NCAPE => self.ncape,
            CAPESpeed => some(self.cape_speed().unpack()),
        }
    }
}

/// Lift a parcel for a convective parcel analysis.
///
/// The origin is either a level of `profile`, by index, or an explicit `Parcel`. The parcel
/// rises dry adiabatically to its LCL and then pseudo-adiabatically to the top of the plot range
/// in `config`. A profile without a persistent positively buoyant layer is not an error, it has
/// zero CAPE and no LFC or EL.
///
/// ```
/// use skewt_engine::{lift_parcel, DiagramConfig, EnvironmentProfile};
/// use metfor::{Celsius, HectoPascal, Quantity};
///
/// let profile = EnvironmentProfile::new(
///     &[HectoPascal(1000.0), HectoPascal(850.0), HectoPascal(500.0), HectoPascal(200.0)],
///     &[Celsius(30.0), Celsius(17.0), Celsius(-14.0), Celsius(-58.0)],
///     &[Celsius(22.0), Celsius(11.0), Celsius(-25.0), Celsius(-70.0)],
/// )
/// .unwrap();
///
/// let anal = lift_parcel(&profile, 0usize, &DiagramConfig::default()).unwrap();
/// assert!(anal.cape().unpack() > 0.0);
/// assert!(anal.lcl_pressure() < HectoPascal(1000.0));
/// ```
pub fn lift_parcel<O>(
    profile: &EnvironmentProfile,
    origin: O,
    config: &DiagramConfig,
) -> Result<ParcelAscentAnalysis>
where
    O: Into<ParcelOrigin>,
{
    lift::lift_parcel(profile, origin.into(), config)
}
