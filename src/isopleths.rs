//! Generate the background curves of the diagram.
//!
//! Every curve is a sequence of `ThermoPoint`s on a common pressure grid, ordered from the bottom
//! of the plot (highest pressure) to the top. Curves in a family are independent, so families are
//! generated in parallel.
use crate::{
    config::DiagramConfig,
    error::{AnalysisError, Result},
    projection::ThermoPoint,
    pseudoadiabat::MoistStepper,
    thermo::{check_pressure, check_temperature, dew_point_from_mixing_ratio_c, dry_adiabat_k, P0},
};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
use rayon::prelude::*;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tracing::trace;

/// The mandatory levels of upper air observations, hPa.
pub const MANDATORY_LEVELS: [f64; 11] = [
    1000.0, 925.0, 850.0, 700.0, 500.0, 400.0, 300.0, 250.0, 200.0, 150.0, 100.0,
];

/// A range of pressures, bottom is the higher pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureRange {
    /// Highest pressure, the bottom of the range.
    pub bottom: HectoPascal,
    /// Lowest pressure, the top of the range.
    pub top: HectoPascal,
}

impl PressureRange {
    /// Create a range, checking both ends are valid pressures and the bottom is below the top.
    pub fn new(bottom: HectoPascal, top: HectoPascal) -> Result<Self> {
        let range = PressureRange { bottom, top };
        range.validate()?;
        Ok(range)
    }

    /// Is `pressure` inside this range, ends inclusive?
    #[inline]
    pub fn contains(&self, pressure: HectoPascal) -> bool {
        pressure <= self.bottom && pressure >= self.top
    }

    fn validate(&self) -> Result<(f64, f64)> {
        let bottom = check_pressure(self.bottom)?;
        let top = check_pressure(self.top)?;
        if top >= bottom {
            return Err(AnalysisError::InvalidInput(format!(
                "the top of a pressure range ({} hPa) must be below the bottom ({} hPa)",
                top, bottom
            )));
        }

        Ok((bottom, top))
    }
}

/// How to sample a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    /// The range the curves cover.
    pub range: PressureRange,
    /// Distance between samples, and the largest integration step.
    pub step: HectoPascal,
    /// Optional limit on integration steps for each curve.
    pub max_steps: Option<usize>,
}

impl Sampling {
    /// The sample pressures, from the bottom of the range to the top at `step` intervals. Both ends
    /// of the range are always included.
    pub fn pressure_grid(&self) -> Result<Vec<HectoPascal>> {
        let (bottom, top) = self.range.validate()?;
        let step = self.step.unpack();
        if !step.is_finite() || step <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "sampling step must be positive, got {} hPa",
                step
            )));
        }

        let num_steps = ((bottom - top) / step).ceil() as usize;
        let min_gap = step * 1.0e-6;

        let mut grid: Vec<HectoPascal> = (0..num_steps)
            .map(|i| bottom - step * i as f64)
            .take_while(|&p| p > top + min_gap)
            .map(HectoPascal)
            .collect();
        grid.push(HectoPascal(top));

        Ok(grid)
    }
}

/// The kinds of background curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum IsoplethKind {
    /// Constant potential temperature, labelled in Kelvin.
    DryAdiabat,
    /// Constant wet bulb potential temperature, labelled in &deg;C.
    MoistAdiabat,
    /// Constant saturation mixing ratio, labelled in g/kg.
    MixingRatio,
    /// Constant temperature, labelled in &deg;C.
    Isotherm,
}

/// A single labelled background curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Isopleth {
    /// What kind of curve this is.
    pub kind: IsoplethKind,
    /// The label value in the units of its kind.
    pub label: f64,
    /// Samples from the bottom of the plot to the top.
    pub points: Vec<ThermoPoint>,
}

/// A dry adiabat, Poisson's equation evaluated on the sampling grid.
pub fn dry_adiabat(theta: Kelvin, sampling: &Sampling) -> Result<Isopleth> {
    let theta_k = theta.unpack();
    if !theta_k.is_finite() || theta_k <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "potential temperature must be positive, got {} K",
            theta_k
        )));
    }

    let points = sampling
        .pressure_grid()?
        .into_iter()
        .map(|p| ThermoPoint {
            pressure: p,
            temperature: Celsius::from(Kelvin(dry_adiabat_k(theta_k, p.unpack()))),
        })
        .collect();

    Ok(finish(IsoplethKind::DryAdiabat, theta_k, points))
}

/// A pseudo-adiabat labelled by its wet bulb potential temperature, the temperature where it
/// crosses 1000 hPa.
pub fn moist_adiabat(theta_w: Celsius, sampling: &Sampling) -> Result<Isopleth> {
    let grid = sampling.pressure_grid()?;
    let start = ThermoPoint {
        pressure: P0,
        temperature: theta_w,
    };

    // Integrate outward from the reference level in both directions.
    let split = grid.iter().take_while(|&&p| p > P0).count();
    let (below, above) = grid.split_at(split);

    let mut points: Vec<ThermoPoint> = Vec::with_capacity(grid.len());

    let mut stepper = MoistStepper::new(start, sampling)?;
    for &p in below.iter().rev() {
        points.push(stepper.advance_to(p)?);
    }
    points.reverse();

    // One step budget covers both directions.
    stepper.restart_at(start)?;
    for &p in above {
        points.push(stepper.advance_to(p)?);
    }

    Ok(finish(IsoplethKind::MoistAdiabat, theta_w.unpack(), points))
}

/// A saturation mixing ratio line, `mixing_ratio` in g/kg.
pub fn mixing_ratio_line(mixing_ratio: f64, sampling: &Sampling) -> Result<Isopleth> {
    if !mixing_ratio.is_finite() || mixing_ratio <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "mixing ratio must be positive, got {} g/kg",
            mixing_ratio
        )));
    }

    let w = mixing_ratio / 1000.0;
    let points = sampling
        .pressure_grid()?
        .into_iter()
        .map(|p| {
            let td = dew_point_from_mixing_ratio_c(p.unpack(), w).ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "{} g/kg at {} hPa is outside the saturation range of liquid water",
                    mixing_ratio,
                    p.unpack()
                ))
            })?;

            Ok(ThermoPoint {
                pressure: p,
                temperature: Celsius(td),
            })
        })
        .collect::<Result<Vec<ThermoPoint>>>()?;

    Ok(finish(IsoplethKind::MixingRatio, mixing_ratio, points))
}

/// An isotherm.
pub fn isotherm(temperature: Celsius, sampling: &Sampling) -> Result<Isopleth> {
    check_temperature(temperature)?;

    let points = sampling
        .pressure_grid()?
        .into_iter()
        .map(|p| ThermoPoint {
            pressure: p,
            temperature,
        })
        .collect();

    Ok(finish(IsoplethKind::Isotherm, temperature.unpack(), points))
}

/// A family of dry adiabats, in the order of `thetas`.
pub fn dry_adiabats(thetas: &[Kelvin], sampling: &Sampling) -> Result<Vec<Isopleth>> {
    family(thetas, |theta| dry_adiabat(theta, sampling))
}

/// A family of moist adiabats, in the order of `theta_ws`.
pub fn moist_adiabats(theta_ws: &[Celsius], sampling: &Sampling) -> Result<Vec<Isopleth>> {
    family(theta_ws, |theta_w| moist_adiabat(theta_w, sampling))
}

/// A family of mixing ratio lines, values in g/kg.
pub fn mixing_ratio_lines(mixing_ratios: &[f64], sampling: &Sampling) -> Result<Vec<Isopleth>> {
    family(mixing_ratios, |w| mixing_ratio_line(w, sampling))
}

/// A family of isotherms.
pub fn isotherms(temperatures: &[Celsius], sampling: &Sampling) -> Result<Vec<Isopleth>> {
    family(temperatures, |t| isotherm(t, sampling))
}

/// The mandatory levels that fall inside `range`.
pub fn standard_isobars(range: &PressureRange) -> Vec<HectoPascal> {
    MANDATORY_LEVELS
        .iter()
        .cloned()
        .map(HectoPascal)
        .filter(|&p| range.contains(p))
        .collect()
}

fn family<L, F>(labels: &[L], generator: F) -> Result<Vec<Isopleth>>
where
    L: Copy + Send + Sync,
    F: Fn(L) -> Result<Isopleth> + Send + Sync,
{
    labels.par_iter().map(|&label| generator(label)).collect()
}

fn finish(kind: IsoplethKind, label: f64, points: Vec<ThermoPoint>) -> Isopleth {
    trace!(%kind, label, num_points = points.len(), "generated isopleth");
    Isopleth {
        kind,
        label,
        points,
    }
}

/// Every background curve of a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    /// Dry adiabats
    pub dry_adiabats: Vec<Isopleth>,
    /// Moist adiabats
    pub moist_adiabats: Vec<Isopleth>,
    /// Mixing ratio lines
    pub mixing_ratio_lines: Vec<Isopleth>,
    /// Isotherms
    pub isotherms: Vec<Isopleth>,
    /// Pressures of the horizontal grid lines.
    pub isobars: Vec<HectoPascal>,
}

impl Background {
    /// Generate the families listed in `config.labels` over the configured pressure range.
    pub fn generate(config: &DiagramConfig) -> Result<Self> {
        config.validate()?;

        let sampling = config.sampling();
        let labels = &config.labels;

        let thetas: Vec<Kelvin> = labels.dry_adiabats_k.iter().cloned().map(Kelvin).collect();
        let theta_ws: Vec<Celsius> = labels.moist_adiabats_c.iter().cloned().map(Celsius).collect();
        let temperatures: Vec<Celsius> = labels.isotherms_c.iter().cloned().map(Celsius).collect();

        Ok(Background {
            dry_adiabats: dry_adiabats(&thetas, &sampling)?,
            moist_adiabats: moist_adiabats(&theta_ws, &sampling)?,
            mixing_ratio_lines: mixing_ratio_lines(&labels.mixing_ratios_gkg, &sampling)?,
            isotherms: isotherms(&temperatures, &sampling)?,
            isobars: standard_isobars(&sampling.range),
        })
    }

    /// Iterate over every curve regardless of kind.
    pub fn curves(&self) -> impl Iterator<Item = &Isopleth> {
        self.dry_adiabats
            .iter()
            .chain(self.moist_adiabats.iter())
            .chain(self.mixing_ratio_lines.iter())
            .chain(self.isotherms.iter())
    }
}
