//! The skewed log-pressure plane.
//!
//! The vertical coordinate is `y = ln(p_ref / p)`, so equal pressure ratios are equally spaced and
//! y increases upward. The horizontal coordinate shears temperature by height, `x = T + s y` with
//! T in &deg;C and `s` the configured skew slope. Isotherms become straight diagonal lines and
//! isobars stay horizontal.
use crate::{
    config::DiagramConfig,
    error::{AnalysisError, Result},
    isopleths::PressureRange,
    profile::EnvironmentProfile,
    thermo::{check_pressure, check_temperature},
};
use itertools::{izip, Itertools};
use metfor::{Celsius, HectoPascal, Quantity};

/// A point in physical (pressure, temperature) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoPoint {
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Temperature in C
    pub temperature: Celsius,
}

/// A point on the plot plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    /// Skewed horizontal coordinate.
    pub x: f64,
    /// Log-pressure vertical coordinate.
    pub y: f64,
}

/// Temperature and dew point traces of a sounding on the plot plane.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileTraces {
    /// The environmental temperature.
    pub temperature: Vec<PlotPoint>,
    /// The environmental dew point.
    pub dew_point: Vec<PlotPoint>,
}

/// Bidirectional mapping between physical coordinates and the plot plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewTProjection {
    skew_slope: f64,
    reference_pressure: f64,
    tick_pressure: f64,
    range: PressureRange,
}

impl SkewTProjection {
    /// Build the projection described by `config`.
    pub fn new(config: &DiagramConfig) -> Result<Self> {
        config.validate()?;

        Ok(SkewTProjection {
            skew_slope: config.skew_slope,
            reference_pressure: config.reference_pressure_hpa,
            tick_pressure: config.tick_pressure_hpa,
            range: config.pressure_range(),
        })
    }

    /// The horizontal shear.
    #[inline]
    pub fn skew_slope(&self) -> f64 {
        self.skew_slope
    }

    /// The range of pressures that may be projected.
    #[inline]
    pub fn pressure_range(&self) -> PressureRange {
        self.range
    }

    /// Map a pressure and temperature onto the plot plane.
    ///
    /// Fails with `InvalidPressure` for non-positive pressures, `OutOfRange` for pressures
    /// outside the plot, and `InvalidInput` for temperatures that are not finite or are below
    /// absolute zero.
    pub fn to_plot(&self, pressure: HectoPascal, temperature: Celsius) -> Result<PlotPoint> {
        let y = self.isobar_y(pressure)?;
        let x = check_temperature(temperature)? + self.skew_slope * y;

        Ok(PlotPoint { x, y })
    }

    /// Map a `ThermoPoint` onto the plot plane.
    #[inline]
    pub fn project(&self, pnt: ThermoPoint) -> Result<PlotPoint> {
        self.to_plot(pnt.pressure, pnt.temperature)
    }

    /// Map a point on the plot plane back to pressure and temperature. This is the algebraic
    /// inverse of `to_plot` and works anywhere on the plane.
    pub fn to_physical(&self, pnt: PlotPoint) -> ThermoPoint {
        let pressure = self.reference_pressure * (-pnt.y).exp();
        let temperature = pnt.x - self.skew_slope * pnt.y;

        ThermoPoint {
            pressure: HectoPascal(pressure),
            temperature: Celsius(temperature),
        }
    }

    /// The vertical coordinate of an isobar.
    pub fn isobar_y(&self, pressure: HectoPascal) -> Result<f64> {
        let p = check_pressure(pressure)?;
        if !self.range.contains(pressure) {
            return Err(AnalysisError::OutOfRange {
                pressure: p,
                top: self.range.top.unpack(),
                bottom: self.range.bottom.unpack(),
            });
        }

        Ok((self.reference_pressure / p).ln())
    }

    /// The x position of the label for an isotherm, measured at the tick pressure.
    #[inline]
    pub fn isotherm_tick(&self, temperature: Celsius) -> f64 {
        temperature.unpack() + self.skew_slope * (self.reference_pressure / self.tick_pressure).ln()
    }

    /// Project a whole curve, failing at the first point that cannot be projected.
    pub fn project_curve(&self, pnts: &[ThermoPoint]) -> Result<Vec<PlotPoint>> {
        pnts.iter().map(|&pnt| self.project(pnt)).collect()
    }

    /// Project a curve, silently dropping points outside the plot.
    pub fn project_clipped(&self, pnts: &[ThermoPoint]) -> Vec<PlotPoint> {
        pnts.iter()
            .filter_map(|&pnt| self.project(pnt).ok())
            .collect()
    }

    /// Project the temperature and dew point of a sounding, clipped to the plot.
    pub fn project_profile(&self, profile: &EnvironmentProfile) -> ProfileTraces {
        let (temperature, dew_point): (Vec<_>, Vec<_>) = izip!(
            profile.pressure(),
            profile.temperature(),
            profile.dew_point()
        )
        .filter_map(|(&p, &t, &dp)| {
            let t_pnt = self.to_plot(p, t).ok()?;
            let dp_pnt = self.to_plot(p, dp).ok()?;
            Some((t_pnt, dp_pnt))
        })
        .unzip();

        ProfileTraces {
            temperature,
            dew_point,
        }
    }

    /// Horizontal extent of the visible part of a sounding, padded on both sides by `padding`.
    ///
    /// Returns `None` if no level of the sounding is inside the plot.
    pub fn horizontal_limits(
        &self,
        profile: &EnvironmentProfile,
        padding: f64,
    ) -> Option<(f64, f64)> {
        let traces = self.project_profile(profile);

        traces
            .temperature
            .iter()
            .chain(traces.dew_point.iter())
            .map(|pnt| pnt.x)
            .minmax()
            .into_option()
            .map(|(min, max)| (min - padding, max + padding))
    }
}
