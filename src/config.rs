//! Configuration for building a diagram.
//!
//! Everything the engine needs beyond the sounding itself lives in a `DiagramConfig`. It is plain
//! data, so it can be built in code, deserialized with `serde`, or parsed from TOML:
//!
//! ```rust
//! use skewt_engine::DiagramConfig;
//!
//! let config = DiagramConfig::from_toml_str(
//!     r#"
//!     skew_slope = 35.0
//!     pressure_min_hpa = 200.0
//!     step_hpa = 2.5
//!
//!     [labels]
//!     mixing_ratios_gkg = [1.0, 4.0, 10.0]
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.skew_slope, 35.0);
//! assert_eq!(config.pressure_max_hpa, 1050.0);
//! ```
use crate::{
    error::{AnalysisError, Result},
    isopleths::{PressureRange, Sampling},
};
use metfor::HectoPascal;
use serde::{Deserialize, Serialize};

/// Options recognized by the projection, the isopleth generators, and the parcel integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagramConfig {
    /// Horizontal shear, &deg;C of x per unit of `ln(p_ref / p)`.
    pub skew_slope: f64,
    /// Pressure at the origin of the vertical axis, hPa.
    pub reference_pressure_hpa: f64,
    /// Top of the plot, hPa.
    pub pressure_min_hpa: f64,
    /// Bottom of the plot, hPa.
    pub pressure_max_hpa: f64,
    /// Pressure where isotherm labels are placed along the x-axis, hPa.
    pub tick_pressure_hpa: f64,
    /// Sampling and integration resolution, hPa.
    pub step_hpa: f64,
    /// Convergence tolerance for the LCL search, hPa.
    pub pressure_tolerance_hpa: f64,
    /// Iteration bound for root finding.
    pub max_root_iterations: usize,
    /// Positive buoyancy layers thinner than this are treated as transient, hPa.
    pub min_buoyant_layer_hpa: f64,
    /// Compare parcel and environment virtual temperatures instead of temperatures.
    pub virtual_temperature: bool,
    /// Optional limit on the number of integration steps per curve.
    pub max_integration_steps: Option<usize>,
    /// The label values of the background isopleths.
    pub labels: IsoplethLabels,
}

/// Label values of the background isopleth families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IsoplethLabels {
    /// Potential temperatures of the dry adiabats, Kelvin.
    pub dry_adiabats_k: Vec<f64>,
    /// Wet bulb potential temperatures of the moist adiabats, &deg;C.
    pub moist_adiabats_c: Vec<f64>,
    /// Saturation mixing ratios, g/kg.
    pub mixing_ratios_gkg: Vec<f64>,
    /// Isotherms, &deg;C.
    pub isotherms_c: Vec<f64>,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        DiagramConfig {
            skew_slope: 40.0,
            reference_pressure_hpa: 1000.0,
            pressure_min_hpa: 100.0,
            pressure_max_hpa: 1050.0,
            tick_pressure_hpa: 1025.0,
            step_hpa: 5.0,
            pressure_tolerance_hpa: 0.1,
            max_root_iterations: 100,
            min_buoyant_layer_hpa: 20.0,
            virtual_temperature: false,
            max_integration_steps: None,
            labels: IsoplethLabels::default(),
        }
    }
}

impl Default for IsoplethLabels {
    fn default() -> Self {
        IsoplethLabels {
            dry_adiabats_k: (0..21).map(|i| 250.0 + 10.0 * f64::from(i)).collect(),
            moist_adiabats_c: (0..12).map(|i| -16.0 + 4.0 * f64::from(i)).collect(),
            mixing_ratios_gkg: vec![0.4, 1.0, 2.0, 3.0, 5.0, 8.0, 12.0, 16.0, 20.0],
            isotherms_c: (0..28).map(|i| -200.0 + 10.0 * f64::from(i)).collect(),
        }
    }
}

impl DiagramConfig {
    /// Parse and validate a configuration from TOML. Missing keys take their default values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DiagramConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the options for consistency.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(AnalysisError::InvalidConfig(msg));

        if !self.skew_slope.is_finite() {
            return bad(format!("skew_slope must be finite, got {}", self.skew_slope));
        }

        for (name, val) in &[
            ("reference_pressure_hpa", self.reference_pressure_hpa),
            ("pressure_min_hpa", self.pressure_min_hpa),
            ("pressure_max_hpa", self.pressure_max_hpa),
            ("tick_pressure_hpa", self.tick_pressure_hpa),
            ("step_hpa", self.step_hpa),
            ("pressure_tolerance_hpa", self.pressure_tolerance_hpa),
        ] {
            if !val.is_finite() || *val <= 0.0 {
                return bad(format!("{} must be positive, got {}", name, val));
            }
        }

        if self.pressure_min_hpa >= self.pressure_max_hpa {
            return bad(format!(
                "pressure_min_hpa ({}) must be below pressure_max_hpa ({})",
                self.pressure_min_hpa, self.pressure_max_hpa
            ));
        }

        if !self.min_buoyant_layer_hpa.is_finite() || self.min_buoyant_layer_hpa < 0.0 {
            return bad(format!(
                "min_buoyant_layer_hpa must not be negative, got {}",
                self.min_buoyant_layer_hpa
            ));
        }

        if self.max_root_iterations == 0 {
            return bad("max_root_iterations must be at least 1".to_owned());
        }

        if self.labels.mixing_ratios_gkg.iter().any(|&w| w <= 0.0) {
            return bad("mixing ratio labels must be positive".to_owned());
        }

        Ok(())
    }

    /// The plotted pressure range.
    #[inline]
    pub fn pressure_range(&self) -> PressureRange {
        PressureRange {
            bottom: HectoPascal(self.pressure_max_hpa),
            top: HectoPascal(self.pressure_min_hpa),
        }
    }

    /// Sampling parameters for the isopleth generators.
    #[inline]
    pub fn sampling(&self) -> Sampling {
        Sampling {
            range: self.pressure_range(),
            step: HectoPascal(self.step_hpa),
            max_steps: self.max_integration_steps,
        }
    }
}
