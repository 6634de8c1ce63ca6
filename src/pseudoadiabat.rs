//! Fixed step integration along a pseudo-adiabat.
//!
//! There is no closed form for a moist adiabat, so temperature is integrated with 4th order
//! Runge-Kutta in `ln(p)`. The same stepper draws the background moist adiabats and lifts parcels
//! above their LCL.
use crate::{
    error::{AnalysisError, Result},
    isopleths::Sampling,
    projection::ThermoPoint,
    thermo::{check_pressure, pseudoadiabatic_lapse},
};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
use tracing::warn;

/// Integration state: the current pressure and temperature on a pseudo-adiabat.
#[derive(Debug, Clone)]
pub struct MoistStepper {
    // hPa
    pressure: f64,
    // Kelvin
    temperature: f64,
    // Largest pressure change for a single step, hPa
    max_step: f64,
    budget: Option<usize>,
    steps: usize,
}

impl MoistStepper {
    /// Start integrating at `start` with the step size and budget from `sampling`.
    pub fn new(start: ThermoPoint, sampling: &Sampling) -> Result<Self> {
        let (pressure, temperature) = check_start(start)?;
        let max_step = sampling.step.unpack();
        if !max_step.is_finite() || max_step <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "integration step must be positive, got {} hPa",
                max_step
            )));
        }

        Ok(MoistStepper {
            pressure,
            temperature,
            max_step,
            budget: sampling.max_steps,
            steps: 0,
        })
    }

    /// Jump to `start` and keep counting steps against the same budget. A curve integrated
    /// outward from a point in both directions uses this to spend one budget.
    pub fn restart_at(&mut self, start: ThermoPoint) -> Result<()> {
        let (pressure, temperature) = check_start(start)?;
        self.pressure = pressure;
        self.temperature = temperature;
        Ok(())
    }

    /// The current point on the pseudo-adiabat.
    #[inline]
    pub fn state(&self) -> ThermoPoint {
        ThermoPoint {
            pressure: HectoPascal(self.pressure),
            temperature: Celsius::from(Kelvin(self.temperature)),
        }
    }

    /// Number of steps taken so far.
    #[inline]
    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Take a single Runge-Kutta step to `next_pressure` (hPa).
    ///
    /// On failure the state is left at the last valid sample.
    pub fn step(&mut self, next_pressure: f64) -> Result<()> {
        if let Some(budget) = self.budget {
            if self.steps >= budget {
                return Err(AnalysisError::StepBudgetExhausted {
                    budget,
                    pressure: self.pressure,
                });
            }
        }

        let x0 = self.pressure.ln();
        let h = next_pressure.ln() - x0;
        let t0 = self.temperature;
        let f = |x: f64, t: f64| pseudoadiabatic_lapse(x.exp(), t);

        let k1 = f(x0, t0);
        let k2 = f(x0 + h / 2.0, t0 + h / 2.0 * k1);
        let k3 = f(x0 + h / 2.0, t0 + h / 2.0 * k2);
        let k4 = f(x0 + h, t0 + h * k3);

        let t1 = t0 + h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);

        if !t1.is_finite() || t1 <= 0.0 {
            warn!(
                pressure = self.pressure,
                next_pressure, "pseudo-adiabat integration diverged"
            );
            return Err(AnalysisError::IntegrationDivergence {
                pressure: self.pressure,
            });
        }

        self.pressure = next_pressure;
        self.temperature = t1;
        self.steps += 1;

        Ok(())
    }

    /// Integrate to `target`, in equal steps of `ln(p)` no larger than the configured step size.
    pub fn advance_to(&mut self, target: HectoPascal) -> Result<ThermoPoint> {
        let target = check_pressure(target)?;

        if target == self.pressure {
            return Ok(self.state());
        }

        // Equal steps in ln(p) are widest in hPa at the high pressure end.
        let p_hi = self.pressure.max(target);
        let p_lo = self.pressure.min(target);
        let num_steps = if self.max_step >= p_hi {
            1
        } else {
            let max_dx = (p_hi / (p_hi - self.max_step)).ln();
            // A span of a whole number of steps may round just above it.
            ((p_hi / p_lo).ln() / max_dx - 1.0e-9).ceil().max(1.0) as usize
        };

        let x0 = self.pressure.ln();
        let dx = (target.ln() - x0) / num_steps as f64;

        for i in 1..num_steps {
            self.step((x0 + dx * i as f64).exp())?;
        }
        // Land exactly on the target.
        self.step(target)?;

        Ok(self.state())
    }
}

fn check_start(start: ThermoPoint) -> Result<(f64, f64)> {
    let pressure = check_pressure(start.pressure)?;
    let temperature = Kelvin::from(start.temperature).unpack();
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "starting temperature must be above absolute zero, got {} K",
            temperature
        )));
    }

    Ok((pressure, temperature))
}
