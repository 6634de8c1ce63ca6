//! Thermodynamic constants and the unit model used throughout the engine.
//!
//! Public functions take and return `metfor` unit types and wrap the `metfor` formulas, turning
//! their `None` results into errors. Internally the numerics run on plain `f64` values in hPa,
//! &deg;C, Kelvin, and kg/kg; the `pub(crate)` kernels at the bottom of this module are shared by
//! the isopleth generators and the parcel integrator so both use exactly the same physics.
//!
//! Saturation vapor pressure is the Alduchov and Eskridge (1997) Magnus form used by
//! `metfor::vapor_pressure_water`, valid from -80 to 50 &deg;C. Equivalent potential temperature is
//! the AMS glossary formula of `metfor::equiv_pot_temperature`. The latent heat in the
//! pseudo-adiabatic lapse rate is the Rogers and Yau fit of
//! `metfor::latent_heat_of_condensation_vaporization`.
//!
//! Air colder than -80 &deg;C holds so little vapor that the kernels treat it as dry.
use crate::error::{AnalysisError, Result};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};

/// Gas constant for dry air, J / (kg K).
pub const RD: f64 = metfor::Rd.0;
/// Gas constant for water vapor, J / (kg K).
pub const RV: f64 = metfor::Rv.0;
/// Specific heat of dry air at constant pressure, J / (kg K).
pub const CP: f64 = metfor::cpd.0;
/// Poisson constant, R / cp.
pub const KAPPA: f64 = RD / CP;
/// Ratio of the molecular weight of water to dry air.
pub const EPSILON: f64 = metfor::epsilon;
/// Gravitational acceleration, m / s^2. Positive, unlike `metfor::g`.
pub const G: f64 = -metfor::g;
/// Reference pressure for potential temperature.
pub const P0: HectoPascal = HectoPascal(1000.0);
/// Kelvin temperature of 0 &deg;C.
pub const CELSIUS_OFFSET: f64 = 273.15;

/// Coldest temperature, &deg;C, covered by the vapor pressure fit.
pub(crate) const MIN_VAPOR_TEMPERATURE_C: f64 = -80.0;

/// Convert a pressure in hPa to Pascals.
#[inline]
pub fn hpa_to_pa(pressure: HectoPascal) -> f64 {
    pressure.unpack() * 100.0
}

/// Convert a pressure in Pascals to hPa.
#[inline]
pub fn pa_to_hpa(pascals: f64) -> HectoPascal {
    HectoPascal(pascals / 100.0)
}

/// Saturation vapor pressure over liquid water. Fails outside -80 to 50 &deg;C.
pub fn saturation_vapor_pressure(temperature: Celsius) -> Result<HectoPascal> {
    let t = check_temperature(temperature)?;
    metfor::vapor_pressure_water(Celsius(t)).ok_or_else(|| out_of_vapor_range(t))
}

/// The temperature at which `vapor_pressure` is the saturation vapor pressure, i.e. the dew point.
pub fn dew_point_from_vapor_pressure(vapor_pressure: HectoPascal) -> Result<Celsius> {
    let e = vapor_pressure.unpack();
    if !e.is_finite() || e <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "vapor pressure must be positive, got {} hPa",
            e
        )));
    }

    metfor::dew_point_from_vapor_pressure_water(vapor_pressure).ok_or_else(|| {
        AnalysisError::InvalidInput(format!(
            "a vapor pressure of {} hPa is outside the saturation range of liquid water",
            e
        ))
    })
}

/// Mixing ratio (kg/kg) of air at `pressure` with dew point `dew_point`.
pub fn mixing_ratio(pressure: HectoPascal, dew_point: Celsius) -> Result<f64> {
    let p = check_pressure(pressure)?;
    let e = saturation_vapor_pressure(dew_point)?;
    if e.unpack() >= p {
        return Err(AnalysisError::InvalidPressure(p));
    }

    metfor::mixing_ratio(dew_point, pressure).ok_or(AnalysisError::InvalidPressure(p))
}

/// Saturation mixing ratio (kg/kg) at `pressure` and `temperature`.
#[inline]
pub fn saturation_mixing_ratio(pressure: HectoPascal, temperature: Celsius) -> Result<f64> {
    mixing_ratio(pressure, temperature)
}

/// Dew point of air at `pressure` holding `mixing_ratio` kg/kg of water vapor.
pub fn dew_point_from_mixing_ratio(pressure: HectoPascal, mixing_ratio: f64) -> Result<Celsius> {
    let p = check_pressure(pressure)?;
    if !mixing_ratio.is_finite() || mixing_ratio <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "mixing ratio must be positive, got {}",
            mixing_ratio
        )));
    }

    dew_point_from_mixing_ratio_c(p, mixing_ratio)
        .map(Celsius)
        .ok_or_else(|| {
            AnalysisError::InvalidInput(format!(
                "a mixing ratio of {} at {} hPa is outside the saturation range of liquid water",
                mixing_ratio, p
            ))
        })
}

/// Relative humidity as a fraction (0 to 1 for sub-saturated air).
pub fn relative_humidity(temperature: Celsius, dew_point: Celsius) -> Result<f64> {
    let t = check_temperature(temperature)?;
    let td = check_temperature(dew_point)?;
    metfor::rh(temperature, dew_point).ok_or_else(|| out_of_vapor_range(t.min(td)))
}

/// Dew point from the temperature and a relative humidity fraction.
pub fn dew_point_from_relative_humidity(temperature: Celsius, rh: f64) -> Result<Celsius> {
    if !rh.is_finite() || rh <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "relative humidity must be positive, got {}",
            rh
        )));
    }

    let es = saturation_vapor_pressure(temperature)?;
    dew_point_from_vapor_pressure(HectoPascal(rh * es.unpack()))
}

/// Convert a mixing ratio (kg/kg) at `pressure` and `temperature` into a relative humidity
/// fraction.
pub fn relative_humidity_from_mixing_ratio(
    pressure: HectoPascal,
    temperature: Celsius,
    mixing_ratio: f64,
) -> Result<f64> {
    let dew_point = dew_point_from_mixing_ratio(pressure, mixing_ratio)?;
    relative_humidity(temperature, dew_point)
}

/// Convert a relative humidity fraction at `pressure` and `temperature` into a mixing ratio
/// (kg/kg).
pub fn mixing_ratio_from_relative_humidity(
    pressure: HectoPascal,
    temperature: Celsius,
    rh: f64,
) -> Result<f64> {
    let dew_point = dew_point_from_relative_humidity(temperature, rh)?;
    mixing_ratio(pressure, dew_point)
}

/// Potential temperature, `T (P0 / p)^(R/cp)`.
pub fn potential_temperature(pressure: HectoPascal, temperature: Celsius) -> Result<Kelvin> {
    check_pressure(pressure)?;
    check_temperature(temperature)?;
    Ok(metfor::potential_temperature(pressure, temperature))
}

/// Temperature on the dry adiabat `theta` at `pressure`, Poisson's equation.
pub fn temperature_from_theta(theta: Kelvin, pressure: HectoPascal) -> Result<Celsius> {
    let p = check_pressure(pressure)?;
    let theta_k = theta.unpack();
    if !theta_k.is_finite() || theta_k <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "potential temperature must be positive, got {} K",
            theta_k
        )));
    }

    Ok(Celsius::from(Kelvin(dry_adiabat_k(theta_k, p))))
}

/// Virtual temperature of air at `pressure` with `temperature` and `dew_point`.
///
/// A dew point below -80 &deg;C means the air is effectively dry and the virtual temperature is
/// the temperature.
pub fn virtual_temperature(
    pressure: HectoPascal,
    temperature: Celsius,
    dew_point: Celsius,
) -> Result<Celsius> {
    let p = check_pressure(pressure)?;
    let t_k = Kelvin::from(Celsius(check_temperature(temperature)?)).unpack();
    let td_k = Kelvin::from(Celsius(check_temperature(dew_point)?)).unpack();

    Ok(Celsius::from(Kelvin(virtual_temperature_k(p, t_k, td_k))))
}

/// Equivalent potential temperature, the AMS glossary formula without condensate.
pub fn equivalent_potential_temperature(
    pressure: HectoPascal,
    temperature: Celsius,
    dew_point: Celsius,
) -> Result<Kelvin> {
    // Checks the pressure, the dew point, and that the vapor pressure is below the pressure.
    mixing_ratio(pressure, dew_point)?;
    let t = check_temperature(temperature)?;

    metfor::equiv_pot_temperature(temperature, dew_point, pressure)
        .ok_or_else(|| out_of_vapor_range(t))
}

/// Pseudo-adiabatic lapse rate `dT / d ln(p)` in Kelvin for saturated air at `pressure` and
/// `temperature`.
pub fn pseudoadiabatic_lapse_rate(pressure: HectoPascal, temperature: Celsius) -> Result<f64> {
    let p = check_pressure(pressure)?;
    let t_k = Kelvin::from(Celsius(check_temperature(temperature)?)).unpack();
    let rate = pseudoadiabatic_lapse(p, t_k);
    if rate.is_finite() {
        Ok(rate)
    } else {
        Err(AnalysisError::InvalidPressure(p))
    }
}

/// Unpack a pressure, failing for zero, negative, and non-finite values.
#[inline]
pub(crate) fn check_pressure(pressure: HectoPascal) -> Result<f64> {
    let p = pressure.unpack();
    if p.is_finite() && p > 0.0 {
        Ok(p)
    } else {
        Err(AnalysisError::InvalidPressure(p))
    }
}

/// Unpack a temperature, failing for non-finite values and values below absolute zero.
#[inline]
pub(crate) fn check_temperature(temperature: Celsius) -> Result<f64> {
    let t = temperature.unpack();
    if t.is_finite() && t > -CELSIUS_OFFSET {
        Ok(t)
    } else {
        Err(AnalysisError::InvalidInput(format!(
            "temperature must be finite and above absolute zero, got {} C",
            t
        )))
    }
}

fn out_of_vapor_range(t_c: f64) -> AnalysisError {
    AnalysisError::InvalidInput(format!(
        "{} C is outside the -80 to 50 C range of the vapor pressure fit",
        t_c
    ))
}

//
// f64 kernels, hPa / Celsius / Kelvin / kg/kg. Callers check pressures and temperatures first.
//

/// `None` when the result falls outside the vapor pressure fit.
#[inline]
pub(crate) fn dew_point_from_mixing_ratio_c(p_hpa: f64, w: f64) -> Option<f64> {
    if w.is_nan() || w <= 0.0 {
        return None;
    }

    metfor::dew_point_from_p_and_mw(HectoPascal(p_hpa), w).map(|td| td.unpack())
}

/// Zero below -80 &deg;C, NaN when the saturation vapor pressure exceeds the total pressure or
/// the temperature is above the vapor pressure fit.
#[inline]
pub(crate) fn saturation_mixing_ratio_kgkg(p_hpa: f64, t_c: f64) -> f64 {
    if t_c < MIN_VAPOR_TEMPERATURE_C {
        0.0
    } else if t_c.is_nan() || t_c <= -CELSIUS_OFFSET || p_hpa.is_nan() || p_hpa <= 0.0 {
        std::f64::NAN
    } else {
        metfor::mixing_ratio(Celsius(t_c), HectoPascal(p_hpa)).unwrap_or(std::f64::NAN)
    }
}

#[inline]
pub(crate) fn dry_adiabat_k(theta_k: f64, p_hpa: f64) -> f64 {
    metfor::temperature_from_pot_temp(Kelvin(theta_k), HectoPascal(p_hpa)).unpack()
}

/// The temperature itself when the dew point is too cold for the vapor pressure fit.
#[inline]
pub(crate) fn virtual_temperature_k(p_hpa: f64, t_k: f64, td_k: f64) -> f64 {
    if td_k.is_nan() || td_k <= 0.0 || t_k.is_nan() || t_k <= 0.0 {
        return t_k;
    }

    metfor::virtual_temperature(Kelvin(t_k), Kelvin(td_k), HectoPascal(p_hpa))
        .map_or(t_k, |tv| tv.unpack())
}

/// `dT / d ln p` along a pseudo-adiabat. NaN where the saturation mixing ratio is undefined.
#[inline]
pub(crate) fn pseudoadiabatic_lapse(p_hpa: f64, t_k: f64) -> f64 {
    if t_k.is_nan() || t_k <= 0.0 {
        return std::f64::NAN;
    }

    let t_c = t_k - CELSIUS_OFFSET;
    let rs = saturation_mixing_ratio_kgkg(p_hpa, t_c);
    let lv = latent_heat(t_c);
    (RD * t_k + lv * rs) / (CP + lv * lv * rs * EPSILON / (RD * t_k * t_k))
}

/// The fit is evaluated at the ends of its range outside -100 to 60 &deg;C.
#[inline]
fn latent_heat(t_c: f64) -> f64 {
    metfor::latent_heat_of_condensation_vaporization(Celsius(t_c.max(-100.0).min(60.0)))
        .map_or(std::f64::NAN, |lv| lv.unpack())
}
