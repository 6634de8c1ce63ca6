//! Parcels and the ways to pick one out of a profile.
use crate::{
    error::{AnalysisError, Result},
    profile::EnvironmentProfile,
    sounding::DataRow,
    thermo::{
        dew_point_from_mixing_ratio, equivalent_potential_temperature, mixing_ratio,
        potential_temperature, temperature_from_theta, virtual_temperature,
    },
};
use itertools::izip;
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};

/// Variables defining a parcel as used in parcel analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcel {
    /// Temperature in C
    pub temperature: Celsius,
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Dew point in C
    pub dew_point: Celsius,
}

impl Parcel {
    /// Get the potential temperature of the parcel.
    pub fn theta(&self) -> Result<Kelvin> {
        potential_temperature(self.pressure, self.temperature)
    }

    /// Get the equivalent potential temperature of the parcel.
    pub fn theta_e(&self) -> Result<Kelvin> {
        equivalent_potential_temperature(self.pressure, self.temperature, self.dew_point)
    }

    /// Get the mixing ratio of the parcel in kg/kg.
    pub fn mixing_ratio(&self) -> Result<f64> {
        mixing_ratio(self.pressure, self.dew_point)
    }

    /// Get the virtual temperature of the parcel.
    pub fn virtual_temperature(&self) -> Result<Celsius> {
        virtual_temperature(self.pressure, self.temperature, self.dew_point)
    }

    /// Is the parcel at 100% relative humidity?
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.dew_point >= self.temperature
    }

    /// Try to convert a `DataRow` to a `Parcel`.
    pub fn from_datarow(row: DataRow) -> Option<Self> {
        let temperature = row.temperature.into_option()?;
        let pressure = row.pressure.into_option()?;
        let dew_point = row.dew_point.into_option()?;

        Some(Parcel {
            temperature,
            pressure,
            dew_point,
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let (p, t, td) = (
            self.pressure.unpack(),
            self.temperature.unpack(),
            self.dew_point.unpack(),
        );

        if !p.is_finite() || p <= 0.0 {
            return Err(AnalysisError::InvalidPressure(p));
        }
        if !t.is_finite() || !td.is_finite() || Kelvin::from(self.dew_point).unpack() <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "parcel temperature {} C and dew point {} C must be physical",
                t, td
            )));
        }
        if td > t {
            return Err(AnalysisError::InvalidInput(format!(
                "parcel dew point {} C exceeds its temperature {} C",
                td, t
            )));
        }

        Ok(())
    }
}

/// Where to start lifting a parcel from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParcelOrigin {
    /// A level of the profile, 0 is the lowest.
    Index(usize),
    /// Explicit starting values.
    Values(Parcel),
}

impl From<usize> for ParcelOrigin {
    fn from(idx: usize) -> Self {
        ParcelOrigin::Index(idx)
    }
}

impl From<Parcel> for ParcelOrigin {
    fn from(parcel: Parcel) -> Self {
        ParcelOrigin::Values(parcel)
    }
}

impl ParcelOrigin {
    /// The starting parcel in `profile`.
    ///
    /// Fails with `InvalidInput` for an index past the top of the profile, for values with a dew
    /// point above the temperature, and for values outside the profile.
    pub fn resolve(&self, profile: &EnvironmentProfile) -> Result<Parcel> {
        let parcel = match *self {
            ParcelOrigin::Index(idx) => profile
                .data_row(idx)
                .and_then(Parcel::from_datarow)
                .ok_or_else(|| {
                    AnalysisError::InvalidInput(format!(
                        "origin index {} is past the top of a profile with {} levels",
                        idx,
                        profile.len()
                    ))
                })?,
            ParcelOrigin::Values(parcel) => parcel,
        };

        parcel.validate()?;

        if !profile.contains(parcel.pressure) {
            return Err(AnalysisError::InvalidInput(format!(
                "origin pressure {} hPa is outside the profile ({} - {} hPa)",
                parcel.pressure.unpack(),
                profile.top_pressure().unpack(),
                profile.bottom_pressure().unpack()
            )));
        }

        Ok(parcel)
    }
}

/// Get a surface parcel, the lowest level of the profile.
pub fn surface_parcel(profile: &EnvironmentProfile) -> Parcel {
    Parcel {
        pressure: profile.bottom_pressure(),
        temperature: profile.temperature()[0],
        dew_point: profile.dew_point()[0],
    }
}

/// Get a parcel at a pressure level, interpolating the profile if needed.
pub fn pressure_parcel(profile: &EnvironmentProfile, pressure: HectoPascal) -> Result<Parcel> {
    Ok(Parcel {
        pressure,
        temperature: profile.temperature_at(pressure)?,
        dew_point: profile.dew_point_at(pressure)?,
    })
}

/// Create a mixed layer parcel.
///
/// The parcel has the mean potential temperature and mean mixing ratio of the levels in the lowest
/// 100 hPa of the profile, and starts at the bottom of the profile.
pub fn mixed_layer_parcel(profile: &EnvironmentProfile) -> Result<Parcel> {
    let bottom_p = profile.bottom_pressure();
    let top_p = bottom_p - HectoPascal(100.0);

    let (sum_theta, sum_mw, count) = izip!(
        profile.pressure(),
        profile.temperature(),
        profile.dew_point()
    )
    .take_while(|(&p, _, _)| p >= top_p)
    .try_fold((0.0f64, 0.0f64, 0.0f64), |acc, (&p, &t, &dp)| {
        let (sum_theta, sum_mw, count) = acc;
        let theta = potential_temperature(p, t)?.unpack();
        let mw = mixing_ratio(p, dp)?;
        Ok::<_, AnalysisError>((sum_theta + theta, sum_mw + mw, count + 1.0))
    })?;

    // The bottom level is always included.
    debug_assert!(count >= 1.0);

    let theta = Kelvin(sum_theta / count);
    let mw = sum_mw / count;

    let temperature = temperature_from_theta(theta, bottom_p)?;
    let dew_point = dew_point_from_mixing_ratio(bottom_p, mw)?;

    Ok(Parcel {
        temperature,
        pressure: bottom_p,
        dew_point: if dew_point > temperature {
            temperature
        } else {
            dew_point
        },
    })
}

/// Get the most unstable parcel.
///
/// This is the level in the lowest 300 hPa of the profile with the highest equivalent potential
/// temperature.
pub fn most_unstable_parcel(profile: &EnvironmentProfile) -> Result<Parcel> {
    let top_p = profile.bottom_pressure() - HectoPascal(300.0);

    let (_, parcel) = izip!(
        profile.pressure(),
        profile.temperature(),
        profile.dew_point()
    )
    .take_while(|(&p, _, _)| p >= top_p)
    .map(|(&pressure, &temperature, &dew_point)| Parcel {
        temperature,
        pressure,
        dew_point,
    })
    .try_fold(
        (std::f64::MIN, surface_parcel(profile)),
        |(max_theta_e, max_parcel), pcl| {
            let theta_e = pcl.theta_e()?.unpack();
            if theta_e > max_theta_e {
                Ok::<_, AnalysisError>((theta_e, pcl))
            } else {
                Ok((max_theta_e, max_parcel))
            }
        },
    )?;

    Ok(parcel)
}
