//! The validated environment a parcel rises through.
//!
//! A `Sounding` may be unsorted, have gaps, or contain levels that are physically impossible. An
//! `EnvironmentProfile` is built from one (or from plain arrays) by dropping incomplete levels,
//! checking what is left, and sorting it by decreasing pressure. Once built it is immutable and
//! every level has a pressure, temperature, and dew point.
use crate::{
    error::{AnalysisError, Result},
    interpolation::{bracket, log_p_interp, log_p_interpolate, log_p_interpolate_wind},
    sounding::{DataRow, Sounding},
    thermo::{virtual_temperature, G, RD},
};
use itertools::Itertools;
use metfor::{Celsius, HectoPascal, Kelvin, Knots, Meters, Quantity, WindSpdDir};
use optional::{some, Optioned};
use tracing::{debug, warn};

/// A sorted, gap free profile of pressure, temperature, and dew point.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentProfile {
    pressure: Vec<HectoPascal>,
    temperature: Vec<Celsius>,
    dew_point: Vec<Celsius>,
    height: Vec<Optioned<Meters>>,
    wind: Vec<Optioned<WindSpdDir<Knots>>>,
}

impl EnvironmentProfile {
    /// Build a profile from parallel arrays. Any pressure unit convertible to hPa and any
    /// temperature unit convertible to &deg;C may be used.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{HectoPascal, Kelvin, Quantity};
    /// use skewt_engine::EnvironmentProfile;
    ///
    /// let profile = EnvironmentProfile::new(
    ///     &[HectoPascal(850.0), HectoPascal(1000.0)],
    ///     &[Kelvin(283.15), Kelvin(293.15)],
    ///     &[Kelvin(273.15), Kelvin(283.15)],
    /// )
    /// .unwrap();
    ///
    /// // Sorted with the surface first.
    /// assert_eq!(profile.bottom_pressure(), HectoPascal(1000.0));
    /// assert!((profile.temperature()[0].unpack() - 20.0).abs() < 1.0e-9);
    /// ```
    pub fn new<P, T>(pressure: &[P], temperature: &[T], dew_point: &[T]) -> Result<Self>
    where
        P: Copy,
        T: Copy,
        HectoPascal: From<P>,
        Celsius: From<T>,
    {
        if pressure.len() != temperature.len() || pressure.len() != dew_point.len() {
            return Err(AnalysisError::MalformedProfile(format!(
                "mismatched profile lengths: {} pressures, {} temperatures, {} dew points",
                pressure.len(),
                temperature.len(),
                dew_point.len()
            )));
        }

        let rows = build_rows(pressure, temperature, dew_point)?;
        Self::from_rows(rows)
    }

    /// Validate and normalize the levels of a sounding.
    ///
    /// Levels missing a pressure, temperature, or dew point are dropped, as are levels below the
    /// station pressure when it is known.
    ///
    /// ```rust
    /// use metfor::HectoPascal;
    /// use skewt_engine::{doctest::make_test_sounding, EnvironmentProfile};
    ///
    /// let snd = make_test_sounding();
    /// let profile = EnvironmentProfile::from_sounding(&snd).unwrap();
    ///
    /// assert_eq!(profile.len(), 5);
    /// assert_eq!(profile.bottom_pressure(), HectoPascal(1005.0));
    /// ```
    pub fn from_sounding(snd: &Sounding) -> Result<Self> {
        let station_pressure = snd.station_pressure().into_option();

        let rows: Vec<DataRow> = snd
            .rows()
            .filter(DataRow::is_complete)
            .filter(|row| match (station_pressure, row.pressure.into_option()) {
                (Some(sfc_p), Some(p)) => p <= sfc_p,
                _ => true,
            })
            .collect();

        let num_dropped = snd.pressure_profile().len() - rows.len();
        if num_dropped > 0 {
            debug!(
                num_dropped,
                source = snd.source_description().unwrap_or("unknown"),
                "dropped incomplete or below ground levels"
            );
        }

        Self::from_rows(rows)
    }

    fn from_rows(rows: Vec<DataRow>) -> Result<Self> {
        let mut levels = rows
            .iter()
            .map(validate_row)
            .collect::<Result<Vec<Level>>>()?;

        if levels.len() < 2 {
            return Err(AnalysisError::MalformedProfile(format!(
                "at least 2 complete levels are required, found {}",
                levels.len()
            )));
        }

        let is_sorted = levels
            .iter()
            .tuple_windows::<(_, _)>()
            .all(|(lower, upper)| lower.pressure >= upper.pressure);
        if !is_sorted {
            warn!("profile not in order of decreasing pressure, sorting");
            levels.sort_by(|a, b| {
                b.pressure
                    .partial_cmp(&a.pressure)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        if let Some((dup, _)) = levels
            .iter()
            .tuple_windows::<(_, _)>()
            .find(|(lower, upper)| lower.pressure == upper.pressure)
        {
            return Err(AnalysisError::MalformedProfile(format!(
                "duplicate pressure level {} hPa",
                dup.pressure.unpack()
            )));
        }

        let profile = EnvironmentProfile {
            pressure: levels.iter().map(|lvl| lvl.pressure).collect(),
            temperature: levels.iter().map(|lvl| lvl.temperature).collect(),
            dew_point: levels.iter().map(|lvl| lvl.dew_point).collect(),
            height: levels.iter().map(|lvl| lvl.height).collect(),
            wind: levels.iter().map(|lvl| lvl.wind).collect(),
        };

        debug!(
            levels = profile.len(),
            bottom = profile.bottom_pressure().unpack(),
            top = profile.top_pressure().unpack(),
            "built environment profile"
        );

        Ok(profile)
    }

    /// Pressure of every level, surface first.
    #[inline]
    pub fn pressure(&self) -> &[HectoPascal] {
        &self.pressure
    }

    /// Temperature of every level.
    #[inline]
    pub fn temperature(&self) -> &[Celsius] {
        &self.temperature
    }

    /// Dew point of every level.
    #[inline]
    pub fn dew_point(&self) -> &[Celsius] {
        &self.dew_point
    }

    /// Geopotential heights, where known.
    #[inline]
    pub fn height(&self) -> &[Optioned<Meters>] {
        &self.height
    }

    /// Winds, where known.
    #[inline]
    pub fn wind(&self) -> &[Optioned<WindSpdDir<Knots>>] {
        &self.wind
    }

    /// Number of levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Always false, a profile has at least two levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Pressure of the lowest level.
    #[inline]
    pub fn bottom_pressure(&self) -> HectoPascal {
        self.pressure[0]
    }

    /// Pressure of the highest level.
    #[inline]
    pub fn top_pressure(&self) -> HectoPascal {
        self.pressure[self.pressure.len() - 1]
    }

    /// Is `pressure` between the bottom and top of the profile, inclusive?
    #[inline]
    pub fn contains(&self, pressure: HectoPascal) -> bool {
        pressure <= self.bottom_pressure() && pressure >= self.top_pressure()
    }

    /// Get the level at `idx` as a `DataRow`.
    pub fn data_row(&self, idx: usize) -> Option<DataRow> {
        if idx >= self.len() {
            return None;
        }

        Some(DataRow {
            pressure: some(self.pressure[idx]),
            temperature: some(self.temperature[idx]),
            dew_point: some(self.dew_point[idx]),
            wind: self.wind[idx],
            height: self.height[idx],
        })
    }

    /// Temperature at `pressure`, interpolated linearly in `ln(p)`.
    pub fn temperature_at(&self, pressure: HectoPascal) -> Result<Celsius> {
        self.interpolate(pressure, &self.temperature)
    }

    /// Dew point at `pressure`, interpolated linearly in `ln(p)`.
    pub fn dew_point_at(&self, pressure: HectoPascal) -> Result<Celsius> {
        self.interpolate(pressure, &self.dew_point)
    }

    /// Virtual temperature at `pressure`, from the interpolated temperature and dew point.
    pub fn virtual_temperature_at(&self, pressure: HectoPascal) -> Result<Kelvin> {
        let t = self.temperature_at(pressure)?;
        let td = self.dew_point_at(pressure)?;

        virtual_temperature(pressure, t, td).map(Kelvin::from)
    }

    /// Every variable at `pressure`. Heights and winds are missing if either neighboring level
    /// lacks them.
    pub fn level_at(&self, pressure: HectoPascal) -> Result<DataRow> {
        let temperature = self.temperature_at(pressure)?;
        let dew_point = self.dew_point_at(pressure)?;

        Ok(DataRow {
            pressure: some(pressure),
            temperature: some(temperature),
            dew_point: some(dew_point),
            wind: log_p_interpolate_wind(&self.pressure, &self.wind, pressure),
            height: log_p_interpolate(&self.pressure, &self.height, pressure),
        })
    }

    /// Interpolate the profile onto a new set of pressures. Every pressure in `grid` must be
    /// inside the profile.
    pub fn resample(&self, grid: &[HectoPascal]) -> Result<EnvironmentProfile> {
        let rows = grid
            .iter()
            .map(|&p| self.level_at(p))
            .collect::<Result<Vec<DataRow>>>()?;

        Self::from_rows(rows)
    }

    /// Thickness of the layer between two pressures by the hypsometric equation, using the mean
    /// virtual temperature of the profile in between.
    pub fn thickness(&self, bottom: HectoPascal, top: HectoPascal) -> Result<Meters> {
        if top > bottom {
            return Ok(Meters(-self.thickness(top, bottom)?.unpack()));
        }

        let mut levels: Vec<HectoPascal> = self
            .pressure
            .iter()
            .cloned()
            .filter(|&p| p < bottom && p > top)
            .collect();
        levels.insert(0, bottom);
        levels.push(top);

        let tvs = levels
            .iter()
            .map(|&p| self.virtual_temperature_at(p).map(|tv| tv.unpack()))
            .collect::<Result<Vec<f64>>>()?;

        let dz: f64 = levels
            .iter()
            .zip(tvs.iter())
            .tuple_windows::<(_, _)>()
            .map(|((p0, tv0), (p1, tv1))| {
                RD / G * 0.5 * (tv0 + tv1) * (p0.unpack() / p1.unpack()).ln()
            })
            .sum();

        Ok(Meters(dz))
    }

    fn interpolate(&self, pressure: HectoPascal, values: &[Celsius]) -> Result<Celsius> {
        let target = pressure.unpack();
        if !target.is_finite() || target <= 0.0 {
            return Err(AnalysisError::InvalidPressure(target));
        }

        let (i0, i1) = bracket(&self.pressure, pressure).ok_or(AnalysisError::OutOfRange {
            pressure: target,
            top: self.top_pressure().unpack(),
            bottom: self.bottom_pressure().unpack(),
        })?;

        if i0 == i1 {
            return Ok(values[i0]);
        }

        Ok(Celsius(log_p_interp(
            target,
            self.pressure[i0].unpack(),
            self.pressure[i1].unpack(),
            values[i0].unpack(),
            values[i1].unpack(),
        )))
    }
}

fn build_rows<P, T>(pressure: &[P], temperature: &[T], dew_point: &[T]) -> Result<Vec<DataRow>>
where
    P: Copy,
    T: Copy,
    HectoPascal: From<P>,
    Celsius: From<T>,
{
    itertools::izip!(pressure, temperature, dew_point)
        .map(|(&p, &t, &td)| {
            let (p, t, td) = (HectoPascal::from(p), Celsius::from(t), Celsius::from(td));

            // Missing values are not allowed here, so NaN has to be caught before it is wrapped.
            if !p.unpack().is_finite() || !t.unpack().is_finite() || !td.unpack().is_finite() {
                return Err(AnalysisError::MalformedProfile(format!(
                    "non-finite value at level ({:?}, {:?}, {:?})",
                    p, t, td
                )));
            }

            Ok(DataRow {
                pressure: some(p),
                temperature: some(t),
                dew_point: some(td),
                ..DataRow::default()
            })
        })
        .collect()
}

// A complete level.
struct Level {
    pressure: HectoPascal,
    temperature: Celsius,
    dew_point: Celsius,
    height: Optioned<Meters>,
    wind: Optioned<WindSpdDir<Knots>>,
}

fn validate_row(row: &DataRow) -> Result<Level> {
    let (pressure, temperature, dew_point) = match (
        row.pressure.into_option(),
        row.temperature.into_option(),
        row.dew_point.into_option(),
    ) {
        (Some(p), Some(t), Some(td)) => (p, t, td),
        _ => {
            return Err(AnalysisError::MalformedProfile(
                "level missing pressure, temperature, or dew point".to_owned(),
            ))
        }
    };

    let (p, t, td) = (pressure.unpack(), temperature.unpack(), dew_point.unpack());

    if !p.is_finite() || p <= 0.0 {
        return Err(AnalysisError::MalformedProfile(format!(
            "invalid pressure {} hPa",
            p
        )));
    }

    if !t.is_finite() || !td.is_finite() || Kelvin::from(dew_point).unpack() <= 0.0 {
        return Err(AnalysisError::MalformedProfile(format!(
            "invalid temperature or dew point at {} hPa",
            p
        )));
    }

    if td > t {
        return Err(AnalysisError::MalformedProfile(format!(
            "dew point {} C exceeds temperature {} C at {} hPa",
            td, t, p
        )));
    }

    Ok(Level {
        pressure,
        temperature,
        dew_point,
        height: row.height,
        wind: row.wind,
    })
}
