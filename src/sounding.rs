//! The raw sounding container.
//!
//! A decoder fills a `Sounding` column by column. Columns may have gaps and nothing is checked
//! for consistency, so build an `EnvironmentProfile` from it before doing any analysis. Row 0 of
//! every non-empty column is reserved for the surface observation.

use chrono::NaiveDateTime;
use metfor::{Celsius, HectoPascal, Knots, Meters, WindSpdDir};
use optional::{Noned, Optioned};

pub use self::{data_row::DataRow, station_info::StationInfo};

/// Observed (or modeled) columns of an atmospheric sounding plus its metadata.
///
/// A column that was never provided stays empty instead of being filled with missing values.
#[derive(Clone, Debug, Default)]
pub struct Sounding {
    source: Option<String>,
    station: StationInfo,
    valid_time: Option<NaiveDateTime>,

    surface: DataRow,

    pressure: Vec<Optioned<HectoPascal>>,
    temperature: Vec<Optioned<Celsius>>,
    dew_point: Vec<Optioned<Celsius>>,
    wind: Vec<Optioned<WindSpdDir<Knots>>>,
    height: Vec<Optioned<Meters>>,
}

/// Put the surface value in front of an upper air column.
fn with_surface<U: Noned + Copy>(
    mut column: Vec<Optioned<U>>,
    surface: Optioned<U>,
) -> Vec<Optioned<U>> {
    if !column.is_empty() {
        column.insert(0, surface);
    }
    column
}

/// Overwrite the surface slot of a column, if it has one.
fn replace_surface<U: Noned + Copy>(column: &mut [Optioned<U>], surface: Optioned<U>) {
    if let Some(first) = column.first_mut() {
        *first = surface;
    }
}

/// Convert anything that can become an optional quantity into the unit stored here.
fn convert<T, U, V>(value: T) -> Optioned<V>
where
    Optioned<U>: From<T>,
    U: Noned + Copy,
    V: Noned + Copy + From<U>,
{
    let value: Optioned<U> = Optioned::from(value);
    value.map_t(V::from)
}

impl Sounding {
    /// Create a new, empty sounding.
    ///
    /// ```rust
    /// use skewt_engine::Sounding;
    ///
    /// let snd = Sounding::new();
    /// assert_eq!(snd.len(), 0);
    /// assert!(snd.rows().next().is_none());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Sounding::default()
    }

    /// Describe where the data came from, e.g. a model name or a station and cycle.
    ///
    /// ```rust
    /// use skewt_engine::Sounding;
    ///
    /// let snd = Sounding::new().with_source_description("GFS f012 KMSO".to_owned());
    /// assert_eq!(snd.source_description(), Some("GFS f012 KMSO"));
    ///
    /// let snd = snd.with_source_description(None);
    /// assert!(snd.source_description().is_none());
    /// ```
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// The source description, if any.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Set the station info. The station elevation doubles as the surface height.
    #[inline]
    pub fn with_station_info(mut self, station: StationInfo) -> Self {
        self.station = station;
        self.surface.height = station.elevation();
        replace_surface(&mut self.height, self.surface.height);
        self
    }

    /// Where the sounding was taken.
    #[inline]
    pub fn station_info(&self) -> &StationInfo {
        &self.station
    }

    /// Set the valid time.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use skewt_engine::Sounding;
    ///
    /// let vtime = NaiveDate::from_ymd(2019, 7, 4).and_hms(18, 0, 0);
    /// let snd = Sounding::new().with_valid_time(vtime);
    /// assert_eq!(snd.valid_time(), Some(vtime));
    /// assert!(snd.with_valid_time(None).valid_time().is_none());
    /// ```
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// The valid time, if known.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    /// Set the upper air pressure column, listed from the lowest level up.
    ///
    /// ```rust
    /// use metfor::HectoPascal;
    /// use optional::some;
    /// use skewt_engine::Sounding;
    ///
    /// let column = [850.0, 700.0, 500.0]
    ///     .iter()
    ///     .cloned()
    ///     .map(HectoPascal)
    ///     .map(some)
    ///     .collect();
    ///
    /// let snd = Sounding::new()
    ///     .with_station_pressure(HectoPascal(912.0))
    ///     .with_pressure_profile(column);
    ///
    /// // The station pressure sits in front of the upper air levels.
    /// assert_eq!(snd.pressure_profile().len(), 4);
    /// assert_eq!(snd.pressure_profile()[0].unwrap(), HectoPascal(912.0));
    /// ```
    pub fn with_pressure_profile(mut self, column: Vec<Optioned<HectoPascal>>) -> Self {
        self.pressure = with_surface(column, self.surface.pressure);
        self
    }

    /// The pressure column, surface first.
    #[inline]
    pub fn pressure_profile(&self) -> &[Optioned<HectoPascal>] {
        &self.pressure
    }

    /// Set the upper air temperature column.
    pub fn with_temperature_profile(mut self, column: Vec<Optioned<Celsius>>) -> Self {
        self.temperature = with_surface(column, self.surface.temperature);
        self
    }

    /// The temperature column, surface first.
    #[inline]
    pub fn temperature_profile(&self) -> &[Optioned<Celsius>] {
        &self.temperature
    }

    /// Set the upper air dew point column.
    pub fn with_dew_point_profile(mut self, column: Vec<Optioned<Celsius>>) -> Self {
        self.dew_point = with_surface(column, self.surface.dew_point);
        self
    }

    /// The dew point column, surface first.
    #[inline]
    pub fn dew_point_profile(&self) -> &[Optioned<Celsius>] {
        &self.dew_point
    }

    /// Set the upper air wind column.
    pub fn with_wind_profile(mut self, column: Vec<Optioned<WindSpdDir<Knots>>>) -> Self {
        self.wind = with_surface(column, self.surface.wind);
        self
    }

    /// The wind column, surface first.
    #[inline]
    pub fn wind_profile(&self) -> &[Optioned<WindSpdDir<Knots>>] {
        &self.wind
    }

    /// Set the upper air geopotential height column.
    pub fn with_height_profile(mut self, column: Vec<Optioned<Meters>>) -> Self {
        self.height = with_surface(column, self.surface.height);
        self
    }

    /// The geopotential height column, station elevation first.
    #[inline]
    pub fn height_profile(&self) -> &[Optioned<Meters>] {
        &self.height
    }

    /// Set the station pressure, in any pressure unit.
    ///
    ///```rust
    /// use metfor::{HectoPascal, Millibar};
    /// use optional::none;
    /// use skewt_engine::Sounding;
    ///
    /// let snd = Sounding::new().with_station_pressure(Millibar(1013.2));
    /// assert_eq!(snd.station_pressure().unwrap(), HectoPascal(1013.2));
    ///
    /// let snd = snd.with_station_pressure(none::<HectoPascal>());
    /// assert!(snd.station_pressure().is_none());
    ///```
    pub fn with_station_pressure<T, U>(mut self, value: T) -> Self
    where
        Optioned<U>: From<T>,
        U: Noned + Copy + metfor::Pressure,
        HectoPascal: From<U>,
    {
        self.surface.pressure = convert(value);
        replace_surface(&mut self.pressure, self.surface.pressure);
        self
    }

    /// The station pressure.
    #[inline]
    pub fn station_pressure(&self) -> Optioned<HectoPascal> {
        self.surface.pressure
    }

    /// Set the surface temperature, in any temperature unit.
    pub fn with_sfc_temperature<T, U>(mut self, value: T) -> Self
    where
        Optioned<U>: From<T>,
        U: Noned + Copy + metfor::Temperature,
        Celsius: From<U>,
    {
        self.surface.temperature = convert(value);
        replace_surface(&mut self.temperature, self.surface.temperature);
        self
    }

    /// The surface temperature.
    #[inline]
    pub fn sfc_temperature(&self) -> Optioned<Celsius> {
        self.surface.temperature
    }

    /// Set the surface dew point, in any temperature unit.
    ///
    ///```rust
    /// use metfor::{Celsius, Fahrenheit, Quantity};
    /// use skewt_engine::Sounding;
    ///
    /// let snd = Sounding::new()
    ///     .with_sfc_temperature(Celsius(25.0))
    ///     .with_sfc_dew_point(Fahrenheit(50.0));
    ///
    /// assert!((snd.sfc_dew_point().unwrap().unpack() - 10.0).abs() < 1.0e-9);
    ///```
    pub fn with_sfc_dew_point<T, U>(mut self, value: T) -> Self
    where
        Optioned<U>: From<T>,
        U: Noned + Copy + metfor::Temperature,
        Celsius: From<U>,
    {
        self.surface.dew_point = convert(value);
        replace_surface(&mut self.dew_point, self.surface.dew_point);
        self
    }

    /// The surface dew point.
    #[inline]
    pub fn sfc_dew_point(&self) -> Optioned<Celsius> {
        self.surface.dew_point
    }

    /// Set the surface wind, as speed and direction or as components.
    pub fn with_sfc_wind<T, U>(mut self, value: T) -> Self
    where
        Optioned<U>: From<T>,
        U: Noned + Copy,
        WindSpdDir<Knots>: From<U>,
    {
        self.surface.wind = convert(value);
        replace_surface(&mut self.wind, self.surface.wind);
        self
    }

    /// The surface wind.
    #[inline]
    pub fn sfc_wind(&self) -> Optioned<WindSpdDir<Knots>> {
        self.surface.wind
    }

    /// Replace every column at once from rows listed bottom up. The first row is the surface.
    ///
    /// ```rust
    /// use metfor::{Celsius, HectoPascal};
    /// use optional::some;
    /// use skewt_engine::{DataRow, Sounding};
    ///
    /// let row = |p: f64, t: f64| DataRow {
    ///     pressure: some(HectoPascal(p)),
    ///     temperature: some(Celsius(t)),
    ///     ..DataRow::default()
    /// };
    ///
    /// let snd = Sounding::new().with_levels(vec![row(1000.0, 15.0), row(850.0, 5.0)]);
    ///
    /// assert_eq!(snd.len(), 2);
    /// assert_eq!(snd.station_pressure().unwrap(), HectoPascal(1000.0));
    /// assert_eq!(snd.surface_row().unwrap(), row(1000.0, 15.0));
    /// ```
    pub fn with_levels<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = DataRow>,
    {
        let mut rows = rows.into_iter();
        self.surface = rows.next().unwrap_or_default();

        self.pressure = vec![self.surface.pressure];
        self.temperature = vec![self.surface.temperature];
        self.dew_point = vec![self.surface.dew_point];
        self.wind = vec![self.surface.wind];
        self.height = vec![self.surface.height];

        for row in rows {
            self.pressure.push(row.pressure);
            self.temperature.push(row.temperature);
            self.dew_point.push(row.dew_point);
            self.wind.push(row.wind);
            self.height.push(row.height);
        }

        self
    }

    /// Number of rows, including the surface, as set by the pressure column.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// True if there is no pressure column.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Row `idx` across all columns, row 0 is the surface. A column shorter than the pressure
    /// column reads as missing.
    pub fn data_row(&self, idx: usize) -> Option<DataRow> {
        fn cell<U: Noned + Copy>(column: &[Optioned<U>], idx: usize) -> Optioned<U> {
            column.get(idx).cloned().unwrap_or_default()
        }

        if idx >= self.len() {
            return None;
        }

        Some(DataRow {
            pressure: self.pressure[idx],
            temperature: cell(&self.temperature, idx),
            dew_point: cell(&self.dew_point, idx),
            wind: cell(&self.wind, idx),
            height: cell(&self.height, idx),
        })
    }

    /// Iterate over the rows from the surface up.
    ///
    /// ```rust
    /// use metfor::HectoPascal;
    /// use skewt_engine::doctest::make_test_sounding;
    ///
    /// let snd = make_test_sounding();
    /// let pressures: Vec<HectoPascal> = snd
    ///     .rows()
    ///     .filter_map(|row| row.pressure.into_option())
    ///     .collect();
    ///
    /// assert_eq!(pressures.len(), 5);
    /// assert_eq!(pressures[0], HectoPascal(1005.0));
    /// assert!(pressures.windows(2).all(|pair| pair[0] > pair[1]));
    /// ```
    pub fn rows<'a>(&'a self) -> impl Iterator<Item = DataRow> + 'a {
        (0..self.len()).filter_map(move |idx| self.data_row(idx))
    }

    /// The surface observation, if there is a pressure column to hold it.
    #[inline]
    pub fn surface_row(&self) -> Option<DataRow> {
        self.data_row(0)
    }
}

#[doc(hidden)]
pub mod doctest {
    use super::*;
    use optional::some;

    /// A short sounding from 1005 hPa to 700 hPa.
    pub fn make_test_sounding() -> Sounding {
        let column = |vals: &[f64]| -> Vec<Optioned<Celsius>> {
            vals.iter().map(|&v| some(Celsius(v))).collect()
        };
        let pressure: Vec<Optioned<HectoPascal>> = [1000.0, 925.0, 850.0, 700.0]
            .iter()
            .map(|&p| some(HectoPascal(p)))
            .collect();

        Sounding::new()
            .with_station_pressure(HectoPascal(1005.0))
            .with_sfc_temperature(Celsius(21.0))
            .with_sfc_dew_point(Celsius(12.5))
            .with_pressure_profile(pressure)
            .with_temperature_profile(column(&[20.0, 18.0, 10.0, 2.0]))
            .with_dew_point_profile(column(&[12.0, 9.0, 1.0, -8.0]))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use metfor::{Feet, Quantity};
    use optional::{none, some};

    #[test]
    fn test_columns() {
        let snd = doctest::make_test_sounding();

        assert_eq!(snd.len(), 5);
        assert_eq!(snd.temperature_profile().len(), 5);
        assert!(snd.wind_profile().is_empty());
        assert!(snd.height_profile().is_empty());

        let sfc = snd.surface_row().unwrap();
        assert_eq!(sfc.pressure.unwrap(), HectoPascal(1005.0));
        assert_eq!(sfc.temperature.unwrap(), Celsius(21.0));
        assert_eq!(sfc.dew_point.unwrap(), Celsius(12.5));
        assert!(sfc.wind.is_none());

        let top = snd.data_row(4).unwrap();
        assert_eq!(top.pressure.unwrap(), HectoPascal(700.0));
        assert_eq!(top.dew_point.unwrap(), Celsius(-8.0));

        assert!(snd.data_row(5).is_none());
        assert_eq!(snd.rows().count(), 5);
    }

    #[test]
    fn test_surface_set_after_columns() {
        let snd = Sounding::new()
            .with_pressure_profile(vec![some(HectoPascal(850.0))])
            .with_temperature_profile(vec![some(Celsius(10.0))]);
        assert!(snd.pressure_profile()[0].is_none());

        let snd = snd
            .with_station_pressure(HectoPascal(990.0))
            .with_sfc_temperature(Celsius(22.0));
        assert_eq!(snd.pressure_profile()[0].unwrap(), HectoPascal(990.0));
        assert_eq!(snd.temperature_profile()[0].unwrap(), Celsius(22.0));

        // Dew point was never given, so that column stays empty.
        assert!(snd.dew_point_profile().is_empty());
        assert!(snd.surface_row().unwrap().dew_point.is_none());
    }

    #[test]
    fn test_station_elevation_is_surface_height() {
        let stn = StationInfo::new()
            .with_station(72776)
            .with_lat_lon((47.46, -111.38))
            .with_elevation(Feet(3658.0));

        let heights = vec![some(Meters(1500.0)), none()];

        // Either order works.
        let before = Sounding::new()
            .with_station_info(stn)
            .with_height_profile(heights.clone());
        let after = Sounding::new()
            .with_height_profile(heights)
            .with_station_info(stn);

        for snd in &[before, after] {
            let elevation = snd.height_profile()[0].unwrap();
            assert!((elevation.unpack() - 1115.0).abs() < 0.1);
            assert_eq!(snd.height_profile().len(), 3);
        }
    }

    #[test]
    fn test_with_levels() {
        let rows: Vec<DataRow> = [(1000.0, 20.0, 15.0), (900.0, 14.0, 2.0), (800.0, 8.0, -4.0)]
            .iter()
            .map(|&(p, t, td)| DataRow {
                pressure: some(HectoPascal(p)),
                temperature: some(Celsius(t)),
                dew_point: some(Celsius(td)),
                ..DataRow::default()
            })
            .collect();

        let snd = Sounding::new().with_levels(rows.clone());
        assert_eq!(snd.rows().collect::<Vec<_>>(), rows);
        assert_eq!(snd.sfc_dew_point().unwrap(), Celsius(15.0));
        assert!(rows.iter().all(DataRow::is_complete));

        let empty = Sounding::new().with_levels(Vec::new());
        assert_eq!(empty.len(), 1);
        assert!(!empty.surface_row().unwrap().is_complete());
    }
}

mod data_row;
mod station_info;
